use std::sync::Mutex;

use crate::captions::persist::CaptionPersistence;
use crate::captions::record::{CaptionRecord, UpsertOutcome};
use crate::foundation::core::VideoId;
use crate::foundation::error::{BurninError, BurninResult};

/// Caption index over an injected persistence handle.
///
/// Every call loads the full document; writes save it back before returning. Nothing is cached
/// between calls. The load-modify-save cycle runs under one in-process lock, so concurrent
/// upserts through the same index never lose updates. Writers in other processes sharing the
/// same store are not coordinated.
pub struct CaptionIndex {
    store: Box<dyn CaptionPersistence>,
    write_lock: Mutex<()>,
}

impl CaptionIndex {
    /// Wrap a persistence handle.
    pub fn new(store: impl CaptionPersistence + 'static) -> Self {
        Self {
            store: Box::new(store),
            write_lock: Mutex::new(()),
        }
    }

    /// Insert a record for `(start_frame, end_frame)` or replace the text of the existing one.
    #[tracing::instrument(skip(self, video, text), fields(video = %video))]
    pub fn upsert(
        &self,
        video: &VideoId,
        start_frame: u64,
        end_frame: u64,
        text: &str,
    ) -> BurninResult<UpsertOutcome> {
        let record = CaptionRecord::new(start_frame, end_frame, text)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BurninError::Other(anyhow::anyhow!("caption index lock poisoned")))?;
        let mut doc = self.store.load()?;
        let outcome = doc.upsert(video, record);
        self.store.save(&doc)?;

        tracing::debug!(?outcome, start_frame, end_frame, "caption saved");
        Ok(outcome)
    }

    /// Records for `video` in insertion order; empty when the video has none.
    pub fn lookup(&self, video: &VideoId) -> BurninResult<Vec<CaptionRecord>> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BurninError::Other(anyhow::anyhow!("caption index lock poisoned")))?;
        let doc = self.store.load()?;
        Ok(doc.records(video).to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/captions/index.rs"]
mod tests;
