use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context as _;

use crate::captions::record::CaptionDocument;
use crate::foundation::error::{BurninError, BurninResult};

/// Persistence handle for the whole caption document.
///
/// Implementations load and save the full document; the caption index owns the read-modify-write
/// sequencing around these calls.
pub trait CaptionPersistence: Send + Sync {
    /// Load the current document. A store that was never written loads as empty.
    fn load(&self) -> BurninResult<CaptionDocument>;
    /// Replace the stored document.
    fn save(&self, doc: &CaptionDocument) -> BurninResult<()>;
}

/// JSON file store. Saves go through a sibling temporary file and `rename`, so readers never
/// observe a half-written document.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "captions.json".into());
        name.push(format!(".{}.tmp", uuid::Uuid::now_v7().simple()));
        self.path.with_file_name(name)
    }
}

impl CaptionPersistence for JsonFileStore {
    fn load(&self) -> BurninResult<CaptionDocument> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CaptionDocument::new());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read caption store '{}'", self.path.display()))
                    .into());
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(CaptionDocument::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            BurninError::serde(format!(
                "caption store '{}' is not valid: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, doc: &CaptionDocument) -> BurninResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create caption store dir '{}'", parent.display()))?;
        }

        let json = serde_json::to_vec_pretty(doc)
            .map_err(|e| BurninError::serde(format!("encode caption store: {e}")))?;

        let tmp = self.temp_path();
        {
            let mut f = std::fs::File::create(&tmp)
                .with_context(|| format!("create '{}'", tmp.display()))?;
            f.write_all(&json)
                .with_context(|| format!("write '{}'", tmp.display()))?;
            f.sync_all()
                .with_context(|| format!("sync '{}'", tmp.display()))?;
        }
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "replace caption store '{}' with '{}'",
                self.path.display(),
                tmp.display()
            )
        })?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral pipelines.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    doc: Mutex<CaptionDocument>,
    saves: Mutex<u64>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> u64 {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl CaptionPersistence for InMemoryStore {
    fn load(&self) -> BurninResult<CaptionDocument> {
        let doc = self
            .doc
            .lock()
            .map_err(|_| {
                BurninError::Other(anyhow::anyhow!("in-memory caption store lock poisoned"))
            })?;
        Ok(doc.clone())
    }

    fn save(&self, doc: &CaptionDocument) -> BurninResult<()> {
        let mut slot = self
            .doc
            .lock()
            .map_err(|_| {
                BurninError::Other(anyhow::anyhow!("in-memory caption store lock poisoned"))
            })?;
        *slot = doc.clone();
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/captions/persist.rs"]
mod tests;
