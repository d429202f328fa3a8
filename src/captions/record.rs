use std::collections::BTreeMap;

use crate::foundation::core::{FrameIndex, VideoId};
use crate::foundation::error::{BurninError, BurninResult};

/// A caption bound to the inclusive frame range `[start_frame, end_frame]`.
///
/// Ranges are not checked against the video's frame count; a range past the end simply never
/// matches.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaptionRecord {
    /// First covered frame (inclusive).
    pub start_frame: u64,
    /// Last covered frame (inclusive).
    pub end_frame: u64,
    /// Caption text as entered.
    pub text: String,
}

impl CaptionRecord {
    /// Create a record, rejecting inverted ranges.
    pub fn new(start_frame: u64, end_frame: u64, text: impl Into<String>) -> BurninResult<Self> {
        if start_frame > end_frame {
            return Err(BurninError::validation(format!(
                "caption start_frame ({start_frame}) must be <= end_frame ({end_frame})"
            )));
        }
        Ok(Self {
            start_frame,
            end_frame,
            text: text.into(),
        })
    }

    /// Whether `frame` lies inside this record's inclusive range.
    pub fn covers(&self, frame: FrameIndex) -> bool {
        self.start_frame <= frame.0 && frame.0 <= self.end_frame
    }

    /// Whether this record has exactly the given range (the upsert key).
    pub fn has_range(&self, start_frame: u64, end_frame: u64) -> bool {
        self.start_frame == start_frame && self.end_frame == end_frame
    }
}

/// The whole persisted caption store: every video's records, in insertion order per video.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CaptionDocument {
    entries: BTreeMap<VideoId, Vec<CaptionRecord>>,
}

/// Result of an upsert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// A new record was appended.
    Inserted,
    /// An existing record with the same range had its text replaced.
    Updated,
}

impl CaptionDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for `video`, or an empty slice.
    pub fn records(&self, video: &VideoId) -> &[CaptionRecord] {
        self.entries.get(video).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the text of the record with the same range, or append a new one.
    pub fn upsert(&mut self, video: &VideoId, record: CaptionRecord) -> UpsertOutcome {
        let records = self.entries.entry(video.clone()).or_default();
        match records
            .iter_mut()
            .find(|r| r.has_range(record.start_frame, record.end_frame))
        {
            Some(existing) => {
                existing.text = record.text;
                UpsertOutcome::Updated
            }
            None => {
                records.push(record);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Video identities with at least one entry.
    pub fn videos(&self) -> impl Iterator<Item = &VideoId> {
        self.entries.keys()
    }

    /// Number of videos with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/captions/record.rs"]
mod tests;
