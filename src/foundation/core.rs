use std::fmt;

use crate::foundation::error::{BurninError, BurninResult};

/// Absolute 0-based frame index in source-video order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> BurninResult<Self> {
        if den == 0 {
            return Err(BurninError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(BurninError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse an ffmpeg-style ratio such as `30000/1001` or a bare integer such as `25`.
    ///
    /// Returns `None` for malformed, zero, or non-positive rates (`0/0` is what `ffprobe` reports
    /// for streams without a nominal rate).
    pub fn parse_ratio(s: &str) -> Option<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((a, b)) => (a.trim().parse::<u32>().ok()?, b.trim().parse::<u32>().ok()?),
            None => (s.parse::<u32>().ok()?, 1),
        };
        Self::new(num, den).ok()
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Opaque key naming one uploaded video's frame directory and caption entry.
///
/// Identities are derived from the stored upload's file stem. Uniqueness is the caller's job;
/// this type only rejects values that cannot safely name a directory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Create a validated identity.
    pub fn new(id: impl Into<String>) -> BurninResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(BurninError::validation("video id must be non-empty"));
        }
        if id.contains('/') || id.contains('\\') || id == "." || id == ".." {
            return Err(BurninError::validation(format!(
                "video id '{id}' must not contain path separators or be a relative path segment"
            )));
        }
        Ok(Self(id))
    }

    /// Derive the identity from a video file path (its file stem).
    pub fn from_path(path: &std::path::Path) -> BurninResult<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                BurninError::validation(format!(
                    "cannot derive a video id from '{}'",
                    path.display()
                ))
            })?;
        Self::new(stem)
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
