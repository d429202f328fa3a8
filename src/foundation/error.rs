/// Convenience result type used across burnin.
pub type BurninResult<T> = Result<T, BurninError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Whole-operation failures get their own variant so callers (CLI, HTTP layers) can map them to
/// distinct user-facing messages. Per-frame failures never surface here; they are logged and
/// counted in the operation reports instead.
#[derive(thiserror::Error, Debug)]
pub enum BurninError {
    /// The source video could not be opened or probed.
    #[error("open error: {0}")]
    Open(String),

    /// Zero frames were produced by extraction or found for assembly.
    #[error("no frames: {0}")]
    NoFrames(String),

    /// The first frame of a frame directory could not be decoded.
    #[error("unreadable frame: {0}")]
    UnreadableFrame(String),

    /// Upload rejected because its container extension is not recognized.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No frame directory exists for the requested video identity.
    #[error("unknown video: {0}")]
    UnknownVideo(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Text shaping or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// The output encoder failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing persisted documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BurninError {
    /// Build a [`BurninError::Open`] value.
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    /// Build a [`BurninError::NoFrames`] value.
    pub fn no_frames(msg: impl Into<String>) -> Self {
        Self::NoFrames(msg.into())
    }

    /// Build a [`BurninError::UnreadableFrame`] value.
    pub fn unreadable_frame(msg: impl Into<String>) -> Self {
        Self::UnreadableFrame(msg.into())
    }

    /// Build a [`BurninError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`BurninError::UnknownVideo`] value.
    pub fn unknown_video(msg: impl Into<String>) -> Self {
        Self::UnknownVideo(msg.into())
    }

    /// Build a [`BurninError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BurninError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BurninError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`BurninError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
