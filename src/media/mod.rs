//! Decode side of the codec seam: `ffprobe` probing and sequential frame sources.

/// Frame source trait and built-in sources.
pub mod decode;
/// `ffprobe` stream inspection.
pub mod probe;
