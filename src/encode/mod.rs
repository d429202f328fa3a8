//! Encoding sinks.
//!
//! Sinks consume assembled frames in temporal order and are driven by the video assembler.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
