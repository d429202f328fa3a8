//! burnin burns frame-accurate captions into videos.
//!
//! The pipeline has three stages:
//!
//! - Extract a video into numbered frame files ([`FrameStore`])
//! - Attach captions to inclusive frame ranges ([`CaptionIndex`])
//! - Re-encode the frames with every covering caption composited on top ([`VideoAssembler`])
//!
//! [`Pipeline`] wires the stages from one [`PipelineConfig`]. Decoding and encoding go through
//! the system `ffmpeg`/`ffprobe` binaries behind the [`FrameSource`] and [`FrameSink`] traits.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame sequence to encoder, with caption overlays.
pub mod assemble;
pub mod captions;
/// Pipeline configuration.
pub mod config;
pub mod encode;
pub mod frames;
pub mod media;
pub mod pipeline;
pub mod render;

pub use crate::foundation::core::{Fps, FrameIndex, VideoId};
pub use crate::foundation::error::{BurninError, BurninResult};

pub use crate::assemble::{AssemblyReport, VideoAssembler};
pub use crate::captions::index::CaptionIndex;
pub use crate::captions::persist::{CaptionPersistence, InMemoryStore, JsonFileStore};
pub use crate::captions::record::{CaptionDocument, CaptionRecord, UpsertOutcome};
pub use crate::captions::timeline::{CAPTION_JOINER, CaptionTimeline};
pub use crate::config::PipelineConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::frames::naming::FrameFormat;
pub use crate::frames::store::{Extraction, FrameManifest, FrameRef, FrameStore};
pub use crate::media::decode::{FfmpegFrameSource, FrameSource, InMemorySource};
pub use crate::pipeline::{Pipeline, RenderKind, VideoInfo};
pub use crate::render::caption::CaptionRenderer;
pub use crate::render::layout::CaptionStyle;
pub use crate::render::text::FontBytes;
