use image::RgbImage;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{BurninError, BurninResult};

/// Stream parameters fixed when assembly starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Playback rate.
    pub fps: Fps,
}

/// Sink contract for consuming assembled frames in temporal order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. Indices
/// may have holes when frames were skipped upstream.
pub trait FrameSink: Send {
    /// Start a stream; every pushed frame must match `cfg`.
    fn begin(&mut self, cfg: SinkConfig) -> BurninResult<()>;
    /// Push one frame in strictly increasing index order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> BurninResult<()>;
    /// Finish the stream. A sink that fails here has not produced usable output.
    fn end(&mut self) -> BurninResult<()>;
}

/// Sink that keeps frames in memory; used by tests and for previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    finished: bool,
    /// Frames in push order.
    pub(crate) frames: Vec<(FrameIndex, RgbImage)>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters of the current stream, once started.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Frames received since the last `begin`, with their indices.
    pub fn frames(&self) -> &[(FrameIndex, RgbImage)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> BurninResult<()> {
        self.cfg = Some(cfg);
        self.finished = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> BurninResult<()> {
        if self.cfg.is_none() {
            return Err(BurninError::encode("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> BurninResult<()> {
        self.finished = true;
        Ok(())
    }
}
