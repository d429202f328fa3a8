use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::captions::record::CaptionRecord;
use crate::captions::timeline::CaptionTimeline;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{BurninError, BurninResult};
use crate::frames::naming::{FrameFormat, list_frame_files};
use crate::render::caption::CaptionRenderer;

/// Summary of one assembly run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AssemblyReport {
    /// Encoded file, when the run wrote to a file.
    pub output_path: Option<PathBuf>,
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Frames that received a caption overlay.
    pub frames_captioned: u64,
    /// Frames dropped because they could not be decoded or had the wrong size.
    pub frames_skipped: u64,
}

/// Replays a frame directory through the caption renderer into an encoder.
pub struct VideoAssembler {
    renderer: CaptionRenderer,
}

impl VideoAssembler {
    /// Create an assembler drawing captions with `renderer`.
    pub fn new(renderer: CaptionRenderer) -> Self {
        Self { renderer }
    }

    /// Assemble the `format` frames of `frame_dir` into an MP4 at `output_path`.
    pub fn assemble(
        &mut self,
        frame_dir: &Path,
        format: FrameFormat,
        captions: &[CaptionRecord],
        output_path: &Path,
        fps: Fps,
        codec: &str,
    ) -> BurninResult<AssemblyReport> {
        let frames = list_frame_files(frame_dir, format)?;
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(output_path).with_codec(codec));
        let mut report = self.assemble_into(&frames, captions, fps, &mut sink)?;
        report.output_path = Some(output_path.to_path_buf());
        Ok(report)
    }

    /// Caption and push `frames` (already in temporal order) into `sink`.
    ///
    /// The caption lookup index of a frame is its position in `frames`. The first frame fixes the
    /// output resolution; later frames that fail to decode or differ in size are skipped.
    #[tracing::instrument(skip_all, fields(frames = frames.len(), captions = captions.len(), fps = %fps))]
    pub fn assemble_into(
        &mut self,
        frames: &[PathBuf],
        captions: &[CaptionRecord],
        fps: Fps,
        sink: &mut dyn FrameSink,
    ) -> BurninResult<AssemblyReport> {
        let Some(first_path) = frames.first() else {
            return Err(BurninError::no_frames("frame directory contains no frames"));
        };
        let first = decode_frame(first_path).map_err(|e| {
            BurninError::unreadable_frame(format!(
                "first frame '{}' could not be decoded: {e:#}",
                first_path.display()
            ))
        })?;
        let (width, height) = first.dimensions();

        let timeline = CaptionTimeline::new(captions);
        let mut report = AssemblyReport::default();

        sink.begin(SinkConfig { width, height, fps })?;

        let mut first = Some(first);
        for (pos, path) in frames.iter().enumerate() {
            let idx = FrameIndex(pos as u64);
            let frame = match first.take() {
                Some(frame) => frame,
                None => match decode_frame(path) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(frame = idx.0, path = %path.display(), "skipping undecodable frame: {e:#}");
                        report.frames_skipped += 1;
                        continue;
                    }
                },
            };
            if frame.dimensions() != (width, height) {
                tracing::warn!(
                    frame = idx.0,
                    got = ?frame.dimensions(),
                    expected = ?(width, height),
                    "skipping frame with mismatched size"
                );
                report.frames_skipped += 1;
                continue;
            }

            let frame = match timeline.text_at(idx) {
                Some(text) if !text.trim().is_empty() => {
                    report.frames_captioned += 1;
                    self.renderer.render(&frame, &text, height, width)?
                }
                _ => frame,
            };

            sink.push_frame(idx, &frame)?;
            report.frames_written += 1;
        }

        sink.end()?;

        tracing::info!(
            written = report.frames_written,
            captioned = report.frames_captioned,
            skipped = report.frames_skipped,
            "assembled video"
        );
        Ok(report)
    }
}

fn decode_frame(path: &Path) -> anyhow::Result<RgbImage> {
    use anyhow::Context as _;
    let img = image::open(path).with_context(|| format!("decode '{}'", path.display()))?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
#[path = "../tests/unit/assemble.rs"]
mod tests;
