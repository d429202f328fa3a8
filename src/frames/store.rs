use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbImage;

use crate::foundation::core::{Fps, FrameIndex, VideoId};
use crate::foundation::error::{BurninError, BurninResult};
use crate::frames::naming::{FrameFormat, frame_file_name, list_frame_files, public_frame_path};
use crate::media::decode::{FfmpegFrameSource, FrameSource};

/// Name of the per-video manifest written next to the frame files.
pub const MANIFEST_FILE_NAME: &str = "frames.json";

/// Reference to one extracted frame, as handed to external consumers.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRef {
    /// 0-based sequential frame number.
    pub frame_number: u64,
    /// Public path (`/frames/{video}/frame_{n:06}.{ext}`).
    pub path: String,
}

/// Per-frame result of extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was written to disk.
    Written(FrameRef),
    /// The frame could not be written and was dropped.
    Skipped {
        /// Index the frame would have taken.
        attempted: FrameIndex,
        /// Human-readable cause.
        reason: String,
    },
}

/// Result of extracting one video.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    /// Identity the frames were stored under.
    pub video: VideoId,
    /// Written frames in ascending, gapless index order.
    pub frames: Vec<FrameRef>,
    /// Nominal source rate, if the source reported a positive one.
    pub fps: Option<Fps>,
    /// Decoded frames that could not be written.
    pub skipped: u64,
}

impl Extraction {
    /// Number of frames written.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Facts recorded alongside a video's frames at extraction time.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameManifest {
    /// Frames written.
    pub frame_count: u64,
    /// Frames dropped because they could not be written.
    pub skipped: u64,
    /// Nominal source rate.
    pub fps: Option<Fps>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Image format of the frame files.
    pub image_format: FrameFormat,
}

/// On-disk store of extracted frames: one directory per video identity under `root`.
#[derive(Clone, Debug)]
pub struct FrameStore {
    root: PathBuf,
    format: FrameFormat,
    jpeg_quality: u8,
}

impl FrameStore {
    /// Create a store rooted at `root` writing frames as `format`.
    pub fn new(root: impl Into<PathBuf>, format: FrameFormat) -> Self {
        Self {
            root: root.into(),
            format,
            jpeg_quality: 95,
        }
    }

    /// Set the JPEG quality (1..=100) used for `jpg` frames.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Directory holding `video`'s frames.
    pub fn frame_dir(&self, video: &VideoId) -> PathBuf {
        self.root.join(video.as_str())
    }

    /// Whether a frame directory exists for `video`.
    pub fn has_video(&self, video: &VideoId) -> bool {
        self.frame_dir(video).is_dir()
    }

    /// Open `video_path` with `ffmpeg` and extract all its frames under the path's file stem.
    pub fn extract_video(&self, video_path: &Path) -> BurninResult<Extraction> {
        let video = VideoId::from_path(video_path)?;
        let mut source = FfmpegFrameSource::open(video_path)?;
        self.extract(&video, &mut source)
    }

    /// Decode `source` to the end and write each frame as `frame_{n:06}.{ext}`.
    ///
    /// A frame that cannot be written is logged and skipped; the next frame takes its index, so
    /// the written indices stay gapless. A decode error ends the stream early, like
    /// end-of-stream. Fails with [`BurninError::NoFrames`] when nothing was written.
    #[tracing::instrument(skip(self, video, source), fields(video = %video))]
    pub fn extract(
        &self,
        video: &VideoId,
        source: &mut dyn FrameSource,
    ) -> BurninResult<Extraction> {
        let dir = self.frame_dir(video);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create frame directory '{}'", dir.display()))?;

        let fps = source.nominal_fps();
        let mut frames = Vec::new();
        let mut skipped = 0u64;
        let mut dims: Option<(u32, u32)> = None;

        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        decoded = frames.len() as u64 + skipped,
                        "decoder stopped early: {e}"
                    );
                    break;
                }
            };

            let idx = FrameIndex(frames.len() as u64);
            match self.write_frame(&dir, video, idx, &frame) {
                FrameOutcome::Written(r) => {
                    dims.get_or_insert((frame.width(), frame.height()));
                    frames.push(r);
                }
                FrameOutcome::Skipped { attempted, reason } => {
                    tracing::warn!(frame = attempted.0, "failed to save frame: {reason}");
                    skipped += 1;
                }
            }
        }

        if frames.is_empty() {
            return Err(BurninError::no_frames(format!(
                "no frames were extracted for '{video}' ({skipped} skipped)"
            )));
        }

        let (width, height) = dims.unwrap_or_default();
        let manifest = FrameManifest {
            frame_count: frames.len() as u64,
            skipped,
            fps,
            width,
            height,
            image_format: self.format,
        };
        if let Err(e) = write_manifest(&dir, &manifest) {
            tracing::warn!("failed to write frame manifest: {e}");
        }

        tracing::info!(frames = frames.len(), skipped, fps = ?fps, "extracted frames");
        Ok(Extraction {
            video: video.clone(),
            frames,
            fps,
            skipped,
        })
    }

    /// Frame files of `video`, sorted by name (which is temporal order).
    pub fn list_frames(&self, video: &VideoId) -> BurninResult<Vec<PathBuf>> {
        let dir = self.frame_dir(video);
        if !dir.is_dir() {
            return Err(BurninError::unknown_video(format!(
                "no frame directory for '{video}'"
            )));
        }
        list_frame_files(&dir, self.format)
    }

    /// Manifest written at extraction time, if present and readable.
    pub fn read_manifest(&self, video: &VideoId) -> BurninResult<Option<FrameManifest>> {
        let path = self.frame_dir(video).join(MANIFEST_FILE_NAME);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read frame manifest '{}'", path.display()))
                    .into());
            }
        };
        let manifest = serde_json::from_slice(&bytes).map_err(|e| {
            BurninError::serde(format!("frame manifest '{}': {e}", path.display()))
        })?;
        Ok(Some(manifest))
    }

    fn write_frame(
        &self,
        dir: &Path,
        video: &VideoId,
        idx: FrameIndex,
        frame: &RgbImage,
    ) -> FrameOutcome {
        let path = dir.join(frame_file_name(idx, self.format));
        match encode_frame_file(&path, frame, self.format, self.jpeg_quality) {
            Ok(()) => FrameOutcome::Written(FrameRef {
                frame_number: idx.0,
                path: public_frame_path(video, idx, self.format),
            }),
            Err(e) => {
                if path.is_file() {
                    let _ = std::fs::remove_file(&path);
                }
                FrameOutcome::Skipped {
                    attempted: idx,
                    reason: format!("{e:#}"),
                }
            }
        }
    }
}

fn encode_frame_file(
    path: &Path,
    frame: &RgbImage,
    format: FrameFormat,
    jpeg_quality: u8,
) -> anyhow::Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut w = BufWriter::new(file);
    match format {
        FrameFormat::Jpg => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut w, jpeg_quality);
            frame
                .write_with_encoder(encoder)
                .with_context(|| format!("encode jpeg '{}'", path.display()))?;
        }
        FrameFormat::Png => {
            frame
                .write_to(&mut w, image::ImageFormat::Png)
                .with_context(|| format!("encode png '{}'", path.display()))?;
        }
    }
    w.flush()
        .with_context(|| format!("flush '{}'", path.display()))?;
    Ok(())
}

fn write_manifest(dir: &Path, manifest: &FrameManifest) -> anyhow::Result<()> {
    let path = dir.join(MANIFEST_FILE_NAME);
    let json = serde_json::to_vec_pretty(manifest).context("encode frame manifest")?;
    std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/frames/store.rs"]
mod tests;
