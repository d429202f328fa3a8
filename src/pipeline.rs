//! Collaborator-facing operations: upload intake, frame extraction, caption editing and
//! rendering, wired from one [`PipelineConfig`].

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assemble::{AssemblyReport, VideoAssembler};
use crate::captions::index::CaptionIndex;
use crate::captions::persist::{CaptionPersistence, JsonFileStore};
use crate::captions::record::{CaptionRecord, UpsertOutcome};
use crate::config::PipelineConfig;
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Fps, VideoId};
use crate::foundation::error::{BurninError, BurninResult};
use crate::frames::store::{Extraction, FrameRef, FrameStore};
use crate::media::decode::FrameSource;
use crate::render::caption::CaptionRenderer;
use crate::render::text::FontBytes;

/// Container extensions accepted at upload intake (lowercase, with dot).
pub const ACCEPTED_EXTENSIONS: [&str; 4] = [".mp4", ".avi", ".mov", ".mkv"];

/// Extraction result as handed to external consumers.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    /// Identity to use for caption and render calls.
    pub video_id: VideoId,
    /// Frames written.
    pub frame_count: usize,
    /// Written frames in order.
    pub frames: Vec<FrameRef>,
    /// Detected source rate, or the configured default when none was detected.
    pub fps: f64,
    /// Frames dropped during extraction.
    pub skipped: u64,
}

/// Which variant of a video to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderKind {
    /// Frames with the caption overlay (`{id}_with_captions.mp4`).
    Captioned,
    /// Frames re-encoded without captions (`{id}_plain.mp4`).
    Plain,
}

impl RenderKind {
    fn output_file_name(self, video: &VideoId) -> String {
        match self {
            Self::Captioned => format!("{video}_with_captions.mp4"),
            Self::Plain => format!("{video}_plain.mp4"),
        }
    }
}

/// The captioning pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    frames: FrameStore,
    captions: CaptionIndex,
    font: FontBytes,
}

impl Pipeline {
    /// Build a pipeline with the JSON caption store named by `config`.
    pub fn new(config: PipelineConfig) -> BurninResult<Self> {
        let store = JsonFileStore::new(config.caption_store_path());
        Self::with_caption_store(config, store)
    }

    /// Build a pipeline over an explicit caption persistence handle.
    pub fn with_caption_store(
        config: PipelineConfig,
        store: impl CaptionPersistence + 'static,
    ) -> BurninResult<Self> {
        config.validate()?;
        config.ensure_dirs()?;

        let font = match &config.font_path {
            Some(path) => FontBytes::from_file(path)?,
            None => FontBytes::embedded(),
        };
        let frames = FrameStore::new(config.frames_dir(), config.frame_format)
            .with_jpeg_quality(config.jpeg_quality);

        Ok(Self {
            config,
            frames,
            captions: CaptionIndex::new(store),
            font,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Store the bytes of an upload named `original_name` under a fresh randomized name.
    ///
    /// Only `.mp4`, `.avi`, `.mov` and `.mkv` are accepted (case-insensitive). Returns the stored
    /// path, `uploads/upload_<uuid><ext>`.
    pub fn accept_upload(&self, original_name: &str, body: &mut dyn Read) -> BurninResult<PathBuf> {
        let ext = accepted_extension(original_name)?;
        let path = self
            .config
            .uploads_dir()
            .join(format!("upload_{}{ext}", uuid::Uuid::now_v7().simple()));

        if let Err(e) = write_upload(&path, body) {
            let _ = std::fs::remove_file(&path);
            return Err(e.into());
        }

        tracing::info!(original = original_name, stored = %path.display(), "upload stored");
        Ok(path)
    }

    /// Store an upload and extract its frames. A failed extraction deletes the stored upload.
    #[tracing::instrument(skip(self, body))]
    pub fn ingest_upload(&self, original_name: &str, body: &mut dyn Read) -> BurninResult<VideoInfo> {
        let path = self.accept_upload(original_name, body)?;
        match self.extract_frames(&path) {
            Ok(info) => Ok(info),
            Err(e) => {
                tracing::warn!(path = %path.display(), "extraction failed, removing upload: {e}");
                if path.exists() {
                    let _ = std::fs::remove_file(&path);
                }
                Err(e)
            }
        }
    }

    /// Decode the video at `video_path` into frames stored under its file stem.
    pub fn extract_frames(&self, video_path: &Path) -> BurninResult<VideoInfo> {
        let extraction = self.frames.extract_video(video_path)?;
        Ok(self.video_info(extraction))
    }

    /// Extract frames for `video` from an arbitrary source.
    pub fn extract_frames_from(
        &self,
        video: &VideoId,
        source: &mut dyn FrameSource,
    ) -> BurninResult<VideoInfo> {
        let extraction = self.frames.extract(video, source)?;
        Ok(self.video_info(extraction))
    }

    /// Insert or replace the caption for `[start_frame, end_frame]` of `video_id`.
    pub fn upsert_caption(
        &self,
        video_id: &str,
        start_frame: u64,
        end_frame: u64,
        text: &str,
    ) -> BurninResult<UpsertOutcome> {
        let video = VideoId::new(video_id)?;
        self.captions.upsert(&video, start_frame, end_frame, text)
    }

    /// Captions of `video_id` in insertion order.
    pub fn get_captions(&self, video_id: &str) -> BurninResult<Vec<CaptionRecord>> {
        let video = VideoId::new(video_id)?;
        self.captions.lookup(&video)
    }

    /// Render `video_id` with its captions into `uploads/{id}_with_captions.mp4`.
    pub fn render_captioned_video(&self, video_id: &str) -> BurninResult<PathBuf> {
        self.render_video(video_id, RenderKind::Captioned)
            .map(|(path, _)| path)
    }

    /// Re-encode `video_id` without captions into `uploads/{id}_plain.mp4`.
    pub fn render_plain_video(&self, video_id: &str) -> BurninResult<PathBuf> {
        self.render_video(video_id, RenderKind::Plain)
            .map(|(path, _)| path)
    }

    /// Render `video_id` with `ffmpeg` and return the output path and assembly report.
    #[tracing::instrument(skip(self))]
    pub fn render_video(
        &self,
        video_id: &str,
        kind: RenderKind,
    ) -> BurninResult<(PathBuf, AssemblyReport)> {
        let video = VideoId::new(video_id)?;
        if !self.frames.has_video(&video) {
            return Err(BurninError::unknown_video(format!(
                "no frame directory for '{video}'"
            )));
        }
        let (mut assembler, captions, fps) = self.render_inputs(&video, kind)?;
        let out = self
            .config
            .uploads_dir()
            .join(kind.output_file_name(&video));
        let report = assembler.assemble(
            &self.frames.frame_dir(&video),
            self.config.frame_format,
            &captions,
            &out,
            fps,
            &self.config.video_codec,
        )?;
        Ok((out, report))
    }

    /// Render `video` into an arbitrary sink.
    pub fn render_into(
        &self,
        video: &VideoId,
        kind: RenderKind,
        sink: &mut dyn FrameSink,
    ) -> BurninResult<AssemblyReport> {
        let files = self.frames.list_frames(video)?;
        let (mut assembler, captions, fps) = self.render_inputs(video, kind)?;
        assembler.assemble_into(&files, &captions, fps, sink)
    }

    fn render_inputs(
        &self,
        video: &VideoId,
        kind: RenderKind,
    ) -> BurninResult<(VideoAssembler, Vec<CaptionRecord>, Fps)> {
        let captions = match kind {
            RenderKind::Captioned => self.captions.lookup(video)?,
            RenderKind::Plain => Vec::new(),
        };
        let fps = self.render_fps(video)?;
        let renderer = CaptionRenderer::new(self.config.style.clone(), self.font.clone())?;
        Ok((VideoAssembler::new(renderer), captions, fps))
    }

    /// Output rate for `video`: the rate recorded at extraction, else the configured default.
    pub fn render_fps(&self, video: &VideoId) -> BurninResult<Fps> {
        let recorded = match self.frames.read_manifest(video) {
            Ok(manifest) => manifest.and_then(|m| m.fps),
            Err(e) => {
                tracing::warn!(video = %video, "ignoring unreadable frame manifest: {e}");
                None
            }
        };
        match recorded {
            Some(fps) => Ok(fps),
            None => self.config.default_fps(),
        }
    }

    fn video_info(&self, extraction: Extraction) -> VideoInfo {
        let fps = extraction
            .fps
            .map(Fps::as_f64)
            .unwrap_or(f64::from(self.config.default_fps));
        VideoInfo {
            frame_count: extraction.frame_count(),
            video_id: extraction.video,
            frames: extraction.frames,
            fps,
            skipped: extraction.skipped,
        }
    }
}

fn write_upload(path: &Path, body: &mut dyn Read) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("create upload '{}'", path.display()))?;
    std::io::copy(body, &mut file).with_context(|| format!("write upload '{}'", path.display()))?;
    file.sync_all()
        .with_context(|| format!("sync upload '{}'", path.display()))?;
    Ok(())
}

/// Lowercased extension (with dot) of `file_name` if it is an accepted container.
pub fn accepted_extension(file_name: &str) -> BurninResult<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(BurninError::unsupported_format(format!(
            "'{file_name}' is not a supported video; use MP4, AVI, MOV, or MKV"
        )))
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
