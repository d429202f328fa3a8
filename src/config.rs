use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::{BurninError, BurninResult};
use crate::frames::naming::FrameFormat;
use crate::render::layout::CaptionStyle;

/// Environment variable overriding [`PipelineConfig::data_dir`].
pub const ENV_DATA_DIR: &str = "BURNIN_DATA_DIR";
/// Environment variable overriding [`PipelineConfig::font_path`].
pub const ENV_FONT: &str = "BURNIN_FONT";

/// Pipeline configuration.
///
/// Every field has a default, so an empty JSON object is a valid config file.
///
/// | Source                 | Applied by                       |
/// |------------------------|----------------------------------|
/// | JSON file              | [`PipelineConfig::from_json_file`] |
/// | `BURNIN_DATA_DIR`      | [`PipelineConfig::apply_env`]    |
/// | `BURNIN_FONT`          | [`PipelineConfig::apply_env`]    |
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Root holding `uploads/` and `frames/`.
    pub data_dir: PathBuf,
    /// Caption document path; relative paths resolve against `data_dir`.
    pub caption_store: PathBuf,
    /// Image format of extracted frames.
    pub frame_format: FrameFormat,
    /// JPEG quality for `jpg` frames.
    pub jpeg_quality: u8,
    /// Output rate when a video's source rate is unknown.
    pub default_fps: u32,
    /// Font file overriding the embedded font.
    pub font_path: Option<PathBuf>,
    /// `ffmpeg` encoder for rendered videos.
    pub video_codec: String,
    /// Caption overlay style.
    pub style: CaptionStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            caption_store: PathBuf::from("uploads/captions.json"),
            frame_format: FrameFormat::Jpg,
            jpeg_quality: 95,
            default_fps: 30,
            font_path: None,
            video_codec: "libx264".to_string(),
            style: CaptionStyle::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON config document.
    pub fn from_json_str(s: &str) -> BurninResult<Self> {
        serde_json::from_str(s).map_err(|e| BurninError::serde(format!("config: {e}")))
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: &Path) -> BurninResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
            .map_err(|e| BurninError::serde(format!("{}: {e}", path.display())))
    }

    /// Apply `BURNIN_DATA_DIR` and `BURNIN_FONT` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(font) = get(ENV_FONT) {
            self.font_path = Some(PathBuf::from(font));
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> BurninResult<()> {
        if self.default_fps == 0 {
            return Err(BurninError::validation("default_fps must be > 0"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BurninError::validation("jpeg_quality must be in 1..=100"));
        }
        if self.video_codec.trim().is_empty() {
            return Err(BurninError::validation("video_codec must be non-empty"));
        }
        if !(0.0..=1.0).contains(&self.style.panel_opacity) {
            return Err(BurninError::validation("style.panel_opacity must be in [0, 1]"));
        }
        if !self.style.base_font_px.is_finite() || self.style.base_font_px <= 0.0 {
            return Err(BurninError::validation("style.base_font_px must be > 0"));
        }
        Ok(())
    }

    /// Directory receiving uploads and rendered videos.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Directory holding one frame directory per video.
    pub fn frames_dir(&self) -> PathBuf {
        self.data_dir.join("frames")
    }

    /// Resolved caption document path.
    pub fn caption_store_path(&self) -> PathBuf {
        if self.caption_store.is_absolute() {
            self.caption_store.clone()
        } else {
            self.data_dir.join(&self.caption_store)
        }
    }

    /// Fallback output rate.
    pub fn default_fps(&self) -> BurninResult<Fps> {
        Fps::new(self.default_fps, 1)
    }

    /// Create the uploads and frames directories.
    pub fn ensure_dirs(&self) -> BurninResult<()> {
        for dir in [self.uploads_dir(), self.frames_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create directory '{}'", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
