use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{FrameIndex, VideoId};
use crate::foundation::error::BurninResult;

/// Image format used for extracted frame files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// Lossy JPEG (`.jpg`).
    #[default]
    Jpg,
    /// Lossless PNG (`.png`).
    Png,
}

impl FrameFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    /// Whether `path` carries this format's extension (case-insensitive; `.jpeg` counts as jpg).
    pub fn matches(self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        match self {
            Self::Jpg => ext == "jpg" || ext == "jpeg",
            Self::Png => ext == "png",
        }
    }
}

/// File name of frame `idx`: `frame_{idx:06}.{ext}`.
///
/// Six-digit zero padding keeps lexical order equal to temporal order up to 999_999 frames.
pub fn frame_file_name(idx: FrameIndex, format: FrameFormat) -> String {
    format!("frame_{:06}.{}", idx.0, format.extension())
}

/// Public path under which an external consumer addresses frame `idx` of `video`.
pub fn public_frame_path(video: &VideoId, idx: FrameIndex, format: FrameFormat) -> String {
    format!("/frames/{}/{}", video, frame_file_name(idx, format))
}

/// Frame files of `dir` with `format`'s extension, sorted by file name.
pub fn list_frame_files(dir: &Path, format: FrameFormat) -> BurninResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("read frame directory '{}'", dir.display()))?
    {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && format.matches(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
