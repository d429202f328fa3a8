use std::path::{Path, PathBuf};

use crate::foundation::core::Fps;
use crate::foundation::error::{BurninError, BurninResult};

/// Stream facts about a source video, as reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Width in pixels of decoded frames, after display rotation.
    pub width: u32,
    /// Height in pixels of decoded frames, after display rotation.
    pub height: u32,
    /// Display rotation in degrees, normalized to `0..360`.
    pub rotation: u32,
    /// Nominal frame rate; `None` when the container reports none or a non-positive one.
    pub fps: Option<Fps>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Default, serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    // ffmpeg auto-rotates on decode, so the raw frames follow the display matrix.
    // Newer builds report it as side data, older ones as a `rotate` tag.
    fn rotation(&self) -> u32 {
        let degrees = self
            .side_data_list
            .iter()
            .find_map(|d| d.rotation)
            .or_else(|| self.tags.rotate.as_deref().and_then(|r| r.trim().parse().ok()))
            .unwrap_or(0.0);
        (degrees.round() as i64).rem_euclid(360) as u32
    }
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Probe `source_path` with `ffprobe`.
///
/// Every failure here means the source is unusable and is reported as [`BurninError::Open`].
pub fn probe_video(source_path: &Path) -> BurninResult<VideoSourceInfo> {
    if !source_path.is_file() {
        return Err(BurninError::open(format!(
            "could not open video file '{}': no such file",
            source_path.display()
        )));
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| BurninError::open(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(BurninError::open(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

pub(crate) fn parse_probe_json(source_path: &Path, json: &[u8]) -> BurninResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| BurninError::open(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            BurninError::open(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .filter(|&w| w > 0)
        .ok_or_else(|| BurninError::open("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .filter(|&h| h > 0)
        .ok_or_else(|| BurninError::open("missing video height from ffprobe"))?;
    let rotation = video_stream.rotation();
    let (width, height) = match rotation {
        90 | 270 => (height, width),
        _ => (width, height),
    };

    let fps = video_stream
        .r_frame_rate
        .as_deref()
        .and_then(Fps::parse_ratio)
        .or_else(|| video_stream.avg_frame_rate.as_deref().and_then(Fps::parse_ratio));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        rotation,
        fps,
    })
}
