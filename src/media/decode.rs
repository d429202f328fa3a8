use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;

use crate::foundation::core::Fps;
use crate::foundation::error::{BurninError, BurninResult};
use crate::foundation::process::{StderrDrain, reap, tool_version_line};
use crate::media::probe::{VideoSourceInfo, probe_video};

/// Sequential decoder contract used by frame extraction.
///
/// `next_frame` yields frames in presentation order and `Ok(None)` at end-of-stream. An `Err`
/// means the stream cannot continue; extraction treats it like end-of-stream.
pub trait FrameSource {
    /// Nominal frame rate reported by the source, if any.
    fn nominal_fps(&self) -> Option<Fps>;
    /// Decode the next frame.
    fn next_frame(&mut self) -> BurninResult<Option<RgbImage>>;
}

/// Decoder that streams raw `rgb24` frames out of the system `ffmpeg`.
pub struct FfmpegFrameSource {
    info: VideoSourceInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr: Option<StderrDrain>,
    frame_len: usize,
    decoded: u64,
}

impl FfmpegFrameSource {
    /// Probe and open `path` for decoding.
    ///
    /// Fails with [`BurninError::Open`] if the file is missing, has no video stream, or `ffmpeg`
    /// cannot be started.
    pub fn open(path: &Path) -> BurninResult<Self> {
        let info = probe_video(path)?;
        let frame_len = (info.width as usize)
            .checked_mul(info.height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| BurninError::open("decoded frame size overflow"))?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(&info.source_path)
            .args([
                "-map",
                "0:v:0",
                passthrough_sync_flag(tool_version_line("ffmpeg").as_deref()),
                "passthrough",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BurninError::open(format!(
                    "failed to spawn ffmpeg for '{}' (is it installed and on PATH?): {e}",
                    path.display()
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BurninError::open("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BurninError::open("failed to open ffmpeg stderr (unexpected)"))?;

        tracing::debug!(
            source = %path.display(),
            width = info.width,
            height = info.height,
            rotation = info.rotation,
            fps = ?info.fps,
            "ffmpeg decoder started"
        );

        Ok(Self {
            info,
            child: Some(child),
            stdout: Some(stdout),
            stderr: Some(StderrDrain::spawn(stderr)),
            frame_len,
            decoded: 0,
        })
    }

    fn finish(&mut self) -> BurninResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| {
            BurninError::open(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;
        let log = match self.stderr.take() {
            Some(drain) => drain.finish().map_err(BurninError::open)?,
            None => String::new(),
        };
        if !status.success() {
            return Err(BurninError::open(format!(
                "ffmpeg decoder exited with status {} after {} frames: {log}",
                status, self.decoded
            )));
        }
        Ok(())
    }
}

/// Flag that keeps every decoded frame without duplication or dropping. `-fps_mode` arrived in
/// ffmpeg 5.1; older releases only accept `-vsync`. Unknown or development builds get the new
/// spelling.
fn passthrough_sync_flag(version_line: Option<&str>) -> &'static str {
    match version_line.and_then(release_version) {
        Some(release) if release < (5, 1) => "-vsync",
        _ => "-fps_mode",
    }
}

fn release_version(line: &str) -> Option<(u32, u32)> {
    let token = line.split_whitespace().nth(2)?;
    let token = token.strip_prefix('n').unwrap_or(token);
    let mut parts = token.split(|c: char| !c.is_ascii_digit());
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
    Some((major, minor))
}

impl FrameSource for FfmpegFrameSource {
    fn nominal_fps(&self) -> Option<Fps> {
        self.info.fps
    }

    fn next_frame(&mut self) -> BurninResult<Option<RgbImage>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;
        while filled < buf.len() {
            let n = stdout
                .read(&mut buf[filled..])
                .map_err(|e| BurninError::open(format!("failed to read from ffmpeg: {e}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled < buf.len() {
            if filled > 0 {
                tracing::warn!(
                    bytes = filled,
                    expected = self.frame_len,
                    "discarding truncated trailing frame"
                );
            }
            self.finish()?;
            return Ok(None);
        }

        let frame = RgbImage::from_raw(self.info.width, self.info.height, buf)
            .ok_or_else(|| BurninError::open("decoded frame buffer has unexpected length"))?;
        self.decoded += 1;
        Ok(Some(frame))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(child) = self.child.take() {
            reap(child);
        }
    }
}

/// In-memory source for tests and synthetic inputs.
#[derive(Debug, Default)]
pub struct InMemorySource {
    fps: Option<Fps>,
    frames: VecDeque<RgbImage>,
}

impl InMemorySource {
    /// Create a source yielding `frames` in order.
    pub fn new(frames: Vec<RgbImage>, fps: Option<Fps>) -> Self {
        Self {
            fps,
            frames: frames.into(),
        }
    }
}

impl FrameSource for InMemorySource {
    fn nominal_fps(&self) -> Option<Fps> {
        self.fps
    }

    fn next_frame(&mut self) -> BurninResult<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }
}
