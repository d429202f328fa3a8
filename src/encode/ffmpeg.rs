use std::ffi::OsString;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbImage;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BurninError, BurninResult};
use crate::foundation::process::{StderrDrain, ensure_parent_dir, reap, tool_on_path};

/// Output settings for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// MP4 file to write.
    pub out_path: PathBuf,
    /// Replace `out_path` when it exists; otherwise `begin` fails.
    pub overwrite: bool,
    /// `ffmpeg` video encoder name, e.g. `libx264` or `mpeg4`.
    pub codec: String,
}

impl FfmpegSinkOpts {
    /// H.264 output to `out_path`, overwriting.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: "libx264".to_string(),
        }
    }

    /// Use `codec` instead of `libx264`.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    /// Full `ffmpeg` argument list for encoding raw `rgb24` frames of `cfg` read from stdin.
    pub fn encoder_args(&self, cfg: &SinkConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |s: &str| args.push(s.into());

        push(if self.overwrite { "-y" } else { "-n" });
        for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24"] {
            push(a);
        }
        push("-s");
        push(format!("{}x{}", cfg.width, cfg.height).as_str());
        // Rawvideo has no timing of its own; `-r` before `-i` sets the input rate.
        push("-r");
        push(cfg.fps.to_string().as_str());
        push("-i");
        push("pipe:0");
        push("-an");
        // yuv420p needs even dimensions; pad odd frames by one pixel instead of rejecting them.
        push("-vf");
        push("pad=ceil(iw/2)*2:ceil(ih/2)*2");
        push("-c:v");
        push(self.codec.as_str());
        for a in ["-pix_fmt", "yuv420p", "-movflags", "+faststart"] {
            push(a);
        }
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: StderrDrain,
    cfg: SinkConfig,
    last: Option<FrameIndex>,
}

/// Sink piping raw `rgb24` frames into a system `ffmpeg` process.
///
/// The process starts in `begin` and is reaped in `end`. Dropping a started sink kills the
/// process and leaves whatever partial file it wrote.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    /// Sink writing with `opts`; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }

    fn check(&self, cfg: &SinkConfig) -> BurninResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(BurninError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(BurninError::validation(format!(
                "cannot encode {}x{} frames",
                cfg.width, cfg.height
            )));
        }
        if self.opts.codec.trim().is_empty() {
            return Err(BurninError::validation("ffmpeg codec must be non-empty"));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(BurninError::validation(format!(
                "'{}' exists and overwrite is off",
                self.opts.out_path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> BurninResult<()> {
        self.check(&cfg)?;
        if let Some(stale) = self.encoder.take() {
            reap(stale.child);
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(BurninError::encode("ffmpeg not found on PATH"));
        }

        let mut child = Command::new("ffmpeg")
            .args(self.opts.encoder_args(&cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BurninError::encode(format!("spawn ffmpeg: {e}")))?;

        let (Some(stdin), Some(stderr)) = (child.stdin.take(), child.stderr.take()) else {
            reap(child);
            return Err(BurninError::encode("ffmpeg pipes were not captured"));
        };

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = %cfg.fps,
            codec = %self.opts.codec,
            "encoder started"
        );

        self.encoder = Some(Encoder {
            child,
            stdin,
            stderr: StderrDrain::spawn(stderr),
            cfg,
            last: None,
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbImage) -> BurninResult<()> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| BurninError::encode("push_frame before begin"))?;
        if enc.last.is_some_and(|last| idx <= last) {
            return Err(BurninError::encode(format!(
                "frame {} pushed after frame {}",
                idx.0,
                enc.last.map_or(0, |l| l.0)
            )));
        }
        if frame.dimensions() != (enc.cfg.width, enc.cfg.height) {
            return Err(BurninError::validation(format!(
                "frame {} is {}x{}, encoder expects {}x{}",
                idx.0,
                frame.width(),
                frame.height(),
                enc.cfg.width,
                enc.cfg.height
            )));
        }

        enc.stdin
            .write_all(frame.as_raw())
            .map_err(|e| BurninError::encode(format!("write frame {} to ffmpeg: {e}", idx.0)))?;
        enc.last = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> BurninResult<()> {
        let Encoder {
            mut child,
            stdin,
            stderr,
            ..
        } = self
            .encoder
            .take()
            .ok_or_else(|| BurninError::encode("end before begin"))?;

        // Closing stdin is ffmpeg's end-of-input.
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| BurninError::encode(format!("wait for ffmpeg: {e}")))?;
        let log = stderr.finish().map_err(BurninError::encode)?;

        if !status.success() {
            return Err(BurninError::encode(format!("ffmpeg exited with {status}: {log}")));
        }
        tracing::debug!(out = %self.opts.out_path.display(), "encoder finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(enc) = self.encoder.take() {
            drop(enc.stdin);
            reap(enc.child);
        }
    }
}

/// Whether `ffmpeg` can be run from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

/// Whether `ffprobe` can be run from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_on_path("ffprobe")
}
