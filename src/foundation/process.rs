use std::io::Read as _;
use std::path::Path;
use std::process::{Child, ChildStderr, Command, Stdio};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::foundation::error::BurninResult;

/// Collects a child's stderr on a background thread so a chatty tool never blocks on a full pipe.
pub(crate) struct StderrDrain(JoinHandle<std::io::Result<Vec<u8>>>);

impl StderrDrain {
    pub(crate) fn spawn(mut stderr: ChildStderr) -> Self {
        Self(std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        }))
    }

    /// Wait for the pipe to close and return its trimmed, lossily decoded text.
    pub(crate) fn finish(self) -> Result<String, String> {
        let bytes = self
            .0
            .join()
            .map_err(|_| "stderr drain thread panicked".to_string())?
            .map_err(|e| format!("stderr read failed: {e}"))?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }
}

/// Kill and reap `child`, ignoring failures. Used when a stream is abandoned mid-way.
pub(crate) fn reap(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Whether `tool -version` runs successfully.
pub(crate) fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// First line of `tool -version`, e.g. `ffmpeg version 6.1.1 Copyright ...`.
pub(crate) fn tool_version_line(tool: &str) -> Option<String> {
    let out = Command::new(tool)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
}

/// Create the parent directory of `path` if it has one.
pub(crate) fn ensure_parent_dir(path: &Path) -> BurninResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    Ok(())
}
