use crate::ports::media::{MediaTool, MediaToolError};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command as TokioCommand;

/// `ffprobe`/`ffmpeg` command-line adapter.
#[derive(Clone, Debug)]
pub struct FfmpegTool {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTool {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    async fn run(program: &Path, args: Vec<OsString>) -> std::io::Result<Output> {
        TokioCommand::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: String,
}

pub fn probe_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-show_entries", "format=duration", "-of", "json"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(path.into());
    args
}

/// `-ss`/`-to` are emitted only for the bounds that are set.
pub fn trim_args(input: &Path, start: Option<f64>, end: Option<f64>, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into(), "-c".into(), "copy".into()];
    if let Some(start) = start {
        args.push("-ss".into());
        args.push(start.to_string().into());
    }
    if let Some(end) = end {
        args.push("-to".into());
        args.push(end.to_string().into());
    }
    args.push(output.into());
    args
}

pub fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(manifest.into());
    args.push("-c".into());
    args.push("copy".into());
    args.push(output.into());
    args
}

/// Parse `format.duration` out of ffprobe's JSON output.
pub fn parse_duration(stdout: &[u8]) -> Result<f64, MediaToolError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| MediaToolError::ProbeFailed(format!("unparsable ffprobe output: {}", e)))?;
    let duration: f64 = probe
        .format
        .duration
        .trim()
        .parse()
        .map_err(|_| MediaToolError::ProbeFailed(format!("invalid duration {:?}", probe.format.duration)))?;
    if !duration.is_finite() {
        return Err(MediaToolError::ProbeFailed(format!("invalid duration {}", duration)));
    }
    Ok(duration)
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    // ffmpeg prints its banner first; the cause is at the end
    match trimmed.char_indices().rev().nth(2000) {
        Some((idx, _)) => trimmed[idx..].to_string(),
        None => trimmed.to_string(),
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError> {
        let output = Self::run(&self.ffprobe, probe_args(path))
            .await
            .map_err(|e| MediaToolError::ProbeFailed(format!("failed to spawn ffprobe: {}", e)))?;

        if !output.status.success() {
            tracing::warn!(path = %path.display(), status = ?output.status, "ffprobe exited with failure");
            return Err(MediaToolError::ProbeFailed(stderr_of(&output)));
        }

        let duration = parse_duration(&output.stdout)?;
        tracing::debug!(path = %path.display(), duration, "Probed media duration");
        Ok(duration)
    }

    async fn trim(
        &self,
        input: &Path,
        start: Option<f64>,
        end: Option<f64>,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        let result = Self::run(&self.ffmpeg, trim_args(input, start, end, output))
            .await
            .map_err(|e| MediaToolError::ProcessingFailed(format!("failed to spawn ffmpeg: {}", e)))?;

        if !result.status.success() {
            tracing::error!(input = %input.display(), ?start, ?end, status = ?result.status, "ffmpeg trim failed");
            return Err(MediaToolError::ProcessingFailed(stderr_of(&result)));
        }
        Ok(())
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), MediaToolError> {
        let result = Self::run(&self.ffmpeg, concat_args(manifest, output))
            .await
            .map_err(|e| MediaToolError::ProcessingFailed(format!("failed to spawn ffmpeg: {}", e)))?;

        if !result.status.success() {
            tracing::error!(manifest = %manifest.display(), status = ?result.status, "ffmpeg concat failed");
            return Err(MediaToolError::ProcessingFailed(stderr_of(&result)));
        }
        Ok(())
    }
}
