//! FFprobe-backed metadata extraction.
//!
//! Runs `ffprobe` on the first video stream and reduces its JSON output to
//! a [`VideoMetadata`]. Probe failures are never surfaced to callers of the
//! [`MetadataProvider`] implementation; they are logged and replaced by
//! defaults.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::metadata::{MetadataProvider, VideoMetadata, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::timing::DEFAULT_FPS;

/// Error type for FFprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-of json`).
#[derive(Debug, Default, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    #[serde(default)]
    pub format: Option<FfprobeFormat>,
}

/// A single stream from ffprobe output.
#[derive(Debug, Default, Deserialize)]
pub struct FfprobeStream {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// e.g. "30/1" or "24000/1001"
    pub r_frame_rate: Option<String>,
    pub duration: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Default, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run `ffprobe` on the first video stream of `path`.
pub async fn probe_video(binary: &Path, path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    if !path.exists() {
        return Err(FfmpegError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new(binary)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,duration",
            "-show_entries",
            "format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {stdout}")))
}

/// Reduce ffprobe output to [`VideoMetadata`], filling gaps with defaults.
pub fn to_metadata(probe: &FfprobeOutput) -> VideoMetadata {
    let stream = probe.streams.first();
    VideoMetadata {
        duration: parse_duration(probe),
        fps: parse_framerate(probe),
        width: stream
            .and_then(|s| s.width)
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_WIDTH),
        height: stream
            .and_then(|s| s.height)
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_HEIGHT),
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Video duration in seconds.
///
/// The stream duration wins over the container duration; 0 when neither
/// parses.
pub fn parse_duration(probe: &FfprobeOutput) -> f64 {
    let stream = probe.streams.first().and_then(|s| s.duration.as_deref());
    let format = probe.format.as_ref().and_then(|f| f.duration.as_deref());
    stream
        .or(format)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0)
}

/// Frame rate from `r_frame_rate`, rounded to two decimals.
///
/// Falls back to [`DEFAULT_FPS`] when the field is missing or has a zero
/// denominator.
pub fn parse_framerate(probe: &FfprobeOutput) -> f64 {
    probe
        .streams
        .first()
        .and_then(|s| s.r_frame_rate.as_deref())
        .and_then(parse_fraction)
        .filter(|fps| *fps > 0.0)
        .map(|fps| (fps * 100.0).round() / 100.0)
        .unwrap_or(DEFAULT_FPS)
}

/// Parse a fraction string like `"30/1"` (or a plain number) into a float.
fn parse_fraction(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            (den > 0.0).then(|| num / den)
        }
        None => s.trim().parse::<f64>().ok(),
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// [`MetadataProvider`] that shells out to `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfprobeMetadataProvider {
    binary: PathBuf,
}

impl Default for FfprobeMetadataProvider {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeMetadataProvider {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl MetadataProvider for FfprobeMetadataProvider {
    async fn probe(&self, path: &Path) -> VideoMetadata {
        match probe_video(&self.binary, path).await {
            Ok(output) => to_metadata(&output),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to extract metadata");
                VideoMetadata::default()
            }
        }
    }
}
