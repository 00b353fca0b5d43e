//! FFprobe adapter for media file probing
//!
//! Asks `ffprobe` for a JSON description of the file and extracts the frame
//! size of the first video stream and the container duration.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::MediaInfo;
use crate::ports::ProbePort;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    program: PathBuf,
}

impl FfprobeAdapter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Build [`MediaInfo`] from raw `ffprobe -print_format json` output
pub fn parse_probe_output(file_path: &str, json: &[u8]) -> Result<MediaInfo, DomainError> {
    let output: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| DomainError::ProbeFailed(format!("Unreadable ffprobe output: {}", e)))?;

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DomainError::ProbeFailed(format!("No video stream in {}", file_path)))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(DomainError::ProbeFailed(
                "Video stream has no frame size".to_string(),
            ))
        }
    };

    let duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| DomainError::ProbeFailed("Could not read media duration".to_string()))?;

    MediaInfo::new(file_path.to_string(), width, height, duration)
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError> {
        debug!(path = %path.display(), "probing media");
        let output = Command::new(&self.program)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::ProbeFailed(format!("Failed to run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            return Err(DomainError::ProbeFailed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_probe_output(&path.to_string_lossy(), &output.stdout)
    }
}
