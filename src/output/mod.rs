//! Output naming and result storage

use std::path::{Path, PathBuf};

pub mod artifact;

pub use artifact::{Artifact, ArtifactSlot};

/// Suffix appended to the input's stem to name the result
pub const DOWNLOAD_SUFFIX: &str = " cropped.mp4";

/// Name offered for the result: the input name trimmed, its last extension
/// removed, plus `" cropped.mp4"`
pub fn download_name(input_name: &str) -> String {
    let trimmed = input_name.trim();
    let stem = match trimmed.rfind('.') {
        Some(dot) if dot + 1 < trimmed.len() => &trimmed[..dot],
        _ => trimmed,
    };
    format!("{}{}", stem, DOWNLOAD_SUFFIX)
}

/// Default output location: the download name next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file = download_name(&name);
    match input.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}
