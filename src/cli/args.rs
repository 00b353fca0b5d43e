//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::errors::DomainError;
use crate::domain::model::BoundingBox;

/// Selection, trim and transform options shared by `crop` and `preview`
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Crop area as X,Y,WIDTH,HEIGHT in frame pixels (default: top-left third)
    #[arg(long, value_name = "X,Y,W,H")]
    pub area: Option<String>,

    /// Start time (seconds, MM:SS.ms or HH:MM:SS.ms; default: 0)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (seconds, MM:SS.ms or HH:MM:SS.ms; default: end of video)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Output scale factor (default from config, usually 1)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Remove the audio track
    #[arg(long)]
    pub no_audio: bool,
}

/// How crop progress is reported
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Progress bar on stderr
    #[default]
    Console,
    /// JSON events on stdout
    Json,
    /// No progress output
    None,
}

/// Arguments for the crop command
#[derive(Args, Debug)]
pub struct CropArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (default: "<input stem> cropped.mp4" next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Progress reporting
    #[arg(long, value_enum, default_value_t = ProgressMode::Console)]
    pub progress: ProgressMode,
}

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Frame size as WIDTHxHEIGHT; with --duration, skips probing the input
    #[arg(long, value_name = "WxH")]
    pub frame: Option<String>,

    /// Media duration in seconds; with --frame, skips probing the input
    #[arg(long)]
    pub duration: Option<f64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the select command
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Frame size as WIDTHxHEIGHT
    #[arg(long, value_name = "WxH")]
    pub frame: String,

    /// JSON file holding an array of input events (default: stdin)
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Output scale factor used for the reported output dimensions
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the dims command
#[derive(Args, Debug)]
pub struct DimsArgs {
    /// Selection width in pixels
    #[arg(long)]
    pub width: f64,

    /// Selection height in pixels
    #[arg(long)]
    pub height: f64,

    /// Output scale factor
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse `X,Y,WIDTH,HEIGHT`
pub fn parse_area(value: &str) -> Result<BoundingBox, DomainError> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid area '{}'", value)))?;

    match parts.as_slice() {
        [x, y, width, height] if parts.iter().all(|v| v.is_finite()) => {
            Ok(BoundingBox::new(*x, *y, *width, *height))
        }
        _ => Err(DomainError::BadArgs(format!(
            "Expected area as X,Y,WIDTH,HEIGHT, got '{}'",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_area() {
        assert_eq!(
            parse_area("10, 20,200,100.5").unwrap(),
            BoundingBox::new(10.0, 20.0, 200.0, 100.5)
        );
        assert!(parse_area("10,20,200").is_err());
        assert!(parse_area("a,b,c,d").is_err());
        assert!(parse_area("1,2,3,inf").is_err());
    }
}
