// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;


/// Smallest width or height the selection box may shrink to, in pixels
pub const MIN_SIZE: f64 = 50.0;

/// Practical lower bound for the output scale factor
pub const SCALE_FLOOR: f64 = 0.1;

/// Clamp `val` into `[min, max]`. When `min > max` the upper bound wins.
pub fn clamp(min: f64, val: f64, max: f64) -> f64 {
    val.max(min).min(max)
}

/// Round to two decimal places (the precision of the time inputs)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncate to two decimal places
pub fn floor2(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Selection rectangle in pixels, relative to its positioning parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// X coordinate of the right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check the box invariant against a parent rectangle
    pub fn fits_within(&self, parent: &ParentBox) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= parent.width
            && self.bottom() <= parent.height
            && self.width >= MIN_SIZE
            && self.height >= MIN_SIZE
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Cached content rectangle of the selector's positioning parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParentBox {
    pub width: f64,
    pub height: f64,
}

impl ParentBox {
    /// Create a parent box; dimensions must be finite and non-negative
    pub fn new(width: f64, height: f64) -> Result<Self, DomainError> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(DomainError::InvalidGeometry(format!(
                "Parent dimensions must be non-negative, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Parse a `WIDTHxHEIGHT` string such as `1280x720`
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let (w, h) = value
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| DomainError::BadArgs(format!("Expected WIDTHxHEIGHT, got '{}'", value)))?;
        let width = w
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid width '{}'", w)))?;
        let height = h
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs(format!("Invalid height '{}'", h)))?;
        Self::new(width, height)
    }

    /// Default selection for a freshly loaded video: top-left third of the frame
    pub fn default_selection(&self) -> BoundingBox {
        let width = clamp(MIN_SIZE, self.width / 3.0, self.width);
        let height = clamp(MIN_SIZE, self.height / 3.0, self.height);
        BoundingBox::new(0.0, 0.0, width, height)
    }
}

/// Trim range in seconds, kept at two-decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Create a validated range (`0 <= start < end`)
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        let start = round2(start);
        let end = round2(end);
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::InvalidTimeRange(
                "Times must be finite numbers".to_string(),
            ));
        }
        if start < 0.0 {
            return Err(DomainError::InvalidTimeRange(
                "Start time cannot be negative".to_string(),
            ));
        }
        if start >= end {
            return Err(DomainError::InvalidTimeRange(format!(
                "Start ({}) must be before end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Length of the range in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Validate that the range lies within a media duration
    pub fn validate_against_duration(&self, duration: f64) -> Result<(), DomainError> {
        if self.end > duration {
            return Err(DomainError::InvalidTimeRange(format!(
                "End ({}) exceeds media duration ({})",
                self.end, duration
            )));
        }
        Ok(())
    }
}

/// Output transform options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub remove_audio: bool,
}

impl Transform {
    /// Create a transform; unusable scales fall back to [`SCALE_FLOOR`]
    pub fn new(scale: f64, remove_audio: bool) -> Self {
        Self {
            scale: normalize_scale(scale),
            remove_audio,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            remove_audio: false,
        }
    }
}

/// Replace missing, zero or negative scale factors with the floor value
pub fn normalize_scale(scale: f64) -> f64 {
    if !scale.is_finite() || scale <= 0.0 {
        SCALE_FLOOR
    } else {
        scale
    }
}

/// A single file handed to the tool by a picker or a drop
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub path: PathBuf,
    pub mime: String,
}

impl MediaFile {
    /// Describe a file on disk, guessing its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime = crate::utils::mime::guess_from_path(&path).to_string();
        Self { name, path, mime }
    }

    pub fn is_video(&self) -> bool {
        self.mime.starts_with("video")
    }
}

/// Probed properties of the primary video stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub file_path: String,
    pub width: u32,
    pub height: u32,
    /// Duration in seconds, truncated to two decimals
    pub duration: f64,
}

impl MediaInfo {
    /// Create media info with validation
    pub fn new(file_path: String, width: u32, height: u32, duration: f64) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::BadArgs("Video dimensions cannot be zero".to_string()));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::BadArgs("Duration must be positive".to_string()));
        }
        Ok(Self {
            file_path,
            width,
            height,
            duration: floor2(duration),
        })
    }

    /// The video frame as a selector parent
    pub fn frame(&self) -> ParentBox {
        ParentBox {
            width: self.width as f64,
            height: self.height as f64,
        }
    }
}
