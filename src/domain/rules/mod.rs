// Domain rules - Transport control and file acceptance policies

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::utils::time::{format_time, to_range};


/// Smallest gap between start and end, matching the two-decimal inputs
pub const TIME_STEP: f64 = 0.01;

/// Accept a single video file out of a picked or dropped set
pub fn accept_single_video(files: &[MediaFile]) -> Result<&MediaFile, DomainError> {
    match files {
        [] => Err(DomainError::NoFile),
        [file] if file.is_video() => Ok(file),
        [file] => Err(DomainError::NotAVideo(file.name.clone())),
        _ => Err(DomainError::MultipleFiles),
    }
}

/// Start/end/scale inputs for one loaded video.
///
/// Typing into a field updates its pending value immediately, but only values
/// that keep `0 <= start < end <= duration` are accepted. Committing a field
/// (the blur of the original input) reverts a pending invalid value to the
/// last accepted one.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportControls {
    duration: f64,
    start: f64,
    end: f64,
    pending_start: f64,
    pending_end: f64,
    scale: f64,
}

impl TransportControls {
    /// Create controls spanning the whole media duration
    pub fn new(duration: f64) -> Result<Self, DomainError> {
        let duration = floor2(duration);
        if !duration.is_finite() || duration < TIME_STEP {
            return Err(DomainError::InvalidTimeRange(format!(
                "Media duration too short: {}",
                duration
            )));
        }
        Ok(Self {
            duration,
            start: 0.0,
            end: duration,
            pending_start: 0.0,
            pending_end: duration,
            scale: 1.0,
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Current accepted range
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start,
            end: self.end,
        }
    }

    /// Type a new start value; returns whether it was accepted
    pub fn set_start(&mut self, value: f64) -> bool {
        let value = round2(value);
        self.pending_start = value;
        if self.is_valid_start(value) {
            self.start = value;
            true
        } else {
            false
        }
    }

    /// Type a new end value; returns whether it was accepted
    pub fn set_end(&mut self, value: f64) -> bool {
        let value = round2(value);
        self.pending_end = value;
        if self.is_valid_end(value) {
            self.end = value;
            true
        } else {
            false
        }
    }

    /// Leave the start field, reverting an invalid pending value
    pub fn commit_start(&mut self) -> f64 {
        if !self.is_valid_start(self.pending_start) {
            self.pending_start = self.start;
        }
        self.pending_start
    }

    /// Leave the end field, reverting an invalid pending value
    pub fn commit_end(&mut self) -> f64 {
        if !self.is_valid_end(self.pending_end) {
            self.pending_end = self.end;
        }
        self.pending_end
    }

    /// Set the scale factor, normalising unusable values
    pub fn set_scale(&mut self, value: f64) -> f64 {
        self.scale = normalize_scale(value);
        self.scale
    }

    /// Upper limit of the start input, formatted for display
    pub fn start_max(&self) -> String {
        to_range(self.end - TIME_STEP)
    }

    /// Lower limit of the end input, formatted for display
    pub fn end_min(&self) -> String {
        to_range(self.start + TIME_STEP)
    }

    /// Human readable title for the start input
    pub fn start_title(&self) -> String {
        format_time(self.start)
    }

    /// Human readable title for the end input
    pub fn end_title(&self) -> String {
        format_time(self.end)
    }

    fn is_valid_start(&self, value: f64) -> bool {
        value.is_finite() && value >= 0.0 && value < self.end
    }

    fn is_valid_end(&self, value: f64) -> bool {
        value.is_finite() && value > self.start && value <= self.duration
    }
}
