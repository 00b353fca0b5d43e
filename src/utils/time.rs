//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;

/// Format seconds for input titles: `MM:SS.ss`, or `HH:MM:SS.ss` past an hour
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds - hours * 3600.0) / 60.0).floor();
    let secs = seconds - hours * 3600.0 - minutes * 60.0;

    let hours_part = if hours == 0.0 {
        String::new()
    } else {
        format!("{:02}:", hours as u64)
    };

    format!("{}{:02}:{:05.2}", hours_part, minutes as u64, secs)
}

/// Format a value for the min/max attributes of a time input
pub fn to_range(value: f64) -> String {
    format!("{:.2}", value)
}

/// Parse a time given as seconds, `MM:SS.ms` or `HH:MM:SS.ms`
pub fn parse_time(time_str: &str) -> Result<f64, DomainError> {
    let trimmed = time_str.trim();

    // Try parsing as seconds (float)
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Time must be a non-negative number: {}",
                time_str
            )));
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, parse_component(m, "minutes")?, parse_seconds(s)?),
        [h, m, s] => {
            let minutes = parse_component(m, "minutes")?;
            if minutes >= 60 {
                return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
            }
            (parse_component(h, "hours")?, minutes, parse_seconds(s)?)
        }
        _ => {
            return Err(DomainError::BadArgs(format!(
                "Invalid time format '{}'. Supported formats: seconds (e.g., 12.5), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)",
                time_str
            )))
        }
    };

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn parse_component(part: &str, what: &str) -> Result<u32, DomainError> {
    part.parse::<u32>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid {} format: '{}'", what, part)))
}

fn parse_seconds(part: &str) -> Result<f64, DomainError> {
    let seconds = part
        .parse::<f64>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid seconds format: '{}'", part)))?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
    }
    Ok(seconds)
}
