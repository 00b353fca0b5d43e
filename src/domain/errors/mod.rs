// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// More than one file was dropped at once
    MultipleFiles,
    /// Nothing was selected or dropped
    NoFile,
    /// The file is not recognised as a video
    NotAVideo(String),
    /// Invalid time range
    InvalidTimeRange(String),
    /// Invalid selection or parent geometry
    InvalidGeometry(String),
    /// Media probing failed
    ProbeFailed(String),
    /// Configuration could not be loaded or is invalid
    Config(String),
    /// File system failure
    FsFail(String),
}

impl DomainError {
    /// Message suitable for the transient error banner
    pub fn banner_message(&self) -> String {
        match self {
            DomainError::MultipleFiles => "Only drop one file at a time.".to_string(),
            DomainError::NotAVideo(name) => {
                format!("Did not recognize \"{}\" as a video file.", name)
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::MultipleFiles => write!(f, "Only one file can be loaded at a time"),
            DomainError::NoFile => write!(f, "No file selected"),
            DomainError::NotAVideo(name) => write!(f, "Not a video file: {}", name),
            DomainError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            DomainError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            DomainError::ProbeFailed(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
