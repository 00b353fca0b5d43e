//! Error handling module for videocrop

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors raised while driving the transcoding engine
#[derive(Error, Debug)]
pub enum CropError {
    /// The input file could not be read from disk
    #[error("Error fetching input file {path}")]
    FetchInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input could not be placed in the engine's filesystem
    #[error("Error writing input file {name}")]
    WriteInput {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine process could not be started
    #[error("Failed to start {program}")]
    SpawnEngine {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but did not succeed
    #[error("Error running crop command: {message}")]
    RunCommand { message: String },

    /// The result could not be read back from the engine's filesystem
    #[error("Error reading output file {name}")]
    ReadOutput {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine was stopped with `exit` while a command was running
    #[error("Engine was aborted")]
    EngineAborted,

    /// The engine has not been loaded, or was exited and must be replaced
    #[error("Engine is not loaded")]
    EngineNotLoaded,

    /// A crop is already in progress
    #[error("A crop job is already running")]
    JobRunning,

    /// Media probing failed
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// Validation failure from the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CropError {
    /// Whether this error is the result of a user cancellation
    pub fn is_abort(&self) -> bool {
        matches!(self, CropError::EngineAborted)
    }
}

/// Result type alias for crop operations
pub type CropResult<T> = std::result::Result<T, CropError>;
