//! videocrop library
//!
//! An interactive crop-area selector and the glue that turns its geometry,
//! a trim range and a scale factor into an ffmpeg crop job.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod command;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod selector;
pub mod utils;

// Re-export commonly used types
pub use app::{CropSession, SessionSettings};
pub use domain::errors::DomainError;
pub use domain::model::{BoundingBox, MediaFile, MediaInfo, ParentBox, TimeRange, Transform};
pub use error::{CropError, CropResult};
pub use selector::AreaSelector;
