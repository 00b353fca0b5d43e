//! CLI module for videocrop
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// videocrop
///
/// Crop, trim and rescale a video clip through ffmpeg, with the crop area
/// given explicitly or driven by replayed selector input.
#[derive(Parser, Debug)]
#[command(name = "videocrop")]
#[command(about = "Crop, trim and rescale video clips")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "VIDEOCROP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true, env = "VIDEOCROP_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Configuration file (default: ./videocrop.toml when present)
    #[arg(long, global = true, env = "VIDEOCROP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crop, trim and rescale a video into a new file
    Crop(args::CropArgs),
    /// Print the engine command a crop would run
    Preview(args::PreviewArgs),
    /// Replay selector input events over a frame and print the selection
    Select(args::SelectArgs),
    /// Compute output dimensions for a selection size and scale
    Dims(args::DimsArgs),
    /// Show the frame size and duration of a video
    Inspect(args::InspectArgs),
}
