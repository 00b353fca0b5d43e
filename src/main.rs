//! videocrop
//!
//! Crop, trim and rescale video clips through ffmpeg.
//!
//! # Features
//!
//! - Crop area given as pixels or driven by replayed selector input
//! - Trim by start and end time
//! - Rescale with even output dimensions, optionally dropping audio
//! - Ctrl-C cancels a running crop
//!
//! # Usage
//!
//! ```bash
//! videocrop crop --input clip.mp4 --area 0,0,640,360 --start 1 --end 5 --scale 0.5
//! videocrop preview --input clip.mp4 --frame 1280x720 --duration 10
//! videocrop select --frame 1280x720 --script events.json
//! videocrop dims --width 213.5 --height 120 --scale 0.5
//! videocrop inspect --input clip.mp4
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod config_initialization;

use config_initialization::initialize_configuration;
use videocrop::app::DefaultAppContainer;
use videocrop::cli::{commands, Cli, Commands};
use videocrop::utils::logging;

/// Main entry point for the videocrop CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, report) = initialize_configuration(&cli)?;
    logging::init(&config.logging);
    if let Some(path) = report.source.as_deref() {
        info!("Loaded configuration from: {}", path.display());
    }
    if report.env_overrides > 0 {
        info!("Applied {} environment variable overrides", report.env_overrides);
    }
    if report.cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", report.cli_overrides);
    }
    debug!(?config, "Configuration resolved");

    let container = DefaultAppContainer::new(&config);

    match cli.command {
        Commands::Crop(args) => {
            info!("Executing crop command");
            commands::crop(&container, args).await?;
        }
        Commands::Preview(args) => {
            info!("Executing preview command");
            commands::preview(&container, args).await?;
        }
        Commands::Select(args) => {
            info!("Executing select command");
            commands::select(args)?;
        }
        Commands::Dims(args) => commands::dims(args)?,
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(&container, args).await?;
        }
    }

    Ok(())
}
