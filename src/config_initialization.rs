//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};

use videocrop::adapters::{AppConfig, ResolvedConfig, TomlConfigAdapter};
use videocrop::cli::Cli;
use videocrop::utils::logging::{LogFormat, LogLevel};

/// How the final configuration was assembled, for logging once the
/// subscriber is up
#[derive(Debug, Clone)]
pub struct ConfigReport {
    pub source: Option<std::path::PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

/// Resolve configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> Result<(AppConfig, ConfigReport)> {
    let resolved = match cli.config.as_deref() {
        Some(path) => TomlConfigAdapter::resolve(Some(path))
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => TomlConfigAdapter::resolve(None).context("Failed to load configuration")?,
    };

    let ResolvedConfig {
        mut config,
        source,
        env_overrides,
    } = resolved;

    let cli_overrides = apply_cli_overrides(&mut config, cli)?;
    let report = ConfigReport {
        source,
        env_overrides,
        cli_overrides,
    };
    Ok((config, report))
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> Result<usize> {
    let mut overrides = 0;

    if let Some(level) = cli.log_level.as_deref() {
        config.logging.level = LogLevel::parse(level)?;
        overrides += 1;
    }
    if let Some(format) = cli.log_format.as_deref() {
        config.logging.format = LogFormat::parse(format)?;
        overrides += 1;
    }

    Ok(overrides)
}
