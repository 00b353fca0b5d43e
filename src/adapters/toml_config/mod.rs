// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::normalize_scale;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "videocrop.toml";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "VIDEOCROP_";

/// How long an error banner stays visible unless replaced
pub const DEFAULT_BANNER_MS: u64 = 5100;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub crop: CropDefaults,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

/// External binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Defaults for the crop transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropDefaults {
    pub scale: f64,
    pub remove_audio: bool,
}

impl Default for CropDefaults {
    fn default() -> Self {
        Self {
            scale: 1.0,
            remove_audio: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Error banner auto-dismiss delay in milliseconds
    pub banner_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            banner_ms: DEFAULT_BANNER_MS,
        }
    }
}

impl UiConfig {
    pub fn banner_duration(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }
}

/// Configuration after the file and environment layers, plus where it came from
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AppConfig,
    /// Configuration file that was read, if any
    pub source: Option<PathBuf>,
    /// Number of `VIDEOCROP_*` variables applied
    pub env_overrides: usize,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<AppConfig, DomainError> {
        let mut config: AppConfig = toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;
        Self::validate(&mut config)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Resolve file and environment layers.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used when present and built-in defaults otherwise. Environment
    /// variables are applied on top.
    pub fn resolve(explicit: Option<&Path>) -> Result<ResolvedConfig, DomainError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let source = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None if default_path.is_file() => Some(default_path.to_path_buf()),
            None => None,
        };
        let mut config = match source.as_deref() {
            Some(path) => Self::load_file(path)?,
            None => AppConfig::default(),
        };

        let env_overrides = Self::apply_env(&mut config, |key| std::env::var(key).ok())?;
        Ok(ResolvedConfig {
            config,
            source,
            env_overrides,
        })
    }

    /// Apply `VIDEOCROP_*` overrides read through `lookup`; returns how many
    /// were applied
    pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut applied = 0;

        if let Some(value) = var("FFMPEG") {
            config.engine.ffmpeg = PathBuf::from(value);
            applied += 1;
        }
        if let Some(value) = var("FFPROBE") {
            config.engine.ffprobe = PathBuf::from(value);
            applied += 1;
        }
        if let Some(value) = var("SCALE") {
            config.crop.scale = value
                .trim()
                .parse()
                .map_err(|e| DomainError::Config(format!("Invalid {}SCALE: {}", ENV_PREFIX, e)))?;
            applied += 1;
        }
        if let Some(value) = var("REMOVE_AUDIO") {
            config.crop.remove_audio = parse_bool(&value).ok_or_else(|| {
                DomainError::Config(format!("Invalid {}REMOVE_AUDIO: {}", ENV_PREFIX, value))
            })?;
            applied += 1;
        }
        if let Some(value) = var("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)?;
            applied += 1;
        }
        if let Some(value) = var("LOG_FORMAT") {
            config.logging.format = LogFormat::parse(&value)?;
            applied += 1;
        }
        if let Some(value) = var("BANNER_MS") {
            config.ui.banner_ms = value.trim().parse().map_err(|e| {
                DomainError::Config(format!("Invalid {}BANNER_MS: {}", ENV_PREFIX, e))
            })?;
            applied += 1;
        }

        Self::validate(config)?;
        Ok(applied)
    }

    /// Normalise values that have a safe fallback, reject the rest
    pub fn validate(config: &mut AppConfig) -> Result<(), DomainError> {
        config.crop.scale = normalize_scale(config.crop.scale);
        if config.ui.banner_ms == 0 {
            return Err(DomainError::Config(
                "Banner duration must be positive".to_string(),
            ));
        }
        if config.engine.ffmpeg.as_os_str().is_empty() || config.engine.ffprobe.as_os_str().is_empty() {
            return Err(DomainError::Config(
                "Engine paths cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.engine.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.crop.scale, 1.0);
        assert_eq!(config.ui.banner_duration(), Duration::from_millis(5100));
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = TomlConfigAdapter::parse(
            r#"
            [engine]
            ffmpeg = "/opt/ffmpeg/bin/ffmpeg"

            [crop]
            scale = -2.0
            remove_audio = true

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.engine.ffprobe, PathBuf::from("ffprobe"));
        assert_eq!(config.crop.scale, 0.1);
        assert!(config.crop.remove_audio);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.ui.banner_ms, DEFAULT_BANNER_MS);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(TomlConfigAdapter::parse("[logging]\nlevel = \"loud\"").is_err());
        assert!(TomlConfigAdapter::parse("[ui]\nbanner_ms = 0").is_err());
        assert!(TomlConfigAdapter::parse("not toml at all [").is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = TomlConfigAdapter::parse("[crop]\nscale = 0.5").unwrap();
        let env: HashMap<&str, &str> = [
            ("VIDEOCROP_SCALE", "0.75"),
            ("VIDEOCROP_REMOVE_AUDIO", "yes"),
            ("VIDEOCROP_LOG_LEVEL", "trace"),
            ("OTHER_SCALE", "9"),
        ]
        .into_iter()
        .collect();

        let applied =
            TomlConfigAdapter::apply_env(&mut config, |k| env.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(applied, 3);
        assert_eq!(config.crop.scale, 0.75);
        assert!(config.crop.remove_audio);
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_env_rejects_unparseable_values() {
        let mut config = AppConfig::default();
        let result = TomlConfigAdapter::apply_env(&mut config, |k| {
            (k == "VIDEOCROP_REMOVE_AUDIO").then(|| "maybe".to_string())
        });
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_load_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videocrop.toml");
        std::fs::write(&path, "[ui]\nbanner_ms = 2000\n").unwrap();

        let config = TomlConfigAdapter::load_file(&path).unwrap();
        assert_eq!(config.ui.banner_ms, 2000);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            TomlConfigAdapter::resolve(Some(&missing)),
            Err(DomainError::FsFail(_))
        ));

        let resolved = TomlConfigAdapter::resolve(Some(&path)).unwrap();
        assert_eq!(resolved.source.as_deref(), Some(path.as_path()));
        assert_eq!(resolved.config.ui.banner_ms, 2000);
    }
}
