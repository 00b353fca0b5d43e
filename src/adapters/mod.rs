// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod mock;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegEngine;
pub use mock::{MockEngineAdapter, MockProbeAdapter};
pub use probe_ffprobe::FfprobeAdapter;
pub use toml_config::{AppConfig, ResolvedConfig, TomlConfigAdapter};
pub use tracing_log::TracingProgressAdapter;
