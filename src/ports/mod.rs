// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::model::MediaInfo;
use crate::error::CropResult;

/// Receives the engine's position in the output, in seconds
pub type ProgressSink = Arc<dyn Fn(f64) + Send + Sync>;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a media file for its frame size and duration
    async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError>;
}

/// Port for the transcoding engine.
///
/// The engine owns a private filesystem. Inputs are written into it by name,
/// commands refer to those names, and results are read back out. `exit` may
/// be called from another task while `run` is awaiting; it aborts the running
/// command and leaves the engine permanently unloaded.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Prepare the engine for use
    async fn load(&self) -> CropResult<()>;

    /// Whether `load` succeeded and `exit` has not been called since
    fn is_loaded(&self) -> bool;

    /// Store `data` in the engine filesystem under `name`
    async fn write_file(&self, name: &str, data: &[u8]) -> CropResult<()>;

    /// Read `name` back out of the engine filesystem
    async fn read_file(&self, name: &str) -> CropResult<Vec<u8>>;

    /// Run one command; progress samples go to `progress` when given
    async fn run(&self, args: &[String], progress: Option<ProgressSink>) -> CropResult<()>;

    /// Abort any running command and unload the engine
    fn exit(&self);
}

/// Creates fresh engines, used to replace one that was exited
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Arc<dyn TranscodeEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Arc<dyn TranscodeEngine> + Send + Sync,
{
    fn create(&self) -> Arc<dyn TranscodeEngine> {
        self()
    }
}
