//! In-memory adapters for tests and dry runs
//!
//! `MockEngineAdapter` keeps its filesystem in a map and "transcodes" by
//! writing a marker to the output name. It can be told to fail, or to hold a
//! run open until it is aborted, which is how cancellation is exercised.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::errors::DomainError;
use crate::domain::model::MediaInfo;
use crate::error::{CropError, CropResult};
use crate::ports::{ProbePort, ProgressSink, TranscodeEngine};

#[derive(Debug, Default)]
struct MockEngineState {
    loaded: bool,
    exited: bool,
    files: HashMap<String, Vec<u8>>,
    runs: Vec<Vec<String>>,
}

/// Engine double with an in-memory filesystem
#[derive(Default)]
pub struct MockEngineAdapter {
    state: Mutex<MockEngineState>,
    progress: Vec<f64>,
    fail: bool,
    hold: bool,
    abort: Notify,
    started: Notify,
}

impl MockEngineAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positions (in seconds) reported during every run
    pub fn with_progress(mut self, positions: Vec<f64>) -> Self {
        self.progress = positions;
        self
    }

    /// Every run fails with a command error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every run blocks until the engine is exited
    pub fn holding(mut self) -> Self {
        self.hold = true;
        self
    }

    /// Wait until a run has started
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Contents of a file in the engine filesystem
    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().ok()?.files.get(name).cloned()
    }

    /// Argument lists of every run so far
    pub fn runs(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .map(|state| state.runs.clone())
            .unwrap_or_default()
    }

    pub fn is_exited(&self) -> bool {
        self.state.lock().map(|state| state.exited).unwrap_or(false)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockEngineState) -> T) -> CropResult<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| CropError::RunCommand {
                message: "mock engine state poisoned".to_string(),
            })?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl TranscodeEngine for MockEngineAdapter {
    async fn load(&self) -> CropResult<()> {
        self.with_state(|state| {
            if state.exited {
                Err(CropError::EngineNotLoaded)
            } else {
                state.loaded = true;
                Ok(())
            }
        })?
    }

    fn is_loaded(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.loaded && !state.exited)
            .unwrap_or(false)
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> CropResult<()> {
        if !self.is_loaded() {
            return Err(CropError::EngineNotLoaded);
        }
        self.with_state(|state| {
            state.files.insert(name.to_string(), data.to_vec());
        })
    }

    async fn read_file(&self, name: &str) -> CropResult<Vec<u8>> {
        if !self.is_loaded() {
            return Err(CropError::EngineNotLoaded);
        }
        self.with_state(|state| state.files.get(name).cloned())?
            .ok_or_else(|| CropError::ReadOutput {
                name: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }

    async fn run(&self, args: &[String], progress: Option<ProgressSink>) -> CropResult<()> {
        if !self.is_loaded() {
            return Err(CropError::EngineNotLoaded);
        }
        self.with_state(|state| state.runs.push(args.to_vec()))?;
        self.started.notify_one();

        if let Some(sink) = progress.as_ref() {
            for position in &self.progress {
                sink(*position);
            }
        }
        if self.fail {
            return Err(CropError::RunCommand {
                message: "mock engine exited with status 1".to_string(),
            });
        }
        if self.hold {
            self.abort.notified().await;
            return Err(CropError::EngineAborted);
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default();
        if let Some(output) = args.last() {
            let marker = format!("cropped {}", input).into_bytes();
            self.with_state(|state| {
                state.files.insert(output.clone(), marker);
            })?;
        }
        Ok(())
    }

    fn exit(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.exited = true;
            state.loaded = false;
        }
        self.abort.notify_one();
    }
}

/// Probe double returning fixed media properties
pub struct MockProbeAdapter {
    width: u32,
    height: u32,
    duration: f64,
}

impl MockProbeAdapter {
    pub fn new(width: u32, height: u32, duration: f64) -> Self {
        Self {
            width,
            height,
            duration,
        }
    }
}

#[async_trait]
impl ProbePort for MockProbeAdapter {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError> {
        MediaInfo::new(
            path.to_string_lossy().to_string(),
            self.width,
            self.height,
            self.duration,
        )
        .map_err(|e| DomainError::ProbeFailed(e.to_string()))
    }
}
