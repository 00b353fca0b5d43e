//! FFmpeg execution adapter
//!
//! Runs the system `ffmpeg` binary as a child process. The engine's private
//! filesystem is a temporary directory; commands run with it as their working
//! directory so argument lists can refer to files by bare name.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};

use crate::error::{CropError, CropResult};
use crate::ports::{ProgressSink, TranscodeEngine};

/// Flags placed before every command: overwrite outputs, quiet banner, and
/// machine-readable progress on stdout
const BASE_ARGS: [&str; 5] = ["-y", "-hide_banner", "-nostats", "-progress", "pipe:1"];

/// Stderr lines kept for error reports
const STDERR_TAIL: usize = 12;

/// FFmpeg-backed transcoding engine
pub struct FfmpegEngine {
    program: PathBuf,
    workdir: Mutex<Option<TempDir>>,
    loaded: AtomicBool,
    exited: AtomicBool,
    abort: Notify,
}

impl FfmpegEngine {
    /// Create an unloaded engine using the given `ffmpeg` binary
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: Mutex::new(None),
            loaded: AtomicBool::new(false),
            exited: AtomicBool::new(false),
            abort: Notify::new(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Path of a file inside the engine filesystem
    fn entry(&self, name: &str) -> CropResult<PathBuf> {
        if !self.is_loaded() {
            return Err(CropError::EngineNotLoaded);
        }
        let dir = self
            .workdir
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|dir| dir.path().to_path_buf()))
            .ok_or(CropError::EngineNotLoaded)?;
        Ok(dir.join(name))
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Engine file names must be bare names, never paths
fn check_name(name: &str) -> std::io::Result<()> {
    let plain = !name.is_empty() && Path::new(name).file_name().is_some_and(|n| n == name);
    if plain {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("'{}' is not a plain file name", name),
        ))
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn load(&self) -> CropResult<()> {
        if self.exited.load(Ordering::SeqCst) {
            return Err(CropError::EngineNotLoaded);
        }
        if self.is_loaded() {
            return Ok(());
        }

        let status = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| CropError::SpawnEngine {
                program: self.program_name(),
                source,
            })?;
        if !status.success() {
            return Err(CropError::RunCommand {
                message: format!("{} -version exited with {}", self.program_name(), status),
            });
        }

        let dir = tempfile::Builder::new().prefix("videocrop-").tempdir()?;
        debug!(dir = %dir.path().display(), "engine filesystem created");
        if let Ok(mut guard) = self.workdir.lock() {
            *guard = Some(dir);
        }
        self.loaded.store(true, Ordering::SeqCst);
        info!(program = %self.program_name(), "engine loaded");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst) && !self.exited.load(Ordering::SeqCst)
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> CropResult<()> {
        let write_err = |source| CropError::WriteInput {
            name: name.to_string(),
            source,
        };
        check_name(name).map_err(write_err)?;
        let path = self.entry(name)?;
        tokio::fs::write(&path, data).await.map_err(write_err)?;
        trace!(name, bytes = data.len(), "wrote engine file");
        Ok(())
    }

    async fn read_file(&self, name: &str) -> CropResult<Vec<u8>> {
        let read_err = |source| CropError::ReadOutput {
            name: name.to_string(),
            source,
        };
        check_name(name).map_err(read_err)?;
        let path = self.entry(name)?;
        tokio::fs::read(&path).await.map_err(read_err)
    }

    async fn run(&self, args: &[String], progress: Option<ProgressSink>) -> CropResult<()> {
        let dir = self.entry(".")?;
        debug!(program = %self.program_name(), ?args, "running engine command");

        let mut child = Command::new(&self.program)
            .args(BASE_ARGS)
            .args(args)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CropError::SpawnEngine {
                program: self.program_name(),
                source,
            })?;

        let progress_task = child
            .stdout
            .take()
            .map(|stdout| tokio::spawn(forward_progress(stdout, progress)));
        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(stderr_tail(stderr)));

        let status = tokio::select! {
            status = child.wait() => status.map_err(|e| CropError::RunCommand {
                message: e.to_string(),
            })?,
            _ = self.abort.notified() => {
                if let Err(e) = child.kill().await {
                    warn!("failed to kill engine process: {}", e);
                }
                if let Some(task) = progress_task {
                    task.abort();
                }
                if let Some(task) = stderr_task {
                    task.abort();
                }
                info!("engine command aborted");
                return Err(CropError::EngineAborted);
            }
        };

        if let Some(task) = progress_task {
            let _ = task.await;
        }
        let tail = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            return Err(CropError::RunCommand {
                message: format!("{} exited with {}: {}", self.program_name(), status, tail),
            });
        }
        debug!("engine command finished");
        Ok(())
    }

    fn exit(&self) {
        self.exited.store(true, Ordering::SeqCst);
        self.loaded.store(false, Ordering::SeqCst);
        // Stored as a permit when no run is waiting yet
        self.abort.notify_one();
        if let Ok(mut guard) = self.workdir.lock() {
            guard.take();
        }
        info!("engine exited");
    }
}

/// Parse one `-progress` line into seconds of output written
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    // ffmpeg reports out_time_ms in microseconds as well
    if key != "out_time_us" && key != "out_time_ms" {
        return None;
    }
    let micros: i64 = value.trim().parse().ok()?;
    if micros < 0 {
        return None;
    }
    Some(micros as f64 / 1_000_000.0)
}

async fn forward_progress<R>(stdout: R, sink: Option<ProgressSink>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    let mut last = None;
    while let Ok(Some(line)) = lines.next_line().await {
        let Some(seconds) = parse_progress_line(&line) else {
            continue;
        };
        // out_time_us and out_time_ms arrive in pairs with the same value
        if last == Some(seconds) {
            continue;
        }
        last = Some(seconds);
        if let Some(sink) = sink.as_ref() {
            sink(seconds);
        }
    }
}

async fn stderr_tail<R>(stderr: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stderr).lines();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL);
    while let Ok(Some(line)) = lines.next_line().await {
        trace!(target: "ffmpeg", "{}", line);
        if tail.len() == STDERR_TAIL {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}
