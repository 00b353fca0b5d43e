//! Progress tracking and callback system for UI integration

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::model::clamp;

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called when operation starts
    fn on_start(&self, operation: &str);

    /// Called with the completed fraction of the operation, in `[0, 1]`
    fn on_progress(&self, ratio: f64);

    /// Called when operation completes successfully
    fn on_complete(&self, message: Option<String>);

    /// Called when operation fails
    fn on_error(&self, error: &str);

    /// Called when operation is cancelled
    fn on_cancel(&self);
}

/// Progress phases of a crop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Started, engine not yet running
    Initializing,
    /// The engine is transcoding
    Processing,
    Complete,
    Failed,
    Cancelled,
}

/// Snapshot of a tracked operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub phase: ProgressPhase,
    /// Completed fraction, clamped to `[0, 1]`
    pub ratio: f64,
    pub message: String,
    pub elapsed: Duration,
}

/// Render a completed fraction the way the progress label shows it: `42.50%`
pub fn format_percent(ratio: f64) -> String {
    let ratio = if ratio.is_finite() { clamp(0.0, ratio, 1.0) } else { 0.0 };
    format!("{:.2}%", ratio * 100.0)
}

/// Fraction of a clip of `total` seconds covered once `position` seconds of
/// output exist
pub fn ratio_for(position: f64, total: f64) -> f64 {
    if total <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    clamp(0.0, position / total, 1.0)
}

/// Progress tracker with thread-safe updates
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<Mutex<ProgressTrackerInner>>,
    callbacks: Arc<Mutex<Vec<Arc<dyn ProgressCallback>>>>,
}

struct ProgressTrackerInner {
    info: ProgressInfo,
    start_time: Instant,
    last_update: Option<Instant>,
    update_interval: Duration,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(operation: &str) -> Self {
        let info = ProgressInfo {
            phase: ProgressPhase::Initializing,
            ratio: 0.0,
            message: operation.to_string(),
            elapsed: Duration::ZERO,
        };

        let inner = ProgressTrackerInner {
            info,
            start_time: Instant::now(),
            last_update: None,
            // at most 10 updates per second
            update_interval: Duration::from_millis(100),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a progress callback
    pub fn add_callback(&self, callback: Arc<dyn ProgressCallback>) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(callback);
        }
    }

    /// Start the operation
    pub fn start(&self, operation: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Initializing;
            inner.info.ratio = 0.0;
            inner.info.message = operation.to_string();
            inner.start_time = Instant::now();
            inner.last_update = None;
        }

        self.notify_callbacks(|cb| cb.on_start(operation));
    }

    /// Set current phase
    pub fn set_phase(&self, phase: ProgressPhase) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = phase;
        }
    }

    /// Record a new completed fraction; callbacks are throttled to the
    /// update interval
    pub fn update(&self, ratio: f64) {
        let ratio = if ratio.is_finite() { clamp(0.0, ratio, 1.0) } else { 0.0 };
        let should_notify = match self.inner.lock() {
            Ok(mut inner) => {
                let now = Instant::now();
                inner.info.ratio = ratio;
                inner.info.elapsed = now.duration_since(inner.start_time);
                let due = inner
                    .last_update
                    .map_or(true, |last| now.duration_since(last) >= inner.update_interval);
                if due {
                    inner.last_update = Some(now);
                }
                due
            }
            Err(_) => false,
        };

        if should_notify {
            self.notify_callbacks(|cb| cb.on_progress(ratio));
        }
    }

    /// Complete operation successfully
    pub fn complete(&self, message: Option<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Complete;
            inner.info.ratio = 1.0;
            inner.info.elapsed = inner.start_time.elapsed();
            if let Some(ref msg) = message {
                inner.info.message = msg.clone();
            }
        }

        self.notify_callbacks(|cb| cb.on_complete(message.clone()));
    }

    /// Mark operation as failed
    pub fn error(&self, error: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Failed;
            inner.info.message = error.to_string();
        }

        self.notify_callbacks(|cb| cb.on_error(error));
    }

    /// Cancel operation
    pub fn cancel(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Cancelled;
            inner.info.message = "Operation cancelled".to_string();
        }

        self.notify_callbacks(|cb| cb.on_cancel());
    }

    /// Get current progress information
    pub fn get_info(&self) -> Option<ProgressInfo> {
        self.inner.lock().ok().map(|inner| inner.info.clone())
    }

    /// Set update interval
    pub fn set_update_interval(&self, interval: Duration) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.update_interval = interval;
        }
    }

    /// Notify all callbacks
    fn notify_callbacks<F>(&self, f: F)
    where
        F: Fn(&dyn ProgressCallback),
    {
        if let Ok(callbacks) = self.callbacks.lock() {
            for callback in callbacks.iter() {
                f(callback.as_ref());
            }
        }
    }
}

/// Progress bar on stderr, leaving stdout clean for results
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_start(&self, _operation: &str) {}

    fn on_progress(&self, ratio: f64) {
        let bar_length = 20;
        let filled = (clamp(0.0, ratio, 1.0) * bar_length as f64) as usize;
        let bar = "#".repeat(filled) + &"-".repeat(bar_length - filled);
        eprint!("\r[{}] {:>7}", bar, format_percent(ratio));
        let _ = std::io::stderr().flush();
    }

    fn on_complete(&self, message: Option<String>) {
        match message {
            Some(msg) => eprintln!("\rDone: {}", msg),
            None => eprintln!("\rDone"),
        }
    }

    fn on_error(&self, _error: &str) {
        eprintln!("\rErrored");
    }

    fn on_cancel(&self) {
        eprintln!("\rCanceled");
    }
}

/// One JSON object per line on stdout for every progress event
pub struct JsonProgressCallback;

impl JsonProgressCallback {
    fn emit(&self, mut event: serde_json::Value) {
        event["timestamp"] = serde_json::Value::String(chrono::Utc::now().to_rfc3339());
        println!("{}", event);
    }
}

impl ProgressCallback for JsonProgressCallback {
    fn on_start(&self, operation: &str) {
        self.emit(serde_json::json!({ "event": "start", "operation": operation }));
    }

    fn on_progress(&self, ratio: f64) {
        self.emit(serde_json::json!({
            "event": "progress",
            "ratio": ratio,
            "percent": format_percent(ratio),
        }));
    }

    fn on_complete(&self, message: Option<String>) {
        self.emit(serde_json::json!({ "event": "complete", "message": message }));
    }

    fn on_error(&self, error: &str) {
        self.emit(serde_json::json!({ "event": "error", "error": error }));
    }

    fn on_cancel(&self) {
        self.emit(serde_json::json!({ "event": "cancel" }));
    }
}
