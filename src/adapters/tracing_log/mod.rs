// Tracing log adapter - Structured progress events through tracing

use tracing::{debug, error, info, warn, Level};

use crate::engine::progress::{format_percent, ProgressCallback};

/// Forwards crop progress to the tracing subscriber as structured events.
///
/// Used instead of the console bar when logs are JSON, so progress lands in
/// the same stream as everything else.
pub struct TracingProgressAdapter {
    progress_level: Level,
}

impl Default for TracingProgressAdapter {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl TracingProgressAdapter {
    /// Progress samples are logged at `progress_level`; lifecycle events
    /// always use their natural level
    pub fn new(progress_level: Level) -> Self {
        Self { progress_level }
    }
}

impl ProgressCallback for TracingProgressAdapter {
    fn on_start(&self, operation: &str) {
        info!(operation, "operation started");
    }

    fn on_progress(&self, ratio: f64) {
        let percent = format_percent(ratio);
        if self.progress_level == Level::TRACE {
            tracing::trace!(ratio, %percent, "progress");
        } else if self.progress_level == Level::DEBUG {
            debug!(ratio, %percent, "progress");
        } else {
            info!(ratio, %percent, "progress");
        }
    }

    fn on_complete(&self, message: Option<String>) {
        info!(result = message.as_deref().unwrap_or(""), "operation complete");
    }

    fn on_error(&self, error: &str) {
        error!(error, "operation failed");
    }

    fn on_cancel(&self) {
        warn!("operation canceled");
    }
}
