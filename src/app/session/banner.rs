//! Transient error banner

use std::time::{Duration, Instant};

/// A single error message that disappears after a fixed delay.
///
/// Showing a new message replaces the current one and restarts the timer.
#[derive(Debug, Clone)]
pub struct ErrorBanner {
    message: Option<String>,
    shown_at: Option<Instant>,
    duration: Duration,
}

impl ErrorBanner {
    pub fn new(duration: Duration) -> Self {
        Self {
            message: None,
            shown_at: None,
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some(message.into());
        self.shown_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.shown_at = None;
    }

    /// The visible message, if any
    pub fn message(&self) -> Option<&str> {
        self.message_at(Instant::now())
    }

    pub fn message_at(&self, now: Instant) -> Option<&str> {
        let shown_at = self.shown_at?;
        if now.saturating_duration_since(shown_at) >= self.duration {
            return None;
        }
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_expires_after_duration() {
        let mut banner = ErrorBanner::new(Duration::from_millis(5100));
        let t0 = Instant::now();
        banner.show_at("Only drop one file at a time.", t0);

        assert_eq!(banner.message_at(t0), Some("Only drop one file at a time."));
        assert!(banner.message_at(t0 + Duration::from_millis(5099)).is_some());
        assert!(banner.message_at(t0 + Duration::from_millis(5100)).is_none());
    }

    #[test]
    fn test_new_message_restarts_timer() {
        let mut banner = ErrorBanner::new(Duration::from_millis(5100));
        let t0 = Instant::now();
        banner.show_at("first", t0);
        banner.show_at("second", t0 + Duration::from_secs(5));

        assert_eq!(banner.message_at(t0 + Duration::from_secs(6)), Some("second"));

        banner.clear();
        assert!(banner.message_at(t0 + Duration::from_secs(6)).is_none());
    }
}
