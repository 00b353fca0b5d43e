//! Crop job lifecycle and progress reporting

use serde::{Deserialize, Serialize};

use crate::error::{CropError, CropResult};

pub mod progress;

use progress::format_percent;

/// Where a crop job stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Running,
    Done,
    Canceled,
    Errored,
}

/// State of the single crop job a session may run at a time
#[derive(Debug, Clone, PartialEq)]
pub struct CropJob {
    state: JobState,
    ratio: f64,
}

impl Default for CropJob {
    fn default() -> Self {
        Self {
            state: JobState::Idle,
            ratio: 0.0,
        }
    }
}

impl CropJob {
    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Last completed fraction reported while running
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Enter `Running`; refused while a job is already running
    pub fn start(&mut self) -> CropResult<()> {
        if self.is_running() {
            return Err(CropError::JobRunning);
        }
        self.state = JobState::Running;
        self.ratio = 0.0;
        Ok(())
    }

    /// Record progress; ignored unless running
    pub fn set_progress(&mut self, ratio: f64) {
        if self.is_running() {
            self.ratio = ratio;
        }
    }

    /// Record the outcome of the engine run.
    ///
    /// An abort lands in `Canceled`, not `Errored`. A job already canceled
    /// stays canceled whatever the run reports afterwards.
    pub fn finish<T>(&mut self, result: &CropResult<T>) -> JobState {
        if self.state == JobState::Canceled {
            return self.state;
        }
        self.state = match result {
            Ok(_) => {
                self.ratio = 1.0;
                JobState::Done
            }
            Err(e) if e.is_abort() => JobState::Canceled,
            Err(_) => JobState::Errored,
        };
        self.state
    }

    /// Mark the job failed after the fact, unless it was canceled
    pub fn fail(&mut self) {
        if self.state != JobState::Canceled {
            self.state = JobState::Errored;
        }
    }

    /// Mark a running job canceled; returns whether one was running
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = JobState::Canceled;
        true
    }

    /// Text for the progress label
    pub fn status_text(&self) -> String {
        match self.state {
            JobState::Idle => String::new(),
            JobState::Running | JobState::Done => format_percent(self.ratio),
            JobState::Canceled => "Canceled".to_string(),
            JobState::Errored => "Errored".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let mut job = CropJob::default();
        assert_eq!(job.status_text(), "");

        job.start().unwrap();
        assert_eq!(job.status_text(), "0.00%");
        assert!(matches!(job.start(), Err(CropError::JobRunning)));

        job.set_progress(0.4567);
        assert_eq!(job.status_text(), "45.67%");

        assert_eq!(job.finish(&Ok(())), JobState::Done);
        assert_eq!(job.status_text(), "100.00%");

        // A finished job can be started again
        job.start().unwrap();
        assert_eq!(job.ratio(), 0.0);
    }

    #[test]
    fn test_failures_and_aborts() {
        let mut job = CropJob::default();
        job.start().unwrap();
        let failed: CropResult<()> = Err(CropError::RunCommand {
            message: "exit 1".to_string(),
        });
        assert_eq!(job.finish(&failed), JobState::Errored);
        assert_eq!(job.status_text(), "Errored");

        job.start().unwrap();
        let aborted: CropResult<()> = Err(CropError::EngineAborted);
        assert_eq!(job.finish(&aborted), JobState::Canceled);
        assert_eq!(job.status_text(), "Canceled");
    }

    #[test]
    fn test_cancel_wins_over_late_result() {
        let mut job = CropJob::default();
        assert!(!job.cancel());

        job.start().unwrap();
        assert!(job.cancel());
        job.set_progress(0.9);
        assert_eq!(job.finish(&Ok(())), JobState::Canceled);
        assert_eq!(job.status_text(), "Canceled");
    }
}
