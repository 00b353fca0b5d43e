//! Crop session
//!
//! [`CropSession`] plays the part of the host page: it owns the area
//! selector, the transport controls, the engine and the latest result, and it
//! keeps the dimension labels in sync with the selector through a change
//! subscription.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::crop_interactor::{CropInteractor, CropRequest};
use crate::command::{build_command, compute_output_dimensions, render_preview};
use crate::domain::errors::DomainError;
use crate::domain::model::{BoundingBox, MediaFile, MediaInfo, Transform};
use crate::domain::rules::{accept_single_video, TransportControls};
use crate::engine::progress::{ProgressPhase, ProgressTracker};
use crate::engine::{CropJob, JobState};
use crate::error::{CropError, CropResult};
use crate::output::{download_name, Artifact, ArtifactSlot};
use crate::ports::{EngineFactory, ProbePort, TranscodeEngine};
use crate::selector::AreaSelector;

pub mod banner;

#[cfg(test)]
mod tests;

pub use banner::ErrorBanner;

/// Session-wide settings, usually taken from the application config
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Program name shown in command previews
    pub program: PathBuf,
    pub default_scale: f64,
    pub remove_audio: bool,
    pub banner_duration: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            default_scale: 1.0,
            remove_audio: false,
            banner_duration: Duration::from_millis(5100),
        }
    }
}

/// Label text kept current by the selector subscription
#[derive(Debug, Clone, Default)]
struct Labels {
    area: String,
    output: String,
    scale: f64,
}

impl Labels {
    fn refresh(&mut self, bbox: &BoundingBox) {
        let (out_width, out_height) = compute_output_dimensions(bbox.width, bbox.height, self.scale);
        self.area = format!("{} x {}", bbox.width, bbox.height);
        self.output = format!("Output Dimensions: {} x {}", out_width, out_height);
    }
}

/// Engine slot shared between the session and its cancel handles
#[derive(Clone)]
struct EngineSlot {
    engine: Arc<Mutex<Arc<dyn TranscodeEngine>>>,
    factory: Arc<dyn EngineFactory>,
}

impl EngineSlot {
    fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(factory.create())),
            factory,
        }
    }

    fn current(&self) -> CropResult<Arc<dyn TranscodeEngine>> {
        self.engine
            .lock()
            .map(|engine| Arc::clone(&engine))
            .map_err(|_| CropError::EngineNotLoaded)
    }

    /// Exit the current engine and put a fresh one in its place
    fn reinitialize(&self) {
        if let Ok(mut engine) = self.engine.lock() {
            engine.exit();
            *engine = self.factory.create();
            debug!("engine reinitialized");
        }
    }
}

/// Cancels the session's running crop from another task
#[derive(Clone)]
pub struct CancelHandle {
    job: Arc<Mutex<CropJob>>,
    engine: EngineSlot,
    tracker: ProgressTracker,
}

impl CancelHandle {
    /// Abort a running crop; returns whether one was running
    pub fn cancel(&self) -> bool {
        let was_running = self.job.lock().map(|mut job| job.cancel()).unwrap_or(false);
        if !was_running {
            return false;
        }
        // Always reinitialize, even if the exit itself misbehaves
        self.engine.reinitialize();
        self.tracker.cancel();
        info!("crop canceled");
        true
    }
}

/// One interactive cropping session
pub struct CropSession {
    settings: SessionSettings,
    probe: Arc<dyn ProbePort>,
    engine: EngineSlot,
    selector: AreaSelector,
    labels: Arc<Mutex<Labels>>,
    controls: Option<TransportControls>,
    remove_audio: bool,
    file: Option<MediaFile>,
    media: Option<MediaInfo>,
    job: Arc<Mutex<CropJob>>,
    tracker: ProgressTracker,
    artifact: ArtifactSlot,
    banner: ErrorBanner,
}

impl CropSession {
    pub fn new(
        settings: SessionSettings,
        probe: Arc<dyn ProbePort>,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        let labels = Arc::new(Mutex::new(Labels {
            scale: settings.default_scale,
            ..Labels::default()
        }));

        let mut selector = AreaSelector::new();
        let sink = Arc::clone(&labels);
        selector.subscribe(move |bbox| {
            if let Ok(mut labels) = sink.lock() {
                labels.refresh(bbox);
            }
        });

        Self {
            remove_audio: settings.remove_audio,
            banner: ErrorBanner::new(settings.banner_duration),
            settings,
            probe,
            engine: EngineSlot::new(factory),
            selector,
            labels,
            controls: None,
            file: None,
            media: None,
            job: Arc::new(Mutex::new(CropJob::default())),
            tracker: ProgressTracker::new("crop"),
            artifact: ArtifactSlot::new(),
        }
    }

    /// Validate a picked or dropped set of files and load the single video
    /// in it. Rejections are shown on the banner.
    pub async fn load_files(&mut self, files: &[MediaFile]) -> CropResult<&MediaInfo> {
        let file = match accept_single_video(files) {
            Ok(file) => file.clone(),
            Err(e) => {
                self.banner.show(e.banner_message());
                return Err(e.into());
            }
        };
        self.load_file(file).await
    }

    /// Load one file: probe it, attach the selector to its frame with the
    /// default selection, reset the transport controls and drop any previous
    /// result
    pub async fn load_file(&mut self, file: MediaFile) -> CropResult<&MediaInfo> {
        if self.is_cropping() {
            return Err(CropError::JobRunning);
        }
        if !file.is_video() {
            let err = DomainError::NotAVideo(file.name.clone());
            self.banner.show(err.banner_message());
            return Err(err.into());
        }

        let media = match self.probe.probe(&file.path).await {
            Ok(media) => media,
            Err(e) => {
                self.banner.show(e.banner_message());
                return Err(e.into());
            }
        };
        let mut controls = match TransportControls::new(media.duration) {
            Ok(controls) => controls,
            Err(e) => {
                self.banner.show(e.banner_message());
                return Err(e.into());
            }
        };
        controls.set_scale(self.settings.default_scale);
        self.set_label_scale(controls.scale());

        self.selector.attach(media.frame());
        self.selector.reset();
        self.artifact.clear();
        if let Ok(mut job) = self.job.lock() {
            *job = CropJob::default();
        }
        self.banner.clear();

        info!(
            file = %file.name,
            width = media.width,
            height = media.height,
            duration = media.duration,
            "file loaded"
        );
        self.controls = Some(controls);
        self.file = Some(file);
        Ok(&*self.media.insert(media))
    }

    pub fn file(&self) -> Option<&MediaFile> {
        self.file.as_ref()
    }

    pub fn media(&self) -> Option<&MediaInfo> {
        self.media.as_ref()
    }

    pub fn selector(&self) -> &AreaSelector {
        &self.selector
    }

    /// Mutable access for feeding input events
    pub fn selector_mut(&mut self) -> &mut AreaSelector {
        &mut self.selector
    }

    pub fn controls(&self) -> Option<&TransportControls> {
        self.controls.as_ref()
    }

    pub fn controls_mut(&mut self) -> Option<&mut TransportControls> {
        self.controls.as_mut()
    }

    /// Set the output scale; unusable values fall back to the floor.
    /// Returns the scale actually applied.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        let applied = match self.controls.as_mut() {
            Some(controls) => controls.set_scale(scale),
            None => Transform::new(scale, false).scale,
        };
        self.set_label_scale(applied);
        applied
    }

    pub fn set_remove_audio(&mut self, remove_audio: bool) {
        self.remove_audio = remove_audio;
    }

    fn set_label_scale(&mut self, scale: f64) {
        let bbox = self.selector.bounding_box();
        if let Ok(mut labels) = self.labels.lock() {
            labels.scale = scale;
            labels.refresh(&bbox);
        }
    }

    /// Current transform
    pub fn transform(&self) -> Transform {
        let scale = self
            .controls
            .as_ref()
            .map_or(self.settings.default_scale, |c| c.scale());
        Transform::new(scale, self.remove_audio)
    }

    /// Selection size, e.g. `213.33333333333334 x 120`
    pub fn area_text(&self) -> String {
        self.labels
            .lock()
            .map(|labels| labels.area.clone())
            .unwrap_or_default()
    }

    /// e.g. `Output Dimensions: 212 x 120`
    pub fn output_dimensions_text(&self) -> String {
        self.labels
            .lock()
            .map(|labels| labels.output.clone())
            .unwrap_or_default()
    }

    /// The crop request for the current file and live geometry
    pub fn crop_request(&self) -> CropResult<CropRequest> {
        let (Some(file), Some(controls)) = (self.file.as_ref(), self.controls.as_ref()) else {
            return Err(DomainError::NoFile.into());
        };
        Ok(CropRequest {
            file: file.clone(),
            bbox: self.selector.bounding_box(),
            time: controls.time_range(),
            transform: self.transform(),
        })
    }

    /// Command line that a crop would run right now, with the engine's
    /// placeholder output name
    pub fn command_preview(&self) -> Option<String> {
        let request = self.crop_request().ok()?;
        let args = build_command(&request.command_plan());
        Some(render_preview(&self.settings.program.to_string_lossy(), &args))
    }

    pub fn is_cropping(&self) -> bool {
        self.job.lock().map(|job| job.is_running()).unwrap_or(false)
    }

    pub fn job_state(&self) -> JobState {
        self.job.lock().map(|job| job.state()).unwrap_or(JobState::Idle)
    }

    /// Progress label: `NN.NN%`, `Canceled`, `Errored`, or empty
    pub fn progress_text(&self) -> String {
        self.job
            .lock()
            .map(|job| job.status_text())
            .unwrap_or_default()
    }

    /// Tracker fed by every crop, for attaching progress callbacks
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// The engine the next crop will use
    pub fn engine(&self) -> CropResult<Arc<dyn TranscodeEngine>> {
        self.engine.current()
    }

    pub fn banner(&self) -> &ErrorBanner {
        &self.banner
    }

    pub fn banner_mut(&mut self) -> &mut ErrorBanner {
        &mut self.banner
    }

    /// The latest result, if any
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.current()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            job: Arc::clone(&self.job),
            engine: self.engine.clone(),
            tracker: self.tracker.clone(),
        }
    }

    /// Abort a running crop and reinitialize the engine
    pub fn cancel(&self) -> bool {
        self.cancel_handle().cancel()
    }

    /// Run a crop with the current geometry, time range and transform.
    ///
    /// Refused while another crop runs. On success the result replaces the
    /// previous artifact. A failure leaves the engine in place so the crop
    /// can be retried; a cancellation has already replaced it.
    pub async fn crop(&mut self) -> CropResult<&Artifact> {
        let request = self.crop_request()?;
        let engine = self.engine.current()?;
        self.job
            .lock()
            .map_err(|_| CropError::JobRunning)?
            .start()?;
        self.tracker.start("crop");
        self.tracker.set_phase(ProgressPhase::Processing);

        let job = Arc::clone(&self.job);
        let tracker = self.tracker.clone();
        let on_ratio: Arc<dyn Fn(f64) + Send + Sync> = Arc::new(move |ratio: f64| {
            if let Ok(mut job) = job.lock() {
                job.set_progress(ratio);
            }
            tracker.update(ratio);
        });

        let result = CropInteractor::new(engine)
            .execute(&request, Some(on_ratio))
            .await;

        let state = self.finish_job(&result);
        let output = match (state, result) {
            (JobState::Done, Ok(output)) => output,
            (JobState::Canceled, _) => return Err(CropError::EngineAborted),
            (_, Err(e)) => return Err(e),
            (_, Ok(_)) => return Err(CropError::EngineAborted),
        };

        let name = download_name(&request.file.name);
        match self.artifact.store(&output.data, &name) {
            Ok(artifact) => {
                info!(name = %name, bytes = artifact.len(), "result stored");
                self.tracker.complete(Some(name));
                Ok(artifact)
            }
            Err(e) => {
                let err = CropError::from(e);
                if let Ok(mut job) = self.job.lock() {
                    job.fail();
                }
                self.tracker.error(&err.to_string());
                Err(err)
            }
        }
    }

    fn finish_job<T>(&self, result: &CropResult<T>) -> JobState {
        let state = self
            .job
            .lock()
            .map(|mut job| job.finish(result))
            .unwrap_or(JobState::Errored);
        match (state, result) {
            (JobState::Errored, Err(e)) => {
                warn!("crop failed: {}", e);
                self.tracker.error(&e.to_string());
            }
            (JobState::Canceled, _) => debug!("crop ended after cancellation"),
            _ => {}
        }
        state
    }
}
