use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{AppConfig, FfmpegEngine, FfprobeAdapter};
use crate::app::crop_interactor::CropInteractor;
use crate::app::session::{CropSession, SessionSettings};
use crate::ports::{EngineFactory, ProbePort, TranscodeEngine};

pub trait AppContainer: Send + Sync {
    fn probe(&self) -> Arc<dyn ProbePort>;
    fn engine_factory(&self) -> Arc<dyn EngineFactory>;
    fn session(&self) -> CropSession;

    /// Interactor over a fresh engine
    fn crop_interactor(&self) -> CropInteractor {
        CropInteractor::new(self.engine_factory().create())
    }
}

/// Wires the ffprobe and ffmpeg adapters from the application config
pub struct DefaultAppContainer {
    settings: SessionSettings,
    probe: Arc<dyn ProbePort>,
    engine_factory: Arc<dyn EngineFactory>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let probe: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(config.engine.ffprobe.clone()));

        let program: PathBuf = config.engine.ffmpeg.clone();
        let factory = move || -> Arc<dyn TranscodeEngine> { Arc::new(FfmpegEngine::new(program.clone())) };

        Self {
            settings: SessionSettings {
                program: config.engine.ffmpeg.clone(),
                default_scale: config.crop.scale,
                remove_audio: config.crop.remove_audio,
                banner_duration: config.ui.banner_duration(),
            },
            probe,
            engine_factory: Arc::new(factory),
        }
    }

    /// Assemble from explicit parts, e.g. in-memory doubles
    pub fn with_parts(
        settings: SessionSettings,
        probe: Arc<dyn ProbePort>,
        engine_factory: Arc<dyn EngineFactory>,
    ) -> Self {
        Self {
            settings,
            probe,
            engine_factory,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }
}

impl AppContainer for DefaultAppContainer {
    fn probe(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe)
    }

    fn engine_factory(&self) -> Arc<dyn EngineFactory> {
        Arc::clone(&self.engine_factory)
    }

    fn session(&self) -> CropSession {
        CropSession::new(self.settings.clone(), self.probe(), self.engine_factory())
    }
}
