// Crop interactor - Orchestrates the transcode use case

use std::sync::Arc;

use tracing::{debug, info};

use crate::command::{build_command, CommandIo, CommandPlan};
use crate::domain::model::{BoundingBox, MediaFile, TimeRange, Transform};
use crate::engine::progress::ratio_for;
use crate::error::{CropError, CropResult};
use crate::ports::{ProgressSink, TranscodeEngine};

/// Everything needed to crop one file
#[derive(Debug, Clone, PartialEq)]
pub struct CropRequest {
    pub file: MediaFile,
    pub bbox: BoundingBox,
    pub time: TimeRange,
    pub transform: Transform,
}

impl CropRequest {
    /// Command plan as the engine sees it: the input under its own name,
    /// the result under a name that cannot overwrite it
    pub fn command_plan(&self) -> CommandPlan {
        CommandPlan {
            io: CommandIo::for_input(self.file.name.clone()),
            bbox: self.bbox,
            time: self.time,
            transform: self.transform,
        }
    }
}

/// Result of a successful crop
#[derive(Debug, Clone, PartialEq)]
pub struct CropOutput {
    pub data: Vec<u8>,
    pub output_dimensions: (u32, u32),
    pub args: Vec<String>,
}

/// Interactor for the crop use case
pub struct CropInteractor {
    engine: Arc<dyn TranscodeEngine>,
}

impl CropInteractor {
    /// Create new crop interactor with an injected engine
    pub fn new(engine: Arc<dyn TranscodeEngine>) -> Self {
        Self { engine }
    }

    /// Load the engine if needed, copy the input in, run the crop and read
    /// the result back. `on_ratio` receives the completed fraction of the
    /// requested time range.
    pub async fn execute(
        &self,
        request: &CropRequest,
        on_ratio: Option<Arc<dyn Fn(f64) + Send + Sync>>,
    ) -> CropResult<CropOutput> {
        if !self.engine.is_loaded() {
            debug!("loading engine");
            self.engine.load().await?;
        }

        let data = tokio::fs::read(&request.file.path)
            .await
            .map_err(|source| CropError::FetchInput {
                path: request.file.path.display().to_string(),
                source,
            })?;
        debug!(name = %request.file.name, bytes = data.len(), "fetched input");
        self.engine.write_file(&request.file.name, &data).await?;
        drop(data);

        let plan = request.command_plan();
        let args = build_command(&plan);
        info!(
            input = %request.file.name,
            selection = %request.bbox,
            start = request.time.start,
            end = request.time.end,
            "running crop"
        );

        let total = request.time.duration();
        let sink: Option<ProgressSink> = on_ratio.map(|f| {
            let sink: ProgressSink = Arc::new(move |position: f64| f(ratio_for(position, total)));
            sink
        });
        self.engine.run(&args, sink).await?;

        let output = self.engine.read_file(&plan.io.output).await?;
        info!(bytes = output.len(), "crop finished");

        Ok(CropOutput {
            data: output,
            output_dimensions: plan.output_dimensions(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockEngineAdapter as MockEngine;
    use std::sync::Mutex;

    fn request(path: &std::path::Path) -> CropRequest {
        CropRequest {
            file: MediaFile::from_path(path),
            bbox: BoundingBox::new(10.0, 20.0, 200.0, 100.0),
            time: TimeRange::new(1.0, 5.0).unwrap(),
            transform: Transform::new(0.5, true),
        }
    }

    #[tokio::test]
    async fn test_execute_runs_full_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"input bytes").unwrap();

        let engine = Arc::new(MockEngine::new().with_progress(vec![0.0, 2.0, 4.0]));
        let interactor = CropInteractor::new(engine.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let output = interactor
            .execute(
                &request(&input),
                Some(Arc::new(move |ratio: f64| sink.lock().unwrap().push(ratio))),
            )
            .await
            .unwrap();

        assert!(engine.is_loaded());
        assert_eq!(engine.file("clip.mp4"), Some(b"input bytes".to_vec()));
        assert_eq!(output.output_dimensions, (100, 50));
        assert_eq!(output.data, b"cropped clip.mp4".to_vec());
        assert_eq!(
            engine.runs(),
            vec![vec![
                "-i",
                "clip.mp4",
                "-ss",
                "1",
                "-to",
                "5",
                "-vf",
                "crop=200:100:10:20,scale=100:50",
                "-an",
                "output.mp4"
            ]]
        );
        assert_eq!(*seen.lock().unwrap(), vec![0.0, 0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_input_named_output_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("output.mp4");
        std::fs::write(&input, b"original").unwrap();

        let engine = Arc::new(MockEngine::new());
        let interactor = CropInteractor::new(engine.clone());
        let output = interactor.execute(&request(&input), None).await.unwrap();

        let args = &engine.runs()[0];
        assert_eq!(args[1], "output.mp4");
        assert_eq!(args.last().map(String::as_str), Some("output-cropped.mp4"));
        assert_eq!(engine.file("output.mp4"), Some(b"original".to_vec()));
        assert_eq!(output.data, b"cropped output.mp4".to_vec());
    }

    #[tokio::test]
    async fn test_missing_input_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(MockEngine::new());
        let interactor = CropInteractor::new(engine.clone());

        let err = interactor
            .execute(&request(&dir.path().join("gone.mp4")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CropError::FetchInput { .. }));
        assert!(engine.runs().is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_is_run_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();

        let engine = Arc::new(MockEngine::new().failing());
        let interactor = CropInteractor::new(engine);
        let err = interactor.execute(&request(&input), None).await.unwrap_err();
        assert!(matches!(err, CropError::RunCommand { .. }));
    }
}
