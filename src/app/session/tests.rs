use std::path::Path;
use std::sync::{Arc, Mutex};

use super::*;
use crate::adapters::mock::{MockEngineAdapter, MockProbeAdapter};

/// Every engine the factory has handed out, newest last
type Created = Arc<Mutex<Vec<Arc<MockEngineAdapter>>>>;

fn factory(make: fn() -> MockEngineAdapter) -> (Arc<dyn EngineFactory>, Created) {
    let created: Created = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&created);
    let factory = move || -> Arc<dyn TranscodeEngine> {
        let engine = Arc::new(make());
        log.lock().unwrap().push(Arc::clone(&engine));
        engine
    };
    let factory: Arc<dyn EngineFactory> = Arc::new(factory);
    (factory, created)
}

fn session_with(make: fn() -> MockEngineAdapter) -> (CropSession, Created) {
    let (factory, created) = factory(make);
    let session = CropSession::new(
        SessionSettings::default(),
        Arc::new(MockProbeAdapter::new(640, 360, 10.0)),
        factory,
    );
    (session, created)
}

fn video(dir: &Path, name: &str) -> MediaFile {
    let path = dir.join(name);
    std::fs::write(&path, b"video bytes").unwrap();
    MediaFile::from_path(path)
}

#[tokio::test]
async fn test_load_sets_default_selection_and_labels() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(MockEngineAdapter::new);

    let media = session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();
    assert_eq!((media.width, media.height), (640, 360));

    let bbox = session.selector().bounding_box();
    assert_eq!((bbox.x, bbox.y), (0.0, 0.0));
    assert_eq!(bbox.height, 120.0);
    assert_eq!(session.area_text(), "213.33333333333334 x 120");
    assert_eq!(session.output_dimensions_text(), "Output Dimensions: 212 x 120");

    let controls = session.controls().unwrap();
    assert_eq!((controls.start(), controls.end()), (0.0, 10.0));
    assert_eq!(session.progress_text(), "");
}

#[tokio::test]
async fn test_labels_follow_selector_and_scale() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(MockEngineAdapter::new);
    session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();

    assert!(session.selector_mut().maximize());
    assert_eq!(session.area_text(), "640 x 360");
    assert_eq!(session.output_dimensions_text(), "Output Dimensions: 640 x 360");

    assert_eq!(session.set_scale(0.5), 0.5);
    assert_eq!(session.output_dimensions_text(), "Output Dimensions: 320 x 180");

    // zero falls back to the floor instead of producing an empty frame
    let applied = session.set_scale(0.0);
    assert!(applied > 0.0);
    assert_eq!(session.transform().scale, applied);
}

#[tokio::test]
async fn test_multiple_files_are_rejected_on_banner() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(MockEngineAdapter::new);
    let files = vec![video(dir.path(), "a.mp4"), video(dir.path(), "b.mp4")];

    let err = session.load_files(&files).await.unwrap_err();
    assert!(matches!(err, CropError::Domain(DomainError::MultipleFiles)));
    assert_eq!(session.banner().message(), Some("Only drop one file at a time."));
    assert!(session.file().is_none());
}

#[tokio::test]
async fn test_non_video_is_rejected_on_banner() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(MockEngineAdapter::new);

    let err = session
        .load_files(&[video(dir.path(), "x.txt")])
        .await
        .unwrap_err();
    assert!(matches!(err, CropError::Domain(DomainError::NotAVideo(_))));
    assert_eq!(
        session.banner().message(),
        Some("Did not recognize \"x.txt\" as a video file.")
    );

    // a good file clears the banner
    session.load_files(&[video(dir.path(), "ok.mp4")]).await.unwrap();
    assert!(session.banner().message().is_none());
}

#[tokio::test]
async fn test_command_preview_tracks_live_state() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(MockEngineAdapter::new);
    assert!(session.command_preview().is_none());

    session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();
    assert_eq!(
        session.command_preview().unwrap(),
        "ffmpeg -i clip.mp4 -ss 0 -to 10 -vf crop=213.33333333333334:120:0:0,scale=212:120 output.mp4"
    );

    session.controls_mut().unwrap().set_start(2.5);
    session.set_remove_audio(true);
    let preview = session.command_preview().unwrap();
    assert!(preview.contains("-ss 2.5 -to 10"));
    assert!(preview.ends_with("-an output.mp4"));
}

#[tokio::test]
async fn test_crop_without_file_is_refused() {
    let (mut session, created) = session_with(MockEngineAdapter::new);
    let err = session.crop().await.unwrap_err();
    assert!(matches!(err, CropError::Domain(DomainError::NoFile)));
    assert!(created.lock().unwrap()[0].runs().is_empty());
}

#[tokio::test]
async fn test_crop_stores_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, created) = session_with(|| MockEngineAdapter::new().with_progress(vec![5.0]));
    session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();

    let artifact = session.crop().await.unwrap();
    assert_eq!(artifact.download_name(), "clip cropped.mp4");
    assert_eq!(std::fs::read(artifact.path()).unwrap(), b"cropped clip.mp4");

    assert_eq!(session.job_state(), JobState::Done);
    assert_eq!(session.progress_text(), "100.00%");
    let info = session.tracker().get_info().unwrap();
    assert_eq!(info.phase, crate::engine::progress::ProgressPhase::Complete);

    let engine = Arc::clone(&created.lock().unwrap()[0]);
    assert!(engine.is_loaded());
    assert_eq!(engine.file("clip.mp4"), Some(b"video bytes".to_vec()));

    // a second crop replaces the first result
    let first_path = session.artifact().unwrap().path().to_path_buf();
    session.crop().await.unwrap();
    assert_ne!(session.artifact().unwrap().path(), first_path.as_path());
    assert!(!first_path.exists());
}

#[tokio::test]
async fn test_failed_crop_keeps_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, created) = session_with(|| MockEngineAdapter::new().failing());
    session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();
    let before = session.engine().unwrap();

    let err = session.crop().await.unwrap_err();
    assert!(matches!(err, CropError::RunCommand { .. }));
    assert_eq!(session.progress_text(), "Errored");
    assert!(session.artifact().is_none());
    assert!(Arc::ptr_eq(&before, &session.engine().unwrap()));
    assert_eq!(created.lock().unwrap().len(), 1);

    // and the crop can be retried
    assert!(!session.is_cropping());
    assert!(session.crop().await.is_err());
    assert_eq!(created.lock().unwrap()[0].runs().len(), 2);
}

#[tokio::test]
async fn test_cancel_reinitializes_engine() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, created) = session_with(|| MockEngineAdapter::new().holding());
    session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();
    assert!(!session.cancel());

    let engine = Arc::clone(&created.lock().unwrap()[0]);
    let handle = session.cancel_handle();
    let canceller = async {
        engine.wait_started().await;
        handle.cancel()
    };
    let (result, canceled) = tokio::join!(
        async { session.crop().await.map(|_| ()) },
        canceller
    );

    assert!(canceled);
    assert!(matches!(result, Err(CropError::EngineAborted)));
    assert_eq!(session.job_state(), JobState::Canceled);
    assert_eq!(session.progress_text(), "Canceled");
    assert!(engine.is_exited());

    let created = created.lock().unwrap();
    assert_eq!(created.len(), 2);
    let current = session.engine().unwrap();
    assert!(Arc::ptr_eq(&current, &(Arc::clone(&created[1]) as Arc<dyn TranscodeEngine>)));
    assert!(!current.is_loaded());
}

#[tokio::test]
async fn test_load_is_refused_while_cropping() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_with(MockEngineAdapter::new);
    session.load_file(video(dir.path(), "clip.mp4")).await.unwrap();

    session.job.lock().unwrap().start().unwrap();
    assert!(session.is_cropping());
    assert!(matches!(
        session.load_file(video(dir.path(), "other.mp4")).await,
        Err(CropError::JobRunning)
    ));
    assert!(matches!(session.crop().await, Err(CropError::JobRunning)));

    assert!(session.cancel());
    assert!(!session.is_cropping());
}
