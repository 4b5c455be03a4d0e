//! End-to-end scenarios: capture through the controller, archive, then export
//! with the real exporters writing into temp directories.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::booth::clock::testing::RecordingClock;
use crate::booth::{BoothEvent, CaptureArchive, SessionController, SessionStatus};
use crate::capture::testing::ScriptedCamera;
use crate::capture::{FrameSource, SyntheticCamera};
use crate::error::BoothError;
use crate::export::{FileExporter, GalleryExporter, StripExporter, StripStyle};
use crate::runtime::testing::RecordingRuntime;
use crate::runtime::{BoothRuntime, PermissionStatus};
use crate::state::AppState;

struct Booth {
    runtime: Arc<RecordingRuntime>,
    clock: Arc<RecordingClock>,
    state: AppState,
    _output: TempDir,
    output_dir: std::path::PathBuf,
}

fn booth_with(
    runtime: RecordingRuntime,
    camera: Arc<dyn FrameSource>,
    exporter: impl FnOnce(Arc<dyn BoothRuntime>, &std::path::Path) -> Arc<dyn StripExporter>,
) -> Booth {
    let runtime = Arc::new(runtime);
    let clock = Arc::new(RecordingClock::default());
    let output = TempDir::new().unwrap();
    let output_dir = output.path().to_path_buf();

    let controller = Arc::new(
        SessionController::new(runtime.clone(), camera, Arc::new(CaptureArchive::new()))
            .with_clock(clock.clone()),
    );
    let exporter = exporter(runtime.clone(), &output_dir);

    Booth {
        state: AppState::with_controller(runtime.clone(), controller, exporter),
        runtime,
        clock,
        _output: output,
        output_dir,
    }
}

fn file_booth(camera: Arc<dyn FrameSource>) -> Booth {
    booth_with(RecordingRuntime::new(), camera, |_, dir| {
        Arc::new(FileExporter::new(dir, StripStyle::default())) as Arc<dyn StripExporter>
    })
}

fn synthetic() -> Arc<dyn FrameSource> {
    Arc::new(SyntheticCamera::new(64, 48, true))
}

#[tokio::test]
async fn test_grid_session_then_export() {
    let booth = file_booth(synthetic());

    let record = booth.state.capture("GRID_4x6_6", "alex", 3).await.unwrap();

    assert_eq!(record.images().len(), 6);
    assert_eq!(record.user_name(), "ALEX");
    assert_eq!(record.layout_id(), "GRID_4x6_6");
    assert_eq!(record.id().len(), 5);
    assert_eq!(booth.state.archive().len(), 1);
    assert_eq!(booth.state.controller.status(), SessionStatus::Idle);

    // Warm-up, then per shot: 3 ticks and the post-shot pause
    let expected = Duration::from_millis(500) + 6 * Duration::from_millis(3 * 800 + 600);
    assert_eq!(booth.clock.total(), expected);

    for shot in 0..6 {
        assert_eq!(
            booth.runtime.ticks_for_shot(shot),
            vec![Some(3), Some(2), Some(1), None]
        );
    }

    let exported = booth.state.export(record.id(), None).await.unwrap();
    let expected_name = format!("booth{}.png", record.id().to_lowercase());
    assert_eq!(exported.file_name, expected_name);
    assert!(booth.output_dir.join(&expected_name).exists());

    let events = booth.runtime.events();
    assert!(matches!(events.first(), Some(BoothEvent::SessionStarted { .. })));
    assert!(matches!(events.last(), Some(BoothEvent::ExportCompleted { .. })));
    let frames: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            BoothEvent::FrameCaptured { captured, total } => Some((*captured, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(frames, (1..=6).map(|i| (i, 6)).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_failure_mid_session_keeps_archive_unchanged() {
    let camera = Arc::new(ScriptedCamera::failing_on(2));
    let booth = file_booth(camera.clone());

    let err = booth
        .state
        .capture("STRIP_2x6_4", "robin", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, BoothError::Device(_)));
    assert!(booth.state.archive().is_empty());
    assert_eq!(camera.acquire_calls(), 3);
    assert_eq!(camera.releases(), 1);
    assert_eq!(booth.state.controller.status(), SessionStatus::Idle);
    assert!(matches!(
        booth.runtime.events().last(),
        Some(BoothEvent::SessionFailed { .. })
    ));
}

#[tokio::test]
async fn test_recovers_after_failed_session() {
    let booth = file_booth(synthetic());

    let first = booth.state.capture("POSTCARD_4x6", "kim", 1).await.unwrap();
    assert!(booth.state.capture("NOPE", "kim", 1).await.is_err());
    let second = booth.state.capture("STRIP_2x6_3", "sam", 1).await.unwrap();

    let ids: Vec<_> = booth
        .state
        .archive()
        .list()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    assert_eq!(ids, vec![second.id().to_string(), first.id().to_string()]);
}

#[tokio::test]
async fn test_blank_name_is_rejected_without_side_effects() {
    let camera = Arc::new(ScriptedCamera::default());
    let booth = file_booth(camera.clone());

    let err = booth.state.capture("GRID_4x6_6", "   ", 3).await.unwrap_err();

    assert!(matches!(err, BoothError::Validation(_)));
    assert!(booth.runtime.events().is_empty());
    assert!(booth.runtime.permission_requests.lock().is_empty());
    assert_eq!(camera.activations(), 0);
    assert!(booth.clock.sleeps().is_empty());
    assert!(booth.state.archive().is_empty());
}

#[tokio::test]
async fn test_export_twice_with_different_names() {
    let booth = file_booth(synthetic());
    let record = booth.state.capture("STRIP_2x6_3", "alex", 1).await.unwrap();

    let first = booth.state.export(record.id(), Some("Party!")).await.unwrap();
    let second = booth.state.export(record.id(), Some("for grandma")).await.unwrap();

    assert_eq!(first.file_name, "party.png");
    assert_eq!(second.file_name, "forgrandma.png");
    assert!(first.path.exists());
    assert!(second.path.exists());

    // Export never touches the archive
    assert_eq!(booth.state.archive().len(), 1);
    let stored = booth.state.archive().get(record.id()).unwrap();
    assert!(Arc::ptr_eq(&stored, &record));
}

#[tokio::test]
async fn test_export_unknown_id() {
    let booth = file_booth(synthetic());
    let err = booth.state.export("ZZZZZ", None).await.unwrap_err();
    assert!(matches!(err, BoothError::RecordNotFound(_)));
}

#[tokio::test]
async fn test_gallery_denied_then_retried() {
    let booth = booth_with(
        RecordingRuntime::with_permissions(PermissionStatus::Granted, PermissionStatus::Denied),
        synthetic(),
        |runtime, dir| {
            Arc::new(GalleryExporter::new(
                runtime,
                dir,
                "NoirBooth",
                StripStyle::default(),
            )) as Arc<dyn StripExporter>
        },
    );
    let record = booth.state.capture("POSTCARD_4x6", "alex", 1).await.unwrap();

    let err = booth.state.export(record.id(), None).await.unwrap_err();
    assert!(matches!(err, BoothError::Storage(_)));
    assert!(matches!(
        booth.runtime.events().last(),
        Some(BoothEvent::ExportFailed { error_type, .. }) if error_type == "storage"
    ));
    assert!(booth.state.archive().contains(record.id()));

    // Same record, now with access granted
    let granted: Arc<dyn BoothRuntime> = Arc::new(RecordingRuntime::new());
    let retry = AppState::with_controller(
        granted.clone(),
        booth.state.controller.clone(),
        Arc::new(GalleryExporter::new(
            granted,
            &booth.output_dir,
            "NoirBooth",
            StripStyle::default(),
        )),
    );
    let exported = retry.export(record.id(), None).await.unwrap();
    assert_eq!(exported.album.as_deref(), Some("NoirBooth"));
    assert!(booth.output_dir.join("NoirBooth").join(&exported.file_name).exists());
}
