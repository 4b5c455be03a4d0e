use std::sync::Arc;

use crate::booth::{CaptureArchive, CaptureRecord, SessionController};
use crate::capture::FrameSource;
use crate::error::Result;
use crate::export::{export_capture, ExportedStrip, StripExporter};
use crate::runtime::BoothRuntime;

/// Everything a front end needs: one controller, its archive and the exporter
/// chosen at startup.
pub struct AppState {
    pub runtime: Arc<dyn BoothRuntime>,
    pub controller: Arc<SessionController>,
    pub exporter: Arc<dyn StripExporter>,
}

impl AppState {
    pub fn new(
        runtime: Arc<dyn BoothRuntime>,
        camera: Arc<dyn FrameSource>,
        exporter: Arc<dyn StripExporter>,
    ) -> Self {
        let archive = Arc::new(CaptureArchive::new());
        let controller = Arc::new(SessionController::new(runtime.clone(), camera, archive));
        Self::with_controller(runtime, controller, exporter)
    }

    pub fn with_controller(
        runtime: Arc<dyn BoothRuntime>,
        controller: Arc<SessionController>,
        exporter: Arc<dyn StripExporter>,
    ) -> Self {
        Self {
            runtime,
            controller,
            exporter,
        }
    }

    pub fn archive(&self) -> &Arc<CaptureArchive> {
        self.controller.archive()
    }

    pub async fn capture(
        &self,
        layout_id: &str,
        user_name: &str,
        countdown_seconds: u8,
    ) -> Result<Arc<CaptureRecord>> {
        self.controller
            .start_session(layout_id, user_name, countdown_seconds)
            .await
    }

    pub async fn export(
        &self,
        record_id: &str,
        file_name_hint: Option<&str>,
    ) -> Result<ExportedStrip> {
        export_capture(
            self.runtime.as_ref(),
            self.exporter.as_ref(),
            self.archive(),
            record_id,
            file_name_hint,
        )
        .await
    }
}
