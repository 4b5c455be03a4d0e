//! Photo-library export.
//!
//! Strips are filed under `<library>/<album>`. Saving requires storage
//! permission from the runtime; a grant is remembered for the lifetime of the
//! exporter, a denial is not, so the user can be asked again on retry.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{
    artifact_file_name, render_png, storage_error, write_strip, ExportedStrip, StripCaption,
    StripExporter, StripStyle,
};
use crate::booth::CaptureRecord;
use crate::error::{BoothError, Result};
use crate::runtime::{BoothRuntime, PermissionKind};

pub const DEFAULT_ALBUM_NAME: &str = "NoirBooth";

pub struct GalleryExporter {
    runtime: Arc<dyn BoothRuntime>,
    library_dir: PathBuf,
    album_name: String,
    style: StripStyle,
    storage_granted: AtomicBool,
}

impl GalleryExporter {
    pub fn new(
        runtime: Arc<dyn BoothRuntime>,
        library_dir: impl Into<PathBuf>,
        album_name: impl Into<String>,
        style: StripStyle,
    ) -> Self {
        let album_name = album_name.into();
        let album_name = if album_name.trim().is_empty() {
            DEFAULT_ALBUM_NAME.to_string()
        } else {
            album_name.trim().to_string()
        };

        Self {
            runtime,
            library_dir: library_dir.into(),
            album_name,
            style,
            storage_granted: AtomicBool::new(false),
        }
    }

    pub fn album_name(&self) -> &str {
        &self.album_name
    }

    pub fn album_dir(&self) -> PathBuf {
        self.library_dir.join(&self.album_name)
    }

    async fn ensure_storage_permission(&self) -> Result<()> {
        if self.storage_granted.load(Ordering::Acquire) {
            return Ok(());
        }

        let status = self
            .runtime
            .request_permission(PermissionKind::Storage)
            .await
            .map_err(|e| BoothError::Storage(format!("storage permission unavailable: {}", e)))?;

        if !status.is_granted() {
            return Err(BoothError::Storage(
                "permission required to save photos".to_string(),
            ));
        }

        self.storage_granted.store(true, Ordering::Release);
        Ok(())
    }

    /// Create the album directory on first use.
    async fn ensure_album(&self, album_dir: &Path) -> Result<()> {
        let exists = tokio::fs::try_exists(album_dir)
            .await
            .map_err(|e| storage_error(album_dir, e))?;
        if exists {
            return Ok(());
        }

        tokio::fs::create_dir_all(album_dir)
            .await
            .map_err(|e| storage_error(album_dir, e))?;
        tracing::info!("Created album {} at {:?}", self.album_name, album_dir);
        Ok(())
    }
}

#[async_trait]
impl StripExporter for GalleryExporter {
    fn name(&self) -> &str {
        "gallery"
    }

    async fn compose_and_export(
        &self,
        record: Arc<CaptureRecord>,
        file_name_hint: Option<&str>,
    ) -> Result<ExportedStrip> {
        self.ensure_storage_permission().await?;

        let file_name = artifact_file_name(record.id(), file_name_hint);
        let caption = StripCaption::for_record(&record, &self.style);
        let record_id = record.id().to_string();

        let png = render_png(record, self.style.clone()).await?;

        let album_dir = self.album_dir();
        self.ensure_album(&album_dir).await?;
        let path = write_strip(&album_dir, &file_name, &png, &caption).await?;

        Ok(ExportedStrip {
            record_id,
            file_name,
            path,
            album: Some(self.album_name.clone()),
        })
    }
}
