//! Strip export.
//!
//! Turning a record into a PNG and persisting it is delegated to a
//! [`StripExporter`]. Two implementations are chosen between at startup:
//!
//! - [`FileExporter`]: plain file download into an output directory
//! - [`GalleryExporter`]: photo-library style, grouped under a named album
//!   and gated on storage permission
//!
//! Both share the same pipeline: compose on a blocking thread, encode to PNG in
//! memory, then write atomically (temp file + rename) next to a JSON caption
//! manifest repeating the footer text as metadata.

pub mod compose;
mod file;
mod gallery;
pub mod lettering;
pub mod naming;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::booth::{BoothEvent, CaptureArchive, CaptureRecord};
use crate::error::{BoothError, Result};
use crate::runtime::{emit_booth_event, BoothRuntime};

pub use compose::{compose_strip, StripStyle, MAX_STRIP_DIMENSION};
pub use file::FileExporter;
pub use gallery::{GalleryExporter, DEFAULT_ALBUM_NAME};
pub use naming::{artifact_file_name, sanitize};

/// Where an exported strip ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedStrip {
    pub record_id: String,
    pub file_name: String,
    pub path: PathBuf,
    /// Album the strip was filed under, for gallery exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
}

/// Footer text and metadata written next to each strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripCaption {
    pub record_id: String,
    pub user_name: String,
    pub date: String,
    pub layout: String,
    pub frames: usize,
    pub share_url: String,
    pub exported_at: DateTime<Utc>,
}

impl StripCaption {
    pub fn for_record(record: &CaptureRecord, style: &StripStyle) -> Self {
        Self {
            record_id: record.id().to_string(),
            user_name: record.user_name().to_string(),
            date: record.display_date(),
            layout: record.layout_id().to_string(),
            frames: record.images().len(),
            share_url: style.share_url(record.id()),
            exported_at: Utc::now(),
        }
    }
}

/// Renders a record into a strip image and persists it.
#[async_trait]
pub trait StripExporter: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Compose and persist one strip.
    ///
    /// # Errors
    /// - `BoothError::Export` if the strip cannot be rendered or encoded
    /// - `BoothError::Storage` if it cannot be written or permission is denied
    async fn compose_and_export(
        &self,
        record: Arc<CaptureRecord>,
        file_name_hint: Option<&str>,
    ) -> Result<ExportedStrip>;
}

/// Look up a record and export it, reporting the outcome as events.
///
/// The archive is only read; a failed export leaves the record as it was, so
/// the caller can retry with the same id.
pub async fn export_capture(
    runtime: &dyn BoothRuntime,
    exporter: &dyn StripExporter,
    archive: &CaptureArchive,
    record_id: &str,
    file_name_hint: Option<&str>,
) -> Result<ExportedStrip> {
    let record = archive
        .get(record_id)
        .ok_or_else(|| BoothError::RecordNotFound(record_id.to_string()))?;

    match exporter.compose_and_export(record, file_name_hint).await {
        Ok(exported) => {
            tracing::info!(
                "Exported capture {} to {:?} via {}",
                record_id,
                exported.path,
                exporter.name()
            );
            emit_booth_event(
                runtime,
                BoothEvent::ExportCompleted {
                    record_id: record_id.to_string(),
                    file_name: exported.file_name.clone(),
                    location: exported.path.display().to_string(),
                },
            );
            Ok(exported)
        }
        Err(e) => {
            tracing::warn!("Export of {} failed: {}", record_id, e);
            emit_booth_event(
                runtime,
                BoothEvent::ExportFailed {
                    record_id: record_id.to_string(),
                    message: e.to_string(),
                    error_type: e.error_type().to_string(),
                },
            );
            Err(e)
        }
    }
}

/// Compose and PNG-encode a strip off the async executor.
pub(crate) async fn render_png(record: Arc<CaptureRecord>, style: StripStyle) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let strip = compose_strip(&record, &style)?;
        let mut bytes = Cursor::new(Vec::new());
        strip
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| BoothError::Export(format!("failed to encode PNG: {}", e)))?;
        Ok(bytes.into_inner())
    })
    .await
    .map_err(|e| BoothError::Export(format!("render task failed: {}", e)))?
}

/// Write the PNG and its caption manifest into `dir`.
pub(crate) async fn write_strip(
    dir: &Path,
    file_name: &str,
    png: &[u8],
    caption: &StripCaption,
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    write_atomic(&path, png).await?;

    let manifest = serde_json::to_vec_pretty(caption)
        .map_err(|e| BoothError::Export(format!("failed to serialize caption: {}", e)))?;
    write_atomic(&dir.join(naming::manifest_file_name(file_name)), &manifest).await?;

    Ok(path)
}

/// Temp file + rename, so readers never see a half-written strip.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    tokio::fs::write(&temp_path, bytes)
        .await
        .map_err(|e| storage_error(&temp_path, e))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| storage_error(path, e))?;
    Ok(())
}

pub(crate) fn storage_error(path: &Path, e: std::io::Error) -> BoothError {
    BoothError::Storage(format!("cannot write {}: {}", path.display(), e))
}

#[cfg(test)]
pub(crate) fn test_record(layout: &'static crate::booth::LayoutTemplate, id: &str) -> CaptureRecord {
    let frames = (0..layout.photo_count)
        .map(crate::booth::record::test_frame)
        .collect();
    CaptureRecord::finalize(id.to_string(), frames, layout, "alex").unwrap()
}
