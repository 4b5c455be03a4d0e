//! Plain file export into an output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::{
    artifact_file_name, render_png, storage_error, write_strip, ExportedStrip, StripCaption,
    StripExporter, StripStyle,
};
use crate::booth::CaptureRecord;
use crate::error::Result;

/// Writes strips straight into a directory, like a browser download.
pub struct FileExporter {
    output_dir: PathBuf,
    style: StripStyle,
}

impl FileExporter {
    pub fn new(output_dir: impl Into<PathBuf>, style: StripStyle) -> Self {
        Self {
            output_dir: output_dir.into(),
            style,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl StripExporter for FileExporter {
    fn name(&self) -> &str {
        "file"
    }

    async fn compose_and_export(
        &self,
        record: Arc<CaptureRecord>,
        file_name_hint: Option<&str>,
    ) -> Result<ExportedStrip> {
        let file_name = artifact_file_name(record.id(), file_name_hint);
        let caption = StripCaption::for_record(&record, &self.style);
        let record_id = record.id().to_string();

        let png = render_png(record, self.style.clone()).await?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| storage_error(&self.output_dir, e))?;
        let path = write_strip(&self.output_dir, &file_name, &png, &caption).await?;

        tracing::debug!("Wrote {} bytes to {:?}", png.len(), path);
        Ok(ExportedStrip {
            record_id,
            file_name,
            path,
            album: None,
        })
    }
}
