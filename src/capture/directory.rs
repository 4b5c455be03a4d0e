use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{mirror_if, FrameSource};
use crate::booth::Frame;
use crate::error::{BoothError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Serves frames from image files in a directory, cycling in name order.
///
/// The directory is scanned on `activate`, so photos dropped in between
/// sessions are picked up by the next one.
pub struct DirectoryCamera {
    dir: PathBuf,
    mirror: bool,
    files: RwLock<Vec<PathBuf>>,
}

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>, mirror: bool) -> Self {
        Self {
            dir: dir.into(),
            mirror,
            files: RwLock::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            BoothError::Device(format!(
                "camera directory {} is unavailable: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_image_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl FrameSource for DirectoryCamera {
    fn name(&self) -> &str {
        "directory"
    }

    async fn activate(&self) -> Result<()> {
        let files = self.scan().await?;
        if files.is_empty() {
            return Err(BoothError::Device(format!(
                "no images found in {}",
                self.dir.display()
            )));
        }
        tracing::info!(
            "Directory camera active: {} image(s) in {:?}",
            files.len(),
            self.dir
        );
        *self.files.write() = files;
        Ok(())
    }

    async fn acquire_frame(&self, shot: usize) -> Result<Frame> {
        let path = {
            let files = self.files.read();
            if files.is_empty() {
                return Err(BoothError::Device("camera is not active".to_string()));
            }
            files[shot % files.len()].clone()
        };

        let mirror = self.mirror;
        let decoded = tokio::task::spawn_blocking(move || {
            image::open(&path)
                .map(|img| mirror_if(img.to_rgba8(), mirror))
                .map_err(|e| BoothError::Device(format!("failed to read {}: {}", path.display(), e)))
        })
        .await
        .map_err(|e| BoothError::Internal(format!("capture task failed: {}", e)))??;

        Ok(Frame::new(shot, decoded))
    }

    fn release(&self) {
        self.files.write().clear();
    }
}
