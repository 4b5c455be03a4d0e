//! Captured frames and finished capture records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::Serialize;
use uuid::Uuid;

use super::layout::LayoutTemplate;
use crate::error::{BoothError, Result};

/// Length of a record id.
pub const RECORD_ID_LEN: usize = 5;

const ID_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One captured image.
///
/// Pixels are reference counted, so cloning a frame (or a record holding
/// frames) never copies image data.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Zero-based shot index within its session
    pub shot: usize,
    pub captured_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pixels: Arc<RgbaImage>,
}

impl Frame {
    pub fn new(shot: usize, pixels: RgbaImage) -> Self {
        Self {
            shot,
            captured_at: Utc::now(),
            width: pixels.width(),
            height: pixels.height(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True if both frames share the same pixel buffer.
    pub fn same_pixels(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// The immutable result of a finished capture session.
///
/// Fields are private; a record can only be built through [`CaptureRecord::finalize`],
/// which enforces that it holds exactly one frame per layout slot.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    id: String,
    user_name: String,
    images: Vec<Frame>,
    #[serde(serialize_with = "serialize_layout_id")]
    layout: &'static LayoutTemplate,
    timestamp: DateTime<Utc>,
}

impl CaptureRecord {
    /// Build a record from a completed session.
    ///
    /// Fails if the frame count does not match the layout or the name is blank.
    pub fn finalize(
        id: String,
        frames: Vec<Frame>,
        layout: &'static LayoutTemplate,
        user_name: &str,
    ) -> Result<Self> {
        if frames.len() != layout.photo_count {
            return Err(BoothError::Internal(format!(
                "refusing to finalize {} frame(s) for layout {} ({} required)",
                frames.len(),
                layout.id,
                layout.photo_count
            )));
        }

        let user_name = normalize_user_name(user_name)?;

        Ok(Self {
            id,
            user_name,
            images: frames,
            layout,
            timestamp: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn images(&self) -> &[Frame] {
        &self.images
    }

    pub fn layout_id(&self) -> &'static str {
        self.layout.id
    }

    /// The layout template this record was captured with.
    pub fn layout(&self) -> &'static LayoutTemplate {
        self.layout
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Footer date, `MM/DD/YYYY`.
    pub fn display_date(&self) -> String {
        self.timestamp.format("%m/%d/%Y").to_string()
    }
}

fn serialize_layout_id<S>(
    layout: &&'static LayoutTemplate,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(layout.id)
}

/// Trim and uppercase a display name; blank names are rejected.
pub fn normalize_user_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BoothError::Validation("please enter your name".to_string()));
    }
    Ok(trimmed.to_uppercase())
}

/// Generate a short uppercase base-36 token.
///
/// Entropy comes from a v4 UUID. Uniqueness is best-effort only; callers that
/// need it check against the archive and regenerate.
pub fn generate_record_id() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(RECORD_ID_LEN);
    for _ in 0..RECORD_ID_LEN {
        id.push(ID_ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    id
}

#[cfg(test)]
pub(crate) fn test_frame(shot: usize) -> Frame {
    Frame::new(shot, RgbaImage::from_pixel(8, 6, image::Rgba([shot as u8, 0, 0, 255])))
}
