//! Settings schema definitions for NoirBooth configuration.
//!
//! All settings structs use `#[serde(default)]` to allow partial configuration files.
//! Anything left out of the file takes the value from `Default`.

use serde::{Deserialize, Serialize};

use crate::booth::DEFAULT_LAYOUT_ID;
use crate::export::DEFAULT_ALBUM_NAME;

/// Upper bound for `export.scale`.
pub const MAX_EXPORT_SCALE: u32 = 8;

/// Bounds for synthetic frame sides, in pixels.
pub const MIN_FRAME_SIDE: u32 = 16;
pub const MAX_FRAME_SIDE: u32 = 4096;

/// Root settings structure for NoirBooth.
///
/// Loaded from `~/.noirbooth/settings.toml` with environment variable interpolation support.
/// Version field enables future migrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothSettings {
    /// Schema version for migrations
    pub version: u32,

    /// Session defaults
    pub booth: BoothSection,

    /// Frame source configuration
    pub camera: CameraSettings,

    /// Strip export configuration
    pub export: ExportSettings,

    /// Advanced/debug settings
    pub advanced: AdvancedSettings,
}

/// Defaults applied when a session is started without explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothSection {
    /// Layout id, e.g. "GRID_4x6_6"
    pub default_layout: String,

    /// Name used when none is given
    pub default_user_name: String,

    /// Countdown per shot, 1-9 seconds
    pub countdown_seconds: u8,
}

/// Which camera to use and how frames are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// "synthetic" | "directory"
    pub source: CameraSource,

    /// Image directory for the directory source (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Mirror frames horizontally (selfie view)
    pub mirror: bool,

    /// Synthetic frame width in pixels
    pub frame_width: u32,

    /// Synthetic frame height in pixels
    pub frame_height: u32,
}

impl CameraSettings {
    /// Synthetic frame size clamped to `MIN_FRAME_SIDE..=MAX_FRAME_SIDE`.
    pub fn frame_size(&self) -> (u32, u32) {
        (
            self.frame_width.clamp(MIN_FRAME_SIDE, MAX_FRAME_SIDE),
            self.frame_height.clamp(MIN_FRAME_SIDE, MAX_FRAME_SIDE),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSource {
    Synthetic,
    Directory,
}

/// Where strips go and how they look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// "file" | "gallery"
    pub target: ExportTarget,

    /// Output directory for file exports (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Photo library root for gallery exports (supports $ENV_VAR syntax)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_dir: Option<String>,

    /// Album strips are filed under
    pub album_name: String,

    /// Host encoded in the QR code
    pub share_host: String,

    /// Pixels per layout unit, 1-8
    pub scale: u32,

    /// Film grain strength over each photo, 0 for none
    pub grain: u8,
}

impl ExportSettings {
    pub fn effective_scale(&self) -> u32 {
        self.scale.clamp(1, MAX_EXPORT_SCALE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportTarget {
    File,
    Gallery,
}

/// Advanced/debug settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Log level: "error" | "warn" | "info" | "debug" | "trace"
    pub log_level: String,
}

// =============================================================================
// Default implementations
// =============================================================================

impl Default for BoothSettings {
    fn default() -> Self {
        Self {
            version: 1,
            booth: BoothSection::default(),
            camera: CameraSettings::default(),
            export: ExportSettings::default(),
            advanced: AdvancedSettings::default(),
        }
    }
}

impl Default for BoothSection {
    fn default() -> Self {
        Self {
            default_layout: DEFAULT_LAYOUT_ID.to_string(),
            default_user_name: "GUEST".to_string(),
            countdown_seconds: 3,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            source: CameraSource::Synthetic,
            directory: None,
            mirror: true,
            frame_width: 640,
            frame_height: 480,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            target: ExportTarget::File,
            output_dir: None,
            library_dir: None,
            album_name: DEFAULT_ALBUM_NAME.to_string(),
            share_host: "noir.booth".to_string(),
            scale: 2,
            grain: 12,
        }
    }
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}
