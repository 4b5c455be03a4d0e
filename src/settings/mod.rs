//! Centralized TOML-based settings system for NoirBooth.
//!
//! Settings are loaded from `~/.noirbooth/settings.toml` with environment variable
//! interpolation support for path values. `get_with_env_fallback` lets a
//! `NOIRBOOTH_*` variable fill a path the file leaves unset.
//!
//! # Usage
//!
//! ```rust,ignore
//! use noirbooth_lib::settings::{SettingsManager, get_with_env_fallback};
//!
//! let manager = SettingsManager::new().await?;
//! let settings = manager.get().await;
//!
//! let output_dir = get_with_env_fallback(
//!     &settings.export.output_dir,
//!     &["NOIRBOOTH_OUTPUT_DIR"],
//!     None,
//! );
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_with_env_fallback, settings_path, SettingsManager};
pub use schema::{BoothSettings, CameraSource, ExportTarget};
