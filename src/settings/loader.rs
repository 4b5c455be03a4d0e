//! Settings loading, saving, and path interpolation.
//!
//! `SettingsManager` keeps the parsed settings in memory and writes the whole
//! file back on every change. Path-valued fields accept `$VAR`, `${VAR}` and a
//! leading `~/`; they are expanded once at load time.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use tokio::sync::RwLock;

use super::schema::BoothSettings;

/// Written on first run so users have something to edit.
const TEMPLATE: &str = include_str!("template.toml");

/// `~/.noirbooth/settings.toml`, or `./.noirbooth/settings.toml` without a home dir.
pub fn settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".noirbooth")
        .join("settings.toml")
}

pub struct SettingsManager {
    settings: RwLock<BoothSettings>,
    path: PathBuf,
}

impl SettingsManager {
    /// Load from the default location.
    pub async fn new() -> Result<Self> {
        Self::with_path(settings_path()).await
    }

    /// Load from an explicit file (`--config`). A missing file means defaults.
    pub async fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = read_settings(&path).await?;
        Ok(Self {
            settings: RwLock::new(settings),
            path,
        })
    }

    pub async fn get(&self) -> BoothSettings {
        self.settings.read().await.clone()
    }

    /// Replace the settings and persist them.
    pub async fn update(&self, new_settings: BoothSettings) -> Result<()> {
        let contents =
            toml::to_string_pretty(&new_settings).context("Failed to serialize settings")?;
        write_file_atomic(&self.path, contents.as_bytes()).await?;
        *self.settings.write().await = new_settings;

        tracing::info!("Saved settings to {:?}", self.path);
        Ok(())
    }

    /// Read one value by dotted key, e.g. `export.album_name`.
    pub async fn get_value(&self, key: &str) -> Result<Value> {
        let json = serde_json::to_value(&*self.settings.read().await)?;
        json.pointer(&json_pointer(key))
            .cloned()
            .ok_or_else(|| anyhow!("Setting '{}' not found", key))
    }

    /// Change one value by dotted key and persist. The value must fit the
    /// field's type; on error nothing changes.
    pub async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let (parent, field) = match key.rsplit_once('.') {
            Some((parent, field)) => (json_pointer(parent), field),
            None => (String::new(), key),
        };
        if field.is_empty() {
            bail!("Empty setting key");
        }

        let mut json = serde_json::to_value(self.get().await)?;
        let section = json
            .pointer_mut(&parent)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| anyhow!("Setting section for '{}' not found", key))?;
        if !section.contains_key(field) && !is_optional_field(key) {
            bail!("Setting '{}' not found", key);
        }
        section.insert(field.to_string(), value);

        let updated: BoothSettings = serde_json::from_value(json)
            .with_context(|| format!("Invalid value for setting '{}'", key))?;
        self.update(updated).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.update(BoothSettings::default()).await
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the commented template if no settings file exists yet.
    ///
    /// Returns `true` if a file was created.
    pub async fn ensure_settings_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        write_file_atomic(&self.path, TEMPLATE.as_bytes()).await?;
        tracing::info!("Generated settings template at {:?}", self.path);
        Ok(true)
    }

    /// Re-read the file, picking up edits made outside the app.
    pub async fn reload(&self) -> Result<()> {
        let settings = read_settings(&self.path).await?;
        *self.settings.write().await = settings;
        Ok(())
    }
}

async fn read_settings(path: &Path) -> Result<BoothSettings> {
    if !path.exists() {
        tracing::debug!("Settings file not found at {:?}, using defaults", path);
        return Ok(BoothSettings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings file {:?}", path))?;
    let mut settings: BoothSettings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse settings file {:?}", path))?;

    for value in [
        &mut settings.camera.directory,
        &mut settings.export.output_dir,
        &mut settings.export.library_dir,
    ] {
        if let Some(raw) = value.as_mut() {
            *raw = expand_path_value(raw);
        }
    }

    tracing::info!("Loaded settings from {:?}", path);
    Ok(settings)
}

async fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let temp_path = path.with_extension("toml.tmp");
    tokio::fs::write(&temp_path, bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", temp_path))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}

/// `booth.countdown_seconds` → `/booth/countdown_seconds`
fn json_pointer(key: &str) -> String {
    key.split('.').filter(|p| !p.is_empty()).fold(String::new(), |mut acc, part| {
        acc.push('/');
        acc.push_str(part);
        acc
    })
}

/// Optional path fields are skipped when unset, so they may be absent.
fn is_optional_field(key: &str) -> bool {
    matches!(
        key,
        "camera.directory" | "export.output_dir" | "export.library_dir"
    )
}

/// Expand a leading `$VAR`, `${VAR}` or `~/`, keeping the rest of the path.
///
/// An unset variable leaves the value as written, so the error surfaces
/// later with the original text in it.
fn expand_path_value(raw: &str) -> String {
    let value = raw.trim();

    if let Some(reference) = value.strip_prefix('$') {
        let (name, rest) = match reference.strip_prefix('{') {
            Some(braced) => match braced.split_once('}') {
                Some(parts) => parts,
                None => return value.to_string(),
            },
            None => {
                let end = reference
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(reference.len());
                reference.split_at(end)
            }
        };
        if name.is_empty() {
            return value.to_string();
        }
        return match std::env::var(name) {
            Ok(expanded) => format!("{}{}", expanded, rest),
            Err(_) => value.to_string(),
        };
    }

    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }

    value.to_string()
}

/// First non-empty value among the setting and the listed environment
/// variables, else `default`.
pub fn get_with_env_fallback(
    setting: &Option<String>,
    env_vars: &[&str],
    default: Option<String>,
) -> Option<String> {
    setting
        .iter()
        .cloned()
        .chain(env_vars.iter().filter_map(|name| std::env::var(name).ok()))
        .find(|value| !value.is_empty())
        .or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schema::ExportTarget;
    use tempfile::TempDir;

    async fn manager_in(dir: &TempDir) -> SettingsManager {
        SettingsManager::with_path(dir.path().join("settings.toml"))
            .await
            .unwrap()
    }

    #[test]
    fn test_expand_env_references() {
        std::env::set_var("NOIRBOOTH_TEST_EXPAND", "/srv/booth");
        assert_eq!(expand_path_value("$NOIRBOOTH_TEST_EXPAND"), "/srv/booth");
        assert_eq!(expand_path_value("${NOIRBOOTH_TEST_EXPAND}"), "/srv/booth");
        std::env::remove_var("NOIRBOOTH_TEST_EXPAND");

        assert_eq!(
            expand_path_value("$NOIRBOOTH_SURELY_UNSET_42"),
            "$NOIRBOOTH_SURELY_UNSET_42"
        );
        assert_eq!(expand_path_value(" /plain/path "), "/plain/path");
    }

    #[test]
    fn test_expand_keeps_path_after_variable() {
        std::env::set_var("NOIRBOOTH_TEST_HOME", "/home/booth");
        assert_eq!(
            expand_path_value("$NOIRBOOTH_TEST_HOME/Pictures/booth-frames"),
            "/home/booth/Pictures/booth-frames"
        );
        assert_eq!(
            expand_path_value("${NOIRBOOTH_TEST_HOME}/Pictures/NoirBooth"),
            "/home/booth/Pictures/NoirBooth"
        );
        assert_eq!(
            expand_path_value("${NOIRBOOTH_TEST_HOME}-strips"),
            "/home/booth-strips"
        );
        std::env::remove_var("NOIRBOOTH_TEST_HOME");

        // Unterminated braces and a bare `$` are left alone
        assert_eq!(expand_path_value("${NOIRBOOTH_TEST_HOME"), "${NOIRBOOTH_TEST_HOME");
        assert_eq!(expand_path_value("$/frames"), "$/frames");
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                PathBuf::from(expand_path_value("~/Pictures")),
                home.join("Pictures")
            );
        }
    }

    #[test]
    fn test_json_pointer() {
        assert_eq!(json_pointer("booth.countdown_seconds"), "/booth/countdown_seconds");
        assert_eq!(json_pointer("version"), "/version");
        assert_eq!(json_pointer(""), "");
    }

    #[test]
    fn test_env_fallback_order() {
        std::env::set_var("NOIRBOOTH_FALLBACK_A", "");
        std::env::set_var("NOIRBOOTH_FALLBACK_B", "from_env");

        let vars = ["NOIRBOOTH_FALLBACK_A", "NOIRBOOTH_FALLBACK_B"];
        assert_eq!(
            get_with_env_fallback(&Some("from_settings".into()), &vars, None),
            Some("from_settings".to_string())
        );
        // Empty setting and empty first variable both fall through
        assert_eq!(
            get_with_env_fallback(&Some(String::new()), &vars, None),
            Some("from_env".to_string())
        );
        assert_eq!(
            get_with_env_fallback(&None, &["NOIRBOOTH_FALLBACK_UNSET"], Some("d".into())),
            Some("d".to_string())
        );

        std::env::remove_var("NOIRBOOTH_FALLBACK_A");
        std::env::remove_var("NOIRBOOTH_FALLBACK_B");
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let manager = SettingsManager::with_path("/nonexistent/noirbooth/settings.toml")
            .await
            .unwrap();

        assert_eq!(manager.get().await, BoothSettings::default());
        assert!(!manager.exists());
    }

    #[tokio::test]
    async fn test_get_value_by_key() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir).await;

        assert_eq!(
            manager.get_value("export.album_name").await.unwrap(),
            serde_json::json!("NoirBooth")
        );
        assert_eq!(
            manager.get_value("booth.countdown_seconds").await.unwrap(),
            serde_json::json!(3)
        );
        assert!(manager.get_value("booth.missing").await.is_err());
    }

    #[tokio::test]
    async fn test_set_value_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let manager = SettingsManager::with_path(&path).await.unwrap();

        manager
            .set_value("booth.countdown_seconds", serde_json::json!(5))
            .await
            .unwrap();
        manager
            .set_value("export.target", serde_json::json!("gallery"))
            .await
            .unwrap();
        manager
            .set_value("export.output_dir", serde_json::json!("/tmp/strips"))
            .await
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let reopened = SettingsManager::with_path(&path).await.unwrap();
        let settings = reopened.get().await;
        assert_eq!(settings.booth.countdown_seconds, 5);
        assert_eq!(settings.export.target, ExportTarget::Gallery);
        assert_eq!(settings.export.output_dir.as_deref(), Some("/tmp/strips"));
    }

    #[tokio::test]
    async fn test_set_value_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir).await;

        assert!(manager
            .set_value("booth.countdown_seconds", serde_json::json!("soon"))
            .await
            .is_err());
        assert!(manager
            .set_value("booth.no_such_field", serde_json::json!(1))
            .await
            .is_err());
        assert!(manager
            .set_value("nowhere.field", serde_json::json!(1))
            .await
            .is_err());

        assert_eq!(manager.get().await, BoothSettings::default());
        assert!(!manager.exists());
    }

    #[tokio::test]
    async fn test_template_is_written_once_and_parses() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir).await;

        assert!(manager.ensure_settings_file().await.unwrap());
        assert!(!manager.ensure_settings_file().await.unwrap());

        manager.reload().await.unwrap();
        assert_eq!(manager.get().await, BoothSettings::default());
    }

    #[tokio::test]
    async fn test_load_expands_path_values() {
        std::env::set_var("NOIRBOOTH_TEST_FRAMES", "/srv/frames");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        tokio::fs::write(
            &path,
            "[camera]\nsource = \"directory\"\ndirectory = \"$NOIRBOOTH_TEST_FRAMES/today\"\n",
        )
        .await
        .unwrap();

        let manager = SettingsManager::with_path(&path).await.unwrap();
        assert_eq!(
            manager.get().await.camera.directory.as_deref(),
            Some("/srv/frames/today")
        );

        std::env::remove_var("NOIRBOOTH_TEST_FRAMES");
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        tokio::fs::write(&path, "[booth\ncountdown_seconds = ").await.unwrap();

        assert!(SettingsManager::with_path(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir).await;
        manager
            .set_value("export.share_host", serde_json::json!("example.org"))
            .await
            .unwrap();

        manager.reset().await.unwrap();
        assert_eq!(manager.get().await.export.share_host, "noir.booth");
    }
}
