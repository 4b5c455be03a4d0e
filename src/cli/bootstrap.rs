//! CLI bootstrap - Initialize the booth stack for CLI usage.
//!
//! Resolves settings and flags once, picks the frame source and exporter, and
//! wires them into an `AppState` around a `CliRuntime`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::booth::LayoutTemplate;
use crate::capture::{DirectoryCamera, FrameSource, SyntheticCamera};
use crate::export::{FileExporter, GalleryExporter, StripExporter, StripStyle};
use crate::runtime::{BoothRuntime, CliRuntime, RuntimeEvent};
use crate::settings::{
    get_with_env_fallback, BoothSettings, CameraSource, ExportTarget, SettingsManager,
};
use crate::state::AppState;

use super::args::Args;

/// Values a session starts with unless overridden. The REPL edits these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    pub layout: String,
    pub countdown_seconds: u8,
    pub user_name: String,
}

impl SessionDefaults {
    fn resolve(settings: &BoothSettings, args: &Args) -> Self {
        Self {
            layout: args
                .layout
                .clone()
                .unwrap_or_else(|| settings.booth.default_layout.clone()),
            countdown_seconds: args.timer.unwrap_or(settings.booth.countdown_seconds),
            user_name: settings.booth.default_user_name.clone(),
        }
    }
}

/// Context for CLI execution containing all initialized services.
pub struct CliContext {
    /// Controller, archive and exporter
    pub state: AppState,

    /// Settings manager
    pub settings_manager: Arc<SettingsManager>,

    /// Session defaults (layout, timer, name)
    pub defaults: SessionDefaults,

    /// Command-line arguments
    pub args: Args,
}

impl CliContext {
    pub fn runtime(&self) -> &Arc<dyn BoothRuntime> {
        &self.state.runtime
    }

    /// Graceful shutdown - close the event channel.
    pub async fn shutdown(self) -> Result<()> {
        if self.state.controller.is_active() {
            tracing::warn!("Shutting down with a capture session still running");
        }

        if let Err(e) = self.state.runtime.shutdown().await {
            tracing::warn!("Runtime shutdown error: {}", e);
        }

        Ok(())
    }
}

/// Initialize the CLI context with all services.
pub async fn initialize(args: &Args) -> Result<CliContext> {
    // Load settings first so the log level can come from them
    let settings_manager = Arc::new(match &args.config {
        Some(path) => SettingsManager::with_path(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => SettingsManager::new()
            .await
            .context("Failed to initialize settings manager")?,
    });

    let settings = settings_manager.get().await;
    init_logging(args, &settings);

    // Ensure settings file exists (creates template on first run)
    if let Err(e) = settings_manager.ensure_settings_file().await {
        tracing::warn!("Failed to create settings template: {}", e);
    }

    if args.verbose {
        eprintln!(
            "[cli] Settings loaded from {}",
            settings_manager.path().display()
        );
    }

    // Each command attaches its own receiver (see runner.rs)
    let (event_tx, _) = mpsc::unbounded_channel::<RuntimeEvent>();
    let runtime: Arc<dyn BoothRuntime> =
        Arc::new(CliRuntime::new(event_tx, args.auto_grant, args.json));

    let camera = build_camera(&settings, args)?;
    let exporter = build_exporter(&settings, args, runtime.clone())?;

    if args.verbose {
        eprintln!("[cli] Camera: {}", camera.name());
        eprintln!("[cli] Exporter: {}", exporter.name());
    }

    let defaults = SessionDefaults::resolve(&settings, args);
    if LayoutTemplate::find(&defaults.layout).is_none() {
        tracing::warn!("Default layout {} is not a known template", defaults.layout);
    }

    Ok(CliContext {
        state: AppState::new(runtime, camera, exporter),
        settings_manager,
        defaults,
        args: args.clone(),
    })
}

/// Initialize logging based on verbosity and the configured level.
fn init_logging(args: &Args, settings: &BoothSettings) {
    let log_level = if args.verbose {
        "debug"
    } else {
        settings.advanced.log_level.as_str()
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match format!("noirbooth_lib={}", log_level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => {
            eprintln!("[cli] Ignoring invalid log level '{}'", log_level);
            filter
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_camera(settings: &BoothSettings, args: &Args) -> Result<Arc<dyn FrameSource>> {
    let mirror = settings.camera.mirror && !args.no_mirror;
    let source = args
        .source
        .map(CameraSource::from)
        .unwrap_or(settings.camera.source);

    let camera: Arc<dyn FrameSource> = match source {
        CameraSource::Synthetic => {
            let (width, height) = settings.camera.frame_size();
            Arc::new(SyntheticCamera::new(width, height, mirror))
        }
        CameraSource::Directory => {
            let dir = args
                .frames_dir
                .clone()
                .or_else(|| settings.camera.directory.clone().map(PathBuf::from))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "The directory camera needs --frames-dir or 'camera.directory' in settings.toml"
                    )
                })?;
            Arc::new(DirectoryCamera::new(dir, mirror))
        }
    };

    Ok(camera)
}

fn build_exporter(
    settings: &BoothSettings,
    args: &Args,
    runtime: Arc<dyn BoothRuntime>,
) -> Result<Arc<dyn StripExporter>> {
    let scale = settings.export.effective_scale();
    if scale != settings.export.scale {
        tracing::warn!(
            "export.scale {} is out of range, using {}",
            settings.export.scale,
            scale
        );
    }
    let style = StripStyle {
        scale,
        share_host: settings.export.share_host.clone(),
        grain: settings.export.grain,
    };

    let exporter: Arc<dyn StripExporter> = match args.export_target(settings.export.target) {
        ExportTarget::File => Arc::new(FileExporter::new(resolve_output_dir(settings, args), style)),
        ExportTarget::Gallery => {
            let album = args
                .album
                .clone()
                .unwrap_or_else(|| settings.export.album_name.clone());
            Arc::new(GalleryExporter::new(
                runtime,
                resolve_library_dir(settings),
                album,
                style,
            ))
        }
    };

    Ok(exporter)
}

/// `--output` > settings/`NOIRBOOTH_OUTPUT_DIR` > `<pictures>/NoirBooth` > `./strips`.
fn resolve_output_dir(settings: &BoothSettings, args: &Args) -> PathBuf {
    if let Some(dir) = &args.output {
        return dir.clone();
    }

    get_with_env_fallback(
        &settings.export.output_dir,
        &["NOIRBOOTH_OUTPUT_DIR"],
        None,
    )
    .map(PathBuf::from)
    .or_else(|| dirs::picture_dir().map(|p| p.join("NoirBooth")))
    .unwrap_or_else(|| PathBuf::from("strips"))
}

/// Settings/`NOIRBOOTH_LIBRARY_DIR` > `<pictures>` > `~/Pictures` > `./library`.
fn resolve_library_dir(settings: &BoothSettings) -> PathBuf {
    get_with_env_fallback(
        &settings.export.library_dir,
        &["NOIRBOOTH_LIBRARY_DIR"],
        None,
    )
    .map(PathBuf::from)
    .or_else(dirs::picture_dir)
    .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
    .unwrap_or_else(|| PathBuf::from("library"))
}
