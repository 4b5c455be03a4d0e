//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for booth-cli. Flags override the
//! matching values from `~/.noirbooth/settings.toml`.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::settings::{CameraSource, ExportTarget};

/// NoirBooth CLI - Headless photobox: timed capture sessions and strip export
#[derive(Parser, Debug, Clone)]
#[command(name = "booth-cli")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Run a single session for this name and exit
    #[arg(short = 'n', long, conflicts_with = "file")]
    pub name: Option<String>,

    /// Run one session with the default name from settings and exit
    #[arg(long, conflicts_with_all = ["name", "file"])]
    pub once: bool,

    /// Run one session per name listed in a file (one per line) and exit
    #[arg(short = 'f', long, conflicts_with = "name")]
    pub file: Option<PathBuf>,

    /// Layout template id (e.g. GRID_4x6_6, STRIP_2x6_3)
    #[arg(short = 'l', long)]
    pub layout: Option<String>,

    /// Countdown before each shot, in seconds (1-9)
    #[arg(short = 't', long)]
    pub timer: Option<u8>,

    /// Frame source
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Image directory for `--source directory`
    #[arg(long, env = "NOIRBOOTH_FRAMES_DIR")]
    pub frames_dir: Option<PathBuf>,

    /// Disable the selfie mirror flip
    #[arg(long)]
    pub no_mirror: bool,

    /// Output directory for file exports
    #[arg(short = 'o', long, conflicts_with = "gallery")]
    pub output: Option<PathBuf>,

    /// Save strips into the photo library album instead of a plain directory
    #[arg(long)]
    pub gallery: bool,

    /// Album name for gallery exports
    #[arg(long)]
    pub album: Option<String>,

    /// File name for the exported strip (sanitized; one-shot mode only)
    #[arg(long)]
    pub hint: Option<String>,

    /// Capture only; do not export strips
    #[arg(long)]
    pub no_export: bool,

    /// Settings file (default: ~/.noirbooth/settings.toml)
    #[arg(long, env = "NOIRBOOTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the layout templates and exit
    #[arg(long)]
    pub list_layouts: bool,

    /// Grant camera and storage access without prompting
    #[arg(long)]
    pub auto_grant: bool,

    /// Output events as JSON lines (for scripting/parsing)
    #[arg(long)]
    pub json: bool,

    /// Only output final results (suppress countdown and progress)
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Synthetic,
    Directory,
}

impl From<SourceArg> for CameraSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Synthetic => CameraSource::Synthetic,
            SourceArg::Directory => CameraSource::Directory,
        }
    }
}

impl Args {
    /// True when the CLI runs a fixed amount of work instead of the REPL.
    pub fn is_one_shot(&self) -> bool {
        self.name.is_some() || self.once || self.file.is_some()
    }

    /// Export target after applying `--gallery` / `--output` over settings.
    pub fn export_target(&self, configured: ExportTarget) -> ExportTarget {
        if self.gallery {
            ExportTarget::Gallery
        } else if self.output.is_some() {
            ExportTarget::File
        } else {
            configured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["booth-cli"]);
        assert!(args.name.is_none());
        assert!(!args.once);
        assert!(!args.auto_grant);
        assert!(!args.json);
        assert!(!args.quiet);
        assert!(!args.verbose);
        assert!(!args.is_one_shot());
    }

    #[test]
    fn test_args_one_shot_name() {
        let args = Args::parse_from(["booth-cli", "-n", "Alex", "-l", "STRIP_2x6_3", "-t", "5"]);
        assert_eq!(args.name, Some("Alex".to_string()));
        assert_eq!(args.layout, Some("STRIP_2x6_3".to_string()));
        assert_eq!(args.timer, Some(5));
        assert!(args.is_one_shot());
    }

    #[test]
    fn test_args_name_conflicts_with_file() {
        let result = Args::try_parse_from(["booth-cli", "-n", "Alex", "-f", "names.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_source_and_frames_dir() {
        let args = Args::parse_from([
            "booth-cli",
            "--source",
            "directory",
            "--frames-dir",
            "/srv/frames",
        ]);
        assert_eq!(args.source, Some(SourceArg::Directory));
        assert_eq!(CameraSource::from(SourceArg::Directory), CameraSource::Directory);
        assert_eq!(args.frames_dir, Some(PathBuf::from("/srv/frames")));
    }

    #[test]
    fn test_args_export_target_override() {
        let args = Args::parse_from(["booth-cli", "--gallery"]);
        assert_eq!(args.export_target(ExportTarget::File), ExportTarget::Gallery);

        let args = Args::parse_from(["booth-cli", "-o", "/tmp/strips"]);
        assert_eq!(args.export_target(ExportTarget::Gallery), ExportTarget::File);

        let args = Args::parse_from(["booth-cli"]);
        assert_eq!(args.export_target(ExportTarget::Gallery), ExportTarget::Gallery);
    }

    #[test]
    fn test_args_output_conflicts_with_gallery() {
        let result = Args::try_parse_from(["booth-cli", "--gallery", "-o", "/tmp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_output_modes() {
        let args = Args::parse_from(["booth-cli", "--json", "--quiet", "--auto-grant"]);
        assert!(args.json);
        assert!(args.quiet);
        assert!(args.auto_grant);
    }

    #[test]
    fn test_args_rejects_large_timer_value() {
        // Range is enforced by the session, but the value must fit a u8
        assert!(Args::try_parse_from(["booth-cli", "-t", "300"]).is_err());
    }
}
