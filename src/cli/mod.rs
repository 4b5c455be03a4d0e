//! CLI module for NoirBooth headless operation.
//!
//! Drives the same capture core a GUI would, with events rendered on the
//! terminal or as JSON lines.
//!
//! # Architecture
//!
//! The CLI uses the `BoothRuntime` abstraction. Instead of painting a
//! countdown overlay, the CLI runtime sends events through a channel that is
//! consumed by the output handler.
//!
//! ```text
//! +-------------------+     +-------------+     +---------------+
//! | SessionController | --> | CliRuntime  | --> | output.rs     |
//! | export_capture    |     | (emit())    |     | (print/JSON)  |
//! +-------------------+     +-------------+     +---------------+
//! ```
//!
//! # REPL Mode
//!
//! When no session is requested via `--name`, `--once` or `-f`, the CLI
//! enters interactive REPL mode. See `repl.rs` for details.

mod args;
mod bootstrap;
mod output;
mod repl;
mod runner;

pub use args::{Args, SourceArg};
pub use bootstrap::{initialize, CliContext, SessionDefaults};
pub use output::run_event_loop;
pub use repl::run_repl;
pub use runner::{capture_batch, capture_once, export_record};

/// Print the layout templates, one per line.
pub fn print_layouts() {
    for layout in crate::booth::LAYOUTS.iter() {
        println!("{}", repl::format_layout(layout));
    }
}
