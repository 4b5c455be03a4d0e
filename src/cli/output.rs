//! CLI output handling - Event receiver loop.
//!
//! Receives booth events from the runtime channel and renders them based on
//! output mode: terminal (countdown on stderr, results on stdout), JSON lines,
//! or quiet (results only).

use std::io::{self, Write};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::booth::BoothEvent;
use crate::runtime::RuntimeEvent;

/// Run the event loop until the channel closes.
///
/// The runner detaches the runtime's sender once its operation returns, so
/// this loop drains whatever was emitted and then ends.
///
/// # Arguments
///
/// * `event_rx` - Channel receiver for runtime events
/// * `json_mode` - If true, output events as JSON lines
/// * `quiet_mode` - If true, only output final results
pub async fn run_event_loop(
    mut event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    json_mode: bool,
    quiet_mode: bool,
) -> Result<()> {
    while let Some(event) = event_rx.recv().await {
        let RuntimeEvent::Booth(booth_event) = event;
        handle_booth_event(&booth_event, json_mode, quiet_mode)?;
    }

    Ok(())
}

fn handle_booth_event(event: &BoothEvent, json_mode: bool, quiet_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string(event)?);
        io::stdout().flush()?;
        return Ok(());
    }

    let rendered = if quiet_mode {
        render_quiet(event)
    } else {
        render_terminal(event)
    };

    match rendered {
        Some(Rendered::Progress(text)) => {
            eprint!("{}", text);
            io::stderr().flush()?;
        }
        Some(Rendered::Notice(text)) => eprintln!("{}", text),
        Some(Rendered::Result(text)) => println!("{}", text),
        None => {}
    }

    Ok(())
}

/// Where a rendered event goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rendered {
    /// Partial stderr line (countdown, flash)
    Progress(String),
    /// Full stderr line
    Notice(String),
    /// stdout line
    Result(String),
}

fn render_terminal(event: &BoothEvent) -> Option<Rendered> {
    let rendered = match event {
        BoothEvent::SessionStarted {
            layout,
            photo_count,
            user_name,
            countdown_seconds,
        } => Rendered::Notice(format!(
            "[session] {} - {} ({} photos, {}s timer)",
            user_name, layout, photo_count, countdown_seconds
        )),
        BoothEvent::CountdownTick {
            shot,
            remaining: Some(t),
        } => Rendered::Progress(format!("\r[shot {}] {} ", shot + 1, t)),
        BoothEvent::CountdownTick { remaining: None, .. } => return None,
        BoothEvent::ShutterFlash { shot } => {
            Rendered::Progress(format!("\r[shot {}] *click* ", shot + 1))
        }
        BoothEvent::FrameCaptured { captured, total } => {
            Rendered::Notice(format!(" {}/{}", captured, total))
        }
        BoothEvent::SessionCompleted {
            record_id,
            user_name,
            layout,
        } => Rendered::Result(format!(
            "Captured {} for {} ({})",
            record_id, user_name, layout
        )),
        BoothEvent::SessionFailed { error_type, .. } => Rendered::Notice(format!(
            "\n[session] aborted ({}), no photos were kept",
            error_type
        )),
        BoothEvent::ExportCompleted {
            file_name,
            location,
            ..
        } => Rendered::Result(format!("Saved {} to {}", file_name, location)),
        BoothEvent::ExportFailed {
            record_id,
            error_type,
            ..
        } => Rendered::Notice(format!(
            "[export] {} failed ({}); the capture is kept, retry with /export {}",
            record_id, error_type, record_id
        )),
    };
    Some(rendered)
}

fn render_quiet(event: &BoothEvent) -> Option<Rendered> {
    match event {
        BoothEvent::SessionCompleted { record_id, .. } => Some(Rendered::Result(record_id.clone())),
        BoothEvent::ExportCompleted { location, .. } => Some(Rendered::Result(location.clone())),
        _ => None,
    }
}
