//! CLI execution runner.
//!
//! Runs capture sessions and exports with a fresh output loop per operation.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::booth::CaptureRecord;
use crate::export::ExportedStrip;
use crate::runtime::{CliRuntime, RuntimeEvent};

use super::bootstrap::CliContext;
use super::output::run_event_loop;

/// Run `operation` while an output loop renders the events it emits.
async fn with_output<T>(ctx: &CliContext, operation: impl Future<Output = T>) -> T {
    // Create a fresh channel for this execution
    let (event_tx, event_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

    // We need to downcast to CliRuntime to access replace_event_tx
    let cli_runtime = ctx.runtime().as_any().downcast_ref::<CliRuntime>();
    match cli_runtime {
        Some(runtime) => runtime.replace_event_tx(event_tx),
        None => tracing::warn!("Runtime is not CliRuntime, events may not be received"),
    }

    let json_mode = ctx.args.json;
    let quiet_mode = ctx.args.quiet;
    let output_handle: JoinHandle<Result<()>> =
        tokio::spawn(async move { run_event_loop(event_rx, json_mode, quiet_mode).await });

    let result = operation.await;

    // Closing the sender lets the output loop drain and exit
    if let Some(runtime) = cli_runtime {
        runtime.detach_event_tx();
    }

    match output_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!("Output handler error: {}", e);
        }
        Err(e) => {
            tracing::warn!("Output handler panicked: {}", e);
        }
    }

    result
}

/// Run one capture session for `user_name` with the current defaults, then
/// export it unless `--no-export` is set.
pub async fn capture_once(
    ctx: &CliContext,
    user_name: &str,
    file_name_hint: Option<&str>,
) -> Result<Arc<CaptureRecord>> {
    let record = with_output(
        ctx,
        ctx.state.capture(
            &ctx.defaults.layout,
            user_name,
            ctx.defaults.countdown_seconds,
        ),
    )
    .await?;

    if !ctx.args.no_export {
        export_record(ctx, record.id(), file_name_hint).await?;
    }

    Ok(record)
}

/// Export an archived capture by id.
pub async fn export_record(
    ctx: &CliContext,
    record_id: &str,
    file_name_hint: Option<&str>,
) -> Result<ExportedStrip> {
    let exported = with_output(ctx, ctx.state.export(record_id, file_name_hint)).await?;
    Ok(exported)
}

/// Run one session per name listed in a file.
///
/// Blank lines and lines starting with `#` are skipped. Execution stops on
/// the first error. Strips use default file names.
pub async fn capture_batch(ctx: &CliContext, file_path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file_path)
        .await
        .with_context(|| format!("Failed to read names file: {}", file_path.display()))?;

    let names = parse_names(&content);
    if names.is_empty() {
        anyhow::bail!("No names found in file: {}", file_path.display());
    }

    let total = names.len();
    if !ctx.args.quiet {
        eprintln!(
            "[batch] Running {} session(s) from {}",
            total,
            file_path.display()
        );
    }

    for (i, name) in names.iter().enumerate() {
        if !ctx.args.quiet {
            eprintln!("\n[batch] [{}/{}] {}", i + 1, total, name);
        }

        capture_once(ctx, name, None).await?;
    }

    if !ctx.args.quiet {
        eprintln!("\n[batch] All {} session(s) completed", total);
    }

    Ok(())
}

fn parse_names(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}
