// Runtime abstraction for front ends (CLI today, GUI shells later)
//
// The session controller and exporters only talk to the outside world through
// this trait: progress events go out via `emit`, permission prompts come back
// through `request_permission`.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booth::BoothEvent;

/// Failures talking to the front end.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Nobody is listening for booth events anymore
    #[error("event channel closed")]
    ReceiverClosed,

    /// A permission prompt is needed but stdin is not a terminal
    #[error("cannot prompt for permission without a terminal")]
    NotInteractive,

    #[error("prompt I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// What the core hands to the front end.
///
/// Front ends serialize the inner `BoothEvent`, which carries its own tag.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Capture/export event
    Booth(Box<BoothEvent>),
}

impl From<BoothEvent> for RuntimeEvent {
    fn from(event: BoothEvent) -> Self {
        RuntimeEvent::Booth(Box::new(event))
    }
}

/// Device capabilities that need user consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Camera,
    Storage,
}

impl PermissionKind {
    pub fn label(&self) -> &'static str {
        match self {
            PermissionKind::Camera => "camera",
            PermissionKind::Storage => "photo library",
        }
    }
}

/// Answer to a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// The booth's view of its host.
///
/// Progress events (countdown, flash, frame counter, export results) go out
/// through `emit`; camera and storage consent comes back through
/// `request_permission`. Held as `Arc<dyn BoothRuntime>`.
#[async_trait]
pub trait BoothRuntime: Send + Sync + 'static {
    /// Deliver one event. Fails with `ReceiverClosed` once the front end has
    /// gone away; callers log and carry on.
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError>;

    /// Ask for a one-shot permission.
    ///
    /// # Returns
    /// - `Ok(PermissionStatus)` with the user's answer
    /// - `Err(RuntimeError::NotInteractive)` if a prompt is needed but there is no TTY
    async fn request_permission(
        &self,
        kind: PermissionKind,
    ) -> Result<PermissionStatus, RuntimeError>;

    /// Release the front end once the last operation has finished.
    async fn shutdown(&self) -> Result<(), RuntimeError>;

    /// For front ends that need their concrete runtime back.
    fn as_any(&self) -> &dyn Any;
}

/// Emit a booth event, logging (not propagating) delivery failures.
pub fn emit_booth_event(runtime: &dyn BoothRuntime, event: BoothEvent) {
    let name = event.name();
    if let Err(e) = runtime.emit(event.into()) {
        tracing::debug!("Dropped {} event: {}", name, e);
    }
}

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliRuntime;
