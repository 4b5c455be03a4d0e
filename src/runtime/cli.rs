use super::{BoothRuntime, PermissionKind, PermissionStatus, RuntimeError, RuntimeEvent};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::Any;
use std::io::{self, Write};
use tokio::sync::mpsc;

/// Terminal host: events go to the output loop over a channel, permission
/// prompts are y/n questions on stderr.
pub struct CliRuntime {
    event_tx: RwLock<mpsc::UnboundedSender<RuntimeEvent>>,
    auto_grant: bool,
    json_mode: bool,
}

impl CliRuntime {
    pub fn new(
        event_tx: mpsc::UnboundedSender<RuntimeEvent>,
        auto_grant: bool,
        json_mode: bool,
    ) -> Self {
        Self {
            event_tx: RwLock::new(event_tx),
            auto_grant,
            json_mode,
        }
    }

    /// Replace the event sender (each command gets a fresh channel)
    pub fn replace_event_tx(&self, new_tx: mpsc::UnboundedSender<RuntimeEvent>) {
        *self.event_tx.write() = new_tx;
    }

    /// Swap in a sender with no receiver so the current output loop sees its
    /// channel close once buffered events are drained.
    pub fn detach_event_tx(&self) {
        let (idle_tx, _) = mpsc::unbounded_channel();
        self.replace_event_tx(idle_tx);
    }
}

#[async_trait]
impl BoothRuntime for CliRuntime {
    fn emit(&self, event: RuntimeEvent) -> Result<(), RuntimeError> {
        self.event_tx
            .read()
            .send(event)
            .map_err(|_| RuntimeError::ReceiverClosed)
    }

    async fn request_permission(
        &self,
        kind: PermissionKind,
    ) -> Result<PermissionStatus, RuntimeError> {
        if self.auto_grant {
            if !self.json_mode {
                eprintln!("[auto-granted] {} access", kind.label());
            }
            return Ok(PermissionStatus::Granted);
        }

        if !atty::is(atty::Stream::Stdin) {
            return Err(RuntimeError::NotInteractive);
        }

        eprint!("\nAllow {} access? (y)es / (n)o: ", kind.label());
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        match input.trim().to_lowercase().as_str() {
            "y" | "yes" | "a" | "allow" => Ok(PermissionStatus::Granted),
            _ => Ok(PermissionStatus::Denied), // Default to deny on invalid input
        }
    }

    async fn shutdown(&self) -> Result<(), RuntimeError> {
        // Dropping the sender ends any output loop still attached
        self.detach_event_tx();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booth::BoothEvent;

    #[tokio::test]
    async fn test_emit_delivers_to_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runtime = CliRuntime::new(tx, true, true);

        runtime
            .emit(BoothEvent::ShutterFlash { shot: 0 }.into())
            .unwrap();

        match rx.recv().await {
            Some(RuntimeEvent::Booth(event)) => {
                assert_eq!(*event, BoothEvent::ShutterFlash { shot: 0 })
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_detach_closes_previous_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runtime = CliRuntime::new(tx, true, true);

        runtime.detach_event_tx();
        assert!(rx.recv().await.is_none());
        assert!(matches!(
            runtime.emit(BoothEvent::ShutterFlash { shot: 0 }.into()),
            Err(RuntimeError::ReceiverClosed)
        ));
    }

    #[tokio::test]
    async fn test_auto_grant() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let runtime = CliRuntime::new(tx, true, true);
        let status = runtime
            .request_permission(PermissionKind::Storage)
            .await
            .unwrap();
        assert_eq!(status, PermissionStatus::Granted);
    }
}
