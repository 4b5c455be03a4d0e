//! Events emitted while a session runs and when a strip is exported.

use serde::{Deserialize, Serialize};

/// Progress and outcome events for capture sessions and exports.
///
/// Emitted through the runtime so the CLI (or any other front end) can drive
/// countdown overlays, the shutter flash and the frame counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoothEvent {
    /// A session claimed the camera and is about to count down
    SessionStarted {
        layout: String,
        photo_count: usize,
        user_name: String,
        countdown_seconds: u8,
    },

    /// Countdown update before a shot; `None` means no countdown is showing
    CountdownTick { shot: usize, remaining: Option<u8> },

    /// Visual-only flash right before a frame is acquired
    ShutterFlash { shot: usize },

    /// A frame was added to the session
    FrameCaptured { captured: usize, total: usize },

    /// The session finished and its record is in the archive
    SessionCompleted {
        record_id: String,
        user_name: String,
        layout: String,
    },

    /// The session was aborted; nothing was archived
    SessionFailed { message: String, error_type: String },

    /// A strip was written to storage
    ExportCompleted {
        record_id: String,
        file_name: String,
        location: String,
    },

    /// Export failed; the record is untouched and export can be retried
    ExportFailed {
        record_id: String,
        message: String,
        error_type: String,
    },
}

impl BoothEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            BoothEvent::SessionStarted { .. } => "session_started",
            BoothEvent::CountdownTick { .. } => "countdown_tick",
            BoothEvent::ShutterFlash { .. } => "shutter_flash",
            BoothEvent::FrameCaptured { .. } => "frame_captured",
            BoothEvent::SessionCompleted { .. } => "session_completed",
            BoothEvent::SessionFailed { .. } => "session_failed",
            BoothEvent::ExportCompleted { .. } => "export_completed",
            BoothEvent::ExportFailed { .. } => "export_failed",
        }
    }

    /// Whether this event ends a session or an export.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BoothEvent::SessionCompleted { .. }
                | BoothEvent::SessionFailed { .. }
                | BoothEvent::ExportCompleted { .. }
                | BoothEvent::ExportFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = BoothEvent::CountdownTick {
            shot: 2,
            remaining: Some(3),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "countdown_tick");
        assert_eq!(json["shot"], 2);
        assert_eq!(json["remaining"], 3);

        let cleared = BoothEvent::CountdownTick {
            shot: 2,
            remaining: None,
        };
        let json = serde_json::to_value(&cleared).unwrap();
        assert!(json["remaining"].is_null());
    }

    #[test]
    fn test_event_roundtrip() {
        let event = BoothEvent::ExportFailed {
            record_id: "ABCDE".into(),
            message: "disk full".into(),
            error_type: "storage".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: BoothEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_terminal_events() {
        assert!(!BoothEvent::ShutterFlash { shot: 0 }.is_terminal());
        assert!(BoothEvent::SessionFailed {
            message: String::new(),
            error_type: String::new()
        }
        .is_terminal());
        assert_eq!(BoothEvent::ShutterFlash { shot: 0 }.name(), "shutter_flash");
    }
}
