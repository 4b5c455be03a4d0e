//! Capture core: layouts, the session state machine and the capture archive.
//!
//! ## Flow
//!
//! ```text
//! +-------------------+  frames  +---------------+  Arc<CaptureRecord>  +----------------+
//! | FrameSource       | -------> | Session       | ------------------> | CaptureArchive |
//! | (capture module)  |          | Controller    |                     | (newest first) |
//! +-------------------+          +---------------+                     +----------------+
//!                                       |
//!                                       | BoothEvent (countdown, flash, progress)
//!                                       v
//!                                +---------------+
//!                                | BoothRuntime  |
//!                                +---------------+
//! ```
//!
//! Export is not part of this module; exporters receive records from the
//! archive after the fact.

pub mod archive;
pub mod clock;
pub mod controller;
pub mod events;
pub mod layout;
pub mod record;

#[cfg(test)]
mod integration_tests;

pub use archive::CaptureArchive;
pub use clock::{Clock, SessionTiming, TokioClock};
pub use controller::{SessionController, SessionSnapshot, SessionStatus};
pub use events::BoothEvent;
pub use layout::{LayoutTemplate, DEFAULT_LAYOUT_ID, LAYOUTS};
pub use record::{CaptureRecord, Frame};
