//! NoirBooth: a photobox capture core.
//!
//! A session counts down, fires the shutter and collects one frame per photo
//! of the chosen layout; finished sessions become immutable records in an
//! in-memory archive, which exporters later turn into branded strips.
//!
//! The library is front-end agnostic. Events and permission prompts go
//! through [`runtime::BoothRuntime`]; the `cli` feature provides a headless
//! runtime and the `booth-cli` binary.

pub mod booth;
pub mod capture;
pub mod error;
pub mod export;
pub mod runtime;
pub mod settings;
pub mod state;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{BoothError, Result};
pub use state::AppState;
