use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoothError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("A capture session is already in progress")]
    SessionActive,

    #[error("Capture not found: {0}")]
    RecordNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoothError {
    /// Stable machine-readable name, carried on failure events.
    pub fn error_type(&self) -> &'static str {
        match self {
            BoothError::Validation(_) => "validation",
            BoothError::Device(_) => "device",
            BoothError::Export(_) => "export",
            BoothError::Storage(_) => "storage",
            BoothError::SessionActive => "session_active",
            BoothError::RecordNotFound(_) => "not_found",
            BoothError::Io(_) => "io",
            BoothError::Internal(_) => "internal",
        }
    }
}

// Serialize as the display string so errors can travel inside events
impl Serialize for BoothError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoothError>;
