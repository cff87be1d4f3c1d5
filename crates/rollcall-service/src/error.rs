//! Error types for the dispatch layer.
//!
//! Library errors pass through unchanged (`transparent`) so the envelope
//! carries the same operator-facing message the scanner or store produced.

use rollcall_biometric::TemplateError;
use rollcall_hardware::HardwareError;
use rollcall_storage::StorageError;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors a request can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Scanner registry, session or capture failure.
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// A template could not be decoded or validated.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Record store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The request line was not a valid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An enrollment capture scored below the configured minimum.
    #[error("Fingerprint quality {quality} is below the required {minimum}. Please scan again.")]
    LowQuality { quality: u8, minimum: u8 },

    /// A response payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}
