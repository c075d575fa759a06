//! Tier error taxonomy

use thiserror::Error;

/// Errors a storage tier can produce
#[derive(Debug, Error)]
pub enum TierError {
    /// Storage backend absent or unopenable
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Payload present but fails schema or pattern validation
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Backend call rejected
    #[error("backend denied: {0}")]
    Denied(String),

    /// IO error from the file tier
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for tier operations
pub type Result<T> = std::result::Result<T, TierError>;
