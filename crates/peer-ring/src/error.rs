//! Error types for the ring router.

/// Result type alias for the ring router.
pub type Result<T> = std::result::Result<T, RingError>;

/// Errors that can occur while configuring a ring.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// Invalid ring configuration
    #[error("invalid ring config: {0}")]
    InvalidConfig(String),
    /// Config file could not be read
    #[error("failed to read ring config: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON
    #[error("failed to parse ring config: {0}")]
    Json(#[from] serde_json::Error),
}
