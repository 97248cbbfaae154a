//! Error types for JetPool

use thiserror::Error;

/// Core error type for JetPool operations
#[derive(Error, Debug)]
pub enum JetPoolError {
    /// No idle connection is available. Callers recover by opening a fresh one.
    #[error("No idle connection available")]
    EmptyPool,

    #[error("Failed to open connection: {0}")]
    Open(String),

    #[error("Failed to close connection: {0}")]
    Close(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JetPoolError {
    /// Whether this is the expected "pool exhausted" signal
    pub fn is_empty_pool(&self) -> bool {
        matches!(self, JetPoolError::EmptyPool)
    }
}

/// Result type alias for JetPool operations
pub type Result<T> = std::result::Result<T, JetPoolError>;
