//! Error types for the dispatch crate

use thiserror::Error;

/// Dispatch error types
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Relay unreachable or the request failed in transit
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Relay answered with a non-success status
    #[error("Relay rejected the job: HTTP {status}")]
    Rejected { status: u16 },

    /// Invalid dispatcher configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
