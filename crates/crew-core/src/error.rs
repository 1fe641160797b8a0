//! Error types for crew-core

use thiserror::Error;

/// Result type alias for crew-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent or crew initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// Tool was called with arguments it cannot accept
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

impl Error {
    /// Build an [`Error::InvalidArguments`] from a serde decoding failure
    pub fn invalid_arguments(err: impl std::fmt::Display) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}
