//! Error types for logsync Core.

use thiserror::Error;

/// Errors that can occur while constructing core values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("producer id must not be empty")]
    EmptyProducerId,

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
