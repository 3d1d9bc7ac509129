//! Error types for the sync module.
//!
//! Protocol operations themselves never fail: loss and stale updates are
//! outcomes, not errors. These errors cover the ambient surface around them.

use thiserror::Error;

/// Errors that can occur around sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The sequencer actor has shut down.
    #[error("sequencer actor closed")]
    ActorClosed,

    /// Core value construction failed.
    #[error("core error: {0}")]
    Core(#[from] logsync_core::CoreError),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Check that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SyncError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}
