//! Error types for the network driver.

use logsync_core::ProducerId;
use logsync_sync::{ConvergenceResult, SyncError};
use thiserror::Error;

/// Errors that can occur while building or driving a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Sync error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// The configuration cannot describe a working network.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Replicas were still behind after the settle-round limit.
    #[error("network did not settle within {rounds} rounds")]
    NotConverged { rounds: u64 },

    /// A replica disagrees with the authoritative log.
    #[error("replica {device} did not converge: {result}")]
    Diverged {
        device: ProducerId,
        result: ConvergenceResult,
    },
}

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
