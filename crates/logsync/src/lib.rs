//! # logsync
//!
//! Replicate one authoritative, totally ordered log to many producers over
//! links that lose messages.
//!
//! ## Overview
//!
//! - **Sequencer**: the single owner of the log; appends records, answers probes
//! - **Replica**: a producer's local copy, caught up by offset-based pulls
//! - **Channels**: per-leg loss, seeded for simulation or scripted for tests
//! - **Network**: the loop that drives devices until every replica converges
//!
//! ## Key Concepts
//!
//! - **Offset**: a position in the log; a replica's length is the next one it
//!   needs
//! - **Suffix replacement**: `records[..from] ++ data`; idempotent and
//!   self-healing
//! - **Loss is not an error**: a missing message is `None` and the next round
//!   retries
//!
//! ## Usage
//!
//! ```rust
//! use logsync::{NetworkConfig, SyncNetwork};
//!
//! let config = NetworkConfig {
//!     devices: 3,
//!     seed: 7,
//!     ..NetworkConfig::default()
//! };
//! let mut network = SyncNetwork::new(config).unwrap();
//!
//! for _ in 0..100 {
//!     network.round();
//! }
//! network.settle().unwrap();
//! network.verify().unwrap();
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `logsync::core` - Records, identifiers, clocks
//! - `logsync::store` - The authoritative log storage
//! - `logsync::sync` - Sequencer, replica, channels, codecs

pub mod error;
pub mod network;

// Re-export component crates
pub use logsync_core as core;
pub use logsync_store as store;
pub use logsync_sync as sync;

pub use error::{NetworkError, Result};
pub use network::{NetworkConfig, Produced, RoundReport, SettleReport, SyncNetwork};

// Re-export commonly used types
pub use logsync_core::{Payload, ProducerId, Record, RecordBuilder, Timestamp};
pub use logsync_sync::{
    ApplyOutcome, Codec, ConvergenceResult, LossConfig, Message, Replica, Sequencer,
    SequencerConfig,
};
