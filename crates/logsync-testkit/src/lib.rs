//! # logsync Testkit
//!
//! Testing utilities for logsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Wire vectors**: JSON frames with the messages they must decode to
//! - **Generators**: Proptest strategies for records, logs, and update scenarios
//! - **Fixtures**: Producers with manual clocks, replicas, prefilled sequencers
//! - **Ledger**: The shadow list of delivered records a converged log must match
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use logsync_testkit::generators::UpdateScenario;
//! use logsync_testkit::fixtures::{suffix_update, TestFixture};
//!
//! proptest! {
//!     #[test]
//!     fn update_is_idempotent(scenario: UpdateScenario) {
//!         let mut replica = TestFixture::default().replica_holding(scenario.held());
//!         let update = suffix_update(&scenario.log, scenario.from);
//!         replica.apply_response(Some(update.clone()));
//!         prop_assert!(!replica.apply_response(Some(update)).is_applied());
//!     }
//! }
//! ```
//!
//! ## Convergence Checks
//!
//! ```rust
//! use logsync::{NetworkConfig, SyncNetwork};
//! use logsync_testkit::SentLedger;
//!
//! let mut network = SyncNetwork::new(NetworkConfig { devices: 2, ..Default::default() }).unwrap();
//! let mut ledger = SentLedger::new();
//!
//! for _ in 0..20 {
//!     ledger.note_round(&network.round());
//! }
//! network.settle().unwrap();
//! ledger.verify(&network.sequencer().snapshot()).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod ledger;
pub mod vectors;

pub use fixtures::{multi_producer_fixtures, sequencer_with, suffix_update, TestFixture};
pub use generators::UpdateScenario;
pub use ledger::{LedgerViolation, SentLedger};
pub use vectors::{all_vectors, verify_all_vectors, WireVector};
