//! # logsync Sync
//!
//! Offset-based pull replication between one sequencer and many producers.
//!
//! ## Overview
//!
//! The [`Sequencer`] owns the authoritative, totally ordered log. Each
//! producer device keeps a [`Replica`]: a local copy that it brings up to
//! date by asking for everything past its own length. Every message can be
//! lost; the protocol converges anyway because probes are repeated and
//! updates are applied by suffix replacement.
//!
//! ## Key Properties
//!
//! - **Idempotent**: applying the same update twice changes nothing
//! - **Gap-free**: an update starting past the local length is discarded
//! - **Self-healing**: a stale local tail is overwritten from the log
//! - **Loss-tolerant**: any message may vanish; the next round retries
//!
//! ## Message Flow
//!
//! ```text
//! Producer                           Sequencer
//!   |-------- Record ----------------->|   append, no reply
//!   |-------- Probe { from: len } ---->|
//!   |<------- Update { from, data } ---|   data = log[from..]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use logsync_core::{ManualClock, Payload, ProducerId};
//! use logsync_sync::{Replica, ScriptedContent, Sequencer};
//!
//! let sequencer: Sequencer = Sequencer::default();
//! let content = ScriptedContent::new([Some(Payload::new().with("a", "1"))]);
//! let mut replica = Replica::new(
//!     ProducerId::new("dev_0").unwrap(),
//!     content,
//!     ManualClock::new(0),
//! );
//!
//! sequencer.handle(replica.generate());
//! let update = sequencer.handle(replica.build_probe());
//! replica.apply_response(update);
//!
//! assert_eq!(replica.records(), &sequencer.snapshot()[..]);
//! ```

pub mod actor;
pub mod channel;
pub mod content;
pub mod convergence;
pub mod error;
pub mod messages;
pub mod replica;
pub mod sequencer;
pub mod wire;

pub use actor::{SequencerActor, SequencerHandle, DEFAULT_QUEUE_DEPTH};
pub use channel::{Channel, ChannelExt, Links, LossConfig, Lossy, Reliable, Scripted};
pub use content::{ContentConfig, ContentSource, RandomContent, ScriptedContent};
pub use convergence::{log_digest, verify_convergence, ConvergenceResult, LogDigest};
pub use error::{Result, SyncError};
pub use messages::{Message, MessageKind, Probe, Update};
pub use replica::{ApplyOutcome, Replica};
pub use sequencer::{Sequencer, SequencerConfig, SequencerStats};
pub use wire::Codec;
