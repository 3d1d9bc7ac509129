//! # logsync Core
//!
//! Pure primitives for logsync: records, identifiers, and canonicalization.
//!
//! This crate contains no I/O beyond reading the wall clock, no storage, no
//! networking. It defines the immutable [`Record`] that producers create and
//! the sequencer orders.
//!
//! ## Key Types
//!
//! - [`Record`] - The immutable unit of produced data
//! - [`Payload`] - Mapping from named keys to opaque string values
//! - [`ProducerId`] - Stable identifier of the originating producer
//! - [`Timestamp`] - Creation time in Unix milliseconds
//! - [`RecordDigest`] - Blake3 digest of a record's identity fields
//!
//! ## Identity
//!
//! Two records are the same record when `(producer_id, produced_at, payload)`
//! are equal. The canonical encoding in [`canonical`] covers exactly those
//! fields, so equal records always have equal digests.

pub mod canonical;
pub mod clock;
pub mod error;
pub mod record;
pub mod types;

pub use canonical::canonical_bytes;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use record::{Payload, Record, RecordBuilder};
pub use types::{ProducerId, RecordDigest, Timestamp};
