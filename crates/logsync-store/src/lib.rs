//! # logsync Store
//!
//! Storage abstraction for the authoritative log. The sequencer owns one
//! [`LogStore`] and reaches it only through `append` and `suffix_from`; the
//! backing sequence is never handed out.
//!
//! ## Key Types
//!
//! - [`LogStore`] - The trait for an append-only, internally synchronized log
//! - [`MemoryLog`] - In-memory implementation behind a single `RwLock`
//! - [`Suffix`] - A point-in-time slice of the log starting at an offset
//!
//! ## Design Notes
//!
//! - **Append-only**: once a record occupies position *i* it never changes
//! - **Linearizable**: every `append` and `suffix_from` observes a single
//!   point in time; a reader never sees a partial append
//! - **Total**: out-of-range offsets yield an empty suffix, never a panic

pub mod memory;
pub mod traits;

pub use memory::MemoryLog;
pub use traits::{LogStore, Suffix};
