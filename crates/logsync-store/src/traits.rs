//! LogStore trait: the abstract interface for the authoritative log.
//!
//! Implementations must be internally synchronized. Callers share a store
//! by reference (or `Arc`) and never lock it themselves.

use std::sync::Arc;

use logsync_core::Record;

/// A contiguous slice of the log read at a single point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix {
    /// Offset of the first record in `records`.
    pub from: u64,
    /// Records at positions `[from, from + records.len())`.
    pub records: Vec<Record>,
    /// Length of the whole log when the slice was taken.
    pub log_len: u64,
}

impl Suffix {
    /// Whether the slice reaches the end of the log as it was when read.
    pub fn is_complete(&self) -> bool {
        self.from.saturating_add(self.records.len() as u64) >= self.log_len
    }
}

/// The LogStore trait: an append-only, linearizable sequence of records.
///
/// # Design Notes
///
/// - `append` and `suffix_from` are atomic with respect to each other.
/// - A record's position never changes once assigned, and nothing is removed.
/// - `suffix_from` with `from >= len()` returns an empty slice.
pub trait LogStore: Send + Sync {
    /// Append a record, returning the offset it was placed at.
    fn append(&self, record: Record) -> u64;

    /// Read records starting at `from`, at most `limit` of them when given.
    fn suffix_from(&self, from: u64, limit: Option<usize>) -> Suffix;

    /// Current length of the log (the authoritative offset).
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owned copy of the whole log.
    fn snapshot(&self) -> Vec<Record> {
        self.suffix_from(0, None).records
    }
}

impl<L: LogStore + ?Sized> LogStore for Arc<L> {
    fn append(&self, record: Record) -> u64 {
        (**self).append(record)
    }

    fn suffix_from(&self, from: u64, limit: Option<usize>) -> Suffix {
        (**self).suffix_from(from, limit)
    }

    fn len(&self) -> u64 {
        (**self).len()
    }
}
