//! In-memory implementation of the LogStore trait.
//!
//! A single `RwLock` around the backing `Vec` gives linearizable appends and
//! reads: appends take the write lock, reads copy their slice under the read
//! lock before releasing it.

use std::sync::{PoisonError, RwLock};

use logsync_core::Record;

use crate::traits::{LogStore, Suffix};

/// In-memory append-only log. All data is lost when the log is dropped.
#[derive(Debug, Default)]
pub struct MemoryLog {
    inner: RwLock<Vec<Record>>,
}

impl MemoryLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl LogStore for MemoryLog {
    fn append(&self, record: Record) -> u64 {
        // Every critical section leaves the Vec valid, so a poisoned lock is still usable.
        let mut log = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let offset = log.len() as u64;
        log.push(record);
        tracing::trace!(offset, "appended record");
        offset
    }

    fn suffix_from(&self, from: u64, limit: Option<usize>) -> Suffix {
        let log = self.inner.read().unwrap_or_else(PoisonError::into_inner);

        let start = usize::try_from(from).unwrap_or(usize::MAX).min(log.len());
        let end = match limit {
            Some(limit) => start.saturating_add(limit).min(log.len()),
            None => log.len(),
        };

        Suffix {
            from,
            records: log[start..end].to_vec(),
            log_len: log.len() as u64,
        }
    }

    fn len(&self) -> u64 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len() as u64
    }
}
