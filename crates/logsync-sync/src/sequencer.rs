//! Sequencer: owner of the authoritative log.
//!
//! Appends every record it receives and answers probes with the suffix of the
//! log starting at the probe's offset. It never pushes; producers pull.
//!
//! Each `handle` call performs exactly one operation on the [`LogStore`],
//! which is atomic, so concurrent callers are serialized by the store's lock.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use logsync_core::Record;
use logsync_store::{LogStore, MemoryLog};

use crate::messages::{Message, Probe, Update};
use crate::wire::Codec;

/// Configuration for the sequencer.
#[derive(Debug, Clone, Default)]
pub struct SequencerConfig {
    /// Cap on records per update. `None` sends the whole suffix.
    pub max_update_records: Option<usize>,
}

/// Counters describing what the sequencer has handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerStats {
    /// Records appended to the log.
    pub appended: u64,
    /// Probes answered with an update.
    pub probes_answered: u64,
    /// Inputs ignored: absent, undecodable, or not a request.
    pub ignored: u64,
}

#[derive(Debug, Default)]
struct Counters {
    appended: AtomicU64,
    probes_answered: AtomicU64,
    ignored: AtomicU64,
}

/// The single shared sequencer.
pub struct Sequencer<L: LogStore = MemoryLog> {
    log: L,
    config: SequencerConfig,
    counters: Counters,
}

impl Sequencer<MemoryLog> {
    /// Create a sequencer over an empty in-memory log.
    pub fn new(config: SequencerConfig) -> Self {
        Self::with_log(MemoryLog::new(), config)
    }
}

impl Default for Sequencer<MemoryLog> {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

impl<L: LogStore> Sequencer<L> {
    /// Create a sequencer over an existing log.
    pub fn with_log(log: L, config: SequencerConfig) -> Self {
        Self {
            log,
            config,
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Handle one incoming message.
    ///
    /// - `None` and updates are ignored and yield `None`.
    /// - A record is appended; no response is generated.
    /// - A probe is answered with an update.
    pub fn handle(&self, message: Option<Message>) -> Option<Message> {
        match message {
            None => {
                self.counters.ignored.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("nothing delivered");
                None
            }
            Some(Message::Record(record)) => {
                self.append(record);
                None
            }
            Some(Message::Probe(probe)) => Some(Message::Update(self.answer_probe(&probe))),
            Some(Message::Update(update)) => {
                self.counters.ignored.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(from = update.from, "ignoring update sent to sequencer");
                None
            }
        }
    }

    /// Decode a frame, handle it, and encode the response.
    ///
    /// Undecodable frames are ignored like any other malformed input.
    pub fn handle_frame(&self, codec: Codec, frame: &[u8]) -> Option<Bytes> {
        let message = match codec.decode(frame) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed frame");
                None
            }
        };

        let response = self.handle(message)?;
        match codec.encode(&response) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::debug!(error = %e, "dropping unencodable response");
                None
            }
        }
    }

    /// Append a record to the authoritative log, returning its offset.
    pub fn append(&self, record: Record) -> u64 {
        let offset = self.log.append(record);
        self.counters.appended.fetch_add(1, Ordering::Relaxed);
        offset
    }

    /// Build the update answering `probe`.
    pub fn answer_probe(&self, probe: &Probe) -> Update {
        let suffix = self.log.suffix_from(probe.from, self.config.max_update_records);
        self.counters.probes_answered.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(
            producer = %probe.producer_id,
            from = probe.from,
            sent = suffix.records.len(),
            log_len = suffix.log_len,
            "answering probe"
        );

        Update {
            from: probe.from,
            data: suffix.records,
        }
    }

    /// Length of the authoritative log.
    pub fn len(&self) -> u64 {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Owned copy of the authoritative log, for verification.
    pub fn snapshot(&self) -> Vec<Record> {
        self.log.snapshot()
    }

    pub fn stats(&self) -> SequencerStats {
        SequencerStats {
            appended: self.counters.appended.load(Ordering::Relaxed),
            probes_answered: self.counters.probes_answered.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
        }
    }
}
