//! Producer replica: a device's local copy of the authoritative log.
//!
//! The replica produces records, asks the sequencer for everything past its
//! own length, and merges the answer by suffix replacement:
//!
//! ```text
//! records = records[..from] ++ update.data      (only when from <= len)
//! ```
//!
//! Suffix replacement is idempotent (re-applying the same update changes
//! nothing) and heals any stale tail, because the tail is recomputed from the
//! authoritative log rather than merged. An update whose `from` lies past the
//! local length would leave a gap and is discarded whole.

use logsync_core::{Clock, ProducerId, Record, Timestamp};

use crate::channel::{Channel, ChannelExt, Reliable};
use crate::content::ContentSource;
use crate::messages::{Message, Update};

/// What [`Replica::apply_response`] did with a response.
///
/// None of these are errors; every case is a normal round outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No response was delivered.
    NoMessage,
    /// The response was not an update.
    NotAnUpdate,
    /// The update starts past the local length and was discarded.
    Stale { from: u64, local_len: u64 },
    /// The update carried nothing the replica did not already hold.
    Unchanged { len: u64 },
    /// The local tail was rewritten.
    Applied {
        from: u64,
        /// Local records dropped because they disagreed with the update.
        replaced: usize,
        /// Records written from the update.
        added: usize,
        /// Replica length afterwards.
        len: u64,
    },
}

impl ApplyOutcome {
    /// Whether the replica changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// A producer's replica of the log.
///
/// Owned by one device and never shared, so it needs no locking.
pub struct Replica {
    producer_id: ProducerId,
    records: Vec<Record>,
    content: Box<dyn ContentSource>,
    clock: Box<dyn Clock>,
    probe_gate: Box<dyn Channel>,
    last_produced_at: Option<Timestamp>,
}

impl Replica {
    /// Create an empty replica that probes every round.
    pub fn new(
        producer_id: ProducerId,
        content: impl ContentSource + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            producer_id,
            records: Vec::new(),
            content: Box::new(content),
            clock: Box::new(clock),
            probe_gate: Box::new(Reliable),
            last_produced_at: None,
        }
    }

    /// Decide per round whether a probe is issued at all.
    pub fn with_probe_gate(mut self, gate: impl Channel + 'static) -> Self {
        self.probe_gate = Box::new(gate);
        self
    }

    pub fn producer_id(&self) -> &ProducerId {
        &self.producer_id
    }

    /// The local copy of the log.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of locally known records, i.e. the next expected offset.
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Produce a new record, or `None` when there is no new data.
    ///
    /// Timestamps are strictly increasing per replica so the identity
    /// `(producer_id, produced_at, payload)` is never ambiguous.
    pub fn generate(&mut self) -> Option<Message> {
        let payload = self.content.next_payload()?;

        let now = self.clock.now_millis();
        let produced_at = match self.last_produced_at {
            Some(last) if now <= last => last.successor(),
            _ => now,
        };
        self.last_produced_at = Some(produced_at);

        Some(Message::Record(Record::new(
            self.producer_id.clone(),
            produced_at,
            payload,
        )))
    }

    /// Ask for everything past the local length, unless this round skips it.
    pub fn build_probe(&mut self) -> Option<Message> {
        let probe = Message::probe(self.producer_id.clone(), self.len());
        let probe = self.probe_gate.transmit(Some(probe));
        if probe.is_none() {
            tracing::trace!(producer = %self.producer_id, "probe skipped this round");
        }
        probe
    }

    /// Merge a response from the sequencer.
    pub fn apply_response(&mut self, response: Option<Message>) -> ApplyOutcome {
        match response {
            None => ApplyOutcome::NoMessage,
            Some(Message::Update(update)) => self.apply_update(update),
            Some(other) => {
                tracing::debug!(
                    producer = %self.producer_id,
                    kind = %other.kind(),
                    "ignoring non-update response"
                );
                ApplyOutcome::NotAnUpdate
            }
        }
    }

    fn apply_update(&mut self, update: Update) -> ApplyOutcome {
        let Update { from, data } = update;
        let local_len = self.len();

        if from > local_len {
            tracing::debug!(
                producer = %self.producer_id,
                from,
                local_len,
                "discarding update that would leave a gap"
            );
            return ApplyOutcome::Stale { from, local_len };
        }

        // from <= local_len, which fits in usize.
        let start = from as usize;
        let common = self.records[start..]
            .iter()
            .zip(&data)
            .take_while(|(local, remote)| local == remote)
            .count();

        // Every delivered record is already in place. A longer local tail is
        // kept: it is itself an older read of the same append-only log.
        if common == data.len() {
            return ApplyOutcome::Unchanged { len: local_len };
        }

        let replaced = self.records.len() - start - common;
        if replaced > 0 {
            tracing::debug!(
                producer = %self.producer_id,
                from,
                replaced,
                "rewriting divergent local tail"
            );
        }

        self.records.truncate(start + common);
        let added = data.len() - common;
        self.records.extend(data.into_iter().skip(common));

        ApplyOutcome::Applied {
            from,
            replaced,
            added,
            len: self.len(),
        }
    }
}

impl std::fmt::Debug for Replica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replica")
            .field("producer_id", &self.producer_id)
            .field("len", &self.records.len())
            .field("last_produced_at", &self.last_produced_at)
            .finish_non_exhaustive()
    }
}
