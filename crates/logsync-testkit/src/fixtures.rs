//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests.

use logsync_core::{ManualClock, Payload, ProducerId, Record, RecordBuilder, Timestamp};
use logsync_sync::{Message, Replica, ScriptedContent, Sequencer};

/// Start of every fixture clock (2023-11-14T22:13:20Z).
pub const FIXTURE_EPOCH_MS: i64 = 1_700_000_000_000;

/// A test fixture: one producer with a manual clock.
pub struct TestFixture {
    pub producer_id: ProducerId,
    pub clock: ManualClock,
}

impl TestFixture {
    /// Create a fixture for the named producer.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(name: &str) -> Self {
        Self {
            producer_id: ProducerId::new(name).expect("fixture producer id"),
            clock: ManualClock::new(FIXTURE_EPOCH_MS),
        }
    }

    /// Create a record stamped with the current fixture time, then tick.
    pub fn record(&self, fields: &[(&str, &str)]) -> Record {
        let payload: Payload = fields.iter().map(|(k, v)| (*k, *v)).collect();
        let record = RecordBuilder::new(self.producer_id.clone())
            .produced_at(self.now())
            .payload(payload)
            .build();
        self.clock.advance_ms(1);
        record
    }

    /// Create `count` distinct records with an `n` field counting up.
    pub fn records(&self, count: usize) -> Vec<Record> {
        (0..count)
            .map(|n| {
                let n = n.to_string();
                self.record(&[("n", n.as_str())])
            })
            .collect()
    }

    /// A replica for this producer that plays back `content`.
    pub fn replica(&self, content: ScriptedContent) -> Replica {
        Replica::new(self.producer_id.clone(), content, self.clock.clone())
    }

    /// A replica that never has new data.
    pub fn empty_replica(&self) -> Replica {
        self.replica(ScriptedContent::default())
    }

    /// A replica already holding `records`.
    pub fn replica_holding(&self, records: &[Record]) -> Replica {
        let mut replica = self.empty_replica();
        replica.apply_response(Some(suffix_update(records, 0)));
        replica
    }

    fn now(&self) -> Timestamp {
        use logsync_core::Clock;
        self.clock.now_millis()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new("dev_0")
    }
}

/// Create fixtures named `dev_0`, `dev_1`, ... for multi-producer tests.
pub fn multi_producer_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::new(&format!("dev_{i}")))
        .collect()
}

/// The update a sequencer holding `log` sends for a probe at `from`.
pub fn suffix_update(log: &[Record], from: usize) -> Message {
    let data = log.get(from..).map(<[Record]>::to_vec).unwrap_or_default();
    Message::update(from as u64, data)
}

/// A sequencer whose log already holds `records`, in order.
pub fn sequencer_with(records: impl IntoIterator<Item = Record>) -> Sequencer {
    let sequencer = Sequencer::default();
    for record in records {
        sequencer.append(record);
    }
    sequencer
}
