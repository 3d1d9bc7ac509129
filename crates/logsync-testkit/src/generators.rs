//! Proptest generators for property-based testing.

use proptest::prelude::*;

use logsync_core::{Payload, ProducerId, Record, Timestamp};

/// Generate a producer id like `dev_7`.
pub fn producer_id() -> impl Strategy<Value = ProducerId> {
    (0u8..16).prop_map(|n| ProducerId::new(format!("dev_{n}")).expect("non-empty id"))
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..=1_700_000_000_000i64).prop_map(Timestamp)
}

/// Generate a payload with a few short keys.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop::collection::btree_map("[a-e]", "[0-9a-f]{0,8}", 0..4)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Generate a record.
pub fn record() -> impl Strategy<Value = Record> {
    (producer_id(), timestamp(), payload())
        .prop_map(|(producer_id, produced_at, payload)| {
            Record::new(producer_id, produced_at, payload)
        })
}

/// Generate an authoritative log of up to `max_len` records.
pub fn log(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record(), 0..=max_len)
}

/// A replica partway through a log, and an update aimed at it.
#[derive(Debug, Clone)]
pub struct UpdateScenario {
    /// The authoritative log.
    pub log: Vec<Record>,
    /// How much of the log the replica already holds.
    pub replica_len: usize,
    /// Offset the update starts at. May lie past `replica_len`.
    pub from: usize,
}

impl UpdateScenario {
    /// The records the replica starts with.
    pub fn held(&self) -> &[Record] {
        &self.log[..self.replica_len]
    }

    /// Whether the update would leave a gap.
    pub fn is_stale(&self) -> bool {
        self.from > self.replica_len
    }
}

impl Arbitrary for UpdateScenario {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        log(24)
            .prop_flat_map(|log| {
                let len = log.len();
                (Just(log), 0..=len, 0..=len + 2)
            })
            .prop_map(|(log, replica_len, from)| UpdateScenario {
                log,
                replica_len,
                from,
            })
            .boxed()
    }
}
