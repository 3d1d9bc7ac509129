//! Record: the immutable unit of produced data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::record_digest;
use crate::types::{ProducerId, RecordDigest, Timestamp};

/// Mapping from named keys to opaque string values.
///
/// Backed by a `BTreeMap` so iteration (and therefore canonical encoding) is
/// ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// An immutable record.
///
/// Identity is the triple `(producer_id, produced_at, payload)`; `PartialEq`
/// compares exactly those fields. Records are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    producer_id: ProducerId,
    produced_at: Timestamp,
    payload: Payload,
}

impl Record {
    /// Create a record.
    pub fn new(producer_id: ProducerId, produced_at: Timestamp, payload: Payload) -> Self {
        Self {
            producer_id,
            produced_at,
            payload,
        }
    }

    /// The producer that created this record.
    pub fn producer_id(&self) -> &ProducerId {
        &self.producer_id
    }

    /// When the record was created.
    pub fn produced_at(&self) -> Timestamp {
        self.produced_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Compute the identity digest of this record.
    pub fn digest(&self) -> RecordDigest {
        record_digest(self)
    }
}

/// Builder for creating records.
pub struct RecordBuilder {
    producer_id: ProducerId,
    produced_at: Timestamp,
    payload: Payload,
}

impl RecordBuilder {
    /// Start building a record for a producer.
    pub fn new(producer_id: ProducerId) -> Self {
        Self {
            producer_id,
            produced_at: Timestamp(0),
            payload: Payload::new(),
        }
    }

    /// Set the creation timestamp.
    pub fn produced_at(mut self, ts: Timestamp) -> Self {
        self.produced_at = ts;
        self
    }

    /// Add a single payload field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key, value);
        self
    }

    /// Replace the whole payload.
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Build the record.
    pub fn build(self) -> Record {
        Record::new(self.producer_id, self.produced_at, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer(id: &str) -> ProducerId {
        ProducerId::new(id).unwrap()
    }

    #[test]
    fn test_builder_sets_fields() {
        let record = RecordBuilder::new(producer("a"))
            .produced_at(Timestamp(42))
            .field("x", "1")
            .build();

        assert_eq!(record.producer_id().as_str(), "a");
        assert_eq!(record.produced_at(), Timestamp(42));
        assert_eq!(record.payload().get("x"), Some("1"));
    }

    #[test]
    fn test_identity_covers_all_fields() {
        let base = RecordBuilder::new(producer("a"))
            .produced_at(Timestamp(1))
            .field("x", "1")
            .build();

        let other_producer = RecordBuilder::new(producer("b"))
            .produced_at(Timestamp(1))
            .field("x", "1")
            .build();
        let other_time = RecordBuilder::new(producer("a"))
            .produced_at(Timestamp(2))
            .field("x", "1")
            .build();
        let other_payload = RecordBuilder::new(producer("a"))
            .produced_at(Timestamp(1))
            .field("x", "2")
            .build();

        assert_ne!(base, other_producer);
        assert_ne!(base, other_time);
        assert_ne!(base, other_payload);
        assert_eq!(base, base.clone());
    }

    #[test]
    fn test_record_json_field_names() {
        let record = RecordBuilder::new(producer("dev_1"))
            .produced_at(Timestamp(7))
            .field("a", "v")
            .build();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["producerId"], "dev_1");
        assert_eq!(json["producedAt"], 7);
        assert_eq!(json["payload"]["a"], "v");
    }

    #[test]
    fn test_payload_from_iter_is_key_ordered() {
        let payload: Payload = [("c", "3"), ("a", "1"), ("b", "2")].into_iter().collect();
        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(payload.len(), 3);
    }
}
