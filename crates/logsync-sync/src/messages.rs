//! Sync protocol message types.
//!
//! Every message travels in one envelope tagged by `kind`:
//!
//! ```text
//! {"kind": "record", "producerId": .., "producedAt": .., "payload": {..}}
//! {"kind": "probe",  "producerId": .., "from": n}
//! {"kind": "update", "from": n, "data": [record, ..]}
//! ```
//!
//! A lost message is `None` wherever a message is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use logsync_core::{ProducerId, Record};

/// Sync protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Message {
    /// Produce: one record to append to the authoritative log.
    Record(Record),

    /// Catch-up request from a producer.
    Probe(Probe),

    /// Catch-up response from the sequencer.
    Update(Update),
}

impl Message {
    /// Build a probe message.
    pub fn probe(producer_id: ProducerId, from: u64) -> Self {
        Message::Probe(Probe { producer_id, from })
    }

    /// Build an update message.
    pub fn update(from: u64, data: Vec<Record>) -> Self {
        Message::Update(Update { from, data })
    }

    /// The message's kind tag.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Record(_) => MessageKind::Record,
            Message::Probe(_) => MessageKind::Probe,
            Message::Update(_) => MessageKind::Update,
        }
    }
}

/// Discriminant of [`Message`], for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Record,
    Probe,
    Update,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            MessageKind::Record => "record",
            MessageKind::Probe => "probe",
            MessageKind::Update => "update",
        };
        f.write_str(tag)
    }
}

/// Request for every record at or after `from`.
///
/// On the wire `from` may be absent (read as 0) or out of range; decoding
/// clamps it into `[0, u64::MAX]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProbeRepr")]
pub struct Probe {
    /// The requesting producer.
    pub producer_id: ProducerId,
    /// The requester's replica length, i.e. its next expected offset.
    pub from: u64,
}

/// Lenient wire form of [`Probe`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProbeRepr {
    producer_id: ProducerId,
    #[serde(default)]
    from: Option<RawOffset>,
}

/// An offset as it may appear on the wire: any integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOffset {
    Unsigned(u64),
    Signed(i64),
}

impl From<ProbeRepr> for Probe {
    fn from(repr: ProbeRepr) -> Self {
        let from = match repr.from {
            Some(RawOffset::Unsigned(n)) => n,
            Some(RawOffset::Signed(n)) => n.max(0) as u64,
            None => 0,
        };
        Probe {
            producer_id: repr.producer_id,
            from,
        }
    }
}

/// The suffix of the authoritative log starting at `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Offset echoed back from the probe.
    pub from: u64,
    /// Authoritative records at positions `[from, from + data.len())`.
    pub data: Vec<Record>,
}
