//! Wire vectors: JSON frames and the messages they must decode to.
//!
//! Any peer speaking the JSON codec must agree on these, including the
//! lenient handling of probe offsets and the rejection of malformed frames.

use logsync_core::{ProducerId, Record, RecordBuilder, Timestamp};
use logsync_sync::{Codec, Message};

/// A wire test vector.
#[derive(Debug, Clone)]
pub struct WireVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The JSON frame.
    pub frame: &'static str,
    /// What the frame decodes to; `None` when it must be rejected.
    pub expected: Option<Message>,
}

fn producer(id: &str) -> ProducerId {
    ProducerId::new(id).expect("vector producer id")
}

fn vector_record() -> Record {
    RecordBuilder::new(producer("dev_0"))
        .produced_at(Timestamp(1_700_000_000_000))
        .field("a", "1")
        .field("b", "2")
        .build()
}

/// Get all wire vectors.
pub fn all_vectors() -> Vec<WireVector> {
    vec![
        WireVector {
            name: "record",
            frame: r#"{"kind":"record","producerId":"dev_0","producedAt":1700000000000,"payload":{"a":"1","b":"2"}}"#,
            expected: Some(Message::Record(vector_record())),
        },
        WireVector {
            name: "probe",
            frame: r#"{"kind":"probe","producerId":"dev_1","from":3}"#,
            expected: Some(Message::probe(producer("dev_1"), 3)),
        },
        WireVector {
            name: "probe without offset",
            frame: r#"{"kind":"probe","producerId":"dev_1"}"#,
            expected: Some(Message::probe(producer("dev_1"), 0)),
        },
        WireVector {
            name: "probe with negative offset",
            frame: r#"{"kind":"probe","producerId":"dev_1","from":-1}"#,
            expected: Some(Message::probe(producer("dev_1"), 0)),
        },
        WireVector {
            name: "update",
            frame: r#"{"kind":"update","from":0,"data":[{"producerId":"dev_0","producedAt":1700000000000,"payload":{"a":"1","b":"2"}}]}"#,
            expected: Some(Message::update(0, vec![vector_record()])),
        },
        WireVector {
            name: "empty update",
            frame: r#"{"kind":"update","from":7,"data":[]}"#,
            expected: Some(Message::update(7, vec![])),
        },
        WireVector {
            name: "unknown kind",
            frame: r#"{"kind":"gossip","from":0}"#,
            expected: None,
        },
        WireVector {
            name: "missing kind",
            frame: r#"{"producerId":"dev_1","from":0}"#,
            expected: None,
        },
        WireVector {
            name: "empty producer id",
            frame: r#"{"kind":"probe","producerId":"","from":0}"#,
            expected: None,
        },
        WireVector {
            name: "not json",
            frame: "probe me",
            expected: None,
        },
    ]
}

/// Decode every vector, returning `(name, matches)` pairs.
pub fn verify_all_vectors() -> Vec<(String, bool)> {
    all_vectors()
        .into_iter()
        .map(|v| {
            let decoded = Codec::Json.decode(v.frame.as_bytes()).ok();
            (v.name.to_string(), decoded == v.expected)
        })
        .collect()
}
