//! Frame codecs for protocol messages.
//!
//! The protocol does not mandate an encoding. Two are provided, both carrying
//! the tagged schema from [`crate::messages`]: JSON for readability and CBOR
//! for compactness.

use bytes::Bytes;

use crate::error::{Result, SyncError};
use crate::messages::Message;

/// Encoding used for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    Json,
    Cbor,
}

impl Codec {
    /// Encode a message into a frame.
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        match self {
            Codec::Json => serde_json::to_vec(message)
                .map(Bytes::from)
                .map_err(|e| SyncError::Codec(e.to_string())),
            Codec::Cbor => {
                let mut buf = Vec::new();
                ciborium::ser::into_writer(message, &mut buf)
                    .map_err(|e| SyncError::Codec(e.to_string()))?;
                Ok(Bytes::from(buf))
            }
        }
    }

    /// Decode a frame into a message.
    ///
    /// Unknown kinds, missing fields and garbage all fail here; callers on the
    /// protocol path treat that as "no message".
    pub fn decode(&self, frame: &[u8]) -> Result<Message> {
        match self {
            Codec::Json => {
                serde_json::from_slice(frame).map_err(|e| SyncError::Codec(e.to_string()))
            }
            Codec::Cbor => {
                ciborium::de::from_reader(frame).map_err(|e| SyncError::Codec(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsync_core::{ProducerId, RecordBuilder, Timestamp};

    fn sample_update() -> Message {
        let producer = ProducerId::new("dev_2").unwrap();
        let records = (0..3)
            .map(|n| {
                RecordBuilder::new(producer.clone())
                    .produced_at(Timestamp(100 + n))
                    .field("a", format!("v{n}"))
                    .build()
            })
            .collect();
        Message::update(4, records)
    }

    #[test]
    fn test_json_and_cbor_carry_the_same_message() {
        let message = sample_update();
        for codec in [Codec::Json, Codec::Cbor] {
            let frame = codec.encode(&message).unwrap();
            assert_eq!(codec.decode(&frame).unwrap(), message, "{codec:?}");
        }
    }

    #[test]
    fn test_cbor_is_smaller() {
        let message = sample_update();
        let json = Codec::Json.encode(&message).unwrap();
        let cbor = Codec::Cbor.encode(&message).unwrap();
        assert!(cbor.len() < json.len());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(Codec::Json.decode(b"{not json"), Err(SyncError::Codec(_))));
        assert!(matches!(Codec::Cbor.decode(&[0xff, 0x00]), Err(SyncError::Codec(_))));
    }

    #[test]
    fn test_decode_record_missing_payload_fails() {
        let frame = br#"{"kind":"record","producerId":"dev_0","producedAt":1}"#;
        assert!(Codec::Json.decode(frame).is_err());
    }
}
