//! Canonical CBOR encoding for record identity.
//!
//! Records are encoded following RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! Only the identity fields are encoded, so the same record yields identical
//! bytes (and thus identical digests) on every producer and on the sequencer.

use crate::record::{Payload, Record};
use crate::types::RecordDigest;

/// Domain separator for record digests.
const DIGEST_DOMAIN: &[u8] = b"logsync-record-v0:";

/// Record field keys (integer keys for compact encoding).
mod keys {
    pub const PRODUCER_ID: u64 = 0;
    pub const PRODUCED_AT: u64 = 1;
    pub const PAYLOAD: u64 = 2;
}

/// Encode a record's identity fields to canonical CBOR bytes.
pub fn canonical_bytes(record: &Record) -> Vec<u8> {
    let mut buf = Vec::new();

    // Keys 0..=2 already sort in encoded order.
    encode_uint(&mut buf, 5, 3);

    encode_uint(&mut buf, 0, keys::PRODUCER_ID);
    encode_text(&mut buf, record.producer_id().as_str());

    encode_uint(&mut buf, 0, keys::PRODUCED_AT);
    encode_int(&mut buf, record.produced_at().as_millis());

    encode_uint(&mut buf, 0, keys::PAYLOAD);
    encode_payload(&mut buf, record.payload());

    buf
}

/// Compute the Blake3 identity digest of a record.
pub(crate) fn record_digest(record: &Record) -> RecordDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DIGEST_DOMAIN);
    hasher.update(&canonical_bytes(record));
    RecordDigest(*hasher.finalize().as_bytes())
}

/// Encode a signed integer (major types 0 and 1).
fn encode_int(buf: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode the payload as a text-keyed map (major type 5).
///
/// Keys are sorted by their encoded bytes, which for text keys means
/// shorter keys first, then bytewise.
fn encode_payload(buf: &mut Vec<u8>, payload: &Payload) {
    let mut entries: Vec<(Vec<u8>, &str)> = payload
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_text(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    entries.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, entries.len() as u64);
    for (key_bytes, value) in entries {
        buf.extend_from_slice(&key_bytes);
        encode_text(buf, value);
    }
}
