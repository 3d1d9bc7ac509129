//! Shadow ledger of everything producers managed to send.
//!
//! Each delivered record is noted as it leaves its producer. After the
//! network settles, the ledger checks the authoritative log (or any replica)
//! against it: every producer's delivered records appear exactly once, in the
//! order they were produced, and nothing else appears.

use std::collections::BTreeMap;

use thiserror::Error;

use logsync::RoundReport;
use logsync_core::{ProducerId, Record, RecordDigest};

/// A way the checked log disagrees with the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerViolation {
    /// The log holds records from a producer that never delivered any.
    #[error("unexpected producer {producer} in log")]
    UnknownProducer { producer: ProducerId },

    /// A producer's records in the log differ from what it delivered.
    #[error("producer {producer} differs at its record {index}: sent {sent:?}, logged {logged:?}")]
    Mismatch {
        producer: ProducerId,
        index: usize,
        sent: Option<RecordDigest>,
        logged: Option<RecordDigest>,
    },
}

/// Records delivered to the sequencer, per producer, in production order.
#[derive(Debug, Clone, Default)]
pub struct SentLedger {
    sent: BTreeMap<ProducerId, Vec<Record>>,
    total: usize,
}

impl SentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note one delivered record.
    pub fn note(&mut self, record: Record) {
        self.sent
            .entry(record.producer_id().clone())
            .or_default()
            .push(record);
        self.total += 1;
    }

    /// Note every record a round delivered.
    pub fn note_round(&mut self, report: &RoundReport) {
        for record in report.delivered_records() {
            self.note(record.clone());
        }
    }

    /// Total delivered records.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Records delivered by one producer.
    pub fn sent_by(&self, producer: &ProducerId) -> &[Record] {
        self.sent.get(producer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check `log` holds exactly the delivered records, each producer's in order.
    pub fn verify(&self, log: &[Record]) -> Result<(), LedgerViolation> {
        let mut logged: BTreeMap<&ProducerId, Vec<&Record>> = BTreeMap::new();
        for record in log {
            logged.entry(record.producer_id()).or_default().push(record);
        }

        if let Some(producer) = logged.keys().find(|p| !self.sent.contains_key(**p)) {
            return Err(LedgerViolation::UnknownProducer {
                producer: (*producer).clone(),
            });
        }

        for (producer, sent) in &self.sent {
            let theirs = logged.get(producer).map(Vec::as_slice).unwrap_or(&[]);
            let longest = sent.len().max(theirs.len());

            for index in 0..longest {
                let s = sent.get(index);
                let l = theirs.get(index).copied();
                if s != l {
                    return Err(LedgerViolation::Mismatch {
                        producer: producer.clone(),
                        index,
                        sent: s.map(Record::digest),
                        logged: l.map(Record::digest),
                    });
                }
            }
        }

        Ok(())
    }
}
