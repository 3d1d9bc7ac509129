//! Convergence verification.
//!
//! After syncing, a replica can be compared record-by-record against the
//! authoritative log, or cheaply by a rolling digest over the whole sequence.

use std::fmt;

use logsync_core::{Record, RecordDigest};

/// Domain separator for log digests.
const LOG_DIGEST_DOMAIN: &[u8] = b"logsync-log-v0:";

/// Rolling Blake3 digest of an ordered sequence of records.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogDigest(pub [u8; 32]);

impl LogDigest {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for LogDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogDigest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for LogDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Compute the digest of a log.
///
/// Algorithm:
/// 1. Hash the domain prefix and the record count
/// 2. Hash each record digest in order
/// 3. Return the final hash
///
/// Equal digests mean the same records in the same order.
pub fn log_digest(records: &[Record]) -> LogDigest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(LOG_DIGEST_DOMAIN);
    hasher.update(&(records.len() as u64).to_be_bytes());

    for record in records {
        hasher.update(record.digest().as_bytes());
    }

    LogDigest(*hasher.finalize().as_bytes())
}

/// Result of comparing a replica with the authoritative log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceResult {
    /// Identical records in identical order.
    Converged,
    /// A strict prefix of the authoritative log (needs more rounds).
    Behind { local_len: u64, remote_len: u64 },
    /// Longer than the authoritative log, but agrees where both exist.
    Ahead { local_len: u64, remote_len: u64 },
    /// The two disagree at position `at`.
    Diverged {
        at: u64,
        local: RecordDigest,
        remote: RecordDigest,
    },
}

impl ConvergenceResult {
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceResult::Converged)
    }

    /// Whether the replica is a (possibly complete) prefix of the log.
    pub fn is_prefix(&self) -> bool {
        matches!(
            self,
            ConvergenceResult::Converged | ConvergenceResult::Behind { .. }
        )
    }
}

impl fmt::Display for ConvergenceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceResult::Converged => write!(f, "converged"),
            ConvergenceResult::Behind {
                local_len,
                remote_len,
            } => write!(f, "behind: local={local_len}, remote={remote_len}"),
            ConvergenceResult::Ahead {
                local_len,
                remote_len,
            } => write!(f, "ahead: local={local_len}, remote={remote_len}"),
            ConvergenceResult::Diverged { at, local, remote } => {
                write!(f, "diverged at {at}: local={local}, remote={remote}")
            }
        }
    }
}

/// Compare a replica against the authoritative log.
pub fn verify_convergence(local: &[Record], authoritative: &[Record]) -> ConvergenceResult {
    let mismatch = local
        .iter()
        .zip(authoritative)
        .position(|(l, r)| l != r);

    if let Some(at) = mismatch {
        return ConvergenceResult::Diverged {
            at: at as u64,
            local: local[at].digest(),
            remote: authoritative[at].digest(),
        };
    }

    let local_len = local.len() as u64;
    let remote_len = authoritative.len() as u64;

    match local_len.cmp(&remote_len) {
        std::cmp::Ordering::Equal => ConvergenceResult::Converged,
        std::cmp::Ordering::Less => ConvergenceResult::Behind {
            local_len,
            remote_len,
        },
        std::cmp::Ordering::Greater => ConvergenceResult::Ahead {
            local_len,
            remote_len,
        },
    }
}
