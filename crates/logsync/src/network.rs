//! The driving loop: one sequencer, many lossy producers.
//!
//! Each round visits every device in order. A device offers a new record to
//! the sequencer, then tries to catch up:
//!
//! ```text
//! generate ──produce leg──▶ sequencer.handle
//! build_probe ──probe leg──▶ sequencer.handle ──update leg──▶ apply_response
//! ```
//!
//! Any leg may lose its message. Once production stops, [`SyncNetwork::settle`]
//! keeps running probe-only rounds until every replica has caught up.

use serde::{Deserialize, Serialize};

use logsync_core::{Clock, ProducerId, Record, SystemClock};
use logsync_sync::{
    log_digest, verify_convergence, ApplyOutcome, ChannelExt, ContentConfig, Links, LogDigest,
    LossConfig, Lossy, Message, RandomContent, Replica, Sequencer, SequencerConfig, SyncError,
};

use crate::error::{NetworkError, Result};

/// Configuration for a simulated network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of producer devices.
    pub devices: usize,
    /// Per-leg loss for every device.
    pub loss: LossConfig,
    /// Payload generation for every device.
    pub content: ContentConfig,
    /// Seed all per-device randomness is derived from.
    pub seed: u64,
    /// Probe-only rounds [`SyncNetwork::settle`] runs before giving up.
    pub max_settle_rounds: u64,
    /// Cap on records per update. `None` sends the whole suffix.
    pub max_update_records: Option<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            devices: 10,
            loss: LossConfig::default(),
            content: ContentConfig::default(),
            seed: 0,
            max_settle_rounds: 10_000,
            max_update_records: None,
        }
    }
}

impl NetworkConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| NetworkError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.devices == 0 {
            return Err(NetworkError::InvalidConfig("devices must be at least 1".into()));
        }
        if self.max_settle_rounds == 0 {
            return Err(NetworkError::InvalidConfig(
                "max_settle_rounds must be at least 1".into(),
            ));
        }
        if self.max_update_records == Some(0) {
            return Err(NetworkError::InvalidConfig(
                "max_update_records must be at least 1 when set".into(),
            ));
        }
        self.loss.validate()?;
        self.content.validate()?;
        Ok(())
    }

    fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            max_update_records: self.max_update_records,
        }
    }
}

/// A record generated during a round and whether the sequencer got it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Produced {
    /// Index of the producing device.
    pub device: usize,
    pub record: Record,
    pub delivered: bool,
}

/// What happened during one [`SyncNetwork::round`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: u64,
    /// Every record generated this round, in device order.
    pub produced: Vec<Produced>,
    /// Probes the devices chose to issue.
    pub probes_issued: usize,
    /// Updates that made it back to a device.
    pub updates_delivered: usize,
    /// Updates that changed a replica.
    pub applied: usize,
}

impl RoundReport {
    /// Records that reached the sequencer this round.
    pub fn delivered_records(&self) -> impl Iterator<Item = &Record> {
        self.produced
            .iter()
            .filter(|p| p.delivered)
            .map(|p| &p.record)
    }
}

/// Result of a successful [`SyncNetwork::settle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleReport {
    /// Probe-only rounds it took.
    pub rounds: u64,
    /// Final length of the authoritative log.
    pub log_len: u64,
    /// Digest every replica now shares.
    pub digest: LogDigest,
}

struct Device {
    replica: Replica,
    links: Links,
}

/// What happened when one device tried to catch up.
struct CatchUp {
    probe_issued: bool,
    outcome: ApplyOutcome,
}

/// A sequencer plus a fixed set of producer devices.
pub struct SyncNetwork {
    config: NetworkConfig,
    sequencer: Sequencer,
    devices: Vec<Device>,
    rounds: u64,
}

impl SyncNetwork {
    /// Build a network whose devices stamp records with the system clock.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Build a network whose devices all read `clock`.
    pub fn with_clock<C>(config: NetworkConfig, clock: C) -> Result<Self>
    where
        C: Clock + Clone + 'static,
    {
        config.validate()?;

        let devices = (0..config.devices)
            .map(|index| -> Result<Device> {
                let seed = device_seed(config.seed, index);
                let producer_id =
                    ProducerId::new(format!("dev_{index}")).map_err(SyncError::from)?;
                let content = RandomContent::new(config.content.clone(), seed.wrapping_add(3))?;
                let probe_gate = Lossy::new(config.loss.probe_skip, seed.wrapping_add(4))?;

                Ok(Device {
                    replica: Replica::new(producer_id, content, clock.clone())
                        .with_probe_gate(probe_gate),
                    links: Links::lossy(&config.loss, seed)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(devices = devices.len(), seed = config.seed, "network built");

        Ok(Self {
            sequencer: Sequencer::new(config.sequencer_config()),
            config,
            devices,
            rounds: 0,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Replicas in device order.
    pub fn replicas(&self) -> impl Iterator<Item = &Replica> {
        self.devices.iter().map(|d| &d.replica)
    }

    pub fn replica(&self, index: usize) -> Option<&Replica> {
        self.devices.get(index).map(|d| &d.replica)
    }

    /// Production rounds run so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Run one production round over every device.
    pub fn round(&mut self) -> RoundReport {
        self.rounds += 1;
        let mut report = RoundReport {
            round: self.rounds,
            ..RoundReport::default()
        };

        for (index, device) in self.devices.iter_mut().enumerate() {
            let generated = device.replica.generate();
            let record = match &generated {
                Some(Message::Record(record)) => Some(record.clone()),
                _ => None,
            };
            let arrived = device.links.produce.transmit(generated);
            if let Some(record) = record {
                report.produced.push(Produced {
                    device: index,
                    record,
                    delivered: arrived.is_some(),
                });
            }
            self.sequencer.handle(arrived);

            let exchange = catch_up(&self.sequencer, device);
            report.tally(&exchange);
        }

        tracing::trace!(
            round = report.round,
            produced = report.produced.len(),
            applied = report.applied,
            "round complete"
        );
        report
    }

    /// Whether every replica holds as many records as the authoritative log.
    pub fn is_settled(&self) -> bool {
        let log_len = self.sequencer.len();
        self.replicas().all(|r| r.len() == log_len)
    }

    /// Run probe-only rounds until every replica has caught up.
    pub fn settle(&mut self) -> Result<SettleReport> {
        let mut rounds = 0;

        while !self.is_settled() {
            if rounds >= self.config.max_settle_rounds {
                tracing::warn!(rounds, log_len = self.sequencer.len(), "network did not settle");
                return Err(NetworkError::NotConverged { rounds });
            }
            for device in &mut self.devices {
                catch_up(&self.sequencer, device);
            }
            rounds += 1;
        }

        let log = self.sequencer.snapshot();
        let report = SettleReport {
            rounds,
            log_len: log.len() as u64,
            digest: log_digest(&log),
        };
        tracing::info!(
            rounds,
            log_len = report.log_len,
            digest = %report.digest,
            "network settled"
        );
        Ok(report)
    }

    /// Check every replica against the authoritative log.
    pub fn verify(&self) -> Result<()> {
        let log = self.sequencer.snapshot();
        for replica in self.replicas() {
            let result = verify_convergence(replica.records(), &log);
            if !result.is_converged() {
                return Err(NetworkError::Diverged {
                    device: replica.producer_id().clone(),
                    result,
                });
            }
        }
        Ok(())
    }
}

impl RoundReport {
    fn tally(&mut self, exchange: &CatchUp) {
        if exchange.probe_issued {
            self.probes_issued += 1;
        }
        if exchange.outcome != ApplyOutcome::NoMessage {
            self.updates_delivered += 1;
        }
        if exchange.outcome.is_applied() {
            self.applied += 1;
        }
    }
}

/// One probe/update exchange between a device and the sequencer.
fn catch_up(sequencer: &Sequencer, device: &mut Device) -> CatchUp {
    let probe = device.replica.build_probe();
    let probe_issued = probe.is_some();

    let probe = device.links.probe.transmit(probe);
    let response = device.links.update.transmit(sequencer.handle(probe));
    let outcome = device.replica.apply_response(response);

    CatchUp {
        probe_issued,
        outcome,
    }
}

/// Spread the network seed so devices draw independent streams.
fn device_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsync_core::ManualClock;

    fn lossless(devices: usize) -> NetworkConfig {
        NetworkConfig {
            devices,
            loss: LossConfig::none(),
            content: ContentConfig {
                skip_probability: 0.0,
                ..ContentConfig::default()
            },
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = NetworkConfig::from_json(r#"{"devices": 3, "seed": 9}"#).unwrap();
        assert_eq!(config.devices, 3);
        assert_eq!(config.seed, 9);
        assert_eq!(config.loss, LossConfig::default());
        assert_eq!(config.max_settle_rounds, 10_000);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            NetworkConfig::from_json(r#"{"devices": 0}"#),
            Err(NetworkError::InvalidConfig(_))
        ));
        assert!(matches!(
            NetworkConfig::from_json(r#"{"loss": {"update": 2.0}}"#),
            Err(NetworkError::Sync(SyncError::InvalidConfig(_)))
        ));
        assert!(matches!(
            NetworkConfig::from_json("not json"),
            Err(NetworkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_devices_are_named_in_order() {
        let network = SyncNetwork::new(lossless(3)).unwrap();
        let names: Vec<_> = network
            .replicas()
            .map(|r| r.producer_id().as_str().to_string())
            .collect();
        assert_eq!(names, ["dev_0", "dev_1", "dev_2"]);
    }

    #[test]
    fn test_lossless_round_keeps_everyone_current_except_earlier_devices() {
        let mut network = SyncNetwork::with_clock(lossless(3), ManualClock::new(0)).unwrap();
        let report = network.round();

        assert_eq!(report.round, 1);
        assert_eq!(report.produced.len(), 3);
        assert!(report.produced.iter().all(|p| p.delivered));
        assert_eq!(network.sequencer().len(), 3);

        // Device i caught up right after appending, before later devices.
        let lens: Vec<u64> = network.replicas().map(Replica::len).collect();
        assert_eq!(lens, [1, 2, 3]);
        assert!(!network.is_settled());

        let settled = network.settle().unwrap();
        assert_eq!(settled.rounds, 1);
        assert_eq!(settled.log_len, 3);
        network.verify().unwrap();
    }

    #[test]
    fn test_severed_updates_never_settle() {
        let mut config = lossless(2);
        config.loss.update = 1.0;
        config.max_settle_rounds = 5;

        let mut network = SyncNetwork::new(config).unwrap();
        network.round();
        assert!(matches!(
            network.settle(),
            Err(NetworkError::NotConverged { rounds: 5 })
        ));
        assert!(matches!(
            network.verify(),
            Err(NetworkError::Diverged { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_log() {
        let config = NetworkConfig {
            devices: 4,
            seed: 17,
            ..NetworkConfig::default()
        };
        let clock = ManualClock::new(1_000);
        let mut a = SyncNetwork::with_clock(config.clone(), clock.clone()).unwrap();
        let mut b = SyncNetwork::with_clock(config, clock).unwrap();

        for _ in 0..50 {
            assert_eq!(a.round(), b.round());
        }
        assert_eq!(a.sequencer().snapshot(), b.sequencer().snapshot());
    }
}
