//! Unreliable delivery.
//!
//! Every leg of the protocol (produce, probe, update) may silently lose a
//! whole message. A [`Channel`] decides, one message at a time, whether the
//! message arrives unchanged or becomes `None`. The protocol core never draws
//! randomness itself, so tests can script loss exactly while simulations
//! draw it from a seeded RNG.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{check_probability, Result};

/// Decides delivery of one message at a time.
pub trait Channel: Send {
    /// Whether the next message gets through.
    fn deliver(&mut self) -> bool;
}

/// Extension trait applying a [`Channel`] decision to a message.
pub trait ChannelExt: Channel {
    /// Deliver `message` unchanged or lose it.
    ///
    /// A decision is consumed only when there is a message to decide on, so
    /// scripted channels line up with the messages actually sent.
    fn transmit<M>(&mut self, message: Option<M>) -> Option<M> {
        let message = message?;
        if self.deliver() {
            Some(message)
        } else {
            tracing::trace!("message lost in transit");
            None
        }
    }
}

impl<C: Channel + ?Sized> ChannelExt for C {}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn deliver(&mut self) -> bool {
        (**self).deliver()
    }
}

/// Delivers everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reliable;

impl Channel for Reliable {
    fn deliver(&mut self) -> bool {
        true
    }
}

/// Drops each message independently with a fixed probability.
#[derive(Debug, Clone)]
pub struct Lossy {
    rng: StdRng,
    drop_probability: f64,
}

impl Lossy {
    /// Create a seeded lossy channel. `drop_probability` must be in `[0, 1]`.
    pub fn new(drop_probability: f64, seed: u64) -> Result<Self> {
        check_probability("drop probability", drop_probability)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            drop_probability,
        })
    }

    pub fn drop_probability(&self) -> f64 {
        self.drop_probability
    }
}

impl Channel for Lossy {
    fn deliver(&mut self) -> bool {
        !self.rng.gen_bool(self.drop_probability)
    }
}

/// Follows a fixed list of decisions, then a fallback.
#[derive(Debug, Clone)]
pub struct Scripted {
    decisions: VecDeque<bool>,
    fallback: bool,
}

impl Scripted {
    /// `decisions` are used in order; `fallback` applies once they run out.
    pub fn new(decisions: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            fallback,
        }
    }

    /// Lose the next `count` messages, then deliver everything.
    pub fn drop_first(count: usize) -> Self {
        Self::new(std::iter::repeat(false).take(count), true)
    }

    /// Lose everything.
    pub fn severed() -> Self {
        Self::new([], false)
    }

    /// Decisions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl Channel for Scripted {
    fn deliver(&mut self) -> bool {
        self.decisions.pop_front().unwrap_or(self.fallback)
    }
}

/// Per-leg loss settings for one device.
///
/// Defaults reproduce the loss profile the protocol was designed against:
/// half of all probes are never issued and most responses are lost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossConfig {
    /// Chance a produce message is lost on the way to the sequencer.
    pub produce: f64,
    /// Chance a device does not issue a probe in a round.
    pub probe_skip: f64,
    /// Chance an issued probe is lost on the way to the sequencer.
    pub probe: f64,
    /// Chance an update is lost on the way back.
    pub update: f64,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            produce: 0.0,
            probe_skip: 0.5,
            probe: 0.0,
            update: 0.6,
        }
    }
}

impl LossConfig {
    /// No loss anywhere.
    pub fn none() -> Self {
        Self {
            produce: 0.0,
            probe_skip: 0.0,
            probe: 0.0,
            update: 0.0,
        }
    }

    /// Check every probability is in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_probability("loss.produce", self.produce)?;
        check_probability("loss.probe_skip", self.probe_skip)?;
        check_probability("loss.probe", self.probe)?;
        check_probability("loss.update", self.update)
    }
}

/// The three delivery legs between one device and the sequencer.
pub struct Links {
    pub produce: Box<dyn Channel>,
    pub probe: Box<dyn Channel>,
    pub update: Box<dyn Channel>,
}

impl Links {
    /// Lossless links.
    pub fn reliable() -> Self {
        Self {
            produce: Box::new(Reliable),
            probe: Box::new(Reliable),
            update: Box::new(Reliable),
        }
    }

    /// Independently seeded lossy links.
    pub fn lossy(config: &LossConfig, seed: u64) -> Result<Self> {
        Ok(Self {
            produce: Box::new(Lossy::new(config.produce, seed)?),
            probe: Box::new(Lossy::new(config.probe, seed.wrapping_add(1))?),
            update: Box::new(Lossy::new(config.update, seed.wrapping_add(2))?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    #[test]
    fn test_reliable_delivers() {
        let mut channel = Reliable;
        assert_eq!(channel.transmit(Some(7)), Some(7));
    }

    #[test]
    fn test_absent_message_stays_absent_without_consuming() {
        let mut channel = Scripted::new([true], false);
        assert_eq!(channel.transmit::<u8>(None), None);
        assert_eq!(channel.remaining(), 1);
        assert_eq!(channel.transmit(Some(1)), Some(1));
    }

    #[test]
    fn test_scripted_then_fallback() {
        let mut channel = Scripted::drop_first(2);
        assert_eq!(channel.transmit(Some(1)), None);
        assert_eq!(channel.transmit(Some(2)), None);
        assert_eq!(channel.transmit(Some(3)), Some(3));
        assert_eq!(channel.transmit(Some(4)), Some(4));
    }

    #[test]
    fn test_severed_loses_everything() {
        let mut channel = Scripted::severed();
        assert!((0..10).all(|n| channel.transmit(Some(n)).is_none()));
    }

    #[test]
    fn test_lossy_extremes() {
        let mut never = Lossy::new(0.0, 1).unwrap();
        let mut always = Lossy::new(1.0, 1).unwrap();
        for n in 0..100 {
            assert_eq!(never.transmit(Some(n)), Some(n));
            assert_eq!(always.transmit(Some(n)), None);
        }
    }

    #[test]
    fn test_lossy_is_deterministic_per_seed() {
        let mut a = Lossy::new(0.5, 42).unwrap();
        let mut b = Lossy::new(0.5, 42).unwrap();
        let da: Vec<bool> = (0..64).map(|_| a.deliver()).collect();
        let db: Vec<bool> = (0..64).map(|_| b.deliver()).collect();
        assert_eq!(da, db);
        assert!(da.iter().any(|d| *d));
        assert!(da.iter().any(|d| !*d));
    }

    #[test]
    fn test_lossy_rejects_bad_probability() {
        assert!(matches!(Lossy::new(1.5, 0), Err(SyncError::InvalidConfig(_))));
        assert!(matches!(Lossy::new(f64::NAN, 0), Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn test_boxed_channel_transmits() {
        let mut links = Links::reliable();
        assert_eq!(links.update.transmit(Some("x")), Some("x"));
    }

    #[test]
    fn test_loss_config_validate() {
        assert!(LossConfig::default().validate().is_ok());
        let bad = LossConfig {
            update: -0.1,
            ..LossConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
