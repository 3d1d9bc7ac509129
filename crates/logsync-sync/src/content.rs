//! Content sources for producers.
//!
//! A producer does not invent payloads; it asks a [`ContentSource`]. "Nothing
//! new this round" is a normal answer.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use logsync_core::Payload;

use crate::error::{check_probability, Result, SyncError};

/// Supplies payloads for new records.
pub trait ContentSource: Send {
    /// The next payload, or `None` when there is no new data.
    fn next_payload(&mut self) -> Option<Payload>;
}

/// Settings for [`RandomContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Fixed set of payload keys.
    pub keys: Vec<String>,
    /// Chance a round yields no new data.
    pub skip_probability: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            keys: vec!["a".into(), "b".into(), "c".into()],
            skip_probability: 0.4,
        }
    }
}

impl ContentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(SyncError::InvalidConfig("content.keys must not be empty".into()));
        }
        check_probability("content.skip_probability", self.skip_probability)
    }
}

/// Random payloads: every key maps to 16 random bytes, hex encoded.
#[derive(Debug, Clone)]
pub struct RandomContent {
    rng: StdRng,
    config: ContentConfig,
}

impl RandomContent {
    pub fn new(config: ContentConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        })
    }
}

impl ContentSource for RandomContent {
    fn next_payload(&mut self) -> Option<Payload> {
        if self.rng.gen_bool(self.config.skip_probability) {
            return None;
        }

        let mut payload = Payload::new();
        for key in &self.config.keys {
            let value: [u8; 16] = self.rng.gen();
            payload.insert(key.clone(), hex::encode(value));
        }
        Some(payload)
    }
}

/// Plays back a fixed queue of answers, then reports no new data.
#[derive(Debug, Clone, Default)]
pub struct ScriptedContent {
    queue: VecDeque<Option<Payload>>,
}

impl ScriptedContent {
    pub fn new(answers: impl IntoIterator<Item = Option<Payload>>) -> Self {
        Self {
            queue: answers.into_iter().collect(),
        }
    }

    /// Queue another answer.
    pub fn push(&mut self, answer: Option<Payload>) {
        self.queue.push_back(answer);
    }
}

impl ContentSource for ScriptedContent {
    fn next_payload(&mut self) -> Option<Payload> {
        self.queue.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_content_uses_all_keys() {
        let config = ContentConfig {
            skip_probability: 0.0,
            ..ContentConfig::default()
        };
        let mut source = RandomContent::new(config, 7).unwrap();
        let payload = source.next_payload().unwrap();

        assert_eq!(payload.len(), 3);
        for key in ["a", "b", "c"] {
            assert_eq!(payload.get(key).map(str::len), Some(32));
        }
    }

    #[test]
    fn test_random_content_always_skips() {
        let config = ContentConfig {
            skip_probability: 1.0,
            ..ContentConfig::default()
        };
        let mut source = RandomContent::new(config, 7).unwrap();
        assert!((0..20).all(|_| source.next_payload().is_none()));
    }

    #[test]
    fn test_random_content_values_differ() {
        let config = ContentConfig {
            skip_probability: 0.0,
            ..ContentConfig::default()
        };
        let mut source = RandomContent::new(config, 7).unwrap();
        assert_ne!(source.next_payload(), source.next_payload());
    }

    #[test]
    fn test_content_config_rejects_no_keys() {
        let config = ContentConfig {
            keys: vec![],
            ..ContentConfig::default()
        };
        assert!(RandomContent::new(config, 0).is_err());
    }

    #[test]
    fn test_scripted_content_plays_back_then_dries_up() {
        let mut source = ScriptedContent::new([Some(Payload::new().with("x", "1")), None]);
        assert_eq!(source.next_payload(), Some(Payload::new().with("x", "1")));
        assert_eq!(source.next_payload(), None);
        assert_eq!(source.next_payload(), None);
    }
}
