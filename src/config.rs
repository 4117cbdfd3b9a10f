//! Training configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reward::RewardConfig;

/// Hyperparameters for a training run.
///
/// Missing fields in a JSON document fall back to the defaults below.
///
/// # Examples
///
/// ```
/// use gridq::TrainingConfig;
///
/// let config = TrainingConfig::default()
///     .with_episodes(500)
///     .with_greedy_episodes(100)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert!((config.epsilon_step() - 0.1 / 400.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Exploration rate at the start of training
    pub initial_epsilon: f32,
    /// Step size of the temporal-difference update
    pub learning_rate: f32,
    /// Discount applied to the successor value
    pub discount: f32,
    /// Number of episodes to run
    pub episodes: usize,
    /// Trailing episodes during which epsilon has already decayed to zero
    pub greedy_episodes: usize,
    /// Hard cap on moves per episode
    pub max_steps: usize,
    /// Compute the reference error count every this many episodes
    pub report_interval: usize,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    pub reward: RewardConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            initial_epsilon: 0.1,
            learning_rate: 0.9,
            discount: 0.9,
            episodes: 3500,
            greedy_episodes: 250,
            max_steps: 99,
            report_interval: 10,
            seed: None,
            reward: RewardConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("read config {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_greedy_episodes(mut self, greedy_episodes: usize) -> Self {
        self.greedy_episodes = greedy_episodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_initial_epsilon(mut self, epsilon: f32) -> Self {
        self.initial_epsilon = epsilon;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    /// Amount epsilon drops after each episode that ends on a terminal move.
    pub fn epsilon_step(&self) -> f32 {
        let exploring = self.episodes.saturating_sub(self.greedy_episodes).max(1);
        self.initial_epsilon / exploring as f32
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(Error::invalid_config(format!(
                "learning_rate {} outside [0, 1]",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(Error::invalid_config(format!(
                "discount {} outside [0, 1]",
                self.discount
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_epsilon) {
            return Err(Error::invalid_config(format!(
                "initial_epsilon {} outside [0, 1]",
                self.initial_epsilon
            )));
        }
        if self.episodes == 0 {
            return Err(Error::invalid_config("episodes must be positive"));
        }
        if self.greedy_episodes >= self.episodes {
            return Err(Error::invalid_config(format!(
                "greedy_episodes ({}) must be fewer than episodes ({})",
                self.greedy_episodes, self.episodes
            )));
        }
        if self.max_steps == 0 {
            return Err(Error::invalid_config("max_steps must be positive"));
        }
        if self.report_interval == 0 {
            return Err(Error::invalid_config("report_interval must be positive"));
        }
        Ok(())
    }
}
