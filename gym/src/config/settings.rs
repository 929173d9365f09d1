//! Environment configuration

use crate::config::RewardShaping;
use crate::env::ObservationLayout;
use crate::error::GymError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trading environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Opening cash of every episode
    pub initial_balance: f64,
    /// Observation vector layout
    pub layout: ObservationLayout,
    /// Reward shaping terms
    pub reward: RewardShaping,
    /// Bar interval, used to express episodes in real-world minutes
    pub interval_minutes: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            layout: ObservationLayout::Compact,
            reward: RewardShaping::default(),
            interval_minutes: 5,
        }
    }
}

impl EnvConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_initial_balance(mut self, balance: f64) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn with_layout(mut self, layout: ObservationLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_reward(mut self, reward: RewardShaping) -> Self {
        self.reward = reward;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(GymError::config(format!(
                "initial balance must be finite and positive, got {}",
                self.initial_balance
            )));
        }
        if !self.reward.is_finite() {
            return Err(GymError::config("reward shaping terms must be finite"));
        }
        if self.interval_minutes == 0 {
            return Err(GymError::config("interval_minutes must be at least 1"));
        }
        Ok(())
    }
}
