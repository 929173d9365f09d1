//! Reward shaping configuration

use serde::{Deserialize, Serialize};

/// Additive indicator-based reward terms, summed per symbol each step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardShaping {
    /// Subtracted on a doji bar
    pub doji_penalty: f64,
    /// Added on a hammer bar
    pub hammer_bonus: f64,
    /// Added on an engulfing bar
    pub engulfing_bonus: f64,
    /// Added for buying below VWAP or selling above it
    pub vwap_bonus: f64,
}

impl RewardShaping {
    /// No shaping: reward is the plain mark-to-market profit
    pub fn disabled() -> Self {
        Self {
            doji_penalty: 0.0,
            hammer_bonus: 0.0,
            engulfing_bonus: 0.0,
            vwap_bonus: 0.0,
        }
    }

    pub fn is_disabled(&self) -> bool {
        *self == Self::disabled()
    }

    pub(crate) fn is_finite(&self) -> bool {
        [
            self.doji_penalty,
            self.hammer_bonus,
            self.engulfing_bonus,
            self.vwap_bonus,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self {
            doji_penalty: 5.0,
            hammer_bonus: 5.0,
            engulfing_bonus: 10.0,
            vwap_bonus: 10.0,
        }
    }
}
