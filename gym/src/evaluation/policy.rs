//! Policies that choose one action per symbol from the current state

use crate::env::{Action, Observation, TradingEnv};
use crate::error::GymError;
use crate::Result;

/// Decision rule driven through an episode by the evaluation runner
pub trait Policy: Send {
    /// Get policy name
    fn name(&self) -> &str;

    /// Choose one action per symbol, in store order
    fn act(&mut self, observation: &Observation, env: &TradingEnv) -> Vec<Action>;

    /// Clear per-episode state
    fn reset(&mut self) {}
}

/// Never trades
#[derive(Debug, Clone, Default)]
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn name(&self) -> &str {
        "hold"
    }

    fn act(&mut self, _observation: &Observation, env: &TradingEnv) -> Vec<Action> {
        vec![Action::Hold; env.action_space().symbols]
    }
}

/// Buys on the first step and holds to the end
///
/// With several symbols the first one with a row takes all the cash.
#[derive(Debug, Clone, Default)]
pub struct BuyAndHoldPolicy;

impl Policy for BuyAndHoldPolicy {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn act(&mut self, _observation: &Observation, env: &TradingEnv) -> Vec<Action> {
        let action = if env.current_step() == 0 {
            Action::Buy
        } else {
            Action::Hold
        };
        vec![action; env.action_space().symbols]
    }
}

/// Mean-reversion on RSI thresholds
#[derive(Debug, Clone)]
pub struct RsiPolicy {
    /// Buy below this RSI
    pub oversold: f64,
    /// Sell above this RSI
    pub overbought: f64,
}

impl Default for RsiPolicy {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl Policy for RsiPolicy {
    fn name(&self) -> &str {
        "rsi"
    }

    fn act(&mut self, _observation: &Observation, env: &TradingEnv) -> Vec<Action> {
        (0..env.action_space().symbols)
            .map(|i| match env.current_features(i) {
                Some(row) if row.rsi_14 < self.oversold => Action::Buy,
                Some(row) if row.rsi_14 > self.overbought => Action::Sell,
                _ => Action::Hold,
            })
            .collect()
    }
}

/// Trend-following on MACD signal-line crosses
#[derive(Debug, Clone, Default)]
pub struct MacdCrossPolicy {
    prev_spread: Vec<Option<f64>>,
}

impl Policy for MacdCrossPolicy {
    fn name(&self) -> &str {
        "macd_cross"
    }

    fn act(&mut self, _observation: &Observation, env: &TradingEnv) -> Vec<Action> {
        let symbols = env.action_space().symbols;
        self.prev_spread.resize(symbols, None);

        (0..symbols)
            .map(|i| {
                let Some(row) = env.current_features(i) else {
                    return Action::Hold;
                };
                let spread = row.macd - row.macd_signal;
                let action = match self.prev_spread[i] {
                    Some(prev) if prev <= 0.0 && spread > 0.0 => Action::Buy,
                    Some(prev) if prev >= 0.0 && spread < 0.0 => Action::Sell,
                    _ => Action::Hold,
                };
                self.prev_spread[i] = Some(spread);
                action
            })
            .collect()
    }

    fn reset(&mut self) {
        self.prev_spread.clear();
    }
}

/// Names accepted by [`policy_by_name`]
pub const POLICY_NAMES: [&str; 4] = ["hold", "buy_and_hold", "rsi", "macd_cross"];

/// Build a built-in policy from its name
pub fn policy_by_name(name: &str) -> Result<Box<dyn Policy>> {
    match name {
        "hold" => Ok(Box::new(HoldPolicy)),
        "buy_and_hold" => Ok(Box::new(BuyAndHoldPolicy)),
        "rsi" => Ok(Box::new(RsiPolicy::default())),
        "macd_cross" => Ok(Box::new(MacdCrossPolicy::default())),
        other => Err(GymError::config(format!(
            "unknown policy {other}, expected one of {}",
            POLICY_NAMES.join(", ")
        ))),
    }
}
