//! Evaluation runner: drive one policy through one episode

use crate::env::TradingEnv;
use crate::error::GymError;
use crate::evaluation::{MetricsCalculator, Policy};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Outcome of one evaluated episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Policy name
    pub policy: String,
    /// Starting portfolio value
    pub start_value: f64,
    /// Ending portfolio value
    pub end_value: f64,
    /// Total return
    pub total_return: f64,
    /// Total return percentage
    pub total_return_percent: f64,
    /// Sum of step rewards, shaping included
    pub total_reward: f64,
    /// Actions that moved shares
    pub num_fills: usize,
    pub steps: usize,
    /// Maximum drawdown as a fraction
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Market time covered by the episode
    pub real_world_minutes: u64,
    /// Portfolio value before the first step and after each step
    pub values: Vec<f64>,
}

/// Runs episodes, optionally stopping between steps when cancelled
#[derive(Debug, Clone, Default)]
pub struct EvaluationRunner {
    cancel: Option<Arc<AtomicBool>>,
}

impl EvaluationRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop at the next step boundary once `flag` is set
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Reset the environment and step it with `policy` until done
    pub fn run(&self, env: &mut TradingEnv, policy: &mut dyn Policy) -> Result<EvaluationResult> {
        policy.reset();
        let mut observation = env.reset()?;
        let start_value = env.total_value();
        let mut values = vec![start_value];
        let mut total_reward = 0.0;

        info!(
            "Evaluating {} over {} steps",
            policy.name(),
            env.episode_len() - 1
        );

        loop {
            if self.cancelled() {
                return Err(GymError::invalid_state(format!(
                    "evaluation cancelled at step {}",
                    env.current_step()
                )));
            }
            let actions = policy.act(&observation, env);
            let result = env.step(&actions)?;
            total_reward += result.reward;
            values.push(env.total_value());
            observation = result.observation;
            if result.done {
                break;
            }
        }

        let steps = env.current_step();
        let end_value = env.total_value();
        let total_return = end_value - start_value;
        let result = EvaluationResult {
            policy: policy.name().to_string(),
            start_value,
            end_value,
            total_return,
            total_return_percent: total_return / start_value * 100.0,
            total_reward,
            num_fills: env.episode_log().fills().count(),
            steps,
            max_drawdown: MetricsCalculator::max_drawdown(&values),
            sharpe_ratio: MetricsCalculator::sharpe_ratio(&values),
            real_world_minutes: steps as u64 * env.config().interval_minutes as u64,
            values,
        };

        info!(
            "{} finished: {:.2} -> {:.2} ({:.2}%)",
            result.policy, start_value, end_value, result.total_return_percent
        );
        Ok(result)
    }

    /// Run one episode and write its trade and action logs
    pub fn run_and_log(
        &self,
        env: &mut TradingEnv,
        policy: &mut dyn Policy,
        trade_log: impl AsRef<Path>,
        action_log: impl AsRef<Path>,
    ) -> Result<EvaluationResult> {
        let result = self.run(env, policy)?;
        env.episode_log().write_trade_log(trade_log)?;
        env.episode_log().write_action_log(action_log)?;
        Ok(result)
    }
}
