//! Trading environment state machine

use crate::config::EnvConfig;
use crate::data::{FeatureStore, MarketFeatures};
use crate::env::observation::build_observation;
use crate::env::reward::{shaping_term, step_reward};
use crate::env::{
    Action, ActionSpace, EnvStatus, EpisodeCursor, Observation, ObservationSpace,
};
use crate::error::GymError;
use crate::log::{EpisodeLog, TradeRecord};
use crate::portfolio::{Ledger, Position};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extra data returned with every step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Symbols without a row at the new step, zero-filled in the observation
    pub zero_filled: Vec<String>,
}

/// Result of taking a step in the environment
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Observation at the new step
    pub observation: Observation,
    pub reward: f64,
    /// True once the last row has been reached
    pub done: bool,
    pub info: StepInfo,
}

/// Lockstep multi-symbol trading environment
///
/// Owns its ledger and cursor; the feature store is shared read-only. Given
/// the same store, config and action sequence, every episode reproduces the
/// same observations and rewards.
pub struct TradingEnv {
    store: Arc<FeatureStore>,
    config: EnvConfig,
    ledger: Ledger,
    cursor: EpisodeCursor,
    status: EnvStatus,
    observation_space: ObservationSpace,
    action_space: ActionSpace,
    log: EpisodeLog,
    total_value: f64,
    /// Most recent close seen per symbol this episode, used to mark gaps
    last_close: Vec<Option<f64>>,
    episodes: u64,
}

impl TradingEnv {
    /// Create an environment over a shared feature store
    pub fn new(store: Arc<FeatureStore>, config: EnvConfig) -> Result<Self> {
        config.validate()?;
        if store.episode_len() < 2 {
            return Err(GymError::config(format!(
                "episode needs at least 2 steps, store has {}",
                store.episode_len()
            )));
        }

        let symbols = store.num_symbols();
        let ledger = Ledger::new(store.symbols(), config.initial_balance)?;
        let observation_space = ObservationSpace::new(config.layout, symbols);
        let action_space = ActionSpace::new(symbols);

        info!(
            "Trading environment created: {} symbols, {} steps, observation {:?}",
            symbols,
            store.episode_len(),
            observation_space.shape
        );

        Ok(Self {
            cursor: EpisodeCursor::new(store.episode_len()),
            total_value: config.initial_balance,
            store,
            config,
            ledger,
            status: EnvStatus::Uninitialized,
            observation_space,
            action_space,
            log: EpisodeLog::new(),
            last_close: vec![None; symbols],
            episodes: 0,
        })
    }

    pub fn observation_space(&self) -> &ObservationSpace {
        &self.observation_space
    }

    pub fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    /// Start a new episode and return its first observation
    pub fn reset(&mut self) -> Result<Observation> {
        self.ledger.reset();
        self.cursor.reset();
        self.log.clear();
        self.total_value = self.config.initial_balance;
        self.last_close.iter_mut().for_each(|c| *c = None);
        self.episodes += 1;

        let (observation, _) = self.observe()?;
        self.status = EnvStatus::Ready;
        debug!("Episode {} reset", self.episodes);
        Ok(observation)
    }

    /// Apply one action per symbol, in store order, and advance one step
    pub fn step(&mut self, actions: &[Action]) -> Result<StepResult> {
        if !self.status.accepts_step() {
            return Err(match self.status {
                EnvStatus::Done => GymError::invalid_state("episode ended, call reset"),
                _ => GymError::invalid_state("environment not reset, call reset"),
            });
        }
        if actions.len() != self.action_space.symbols {
            return Err(GymError::config(format!(
                "expected {} actions, got {}",
                self.action_space.symbols,
                actions.len()
            )));
        }

        let step = self.cursor.step();
        let mut prices: Vec<Option<f64>> = Vec::with_capacity(actions.len());
        let mut fills = Vec::with_capacity(actions.len());
        let mut shaping = 0.0;

        for (i, &action) in actions.iter().enumerate() {
            match self.store.row(i, step) {
                Ok(row) => {
                    let fill = self.ledger.apply(action, i, row.close);
                    shaping += shaping_term(&self.config.reward, row, action);
                    self.last_close[i] = Some(row.close);
                    fills.push((i, fill));
                }
                Err(e) if e.is_recoverable() => {
                    // held shares stay marked at the last observed close
                    warn!("{}, skipping {}", e, action);
                }
                Err(e) => return Err(e),
            }
            prices.push(self.last_close[i]);
        }

        self.total_value = self.ledger.mark_to_market(&prices);
        let reward = step_reward(self.total_value, self.config.initial_balance, shaping);

        for (i, fill) in fills {
            self.log.push(TradeRecord {
                step,
                symbol: self.store.symbols()[i].clone(),
                action: fill.action,
                price: fill.price,
                shares: fill.shares,
                portfolio_value: self.total_value,
            });
        }

        self.cursor.advance();
        let done = self.cursor.is_terminal();
        let (observation, zero_filled) = self.observe()?;

        if done {
            self.status = EnvStatus::Done;
            self.log.mark_complete();
            info!(
                "Episode {} done after {} steps, total value {:.2}",
                self.episodes,
                self.cursor.step(),
                self.total_value
            );
        } else {
            self.status = EnvStatus::Running;
        }

        debug!(
            "Step {}: reward {:.4}, total value {:.2}, cash {:.2}",
            step,
            reward,
            self.total_value,
            self.ledger.cash()
        );

        Ok(StepResult {
            observation,
            reward,
            done,
            info: StepInfo { zero_filled },
        })
    }

    /// Step with integer actions (0=Hold, 1=Buy, 2=Sell)
    pub fn step_indices(&mut self, actions: &[u8]) -> Result<StepResult> {
        let actions = actions
            .iter()
            .map(|&a| Action::try_from(a))
            .collect::<Result<Vec<_>>>()?;
        self.step(&actions)
    }

    /// Human-readable summary of the current state
    pub fn render(&self) -> String {
        let positions = self
            .ledger
            .positions()
            .iter()
            .map(|p| format!("{}={}", p.symbol, p.shares))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Step: {}, Balance: {:.2}, Positions: {{{}}}, Total Value: {:.2}",
            self.cursor.step(),
            self.ledger.cash(),
            positions,
            self.total_value
        )
    }

    fn observe(&self) -> Result<(Observation, Vec<String>)> {
        let (observation, zero_filled) = build_observation(
            self.config.layout,
            &self.store,
            &self.ledger,
            self.cursor.step(),
        );
        if observation.len() != self.observation_space.width() {
            return Err(GymError::config(format!(
                "observation has {} values, declared shape is {:?}",
                observation.len(),
                self.observation_space.shape
            )));
        }
        for symbol in &zero_filled {
            warn!(
                "{} has no row at step {}, observation slot zero-filled",
                symbol,
                self.cursor.step()
            );
        }
        Ok((observation, zero_filled))
    }

    /// Feature row of a symbol at the current step
    pub fn current_features(&self, symbol: usize) -> Option<&MarketFeatures> {
        self.store.get(symbol, self.cursor.step())
    }

    pub fn status(&self) -> EnvStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status == EnvStatus::Done
    }

    pub fn current_step(&self) -> usize {
        self.cursor.step()
    }

    pub fn episode_len(&self) -> usize {
        self.cursor.len()
    }

    /// Episodes started since construction
    pub fn episodes(&self) -> u64 {
        self.episodes
    }

    pub fn cash(&self) -> f64 {
        self.ledger.cash()
    }

    pub fn positions(&self) -> &[Position] {
        self.ledger.positions()
    }

    /// Portfolio value as of the last step (initial balance before any step)
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    pub fn episode_log(&self) -> &EpisodeLog {
        &self.log
    }

    pub fn symbols(&self) -> &[String] {
        self.store.symbols()
    }

    pub fn store(&self) -> &Arc<FeatureStore> {
        &self.store
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}
