//! Trading-Gym: a deterministic trading environment for RL policies
//!
//! This crate turns historical intraday OHLCV series into a reproducible
//! market model that a reinforcement-learning trainer can drive through
//! `reset`/`step`, using:
//! - [ta-rs](https://github.com/greyblake/ta-rs) for the moving-average recurrences
//!
//! # Features
//!
//! - **Indicator Pipeline**: EMA, RSI, MACD, candlestick flags and VWAP per tick
//! - **Feature Store**: validated, index-addressed feature rows shared across episodes
//! - **Portfolio Ledger**: whole-share cash/position bookkeeping and mark-to-market
//! - **Trading Environment**: lockstep multi-symbol state machine with shaped rewards
//! - **Evaluation**: policy episodes, trade/action logs and performance reports
//! - **Sessions**: supervised background training jobs with timeout and cancellation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trading_gym::prelude::*;
//!
//! fn main() -> trading_gym::Result<()> {
//!     let rows = read_feature_table("prepared_data.csv")?;
//!     let store = Arc::new(FeatureStore::new(rows, Alignment::Index)?);
//!     let mut env = TradingEnv::new(store, EnvConfig::default())?;
//!
//!     let mut observation = env.reset()?;
//!     loop {
//!         let actions = vec![Action::Hold; env.action_space().symbols];
//!         let result = env.step(&actions)?;
//!         observation = result.observation;
//!         if result.done {
//!             break;
//!         }
//!     }
//!     println!("{} -> {}", env.render(), observation.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod env;
pub mod error;
pub mod evaluation;
pub mod indicators;
pub mod log;
pub mod portfolio;
pub mod session;

pub use error::GymError;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::env::*;
    pub use crate::error::GymError;
    pub use crate::evaluation::*;
    pub use crate::indicators::*;
    pub use crate::log::*;
    pub use crate::portfolio::*;
    pub use crate::session::*;
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GymError>;
