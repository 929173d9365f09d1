//! Step reward

use crate::config::RewardShaping;
use crate::data::MarketFeatures;
use crate::env::Action;

/// Shaping contribution of one symbol's bar and action
///
/// Pattern terms apply whatever the action; the VWAP term rewards buying
/// below VWAP and selling above it.
pub fn shaping_term(shaping: &RewardShaping, row: &MarketFeatures, action: Action) -> f64 {
    let mut term = 0.0;
    if row.doji {
        term -= shaping.doji_penalty;
    }
    if row.hammer {
        term += shaping.hammer_bonus;
    }
    if row.engulfing {
        term += shaping.engulfing_bonus;
    }
    match action {
        Action::Buy if row.close < row.vwap => term += shaping.vwap_bonus,
        Action::Sell if row.close > row.vwap => term += shaping.vwap_bonus,
        _ => {}
    }
    term
}

/// Mark-to-market profit since the start of the episode plus shaping
pub fn step_reward(total_value: f64, initial_balance: f64, shaping: f64) -> f64 {
    total_value - initial_balance + shaping
}
