//! Candlestick pattern flags

use crate::data::Tick;

/// Body below this fraction of the range marks a doji
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Both open and close must sit in the top part of the range for a hammer
pub const HAMMER_POSITION_RATIO: f64 = 0.6;
const RANGE_EPSILON: f64 = 0.001;

/// Body is tiny relative to the range; a zero-range bar is never a doji
pub fn is_doji(tick: &Tick) -> bool {
    let range = tick.range();
    range > 0.0 && tick.body_size() / range < DOJI_BODY_RATIO
}

/// Range more than twice the body with open and close near the high
pub fn is_hammer(tick: &Tick) -> bool {
    let range = tick.range();
    let padded = RANGE_EPSILON + range;
    range > 2.0 * tick.body_size() && tick.lower_wick() / padded > HAMMER_POSITION_RATIO
}

/// Current body engulfs the previous opposite-colored body
pub fn is_engulfing(prev: &Tick, current: &Tick) -> bool {
    let bullish = current.is_bullish()
        && prev.is_bearish()
        && current.close > prev.open
        && current.open < prev.close;
    let bearish = current.is_bearish()
        && prev.is_bullish()
        && current.close < prev.open
        && current.open > prev.close;
    bullish || bearish
}

/// Flags for one bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub doji: bool,
    pub hammer: bool,
    pub engulfing: bool,
}

/// Streaming detector that remembers the previous bar for engulfing
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    prev: Option<Tick>,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, tick: &Tick) -> PatternFlags {
        let flags = PatternFlags {
            doji: is_doji(tick),
            hammer: is_hammer(tick),
            engulfing: self
                .prev
                .as_ref()
                .is_some_and(|prev| is_engulfing(prev, tick)),
        };
        self.prev = Some(tick.clone());
        flags
    }
}
