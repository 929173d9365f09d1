//! Technical indicators module
//!
//! Provides technical analysis indicators using the `ta` crate.

pub mod ema;
pub mod macd;
pub mod patterns;
pub mod pipeline;
pub mod rsi;
pub mod vwap;

pub use ema::*;
pub use macd::*;
pub use patterns::*;
pub use pipeline::*;
pub use rsi::*;
pub use vwap::*;

/// Streaming indicator over close prices
pub trait Indicator {
    /// Get the name of the indicator
    fn name(&self) -> &str;

    /// Update indicator with new value
    fn update(&mut self, value: f64);

    /// Get current indicator value
    fn value(&self) -> Option<f64>;

    /// Check if indicator is ready (has enough data)
    fn is_ready(&self) -> bool;
}
