//! OHLCV tick data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV sample for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Symbol (e.g., "AAPL")
    pub symbol: String,
    /// Bar timestamp, strictly increasing per symbol
    #[serde(rename = "datetime", with = "crate::data::datetime_format")]
    pub timestamp: DateTime<Utc>,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

impl Tick {
    /// Create a new tick
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check if the bar closed above its open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if the bar closed below its open
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Absolute difference between open and close
    pub fn body_size(&self) -> f64 {
        (self.open - self.close).abs()
    }

    /// Distance from the low to the lower end of the body
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Total range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Check that prices are finite, positive and consistent with the range
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tick(open: f64, high: f64, low: f64, close: f64) -> Tick {
        Tick::new(
            "AAPL",
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
            open,
            high,
            low,
            close,
            1_000,
        )
    }

    #[test]
    fn test_tick_geometry() {
        let t = tick(100.0, 110.0, 95.0, 105.0);
        assert!(t.is_bullish());
        assert!(!t.is_bearish());
        assert_eq!(t.body_size(), 5.0);
        assert_eq!(t.lower_wick(), 5.0);
        assert_eq!(t.range(), 15.0);
    }

    #[test]
    fn test_tick_validity() {
        assert!(tick(100.0, 110.0, 95.0, 105.0).is_valid());
        assert!(!tick(100.0, 99.0, 95.0, 105.0).is_valid());
        assert!(!tick(0.0, 110.0, 0.0, 105.0).is_valid());
        assert!(!tick(100.0, f64::NAN, 95.0, 105.0).is_valid());
    }
}
