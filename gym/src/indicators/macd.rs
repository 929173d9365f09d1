//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::Indicator;
use crate::Result;
use ta::indicators::{MovingAverageConvergenceDivergence, MovingAverageConvergenceDivergenceOutput};
use ta::Next;

/// MACD indicator wrapper
///
/// All three EMAs are seeded with their first input, so the line and the
/// signal are defined from the first update.
#[derive(Debug, Clone)]
pub struct MACD {
    inner: MovingAverageConvergenceDivergence,
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
    update_count: usize,
    last_output: Option<MovingAverageConvergenceDivergenceOutput>,
}

impl MACD {
    /// Create new MACD indicator
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<Self> {
        Ok(Self {
            inner: MovingAverageConvergenceDivergence::new(fast_period, slow_period, signal_period)?,
            fast_period,
            slow_period,
            signal_period,
            update_count: 0,
            last_output: None,
        })
    }

    /// The 12/26/9 configuration used for the feature table
    pub fn standard() -> Result<Self> {
        Self::new(12, 26, 9)
    }

    /// Get MACD line value
    pub fn macd(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.macd)
    }

    /// Get signal line value
    pub fn signal(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.signal)
    }

    /// Get histogram value (MACD - Signal)
    pub fn histogram(&self) -> Option<f64> {
        self.last_output.as_ref().map(|o| o.histogram)
    }

    pub fn periods(&self) -> (usize, usize, usize) {
        (self.fast_period, self.slow_period, self.signal_period)
    }
}

impl Indicator for MACD {
    fn name(&self) -> &str {
        "MACD"
    }

    fn update(&mut self, value: f64) {
        self.last_output = Some(self.inner.next(value));
        self.update_count += 1;
    }

    fn value(&self) -> Option<f64> {
        self.macd()
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.slow_period + self.signal_period
    }
}

/// MACD result structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MACDResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Calculate MACD line, signal and histogram for a series of values
pub fn calculate_macd(
    values: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<Vec<MACDResult>> {
    let mut macd = MACD::new(fast_period, slow_period, signal_period)?;
    let mut results = Vec::with_capacity(values.len());
    for &value in values {
        macd.update(value);
        if let Some(o) = macd.last_output.as_ref() {
            results.push(MACDResult {
                macd: o.macd,
                signal: o.signal,
                histogram: o.histogram,
            });
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::calculate_ema;

    #[test]
    fn test_macd_is_ema_difference() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let macd = calculate_macd(&closes, 12, 26, 9).unwrap();
        let fast = calculate_ema(&closes, 12).unwrap();
        let slow = calculate_ema(&closes, 26).unwrap();

        assert_eq!(macd.len(), closes.len());
        assert_eq!(macd[0].macd, 0.0);
        assert_eq!(macd[0].signal, 0.0);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = calculate_ema(&line, 9).unwrap();
        for i in 0..closes.len() {
            assert!((macd[i].macd - line[i]).abs() < 1e-9);
            assert!((macd[i].signal - signal[i]).abs() < 1e-9);
            assert!((macd[i].histogram - (line[i] - signal[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_periods_rejected() {
        assert!(MACD::new(0, 26, 9).is_err());
    }
}
