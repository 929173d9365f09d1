//! EMA (Exponential Moving Average) indicator

use crate::indicators::Indicator;
use crate::Result;
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

/// EMA indicator wrapper
///
/// Seeded with the first sample and smoothed with `alpha = 2 / (span + 1)`,
/// so a value exists from the first update on.
#[derive(Debug, Clone)]
pub struct EMA {
    inner: ExponentialMovingAverage,
    span: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl EMA {
    /// Create new EMA indicator
    pub fn new(span: usize) -> Result<Self> {
        Ok(Self {
            inner: ExponentialMovingAverage::new(span)?,
            span,
            update_count: 0,
            last_value: None,
        })
    }

    /// Get EMA span
    pub fn span(&self) -> usize {
        self.span
    }

    /// Smoothing factor applied to each new sample
    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }
}

impl Indicator for EMA {
    fn name(&self) -> &str {
        "EMA"
    }

    fn update(&mut self, value: f64) {
        self.last_value = Some(self.inner.next(value));
        self.update_count += 1;
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.span
    }
}

/// Calculate EMA from a series of values
pub fn calculate_ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = EMA::new(span)?;
    Ok(values
        .iter()
        .map(|&value| {
            ema.update(value);
            ema.value().unwrap_or(value)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seeded_with_first_close() {
        let closes = vec![100.0, 110.0, 105.0, 120.0, 90.0];
        let ema = calculate_ema(&closes, 8).unwrap();

        assert_eq!(ema.len(), closes.len());
        assert_eq!(ema[0], 100.0);

        let alpha = 2.0 / 9.0;
        for i in 1..closes.len() {
            let expected = closes[i] * alpha + ema[i - 1] * (1.0 - alpha);
            assert!((ema[i] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_readiness() {
        let mut ema = EMA::new(3).unwrap();
        ema.update(1.0);
        assert!(ema.value().is_some());
        assert!(!ema.is_ready());
        ema.update(2.0);
        ema.update(3.0);
        assert!(ema.is_ready());
    }

    #[test]
    fn test_zero_span_rejected() {
        assert!(EMA::new(0).is_err());
    }
}
