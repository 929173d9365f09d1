//! RSI (Relative Strength Index) indicator

use crate::indicators::Indicator;
use crate::Result;
use ta::indicators::SimpleMovingAverage;
use ta::Next;

/// RSI with simple rolling means of gains and losses
///
/// The first sample contributes a zero change, so a 14-period RSI is defined
/// from the 14th update on. A window without losses saturates at 100; a flat
/// window reads 50.
#[derive(Debug, Clone)]
pub struct RSI {
    gains: SimpleMovingAverage,
    losses: SimpleMovingAverage,
    period: usize,
    update_count: usize,
    prev_close: Option<f64>,
    last_value: Option<f64>,
}

impl RSI {
    /// Create new RSI indicator
    pub fn new(period: usize) -> Result<Self> {
        Ok(Self {
            gains: SimpleMovingAverage::new(period)?,
            losses: SimpleMovingAverage::new(period)?,
            period,
            update_count: 0,
            prev_close: None,
            last_value: None,
        })
    }

    /// Get RSI period
    pub fn period(&self) -> usize {
        self.period
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        if avg_gain <= 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

impl Indicator for RSI {
    fn name(&self) -> &str {
        "RSI"
    }

    fn update(&mut self, value: f64) {
        let delta = self.prev_close.map(|prev| value - prev).unwrap_or(0.0);
        self.prev_close = Some(value);

        let avg_gain = self.gains.next(delta.max(0.0));
        let avg_loss = self.losses.next((-delta).max(0.0));
        self.update_count += 1;

        if self.update_count >= self.period {
            self.last_value = Some(rsi_from_averages(avg_gain, avg_loss).clamp(0.0, 100.0));
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}

/// Calculate RSI from a series of values
pub fn calculate_rsi(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut rsi = RSI::new(period)?;
    Ok(values
        .iter()
        .map(|&value| {
            rsi.update(value);
            rsi.value()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_warm_up() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let rsi = calculate_rsi(&closes, 14).unwrap();

        assert!(rsi[..13].iter().all(Option::is_none));
        for value in &rsi[13..] {
            let v = value.unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn test_rsi_saturation() {
        let rising: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(calculate_rsi(&rising, 14).unwrap()[13], Some(100.0));

        let falling: Vec<f64> = (0..14).map(|i| 100.0 - i as f64).collect();
        assert_eq!(calculate_rsi(&falling, 14).unwrap()[13], Some(0.0));

        let flat = vec![100.0; 14];
        assert_eq!(calculate_rsi(&flat, 14).unwrap()[13], Some(50.0));
    }

    #[test]
    fn test_rsi_matches_rolling_means() {
        // deltas over the window: +2, -1, +2 repeated, with a leading 0
        let mut closes = vec![100.0];
        for i in 0..13 {
            let last = *closes.last().unwrap();
            closes.push(last + if i % 3 == 1 { -1.0 } else { 2.0 });
        }
        let deltas: Vec<f64> = std::iter::once(0.0)
            .chain(closes.windows(2).map(|w| w[1] - w[0]))
            .collect();
        let gain: f64 = deltas.iter().map(|d| d.max(0.0)).sum::<f64>() / 14.0;
        let loss: f64 = deltas.iter().map(|d| (-d).max(0.0)).sum::<f64>() / 14.0;
        let expected = 100.0 - 100.0 / (1.0 + gain / loss);

        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert!((rsi[13].unwrap() - expected).abs() < 1e-9);
    }
}
