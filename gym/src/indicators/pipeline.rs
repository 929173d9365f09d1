//! Tick-to-feature pipeline for one symbol

use crate::data::{FeatureRow, Tick};
use crate::error::GymError;
use crate::indicators::{Indicator, PatternDetector, EMA, MACD, RSI, VWAP};
use crate::Result;
use tracing::debug;

/// Streaming computation of every feature-table column
///
/// Feed one symbol's ticks in timestamp order. Each emitted row depends only
/// on the ticks seen so far.
#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    ema_8: EMA,
    ema_21: EMA,
    ema_50: EMA,
    rsi_14: RSI,
    macd: MACD,
    vwap: VWAP,
    patterns: PatternDetector,
}

impl IndicatorPipeline {
    pub fn new() -> Result<Self> {
        Ok(Self {
            ema_8: EMA::new(8)?,
            ema_21: EMA::new(21)?,
            ema_50: EMA::new(50)?,
            rsi_14: RSI::new(14)?,
            macd: MACD::standard()?,
            vwap: VWAP::new(),
            patterns: PatternDetector::new(),
        })
    }

    /// Advance by one tick and emit its feature row
    pub fn next(&mut self, tick: &Tick) -> FeatureRow {
        self.ema_8.update(tick.close);
        self.ema_21.update(tick.close);
        self.ema_50.update(tick.close);
        self.rsi_14.update(tick.close);
        self.macd.update(tick.close);
        let vwap = self.vwap.update(tick.close, tick.volume);
        let flags = self.patterns.update(tick);

        FeatureRow {
            symbol: tick.symbol.clone(),
            timestamp: tick.timestamp,
            close: tick.close,
            ema_8: self.ema_8.value(),
            ema_21: self.ema_21.value(),
            ema_50: self.ema_50.value(),
            rsi_14: self.rsi_14.value(),
            macd: self.macd.macd(),
            macd_signal: self.macd.signal(),
            doji: flags.doji,
            hammer: flags.hammer,
            engulfing: flags.engulfing,
            vwap,
        }
    }
}

/// Compute feature rows for an ordered tick series of a single symbol
///
/// Output has the same length and order as the input. Mixed symbols or
/// non-increasing timestamps are a configuration error.
pub fn compute_features(ticks: &[Tick]) -> Result<Vec<FeatureRow>> {
    let Some(first) = ticks.first() else {
        return Ok(Vec::new());
    };

    for pair in ticks.windows(2) {
        if pair[1].symbol != first.symbol {
            return Err(GymError::config(format!(
                "tick series mixes symbols {} and {}",
                first.symbol, pair[1].symbol
            )));
        }
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(GymError::config(format!(
                "{} ticks not strictly increasing at {}",
                first.symbol, pair[1].timestamp
            )));
        }
    }

    let mut pipeline = IndicatorPipeline::new()?;
    let rows: Vec<FeatureRow> = ticks.iter().map(|t| pipeline.next(t)).collect();
    debug!(
        "Computed {} feature rows for {} ({} complete)",
        rows.len(),
        first.symbol,
        rows.iter().filter(|r| r.is_complete()).count()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn ticks(symbol: &str, n: usize) -> Vec<Tick> {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.5).sin() * 3.0;
                Tick::new(
                    symbol,
                    base + Duration::minutes(5 * i as i64),
                    close - 0.2,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000 + i as u64,
                )
            })
            .collect()
    }

    #[test]
    fn test_rows_align_with_ticks() {
        let input = ticks("AAPL", 30);
        let rows = compute_features(&input).unwrap();

        assert_eq!(rows.len(), input.len());
        for (tick, row) in input.iter().zip(&rows) {
            assert_eq!(row.timestamp, tick.timestamp);
            assert_eq!(row.close, tick.close);
        }
        assert_eq!(rows[0].ema_8, Some(input[0].close));
        assert!(rows[12].rsi_14.is_none());
        assert!(rows[13].rsi_14.is_some());
        assert!(rows[13].is_complete());
    }

    #[test]
    fn test_rows_are_causal() {
        let input = ticks("AAPL", 30);
        let full = compute_features(&input).unwrap();
        let prefix = compute_features(&input[..20]).unwrap();
        assert_eq!(&full[..20], &prefix[..]);
    }

    #[test]
    fn test_rejects_unordered_or_mixed() {
        let mut input = ticks("AAPL", 5);
        input.swap(1, 2);
        assert!(matches!(
            compute_features(&input),
            Err(GymError::Configuration(_))
        ));

        let mut mixed = ticks("AAPL", 3);
        mixed.extend(ticks("MSFT", 3));
        assert!(compute_features(&mixed).is_err());

        assert!(compute_features(&[]).unwrap().is_empty());
    }
}
