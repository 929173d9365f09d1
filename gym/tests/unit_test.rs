//! Unit tests for trading-gym modules

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use trading_gym::config::{EnvConfig, RewardShaping};
    use trading_gym::data::{Alignment, FeatureRow, FeatureStore, SymbolSeries, Tick};
    use trading_gym::env::{Action, TradingEnv};
    use trading_gym::indicators::{
        calculate_ema, calculate_rsi, calculate_vwap, compute_features, Indicator, EMA, MACD, RSI,
    };
    use trading_gym::portfolio::Ledger;
    use trading_gym::GymError;

    fn flat_row(symbol: &str, minute: i64, close: f64) -> FeatureRow {
        FeatureRow {
            symbol: symbol.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
                + Duration::minutes(minute),
            close,
            ema_8: Some(close),
            ema_21: Some(close),
            ema_50: Some(close),
            rsi_14: Some(50.0),
            macd: Some(0.0),
            macd_signal: Some(0.0),
            doji: false,
            hammer: false,
            engulfing: false,
            vwap: Some(close),
        }
    }

    #[test]
    fn test_indicator_streaming_matches_batch() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.3).cos() * 4.0).collect();

        let mut ema = EMA::new(21).unwrap();
        let mut rsi = RSI::new(14).unwrap();
        let mut macd = MACD::standard().unwrap();
        for &close in &closes {
            ema.update(close);
            rsi.update(close);
            macd.update(close);
        }

        assert_eq!(ema.value(), calculate_ema(&closes, 21).unwrap().last().copied());
        assert_eq!(rsi.value(), *calculate_rsi(&closes, 14).unwrap().last().unwrap());
        assert!(ema.is_ready());
        assert!(rsi.is_ready());
        assert!(macd.is_ready());
        assert!(macd.histogram().is_some());
    }

    #[test]
    fn test_rsi_bounded_on_noisy_series() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + ((i * 37) % 11) as f64 - 5.0 + i as f64 * 0.01)
            .collect();
        for value in calculate_rsi(&closes, 14).unwrap().into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_vwap_never_divides_by_zero() {
        let vwap = calculate_vwap(&[10.0, 11.0, 12.0], &[0, 0, 0]);
        assert!(vwap.iter().all(Option::is_none));
    }

    #[test]
    fn test_feature_rows_mirror_ticks() {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        let ticks: Vec<Tick> = (0..16)
            .map(|i| {
                let close = 100.0 + i as f64;
                Tick::new(
                    "AAPL",
                    base + Duration::minutes(i),
                    close - 0.5,
                    close + 0.5,
                    close - 0.8,
                    close,
                    0,
                )
            })
            .collect();

        let rows = compute_features(&ticks).unwrap();
        assert_eq!(rows.len(), ticks.len());
        // zero volume throughout: VWAP never defined, so no row is complete
        assert!(rows.iter().all(|r| r.vwap.is_none() && !r.is_complete()));
        assert_eq!(rows[13].rsi_14, Some(100.0));
    }

    #[test]
    fn test_buy_sell_scenario_from_ten_thousand() {
        let rows = vec![
            flat_row("AAPL", 0, 100.0),
            flat_row("AAPL", 1, 110.0),
            flat_row("AAPL", 2, 105.0),
        ];
        let store =
            Arc::new(FeatureStore::new(vec![SymbolSeries::new("AAPL", rows)], Alignment::Index).unwrap());
        let config = EnvConfig::default().with_reward(RewardShaping::disabled());
        let mut env = TradingEnv::new(store, config).unwrap();

        env.reset().unwrap();
        env.step(&[Action::Buy]).unwrap();
        assert_eq!(env.positions()[0].shares, 100);
        assert_eq!(env.cash(), 0.0);

        let last = env.step(&[Action::Sell]).unwrap();
        assert!(last.done);
        assert_eq!(env.cash(), 11_000.0);
        assert_eq!(env.total_value(), 11_000.0);

        assert!(matches!(
            env.step(&[Action::Hold]),
            Err(GymError::InvalidState(_))
        ));
    }

    #[test]
    fn test_default_shaping_rewards_engulfing_and_vwap() {
        let mut first = flat_row("AAPL", 0, 100.0);
        first.engulfing = true;
        first.vwap = Some(101.0);
        let rows = vec![first, flat_row("AAPL", 1, 100.0)];
        let store =
            Arc::new(FeatureStore::new(vec![SymbolSeries::new("AAPL", rows)], Alignment::Index).unwrap());
        let mut env = TradingEnv::new(store, EnvConfig::default()).unwrap();

        env.reset().unwrap();
        let result = env.step(&[Action::Buy]).unwrap();
        // 10 for engulfing + 10 for buying below VWAP, no mark-to-market change
        assert_eq!(result.reward, 20.0);
    }

    #[test]
    fn test_ledger_invariants_under_alternating_trades() {
        let mut ledger = Ledger::new(&["AAPL", "MSFT", "NVDA"], 25_000.0).unwrap();
        let mut price = 17.0;
        for i in 0..300usize {
            price = (price * 1.37) % 450.0 + 1.0;
            let action = Action::try_from((i % 3) as u8).unwrap();
            ledger.apply(action, i % 3, price);
            assert!(ledger.cash() >= 0.0);
        }
        let marked = ledger.mark_to_market(&[Some(10.0), Some(10.0), Some(10.0)]);
        assert!(marked >= ledger.cash());
    }
}
