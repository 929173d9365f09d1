//! Integration tests for trading-gym

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use trading_gym::config::{EnvConfig, RewardShaping};
use trading_gym::data::{
    read_feature_table, write_feature_table, Alignment, FeatureRow, FeatureStore, SymbolSeries,
    Tick,
};
use trading_gym::env::{Action, EnvStatus, ObservationLayout, TradingEnv};
use trading_gym::evaluation::{
    BuyAndHoldPolicy, EvaluationReport, EvaluationRunner, HoldPolicy, MacdCrossPolicy, Policy,
    RsiPolicy,
};
use trading_gym::indicators::compute_features;
use trading_gym::log::read_trade_log;
use trading_gym::session::{EvaluationJob, SessionManager, SessionStatus};
use trading_gym::GymError;

/// Helper function to create test ticks at 5-minute intervals
fn create_test_ticks(symbol: &str, count: usize, base_price: f64) -> Vec<Tick> {
    let base_time = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
    (0..count)
        .map(|i| {
            let price = base_price + (i as f64 * 0.1) + (i as f64 % 10.0) * 0.5;
            Tick::new(
                symbol,
                base_time + Duration::minutes(5 * i as i64),
                price - 0.3,
                price + 1.0,
                price - 1.0,
                price,
                1_000 + (i as u64 % 7) * 100,
            )
        })
        .collect()
}

fn features(symbol: &str, count: usize, base_price: f64) -> Vec<FeatureRow> {
    compute_features(&create_test_ticks(symbol, count, base_price)).unwrap()
}

fn two_symbol_store(alignment: Alignment) -> Arc<FeatureStore> {
    Arc::new(
        FeatureStore::new(
            vec![
                SymbolSeries::new("AAPL", features("AAPL", 40, 100.0)),
                SymbolSeries::new("MSFT", features("MSFT", 40, 300.0)),
            ],
            alignment,
        )
        .unwrap(),
    )
}

#[test]
fn test_warm_up_rows_dropped_by_store() {
    let store = two_symbol_store(Alignment::Index);
    // RSI(14) is undefined for the first 13 ticks
    assert_eq!(store.episode_len(), 27);
    assert_eq!(store.symbols(), &["AAPL".to_string(), "MSFT".to_string()]);
}

#[test]
fn test_episode_flips_done_after_len_minus_one_steps() {
    let store = two_symbol_store(Alignment::Index);
    let len = store.episode_len();
    let mut env = TradingEnv::new(store, EnvConfig::default()).unwrap();

    let obs = env.reset().unwrap();
    assert_eq!(obs.len(), env.observation_space().width());
    assert_eq!(obs.len(), 13);

    let mut steps = 0;
    loop {
        let result = env.step(&[Action::Hold, Action::Hold]).unwrap();
        steps += 1;
        if result.done {
            break;
        }
    }
    assert_eq!(steps, len - 1);
    assert_eq!(env.status(), EnvStatus::Done);
    assert!(matches!(
        env.step(&[Action::Hold, Action::Hold]),
        Err(GymError::InvalidState(_))
    ));
}

#[test]
fn test_two_environments_are_deterministic() {
    let store = two_symbol_store(Alignment::Index);
    let config = EnvConfig::default().with_layout(ObservationLayout::Extended);
    let mut a = TradingEnv::new(Arc::clone(&store), config.clone()).unwrap();
    let mut b = TradingEnv::new(store, config).unwrap();

    assert_eq!(a.reset().unwrap(), b.reset().unwrap());
    let mut step = 0u8;
    loop {
        let actions = [step % 3, (step / 2) % 3];
        let ra = a.step_indices(&actions).unwrap();
        let rb = b.step_indices(&actions).unwrap();
        assert_eq!(ra, rb);
        assert!(a.cash() >= 0.0);
        if ra.done {
            break;
        }
        step = step.wrapping_add(1);
    }
    assert_eq!(a.episode_log(), b.episode_log());
}

#[test]
fn test_timestamp_gap_zero_fills_and_keeps_mark() {
    let mut msft = features("MSFT", 40, 100.0);
    msft.remove(20);
    let store = Arc::new(
        FeatureStore::new(
            vec![
                SymbolSeries::new("AAPL", features("AAPL", 40, 100.0)),
                SymbolSeries::new("MSFT", msft),
            ],
            Alignment::Timestamp,
        )
        .unwrap(),
    );
    assert_eq!(store.episode_len(), 27);

    let config = EnvConfig::default().with_reward(RewardShaping::disabled());
    let mut env = TradingEnv::new(store, config).unwrap();
    env.reset().unwrap();

    // put all the cash into MSFT
    let first = env.step(&[Action::Hold, Action::Buy]).unwrap();
    assert!(first.info.zero_filled.is_empty());
    assert!(env.positions()[1].shares > 0);

    let mut gap_step = None;
    for _ in 0..6 {
        let result = env.step(&[Action::Hold, Action::Hold]).unwrap();
        if !result.info.zero_filled.is_empty() {
            gap_step = Some(env.current_step());
            assert_eq!(result.info.zero_filled, vec!["MSFT".to_string()]);
            assert!(result.observation.values()[6..12].iter().all(|v| *v == 0.0));
        }
    }
    assert_eq!(gap_step, Some(7));
    let before_gap = env.total_value();

    // acting at the gap step: the sell is skipped, MSFT keeps its last close
    let at_gap = env.step(&[Action::Hold, Action::Sell]).unwrap();
    assert!(env.positions()[1].shares > 0);
    assert_eq!(env.total_value(), before_gap);
    assert!(at_gap.reward > 0.0);

    // no collapse to cash-only value on either side of the gap
    let after_gap = env.step(&[Action::Hold, Action::Hold]).unwrap();
    assert!(after_gap.reward > -1_000.0);
}

#[test]
fn test_policies_run_full_episodes() {
    let store = two_symbol_store(Alignment::Index);
    let runner = EvaluationRunner::new();

    let mut hold = HoldPolicy;
    let mut env = TradingEnv::new(Arc::clone(&store), EnvConfig::default()).unwrap();
    let result = runner.run(&mut env, &mut hold).unwrap();
    assert_eq!(result.end_value, 10_000.0);
    assert_eq!(result.num_fills, 0);
    assert_eq!(result.steps, store.episode_len() - 1);
    assert_eq!(result.real_world_minutes, 5 * result.steps as u64);

    let mut policies: Vec<Box<dyn Policy>> = vec![
        Box::new(BuyAndHoldPolicy),
        Box::new(RsiPolicy::default()),
        Box::new(MacdCrossPolicy::default()),
    ];
    for policy in policies.iter_mut() {
        let result = runner.run(&mut env, policy.as_mut()).unwrap();
        assert_eq!(result.values.len(), result.steps + 1);
        assert!(result.max_drawdown >= 0.0);
        assert!(EvaluationReport::new(result).format().contains("Evaluation Results"));
    }
}

#[test]
fn test_feature_table_to_logs() {
    let dir = tempfile::tempdir().unwrap();
    let table = dir.path().join("prepared_data.csv");
    let mut rows = features("AAPL", 30, 100.0);
    rows.extend(features("MSFT", 30, 250.0));
    write_feature_table(&table, &rows).unwrap();

    let series = read_feature_table(&table).unwrap();
    let store = Arc::new(FeatureStore::new(series, Alignment::Index).unwrap());
    let mut env = TradingEnv::new(store, EnvConfig::default()).unwrap();

    let trade_log = dir.path().join("trade_log.txt");
    let action_log = dir.path().join("actions_log.csv");
    let result = EvaluationRunner::new()
        .run_and_log(&mut env, &mut BuyAndHoldPolicy, &trade_log, &action_log)
        .unwrap();

    let entries = read_trade_log(&trade_log).unwrap();
    assert_eq!(entries.len(), 2 * result.steps);
    assert_eq!(entries[0].action, Action::Buy);
    assert_eq!(entries.last().unwrap().portfolio_value, result.end_value);
    assert!(action_log.exists());
}

#[tokio::test]
async fn test_evaluation_job_in_session() {
    let dir = tempfile::tempdir().unwrap();
    let job = EvaluationJob {
        store: two_symbol_store(Alignment::Index),
        config: EnvConfig::default(),
        policy: "rsi".to_string(),
        trade_log: dir.path().join("trade_log.txt"),
        action_log: dir.path().join("actions_log.csv"),
    };

    let manager = SessionManager::default();
    let id = manager.start(Box::new(job)).await;
    let info = manager.wait(id).await.unwrap();

    assert_eq!(info.status, SessionStatus::Completed, "{:?}", info.error);
    assert_eq!(info.kind, "evaluation");
    assert!(dir.path().join("trade_log.txt").exists());
}

#[tokio::test]
async fn test_unknown_policy_fails_session() {
    let dir = tempfile::tempdir().unwrap();
    let job = EvaluationJob {
        store: two_symbol_store(Alignment::Index),
        config: EnvConfig::default(),
        policy: "oracle".to_string(),
        trade_log: dir.path().join("trade_log.txt"),
        action_log: dir.path().join("actions_log.csv"),
    };

    let manager = SessionManager::default();
    let id = manager.start(Box::new(job)).await;
    let info = manager.wait(id).await.unwrap();
    assert_eq!(info.status, SessionStatus::Failed);
    assert!(info.error.unwrap().contains("unknown policy"));
}
