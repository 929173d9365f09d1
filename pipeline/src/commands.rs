use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use shared::{get_db_connection, Config, IntradayRepository, TickerList};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use trading_gym::config::EnvConfig;
use trading_gym::data::{read_feature_table, write_feature_table, Alignment, FeatureStore, Tick};
use trading_gym::env::TradingEnv;
use trading_gym::evaluation::{policy_by_name, EvaluationReport, EvaluationRunner};
use trading_gym::indicators::compute_features;

async fn repository(config: &Config) -> Result<IntradayRepository> {
    let db = get_db_connection(&config.database_url).await?;
    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;
    Ok(IntradayRepository::new(Arc::new(db)))
}

/// Requested symbol, else the ticker list, else everything stored
async fn resolve_symbols(
    config: &Config,
    repo: &IntradayRepository,
    symbol: Option<String>,
) -> Result<Vec<String>> {
    if let Some(symbol) = symbol {
        return Ok(vec![symbol.trim().to_ascii_uppercase()]);
    }
    let tracked = TickerList::new(config.tickers_file.clone()).load()?;
    if !tracked.is_empty() {
        return Ok(tracked);
    }
    warn!(
        "No tickers in {}, using every stored symbol",
        config.tickers_file.display()
    );
    repo.symbols().await
}

pub async fn import(config: &Config, file: &Path) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file)
        .with_context(|| format!("failed to open {}", file.display()))?;

    let mut ticks = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize() {
        let tick: Tick = record?;
        if tick.is_valid() {
            ticks.push(tick);
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!("Skipped {} malformed bars from {}", skipped, file.display());
    }

    let repo = repository(config).await?;
    let inserted = repo.insert_ticks(&ticks).await?;
    info!(
        "Imported {} new bars from {} ({} already stored)",
        inserted,
        file.display(),
        ticks.len() as u64 - inserted
    );
    Ok(())
}

pub async fn indicators(config: &Config, symbol: Option<String>) -> Result<()> {
    let repo = repository(config).await?;
    for symbol in resolve_symbols(config, &repo, symbol).await? {
        let ticks = repo.load_ticks(&symbol).await?;
        if ticks.is_empty() {
            warn!("No bars stored for {}", symbol);
            continue;
        }
        let rows = compute_features(&ticks)
            .with_context(|| format!("failed to compute indicators for {}", symbol))?;
        let updated = repo.save_features(&rows).await?;
        info!("{}: indicators written for {} bars", symbol, updated);
    }
    Ok(())
}

pub async fn export(config: &Config, out: &Path) -> Result<()> {
    let repo = repository(config).await?;
    let symbols = resolve_symbols(config, &repo, None).await?;
    let series = repo.load_feature_series(&symbols).await?;

    let total: usize = series.iter().map(|s| s.rows.len()).sum();
    let rows: Vec<_> = series
        .into_iter()
        .flat_map(|s| s.rows)
        .filter(|row| row.is_complete())
        .collect();
    write_feature_table(out, &rows)?;
    info!(
        "Exported {} rows to {} ({} warm-up rows dropped)",
        rows.len(),
        out.display(),
        total - rows.len()
    );
    Ok(())
}

pub fn evaluate(
    table: &Path,
    policy: &str,
    env_config: EnvConfig,
    alignment: Alignment,
    trade_log: &Path,
    action_log: &Path,
) -> Result<EvaluationReport> {
    let series = read_feature_table(table)
        .with_context(|| format!("failed to read feature table {}", table.display()))?;
    let store = Arc::new(FeatureStore::new(series, alignment)?);
    let mut env = TradingEnv::new(store, env_config)?;
    let mut policy = policy_by_name(policy)?;

    let result =
        EvaluationRunner::new().run_and_log(&mut env, policy.as_mut(), trade_log, action_log)?;
    Ok(EvaluationReport::new(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use trading_gym::log::read_trade_log;

    fn write_table(path: &Path) {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        let mut rows = Vec::new();
        for (symbol, start) in [("AAPL", 180.0), ("MSFT", 410.0)] {
            let ticks: Vec<Tick> = (0..40)
                .map(|i| {
                    let close = start + (i as f64 * 0.5).sin() * 2.0;
                    Tick::new(
                        symbol,
                        base + Duration::minutes(5 * i as i64),
                        close - 0.1,
                        close + 0.4,
                        close - 0.4,
                        close,
                        2_000,
                    )
                })
                .collect();
            rows.extend(compute_features(&ticks).unwrap());
        }
        write_feature_table(path, &rows).unwrap();
    }

    #[test]
    fn test_evaluate_writes_logs() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("prepared_data.csv");
        let trade_log = dir.path().join("trade_log.txt");
        let action_log = dir.path().join("actions_log.csv");
        write_table(&table);

        let report = evaluate(
            &table,
            "buy_and_hold",
            EnvConfig::default(),
            Alignment::Index,
            &trade_log,
            &action_log,
        )
        .unwrap();

        let entries = read_trade_log(&trade_log).unwrap();
        assert_eq!(entries.len(), 2 * report.result().steps);
        assert!(action_log.exists());
    }

    #[test]
    fn test_evaluate_rejects_unknown_policy() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("prepared_data.csv");
        write_table(&table);

        let err = evaluate(
            &table,
            "oracle",
            EnvConfig::default(),
            Alignment::Index,
            &dir.path().join("t.txt"),
            &dir.path().join("a.csv"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown policy"));
    }
}
