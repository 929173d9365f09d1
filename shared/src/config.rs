use anyhow::Context;
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;
use trading_gym::config::EnvConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub tickers_file: PathBuf,
    pub trade_log: PathBuf,
    pub action_log: PathBuf,
    pub trainer_program: String,
    pub trainer_args: Vec<String>,
    pub session_timeout: Duration,
    pub api_bind_addr: String,
    pub initial_balance: f64,
    pub interval_minutes: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let session_timeout_secs: u64 = std::env::var("SESSION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("SESSION_TIMEOUT_SECS must be a whole number of seconds")?;
        let defaults = EnvConfig::default();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/intraday_data.db?mode=rwc".to_string()),
            tickers_file: std::env::var("TICKERS_FILE")
                .unwrap_or_else(|_| "tickers.csv".to_string())
                .into(),
            trade_log: std::env::var("TRADE_LOG")
                .unwrap_or_else(|_| "trade_log.txt".to_string())
                .into(),
            action_log: std::env::var("ACTION_LOG")
                .unwrap_or_else(|_| "actions_log.csv".to_string())
                .into(),
            trainer_program: std::env::var("TRAINER_PROGRAM")
                .unwrap_or_else(|_| "python".to_string()),
            trainer_args: std::env::var("TRAINER_ARGS")
                .unwrap_or_else(|_| "train_agent.py".to_string())
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            session_timeout: Duration::from_secs(session_timeout_secs),
            api_bind_addr: std::env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:9999".to_string()),
            initial_balance: match std::env::var("INITIAL_BALANCE") {
                Ok(v) => v.parse().context("INITIAL_BALANCE must be a number")?,
                Err(_) => defaults.initial_balance,
            },
            interval_minutes: match std::env::var("INTERVAL_MINUTES") {
                Ok(v) => v.parse().context("INTERVAL_MINUTES must be a whole number")?,
                Err(_) => defaults.interval_minutes,
            },
        })
    }

    /// Environment settings seeded from this configuration
    pub fn env_config(&self) -> EnvConfig {
        EnvConfig {
            initial_balance: self.initial_balance,
            interval_minutes: self.interval_minutes,
            ..EnvConfig::default()
        }
    }
}
