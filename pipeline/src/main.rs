mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use trading_gym::data::Alignment;
use tracing_subscriber::EnvFilter;

/// Offline data pipeline for the trading gym
#[derive(Parser, Debug)]
#[command(name = "pipeline")]
#[command(version = "0.1.0")]
#[command(about = "Import bars, compute indicators, export feature tables and evaluate policies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load raw OHLCV bars from a CSV file into the database
    Import {
        /// CSV with columns symbol,datetime,open,high,low,close,volume
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Recompute and persist indicators for the tracked tickers
    Indicators {
        /// Only this symbol instead of the whole ticker list
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// Write the merged feature table with warm-up rows dropped
    Export {
        #[arg(short, long, default_value = "prepared_data.csv")]
        out: PathBuf,
    },

    /// Run one episode over a feature table and write the trade and action logs
    Evaluate {
        #[arg(short, long, default_value = "prepared_data.csv")]
        table: PathBuf,
        /// hold, buy_and_hold, rsi or macd_cross
        #[arg(short, long, default_value = "buy_and_hold")]
        policy: String,
        /// JSON environment config; missing fields take defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = AlignArg::Index)]
        align: AlignArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlignArg {
    Index,
    Timestamp,
}

impl From<AlignArg> for Alignment {
    fn from(arg: AlignArg) -> Self {
        match arg {
            AlignArg::Index => Alignment::Index,
            AlignArg::Timestamp => Alignment::Timestamp,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = shared::Config::from_env()?;

    match cli.command {
        Commands::Import { file } => commands::import(&config, &file).await,
        Commands::Indicators { symbol } => commands::indicators(&config, symbol).await,
        Commands::Export { out } => commands::export(&config, &out).await,
        Commands::Evaluate {
            table,
            policy,
            config: env_config,
            align,
        } => {
            let env_config = match env_config {
                Some(path) => trading_gym::config::EnvConfig::from_json_file(path)?,
                None => config.env_config(),
            };
            let report = commands::evaluate(
                &table,
                &policy,
                env_config,
                align.into(),
                &config.trade_log,
                &config.action_log,
            )?;
            println!("{}", report.format());
            Ok(())
        }
    }
}
