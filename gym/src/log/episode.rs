//! Per-episode trade records and their on-disk logs

use crate::env::Action;
use crate::error::GymError;
use crate::Result;
use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// Header line of the text trade log
pub const TRADE_LOG_HEADER: &str = "Step,Symbol,Action,Price,Portfolio Value";

/// One symbol's action at one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(rename = "Step")]
    pub step: usize,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Action")]
    pub action: Action,
    #[serde(rename = "Price")]
    pub price: f64,
    /// Shares moved by the action
    #[serde(rename = "Shares")]
    pub shares: u64,
    #[serde(rename = "Portfolio Value")]
    pub portfolio_value: f64,
}

/// Line of the text trade log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    #[serde(rename = "Step")]
    pub step: usize,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Action")]
    pub action: Action,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Portfolio Value")]
    pub portfolio_value: f64,
}

/// Records of the current episode, written out once it completes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeLog {
    records: Vec<TradeRecord>,
    complete: bool,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TradeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.complete = false;
    }

    /// Records that moved shares
    pub fn fills(&self) -> impl Iterator<Item = &TradeRecord> {
        self.records.iter().filter(|r| r.shares > 0)
    }

    /// Portfolio value after the final step
    pub fn final_value(&self) -> Option<f64> {
        self.records.last().map(|r| r.portfolio_value)
    }

    fn ensure_complete(&self) -> Result<()> {
        if self.complete {
            Ok(())
        } else {
            Err(GymError::invalid_state(
                "episode not finished, logs are written once it is done",
            ))
        }
    }

    /// Write the text trade log, one line per record
    pub fn write_trade_log<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.ensure_complete()?;
        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, "{}", TRADE_LOG_HEADER)?;
        for r in &self.records {
            writeln!(
                out,
                "{},{},{},{},{}",
                r.step, r.symbol, r.action, r.price, r.portfolio_value
            )?;
        }
        out.flush()?;
        info!(
            "Trade log written to {:?} ({} records)",
            path.as_ref(),
            self.records.len()
        );
        Ok(())
    }

    /// Write the tabular action log
    pub fn write_action_log<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.ensure_complete()?;
        let mut writer = Writer::from_path(&path)?;
        for r in &self.records {
            writer.serialize(r)?;
        }
        writer.flush()?;
        info!("Action log written to {:?}", path.as_ref());
        Ok(())
    }
}

/// Parse a trade log written by [`EpisodeLog::write_trade_log`]
pub fn read_trade_log<P: AsRef<Path>>(path: P) -> Result<Vec<TradeLogEntry>> {
    parse_trade_log(File::open(path)?)
}

pub fn parse_trade_log<R: Read>(source: R) -> Result<Vec<TradeLogEntry>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let mut entries = Vec::new();
    for record in reader.deserialize() {
        entries.push(record?);
    }
    Ok(entries)
}
