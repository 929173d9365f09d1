//! Tracked ticker list kept in a one-column CSV file

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const HEADER: &str = "Symbol";

#[derive(Error, Debug)]
pub enum TickerError {
    #[error("Ticker {0} is already tracked")]
    Duplicate(String),

    #[error("Ticker {0} is not tracked")]
    NotFound(String),

    #[error("Invalid ticker symbol: {0:?}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// File-backed list of ticker symbols; a missing file is an empty list
#[derive(Debug, Clone)]
pub struct TickerList {
    path: PathBuf,
}

impl TickerList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<String>, TickerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut symbols = Vec::new();
        for record in reader.records() {
            let record = record?;
            let Some(field) = record.get(0).map(str::trim) else {
                continue;
            };
            if field.is_empty() || field.eq_ignore_ascii_case(HEADER) {
                continue;
            }
            let symbol = field.to_ascii_uppercase();
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    /// Track a new symbol and return the updated list
    pub fn add(&self, symbol: &str) -> Result<Vec<String>, TickerError> {
        let symbol = normalize(symbol)?;
        let mut symbols = self.load()?;
        if symbols.contains(&symbol) {
            return Err(TickerError::Duplicate(symbol));
        }
        symbols.push(symbol.clone());
        self.save(&symbols)?;
        info!("Tracking {}", symbol);
        Ok(symbols)
    }

    /// Stop tracking a symbol and return the updated list
    pub fn remove(&self, symbol: &str) -> Result<Vec<String>, TickerError> {
        let symbol = normalize(symbol)?;
        let mut symbols = self.load()?;
        let Some(pos) = symbols.iter().position(|s| *s == symbol) else {
            return Err(TickerError::NotFound(symbol));
        };
        symbols.remove(pos);
        self.save(&symbols)?;
        info!("Stopped tracking {}", symbol);
        Ok(symbols)
    }

    fn save(&self, symbols: &[String]) -> Result<(), TickerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record([HEADER])?;
        for symbol in symbols {
            writer.write_record([symbol])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn normalize(symbol: &str) -> Result<String, TickerError> {
    let symbol = symbol.trim();
    if symbol.is_empty()
        || !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(TickerError::Invalid(symbol.to_string()));
    }
    Ok(symbol.to_ascii_uppercase())
}
