//! Flat feature table persisted between the indicator pipeline and the
//! environment

use crate::data::{FeatureColumn, FeatureRow, SymbolSeries};
use crate::error::GymError;
use crate::Result;
use csv::{Reader, Writer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Load the feature table and group it into per-symbol series
///
/// Symbols keep their first-appearance order; rows are sorted by datetime
/// within each symbol.
pub fn read_feature_table<P: AsRef<Path>>(path: P) -> Result<Vec<SymbolSeries>> {
    let file = File::open(&path)?;
    let series = read_feature_rows(file)?;
    info!(
        "Loaded feature table {:?}: {} symbols",
        path.as_ref(),
        series.len()
    );
    Ok(series)
}

/// Parse a feature table from any reader
pub fn read_feature_rows<R: Read>(source: R) -> Result<Vec<SymbolSeries>> {
    let mut reader = Reader::from_reader(source);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = FeatureColumn::TABLE
        .iter()
        .map(|c| c.name())
        .filter(|name| !headers.iter().any(|h| h.trim() == *name))
        .collect();
    if !missing.is_empty() {
        return Err(GymError::config(format!(
            "feature table is missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<FeatureRow>> = HashMap::new();
    for record in reader.deserialize() {
        let row: FeatureRow = record?;
        if !grouped.contains_key(&row.symbol) {
            order.push(row.symbol.clone());
        }
        grouped.entry(row.symbol.clone()).or_default().push(row);
    }

    Ok(order
        .into_iter()
        .map(|symbol| {
            let mut rows = grouped.remove(&symbol).unwrap_or_default();
            rows.sort_by_key(|r| r.timestamp);
            SymbolSeries::new(symbol, rows)
        })
        .collect())
}

/// Write rows in table layout, one line per row, in the given order
pub fn write_feature_table<P: AsRef<Path>>(path: P, rows: &[FeatureRow]) -> Result<()> {
    let file = File::create(&path)?;
    write_feature_rows(file, rows)?;
    info!("Wrote {} feature rows to {:?}", rows.len(), path.as_ref());
    Ok(())
}

pub fn write_feature_rows<W: Write>(sink: W, rows: &[FeatureRow]) -> Result<()> {
    let mut writer = Writer::from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
