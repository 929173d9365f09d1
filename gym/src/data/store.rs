//! Read-only feature storage shared across episodes

use crate::data::{FeatureRow, MarketFeatures};
use crate::error::GymError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// How per-symbol series map onto episode steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Lockstep by row index; the episode is as long as the shortest series
    #[default]
    Index,
    /// Steps follow the union of timestamps; missing rows are data gaps
    Timestamp,
}

/// Ordered feature rows of one symbol, as loaded from storage
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    pub symbol: String,
    pub rows: Vec<FeatureRow>,
}

impl SymbolSeries {
    pub fn new(symbol: impl Into<String>, rows: Vec<FeatureRow>) -> Self {
        Self {
            symbol: symbol.into(),
            rows,
        }
    }
}

/// Immutable, index-addressed feature rows for a fixed symbol list
///
/// Rows live in one arena; every (step, symbol) pair resolves to an arena
/// slot through a precomputed table, so lookups never scan.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    symbols: Vec<String>,
    arena: Vec<MarketFeatures>,
    /// (start, len) of each symbol's rows in `arena`
    ranges: Vec<(usize, usize)>,
    /// `episode_len * symbols.len()` entries, row-major by step
    slots: Vec<Option<usize>>,
    timeline: Vec<DateTime<Utc>>,
    alignment: Alignment,
}

impl FeatureStore {
    /// Validate series and build the store
    ///
    /// Rows lacking a required indicator (warm-up) are dropped. Fails with a
    /// configuration error on an empty symbol list, duplicate symbols,
    /// mismatched row symbols, out-of-order or duplicate timestamps, or a
    /// series with fewer than two complete rows.
    pub fn new(series: Vec<SymbolSeries>, alignment: Alignment) -> Result<Self> {
        if series.is_empty() {
            return Err(GymError::config("feature store needs at least one symbol"));
        }

        let mut seen = HashSet::new();
        let mut symbols = Vec::with_capacity(series.len());
        let mut arena = Vec::new();
        let mut ranges = Vec::with_capacity(series.len());

        for s in &series {
            if !seen.insert(s.symbol.as_str()) {
                return Err(GymError::config(format!("duplicate symbol {}", s.symbol)));
            }
            validate_order(s)?;

            let start = arena.len();
            let mut dropped = 0usize;
            for row in &s.rows {
                match row.to_market_features() {
                    Some(features) => arena.push(features),
                    None => dropped += 1,
                }
            }
            let len = arena.len() - start;
            if dropped > 0 {
                debug!(
                    "Dropped {} incomplete rows for {} ({} remain)",
                    dropped, s.symbol, len
                );
            }
            if len < 2 {
                return Err(GymError::config(format!(
                    "{} has {} complete feature rows, need at least 2",
                    s.symbol, len
                )));
            }

            symbols.push(s.symbol.clone());
            ranges.push((start, len));
        }

        let (timeline, slots) = match alignment {
            Alignment::Index => index_slots(&arena, &ranges),
            Alignment::Timestamp => timestamp_slots(&arena, &ranges),
        };

        info!(
            "Feature store ready: {} symbols, {} rows, {} steps ({:?} alignment)",
            symbols.len(),
            arena.len(),
            timeline.len(),
            alignment
        );

        Ok(Self {
            symbols,
            arena,
            ranges,
            slots,
            timeline,
            alignment,
        })
    }

    /// Tracked symbols in their fixed order
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn num_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Number of addressable steps in an episode
    pub fn episode_len(&self) -> usize {
        self.timeline.len()
    }

    /// Position of a symbol in the fixed order
    pub fn symbol_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Timestamp of a step on the episode timeline
    ///
    /// Under index alignment this is the first symbol's timestamp at that index.
    pub fn timestamp_at(&self, step: usize) -> Option<DateTime<Utc>> {
        self.timeline.get(step).copied()
    }

    /// Row of a symbol at a step, without the error
    pub fn get(&self, symbol: usize, step: usize) -> Option<&MarketFeatures> {
        if symbol >= self.symbols.len() {
            return None;
        }
        let slot = self.slots.get(step * self.symbols.len() + symbol)?;
        slot.map(|i| &self.arena[i])
    }

    /// Row of a symbol at a step, or `DataGap` when the symbol has none
    pub fn row(&self, symbol: usize, step: usize) -> Result<&MarketFeatures> {
        self.get(symbol, step).ok_or_else(|| GymError::DataGap {
            symbol: self
                .symbols
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| format!("#{symbol}")),
            step,
        })
    }

    /// All complete rows of a symbol
    pub fn series(&self, symbol: usize) -> &[MarketFeatures] {
        match self.ranges.get(symbol) {
            Some(&(start, len)) => &self.arena[start..start + len],
            None => &[],
        }
    }

    /// Total complete rows across symbols
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

fn validate_order(series: &SymbolSeries) -> Result<()> {
    for row in &series.rows {
        if row.symbol != series.symbol {
            return Err(GymError::config(format!(
                "row for {} found in series {}",
                row.symbol, series.symbol
            )));
        }
    }
    for pair in series.rows.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(GymError::config(format!(
                "{} rows not strictly ordered at {}",
                series.symbol, pair[1].timestamp
            )));
        }
    }
    Ok(())
}

fn index_slots(
    arena: &[MarketFeatures],
    ranges: &[(usize, usize)],
) -> (Vec<DateTime<Utc>>, Vec<Option<usize>>) {
    let steps = ranges.iter().map(|&(_, len)| len).min().unwrap_or(0);
    let mut slots = Vec::with_capacity(steps * ranges.len());
    for step in 0..steps {
        for &(start, _) in ranges {
            slots.push(Some(start + step));
        }
    }
    let first = ranges.first().map(|&(start, _)| start).unwrap_or(0);
    let timeline = (0..steps).map(|step| arena[first + step].timestamp).collect();
    (timeline, slots)
}

fn timestamp_slots(
    arena: &[MarketFeatures],
    ranges: &[(usize, usize)],
) -> (Vec<DateTime<Utc>>, Vec<Option<usize>>) {
    let timeline: Vec<DateTime<Utc>> = ranges
        .iter()
        .flat_map(|&(start, len)| arena[start..start + len].iter().map(|r| r.timestamp))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut slots = Vec::with_capacity(timeline.len() * ranges.len());
    let mut cursors: Vec<usize> = vec![0; ranges.len()];
    for ts in &timeline {
        for (symbol, &(start, len)) in ranges.iter().enumerate() {
            let cursor = &mut cursors[symbol];
            if *cursor < len && arena[start + *cursor].timestamp == *ts {
                slots.push(Some(start + *cursor));
                *cursor += 1;
            } else {
                slots.push(None);
            }
        }
    }
    (timeline, slots)
}
