//! Observation layouts and spaces

use crate::data::{FeatureColumn, FeatureStore};
use crate::env::Action;
use crate::portfolio::Ledger;
use serde::{Deserialize, Serialize};

/// Layout of the flat observation vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationLayout {
    /// Six indicators per symbol, then cash
    #[default]
    Compact,
    /// All ten indicators per symbol, then cash, then one share count per symbol
    Extended,
}

const COMPACT_COLUMNS: [FeatureColumn; 6] = [
    FeatureColumn::Ema8,
    FeatureColumn::Ema21,
    FeatureColumn::Rsi14,
    FeatureColumn::Macd,
    FeatureColumn::MacdSignal,
    FeatureColumn::Vwap,
];

const EXTENDED_COLUMNS: [FeatureColumn; 10] = [
    FeatureColumn::Ema8,
    FeatureColumn::Ema21,
    FeatureColumn::Ema50,
    FeatureColumn::Rsi14,
    FeatureColumn::Macd,
    FeatureColumn::MacdSignal,
    FeatureColumn::Doji,
    FeatureColumn::Hammer,
    FeatureColumn::Engulfing,
    FeatureColumn::Vwap,
];

impl ObservationLayout {
    /// Indicator columns emitted for every symbol
    pub fn symbol_columns(&self) -> &'static [FeatureColumn] {
        match self {
            ObservationLayout::Compact => &COMPACT_COLUMNS,
            ObservationLayout::Extended => &EXTENDED_COLUMNS,
        }
    }

    /// Observation width for `symbols` tracked symbols
    pub fn width(&self, symbols: usize) -> usize {
        let per_symbol = self.symbol_columns().len() * symbols + 1;
        match self {
            ObservationLayout::Compact => per_symbol,
            ObservationLayout::Extended => per_symbol + symbols,
        }
    }

    /// Index of the cash entry
    pub fn cash_index(&self, symbols: usize) -> usize {
        self.symbol_columns().len() * symbols
    }
}

/// Declared shape of every observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub shape: Vec<usize>,
    pub layout: ObservationLayout,
}

impl ObservationSpace {
    pub fn new(layout: ObservationLayout, symbols: usize) -> Self {
        Self {
            shape: vec![layout.width(symbols)],
            layout,
        }
    }

    /// Flat vector length
    pub fn width(&self) -> usize {
        self.shape.iter().product()
    }
}

/// One discrete choice per symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpace {
    pub symbols: usize,
    pub choices: usize,
}

impl ActionSpace {
    pub fn new(symbols: usize) -> Self {
        Self {
            symbols,
            choices: Action::CARDINALITY,
        }
    }

    /// Check if an integer action vector fits this space
    pub fn contains(&self, actions: &[u8]) -> bool {
        actions.len() == self.symbols && actions.iter().all(|&a| (a as usize) < self.choices)
    }
}

/// Flat observation vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    values: Vec<f64>,
}

impl Observation {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Indicator slot of one symbol
    pub fn symbol_slot(&self, layout: ObservationLayout, symbol: usize) -> Option<&[f64]> {
        let width = layout.symbol_columns().len();
        self.values.get(symbol * width..(symbol + 1) * width)
    }

    /// Value of one indicator column for one symbol, if the layout carries it
    pub fn feature(
        &self,
        layout: ObservationLayout,
        symbol: usize,
        column: FeatureColumn,
    ) -> Option<f64> {
        let offset = layout.symbol_columns().iter().position(|c| *c == column)?;
        self.symbol_slot(layout, symbol)?.get(offset).copied()
    }

    pub fn cash(&self, layout: ObservationLayout, symbols: usize) -> Option<f64> {
        self.values.get(layout.cash_index(symbols)).copied()
    }
}

impl From<Vec<f64>> for Observation {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// Build the observation at `step`; returns it with the zero-filled symbols
pub(crate) fn build_observation(
    layout: ObservationLayout,
    store: &FeatureStore,
    ledger: &Ledger,
    step: usize,
) -> (Observation, Vec<String>) {
    let columns = layout.symbol_columns();
    let symbols = store.symbols();
    let mut values = Vec::with_capacity(layout.width(symbols.len()));
    let mut zero_filled = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        match store.get(i, step) {
            Some(row) => values.extend(columns.iter().map(|c| row.value(*c))),
            None => {
                values.extend(std::iter::repeat(0.0).take(columns.len()));
                zero_filled.push(symbol.clone());
            }
        }
    }

    values.push(ledger.cash());

    if layout == ObservationLayout::Extended {
        values.extend((0..symbols.len()).map(|i| ledger.shares(i) as f64));
    }

    (Observation { values }, zero_filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_widths() {
        assert_eq!(ObservationLayout::Compact.width(1), 7);
        assert_eq!(ObservationLayout::Compact.width(3), 19);
        assert_eq!(ObservationLayout::Extended.width(1), 12);
        assert_eq!(ObservationLayout::Extended.width(2), 23);
        assert_eq!(ObservationLayout::Extended.cash_index(1), 10);
    }

    #[test]
    fn test_action_space_contains() {
        let space = ActionSpace::new(2);
        assert!(space.contains(&[0, 2]));
        assert!(!space.contains(&[0, 3]));
        assert!(!space.contains(&[1]));
    }

    #[test]
    fn test_feature_lookup() {
        let mut values: Vec<f64> = (0..13).map(|v| v as f64).collect();
        values[0] = 42.0;
        let obs = Observation::from(values);
        let layout = ObservationLayout::Compact;
        assert_eq!(obs.feature(layout, 0, FeatureColumn::Ema8), Some(42.0));
        assert_eq!(obs.feature(layout, 1, FeatureColumn::Rsi14), Some(8.0));
        assert_eq!(obs.feature(layout, 0, FeatureColumn::Ema50), None);
        assert_eq!(obs.cash(layout, 2), Some(12.0));
    }
}
