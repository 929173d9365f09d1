//! Feature rows produced by the indicator pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Columns of the flat feature table, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Symbol,
    Datetime,
    Close,
    Ema8,
    Ema21,
    Ema50,
    Rsi14,
    Macd,
    MacdSignal,
    Doji,
    Hammer,
    Engulfing,
    Vwap,
}

impl FeatureColumn {
    /// Every column of the persisted table
    pub const TABLE: [FeatureColumn; 13] = [
        Self::Symbol,
        Self::Datetime,
        Self::Close,
        Self::Ema8,
        Self::Ema21,
        Self::Ema50,
        Self::Rsi14,
        Self::Macd,
        Self::MacdSignal,
        Self::Doji,
        Self::Hammer,
        Self::Engulfing,
        Self::Vwap,
    ];

    /// Indicator columns that may be undefined during warm-up and must be
    /// present before a row reaches the environment
    pub const REQUIRED_INDICATORS: [FeatureColumn; 7] = [
        Self::Ema8,
        Self::Ema21,
        Self::Ema50,
        Self::Rsi14,
        Self::Macd,
        Self::MacdSignal,
        Self::Vwap,
    ];

    /// Column name as stored
    pub fn name(&self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Datetime => "datetime",
            Self::Close => "close",
            Self::Ema8 => "ema_8",
            Self::Ema21 => "ema_21",
            Self::Ema50 => "ema_50",
            Self::Rsi14 => "rsi_14",
            Self::Macd => "macd",
            Self::MacdSignal => "macd_signal",
            Self::Doji => "doji",
            Self::Hammer => "hammer",
            Self::Engulfing => "engulfing",
            Self::Vwap => "vwap",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::TABLE.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One indicator row per tick, keyed by (symbol, timestamp)
///
/// Optional columns are `None` while the indicator is inside its warm-up
/// window. Values depend only on ticks up to and including `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub symbol: String,
    #[serde(rename = "datetime", with = "crate::data::datetime_format")]
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ema_8: Option<f64>,
    pub ema_21: Option<f64>,
    pub ema_50: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    #[serde(deserialize_with = "flexible_bool")]
    pub doji: bool,
    #[serde(deserialize_with = "flexible_bool")]
    pub hammer: bool,
    #[serde(deserialize_with = "flexible_bool")]
    pub engulfing: bool,
    pub vwap: Option<f64>,
}

impl FeatureRow {
    fn optional(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::Ema8 => self.ema_8,
            FeatureColumn::Ema21 => self.ema_21,
            FeatureColumn::Ema50 => self.ema_50,
            FeatureColumn::Rsi14 => self.rsi_14,
            FeatureColumn::Macd => self.macd,
            FeatureColumn::MacdSignal => self.macd_signal,
            FeatureColumn::Vwap => self.vwap,
            _ => Some(0.0),
        }
    }

    /// Required indicator columns that are undefined (or non-finite) on this row
    pub fn missing_columns(&self) -> Vec<FeatureColumn> {
        FeatureColumn::REQUIRED_INDICATORS
            .iter()
            .copied()
            .filter(|c| !self.optional(*c).is_some_and(f64::is_finite))
            .collect()
    }

    /// Check if every required indicator is defined
    pub fn is_complete(&self) -> bool {
        self.close.is_finite() && self.missing_columns().is_empty()
    }

    /// Convert into the fully-defined row consumed by the environment
    pub fn to_market_features(&self) -> Option<MarketFeatures> {
        if !self.close.is_finite() {
            return None;
        }
        Some(MarketFeatures {
            timestamp: self.timestamp,
            close: self.close,
            ema_8: self.ema_8.filter(|v| v.is_finite())?,
            ema_21: self.ema_21.filter(|v| v.is_finite())?,
            ema_50: self.ema_50.filter(|v| v.is_finite())?,
            rsi_14: self.rsi_14.filter(|v| v.is_finite())?,
            macd: self.macd.filter(|v| v.is_finite())?,
            macd_signal: self.macd_signal.filter(|v| v.is_finite())?,
            doji: self.doji,
            hammer: self.hammer,
            engulfing: self.engulfing,
            vwap: self.vwap.filter(|v| v.is_finite())?,
        })
    }
}

/// A feature row with every indicator defined
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketFeatures {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ema_8: f64,
    pub ema_21: f64,
    pub ema_50: f64,
    pub rsi_14: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub doji: bool,
    pub hammer: bool,
    pub engulfing: bool,
    pub vwap: f64,
}

impl MarketFeatures {
    /// Numeric value of a column; flags encode as 1.0/0.0
    pub fn value(&self, column: FeatureColumn) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match column {
            FeatureColumn::Close => self.close,
            FeatureColumn::Ema8 => self.ema_8,
            FeatureColumn::Ema21 => self.ema_21,
            FeatureColumn::Ema50 => self.ema_50,
            FeatureColumn::Rsi14 => self.rsi_14,
            FeatureColumn::Macd => self.macd,
            FeatureColumn::MacdSignal => self.macd_signal,
            FeatureColumn::Doji => flag(self.doji),
            FeatureColumn::Hammer => flag(self.hammer),
            FeatureColumn::Engulfing => flag(self.engulfing),
            FeatureColumn::Vwap => self.vwap,
            FeatureColumn::Symbol | FeatureColumn::Datetime => 0.0,
        }
    }
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
        Missing,
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(i) => Ok(i != 0),
        Flag::Float(f) => Ok(f != 0.0),
        Flag::Missing => Ok(false),
        Flag::Text(raw) => match raw.trim() {
            "1" | "true" | "True" | "TRUE" => Ok(true),
            "0" | "false" | "False" | "FALSE" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid flag: {other}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row() -> FeatureRow {
        FeatureRow {
            symbol: "AAPL".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
            close: 101.0,
            ema_8: Some(100.5),
            ema_21: Some(100.2),
            ema_50: Some(99.9),
            rsi_14: Some(55.0),
            macd: Some(0.3),
            macd_signal: Some(0.1),
            doji: false,
            hammer: true,
            engulfing: false,
            vwap: Some(100.0),
        }
    }

    #[test]
    fn test_complete_row_converts() {
        let features = row().to_market_features().unwrap();
        assert_eq!(features.close, 101.0);
        assert_eq!(features.value(FeatureColumn::Hammer), 1.0);
        assert_eq!(features.value(FeatureColumn::Doji), 0.0);
        assert_eq!(features.value(FeatureColumn::Rsi14), 55.0);
    }

    #[test]
    fn test_missing_columns_reported() {
        let mut r = row();
        r.rsi_14 = None;
        r.vwap = Some(f64::NAN);
        assert!(!r.is_complete());
        assert_eq!(
            r.missing_columns(),
            vec![FeatureColumn::Rsi14, FeatureColumn::Vwap]
        );
        assert!(r.to_market_features().is_none());
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in FeatureColumn::TABLE {
            assert_eq!(FeatureColumn::from_name(column.name()), Some(column));
        }
        assert_eq!(FeatureColumn::from_name("open"), None);
    }
}
