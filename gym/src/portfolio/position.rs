//! Position tracking

use serde::{Deserialize, Serialize};

/// Whole-share long holding of one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol (e.g., "AAPL")
    pub symbol: String,
    /// Shares held
    pub shares: u64,
}

impl Position {
    /// Create a flat position
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            shares: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares == 0
    }

    /// Get position value at a price
    pub fn value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }
}
