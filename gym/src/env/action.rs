//! Discrete per-symbol actions

use crate::error::GymError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action for one symbol at one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    /// Do nothing
    #[default]
    Hold = 0,
    /// Spend all cash on whole shares
    Buy = 1,
    /// Liquidate the position
    Sell = 2,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Hold, Action::Buy, Action::Sell];

    /// Number of distinct actions per symbol
    pub const CARDINALITY: usize = 3;

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hold => "Hold",
            Action::Buy => "Buy",
            Action::Sell => "Sell",
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = GymError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Hold),
            1 => Ok(Action::Buy),
            2 => Ok(Action::Sell),
            other => Err(GymError::InvalidAction(other)),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Hold" | "hold" | "0" => Ok(Action::Hold),
            "Buy" | "buy" | "1" => Ok(Action::Buy),
            "Sell" | "sell" | "2" => Ok(Action::Sell),
            other => Err(GymError::config(format!("unknown action {other}"))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_conversion() {
        for action in Action::ALL {
            assert_eq!(Action::try_from(action.index()).unwrap(), action);
        }
        assert!(matches!(Action::try_from(3), Err(GymError::InvalidAction(3))));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Buy".parse::<Action>().unwrap(), Action::Buy);
        assert_eq!("sell".parse::<Action>().unwrap(), Action::Sell);
        assert!("short".parse::<Action>().is_err());
    }
}
