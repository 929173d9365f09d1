//! Cash and position bookkeeping for one episode

use crate::env::Action;
use crate::error::GymError;
use crate::portfolio::Position;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of applying one action to one symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub action: Action,
    /// Shares bought or sold; zero when the action changed nothing
    pub shares: u64,
    pub price: f64,
}

impl Fill {
    fn none(action: Action, price: f64) -> Self {
        Self {
            action,
            shares: 0,
            price,
        }
    }

    /// Check if the action moved cash or shares
    pub fn is_filled(&self) -> bool {
        self.shares > 0
    }

    /// Cash moved by the fill, signed from the ledger's side
    pub fn cash_delta(&self) -> f64 {
        let notional = self.shares as f64 * self.price;
        match self.action {
            Action::Buy => -notional,
            Action::Sell => notional,
            Action::Hold => 0.0,
        }
    }
}

/// Cash plus one position per tracked symbol, addressed by symbol index
///
/// Buys spend the largest whole-share quantity cash allows and sells always
/// liquidate, so cash and shares never go negative and no trade is ever
/// rejected for insufficient funds.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_cash: f64,
    cash: f64,
    positions: Vec<Position>,
}

impl Ledger {
    pub fn new<S: AsRef<str>>(symbols: &[S], initial_cash: f64) -> Result<Self> {
        if symbols.is_empty() {
            return Err(GymError::config("ledger needs at least one symbol"));
        }
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(GymError::config(format!(
                "initial balance must be finite and positive, got {}",
                initial_cash
            )));
        }
        Ok(Self {
            initial_cash,
            cash: initial_cash,
            positions: symbols.iter().map(|s| Position::new(s.as_ref())).collect(),
        })
    }

    /// Spend as much cash as possible on whole shares
    pub fn apply_buy(&mut self, symbol: usize, price: f64) -> Fill {
        if !usable_price(price) {
            warn!("Ignoring buy at unusable price {}", price);
            return Fill::none(Action::Buy, price);
        }
        let Some(position) = self.positions.get_mut(symbol) else {
            return Fill::none(Action::Buy, price);
        };

        let shares = (self.cash / price).floor() as u64;
        if shares == 0 {
            return Fill::none(Action::Buy, price);
        }
        position.shares += shares;
        self.cash = clamp_dust(self.cash - shares as f64 * price);
        debug!("Bought {} {} @ {:.4}", shares, position.symbol, price);

        Fill {
            action: Action::Buy,
            shares,
            price,
        }
    }

    /// Liquidate the whole position
    pub fn apply_sell(&mut self, symbol: usize, price: f64) -> Fill {
        if !usable_price(price) {
            warn!("Ignoring sell at unusable price {}", price);
            return Fill::none(Action::Sell, price);
        }
        let Some(position) = self.positions.get_mut(symbol) else {
            return Fill::none(Action::Sell, price);
        };
        if position.is_flat() {
            return Fill::none(Action::Sell, price);
        }

        let shares = position.shares;
        self.cash += shares as f64 * price;
        position.shares = 0;
        debug!("Sold {} {} @ {:.4}", shares, position.symbol, price);

        Fill {
            action: Action::Sell,
            shares,
            price,
        }
    }

    pub fn apply(&mut self, action: Action, symbol: usize, price: f64) -> Fill {
        match action {
            Action::Hold => Fill::none(Action::Hold, price),
            Action::Buy => self.apply_buy(symbol, price),
            Action::Sell => self.apply_sell(symbol, price),
        }
    }

    /// Cash plus shares valued at the given closes; `None` skips a symbol
    pub fn mark_to_market(&self, prices: &[Option<f64>]) -> f64 {
        self.cash
            + self
                .positions
                .iter()
                .zip(prices)
                .filter_map(|(position, price)| price.map(|p| position.value(p)))
                .sum::<f64>()
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn shares(&self, symbol: usize) -> u64 {
        self.positions.get(symbol).map(|p| p.shares).unwrap_or(0)
    }

    /// Restore the opening state of an episode
    pub fn reset(&mut self) {
        self.cash = self.initial_cash;
        for position in &mut self.positions {
            position.shares = 0;
        }
    }
}

fn usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Float dust from `cash - shares * price` must not leave cash below zero
fn clamp_dust(cash: f64) -> f64 {
    cash.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_spends_whole_shares() {
        let mut ledger = Ledger::new(&["AAPL"], 10_000.0).unwrap();
        let fill = ledger.apply_buy(0, 300.0);

        assert_eq!(fill.shares, 33);
        assert_eq!(ledger.shares(0), 33);
        assert!((ledger.cash() - 100.0).abs() < 1e-9);
        assert!((fill.cash_delta() + 9_900.0).abs() < 1e-9);
    }

    #[test]
    fn test_buy_without_cash_is_noop() {
        let mut ledger = Ledger::new(&["AAPL"], 50.0).unwrap();
        let fill = ledger.apply_buy(0, 100.0);
        assert!(!fill.is_filled());
        assert_eq!(ledger.cash(), 50.0);
        assert_eq!(ledger.shares(0), 0);
    }

    #[test]
    fn test_sell_liquidates_and_flat_sell_is_noop() {
        let mut ledger = Ledger::new(&["AAPL"], 10_000.0).unwrap();
        assert!(!ledger.apply_sell(0, 100.0).is_filled());

        ledger.apply_buy(0, 100.0);
        let fill = ledger.apply_sell(0, 110.0);
        assert_eq!(fill.shares, 100);
        assert_eq!(ledger.cash(), 11_000.0);
        assert_eq!(ledger.shares(0), 0);
    }

    #[test]
    fn test_unusable_prices_ignored() {
        let mut ledger = Ledger::new(&["AAPL"], 1_000.0).unwrap();
        assert!(!ledger.apply_buy(0, 0.0).is_filled());
        assert!(!ledger.apply_buy(0, f64::NAN).is_filled());
        assert!(!ledger.apply_buy(0, -5.0).is_filled());
        assert!(!ledger.apply_buy(3, 10.0).is_filled());
        assert_eq!(ledger.cash(), 1_000.0);
    }

    #[test]
    fn test_mark_to_market_skips_missing_prices() {
        let mut ledger = Ledger::new(&["AAPL", "MSFT"], 1_000.0).unwrap();
        ledger.apply_buy(0, 100.0);
        assert_eq!(ledger.mark_to_market(&[Some(120.0), Some(50.0)]), 1_200.0);
        assert_eq!(ledger.mark_to_market(&[None, Some(50.0)]), 0.0);
    }

    #[test]
    fn test_random_sequence_keeps_invariants() {
        let mut ledger = Ledger::new(&["AAPL", "MSFT"], 10_000.0).unwrap();
        let prices = [97.3, 101.9, 88.1, 120.4, 33.3, 250.0, 99.99];
        let actions = [Action::Buy, Action::Sell, Action::Hold];
        for i in 0..200usize {
            let action = actions[(i * 7 + i / 3) % 3];
            let price = prices[(i * 5) % prices.len()];
            ledger.apply(action, i % 2, price);
            assert!(ledger.cash() >= 0.0);
        }
    }

    #[test]
    fn test_buy_all_then_mark_near_initial() {
        let mut ledger = Ledger::new(&["AAPL"], 10_000.0).unwrap();
        ledger.apply_buy(0, 333.0);
        let value = ledger.mark_to_market(&[Some(333.0)]);
        assert!((value - 10_000.0).abs() < 333.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Ledger::new(&["AAPL"], 0.0).is_err());
        assert!(Ledger::new(&["AAPL"], f64::INFINITY).is_err());
        assert!(Ledger::new::<&str>(&[], 100.0).is_err());
    }
}
