//! Portfolio management module

pub mod ledger;
pub mod position;

pub use ledger::*;
pub use position::*;
