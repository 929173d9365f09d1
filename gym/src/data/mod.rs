//! Data management module
//!
//! Handles OHLCV ticks, feature rows, the flat feature table and the
//! read-only feature store the environment steps through.

pub mod datetime_format;
pub mod feature;
pub mod store;
pub mod table;
pub mod tick;

pub use feature::*;
pub use store::*;
pub use table::*;
pub use tick::*;
