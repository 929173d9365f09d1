//! Policy evaluation module

pub mod metrics;
pub mod policy;
pub mod report;
pub mod runner;

pub use metrics::*;
pub use policy::*;
pub use report::*;
pub use runner::*;
