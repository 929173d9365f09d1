//! Trading environment module
//!
//! Drives a portfolio ledger through a feature store one lockstep step at a
//! time and turns each transition into an observation and a reward.

pub mod action;
pub mod observation;
pub mod reward;
pub mod state;
pub mod trading;

pub use action::*;
pub use observation::{ActionSpace, Observation, ObservationLayout, ObservationSpace};
pub use reward::*;
pub use state::*;
pub use trading::*;
