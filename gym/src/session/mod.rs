//! Training-session management
//!
//! Runs trainer processes and evaluation episodes as supervised background
//! tasks with a timeout and on-request termination.

pub mod job;
pub mod manager;

pub use job::*;
pub use manager::*;
