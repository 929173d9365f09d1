//! Configuration module

pub mod settings;
pub mod shaping;

pub use settings::*;
pub use shaping::*;
