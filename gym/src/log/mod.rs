//! Episode logging module
//!
//! Trade and action logs are written once per completed episode.

pub mod episode;

pub use episode::*;
