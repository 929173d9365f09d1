pub mod config;
pub mod database;
pub mod entity;
pub mod repository;
pub mod tickers;

pub use config::Config;
pub use database::get_db_connection;
pub use repository::IntradayRepository;
pub use tickers::{TickerError, TickerList};
