use shared::{Config, TickerList};
use std::sync::Arc;
use tokio::sync::Mutex;
use trading_gym::session::SessionManager;

/// Shared application state, passed to handlers via `axum::extract::State`
pub struct AppState {
    pub config: Config,
    /// Serializes read-modify-write updates of the tickers file
    pub tickers: Mutex<TickerList>,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let tickers = Mutex::new(TickerList::new(config.tickers_file.clone()));
        let sessions = SessionManager::new(config.session_timeout);
        Arc::new(Self {
            config,
            tickers,
            sessions,
        })
    }
}
