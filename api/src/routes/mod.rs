pub mod health;
pub mod portfolio;
pub mod stocks;
pub mod train;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Assemble the API router
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(stocks::routes())
        .merge(train::routes())
        .merge(portfolio::routes())
}
