use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use trading_gym::log::read_trade_log;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio", get(portfolio))
}

/// GET /portfolio: the last episode's trade log and its final value
async fn portfolio(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let path = &state.config.trade_log;
    if !path.exists() {
        return Err(ApiError::NotFound(format!(
            "no trade log at {}",
            path.display()
        )));
    }
    let entries = read_trade_log(path)?;
    let portfolio_value = entries.last().map(|e| e.portfolio_value);
    Ok(Json(json!({
        "portfolio_value": portfolio_value,
        "trades": entries,
    })))
}
