use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/stocks",
        get(list_stocks).post(add_stock).delete(remove_stock),
    )
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub symbol: String,
}

/// GET /stocks
async fn list_stocks(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let symbols = state.tickers.lock().await.load()?;
    Ok(Json(json!({ "symbols": symbols })))
}

/// POST /stocks
async fn add_stock(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StockRequest>,
) -> Result<Json<Value>, ApiError> {
    let symbols = state.tickers.lock().await.add(&req.symbol)?;
    Ok(Json(json!({ "symbols": symbols })))
}

/// DELETE /stocks
async fn remove_stock(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StockRequest>,
) -> Result<Json<Value>, ApiError> {
    let symbols = state.tickers.lock().await.remove(&req.symbol)?;
    Ok(Json(json!({ "symbols": symbols })))
}
