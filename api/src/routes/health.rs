use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "running_sessions": state.sessions.running().await,
        "build": {
            "version": env!("CARGO_PKG_VERSION"),
            "git_hash": env!("GIT_HASH"),
            "git_branch": env!("GIT_BRANCH"),
            "rustc": env!("RUSTC_VERSION"),
            "profile": env!("PROFILE"),
            "built_at": env!("BUILD_TIME"),
        },
    }))
}
