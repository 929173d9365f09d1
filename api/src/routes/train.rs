use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use trading_gym::session::{CommandJob, SessionId, SessionInfo};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/train", get(list_sessions).post(start_training))
        .route("/train/:id", get(session_status).delete(stop_session))
}

/// POST /train: runs the configured trainer command; request bodies are ignored
async fn start_training(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let job = CommandJob::new(
        state.config.trainer_program.clone(),
        state.config.trainer_args.clone(),
    );

    let id = state.sessions.start(Box::new(job)).await;
    (
        StatusCode::ACCEPTED,
        Json(json!({ "session_id": id, "status": "running" })),
    )
}

/// GET /train
async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionInfo>> {
    Json(state.sessions.list().await)
}

/// GET /train/:id
async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionInfo>, ApiError> {
    state
        .sessions
        .status(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no session {}", id)))
}

/// DELETE /train/:id
async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<Value>, ApiError> {
    let Some(info) = state.sessions.status(id).await else {
        return Err(ApiError::NotFound(format!("no session {}", id)));
    };
    if info.status.is_finished() || !state.sessions.stop(id).await {
        return Err(ApiError::BadRequest(format!(
            "session {} is not running ({:?})",
            id, info.status
        )));
    }
    Ok(Json(json!({ "session_id": id, "stopping": true })))
}
