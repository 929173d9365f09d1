use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shared::TickerError;
use thiserror::Error;
use tracing::error;

/// Error returned by route handlers, rendered as `{"error": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(e) => {
                error!("Request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<TickerError> for ApiError {
    fn from(e: TickerError) -> Self {
        match e {
            TickerError::Duplicate(_) | TickerError::Invalid(_) => Self::BadRequest(e.to_string()),
            TickerError::NotFound(_) => Self::NotFound(e.to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<trading_gym::GymError> for ApiError {
    fn from(e: trading_gym::GymError) -> Self {
        Self::Internal(e.into())
    }
}
