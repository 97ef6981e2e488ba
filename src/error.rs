//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::CoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Client-facing error taxonomy. Only this layer translates internal error
/// kinds into responses; the core components fail fast with `CoreError`.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input fields. Client error, not retried here.
    InvalidRequest(String),

    /// Encoder/predictor failure or timeout. Transient; safe for the caller
    /// to retry. No retries are performed inside this service.
    UpstreamUnavailable(String),

    /// Internal contract violation. Indicates a bug; logged loudly, masked
    /// from the client.
    Internal(CoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::UpstreamUnavailable(msg) => {
                tracing::warn!("Upstream unavailable: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Prediction backend unavailable".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal contract violation: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Internal(err)
    }
}
