//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::model::ModelInfo;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ModelInfo>,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.predictor.is_some(),
        model: state.model_info.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
