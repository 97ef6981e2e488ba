//! Metrics handler
//!
//! Read-only snapshot of the drift window plus serving counters. Safe to
//! poll at high frequency: one O(1) lock acquisition, no blocking I/O.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{extract::State, Json};
use serde::Serialize;

use crate::logic::drift::DriftSnapshot;
use crate::AppState;

/// Monotonic serving totals, updated lock-free on the request path.
#[derive(Debug, Default)]
pub struct ServingCounters {
    pub predictions: AtomicU64,
    pub fallbacks: AtomicU64,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    drift: DriftSnapshot,
    predictions_total: u64,
    fallbacks_total: u64,
    /// True when the full window's average sits below the drift threshold.
    degraded: bool,
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let drift = state.drift.snapshot();
    let degraded = state.drift.is_degraded(state.config.drift_threshold);

    Json(MetricsResponse {
        drift,
        predictions_total: state.counters.predictions.load(Ordering::Relaxed),
        fallbacks_total: state.counters.fallbacks.load(Ordering::Relaxed),
        degraded,
    })
}
