//! Job Role Prediction Service
//!
//! Stateless inference endpoint with a confidence-gated fallback decision
//! and an online drift signal over served confidences.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 JOB ROLE PREDICTION SERVICE              │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌────────────────────┐  │
//! │  │ /predict │──▶│ Encoder + │──▶│ Decision Engine    │  │
//! │  │  (Axum)  │   │ Predictor │   │ (threshold gate)   │  │
//! │  └──────────┘   └───────────┘   └─────────┬──────────┘  │
//! │  ┌──────────┐                             ▼             │
//! │  │ /metrics │◀───────────────── ┌────────────────────┐  │
//! │  └──────────┘                   │ Drift Monitor      │  │
//! │                                 │ (rolling window)   │  │
//! │                                 └────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::metrics::ServingCounters;
use logic::drift::DriftMonitor;
use logic::encoder::{FeatureEncoder, HashingEncoder};
use logic::model::{LinearModel, ModelInfo, Predictor};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobrole_serving=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Job Role Prediction Service starting...");
    tracing::info!(
        "Fallback threshold: {}, window capacity: {}",
        config.fallback_threshold,
        config.window_capacity
    );

    let encoder: Arc<dyn FeatureEncoder> = Arc::new(HashingEncoder::default());

    // A missing artifact keeps the process alive: /health stays reachable and
    // /predict reports the backend unavailable until a model is deployed.
    let (predictor, model_info): (Option<Arc<dyn Predictor>>, Option<ModelInfo>) =
        match LinearModel::load(Path::new(&config.model_path)) {
            Ok(model) => {
                let info = model.info();
                (Some(Arc::new(model)), Some(info))
            }
            Err(e) => {
                tracing::warn!("Model not loaded, predictions unavailable: {:#}", e);
                (None, None)
            }
        };

    let drift = Arc::new(
        DriftMonitor::new(config.window_capacity).expect("Invalid WINDOW_CAPACITY"),
    );

    // Build application state
    let state = AppState {
        config: config.clone(),
        encoder,
        predictor,
        model_info,
        drift,
        counters: Arc::new(ServingCounters::default()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub encoder: Arc<dyn FeatureEncoder>,
    /// `None` until a model artifact loads successfully.
    pub predictor: Option<Arc<dyn Predictor>>,
    pub model_info: Option<ModelInfo>,
    pub drift: Arc<DriftMonitor>,
    pub counters: Arc<ServingCounters>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/metrics", get(handlers::metrics::metrics))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
