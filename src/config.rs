//! Configuration module

use std::env;
use std::time::Duration;

/// Application configuration. Every knob is an environment variable so it can
/// change without redeploying code.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Path to the model artifact
    pub model_path: String,

    /// Confidence below this triggers the human-review fallback
    pub fallback_threshold: f64,

    /// Rolling average below this marks the drift signal degraded
    pub drift_threshold: f64,

    /// Rolling confidence window capacity
    pub window_capacity: usize,

    /// Timeout applied to encoder + predictor work per request
    pub upstream_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            model_path: env::var("MODEL_PATH").unwrap_or_else(|_| "model.json".to_string()),

            fallback_threshold: env::var("FALLBACK_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.6),

            drift_threshold: env::var("DRIFT_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.5),

            window_capacity: env::var("WINDOW_CAPACITY")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(100),

            upstream_timeout: Duration::from_millis(
                env::var("UPSTREAM_TIMEOUT_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(2000),
            ),
        }
    }
}
