//! Prediction handler
//!
//! The serving pipeline: validate -> encode -> predict -> decide -> record.
//! Stateless per request; the drift window is the only state that crosses
//! requests, and it is only touched after the upstream calls succeed so a
//! failed request can never pollute the drift signal.

use std::sync::atomic::Ordering;

use axum::{extract::State, Json};
use validator::Validate;

use crate::logic::{decision, UpstreamError};
use crate::models::{CandidateProfile, LabelDistribution, PredictionResponse};
use crate::{AppError, AppResult, AppState};

pub async fn predict(
    State(state): State<AppState>,
    Json(profile): Json<CandidateProfile>,
) -> AppResult<Json<PredictionResponse>> {
    profile
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let predictor = state
        .predictor
        .clone()
        .ok_or_else(|| AppError::UpstreamUnavailable("model not loaded".into()))?;
    let encoder = state.encoder.clone();

    // Encoder and predictor are bounded-latency external collaborators: run
    // them off the async worker and treat a timeout as an upstream failure.
    let upstream = tokio::time::timeout(
        state.config.upstream_timeout,
        tokio::task::spawn_blocking(move || -> Result<LabelDistribution, UpstreamError> {
            let features = encoder.encode(&profile)?;
            predictor.predict(&features)
        }),
    )
    .await;

    let distribution = match upstream {
        Err(_) => {
            return Err(AppError::UpstreamUnavailable(format!(
                "prediction timed out after {:?}",
                state.config.upstream_timeout
            )))
        }
        Ok(Err(join_err)) => {
            return Err(AppError::UpstreamUnavailable(format!(
                "prediction task failed: {join_err}"
            )))
        }
        Ok(Ok(Err(upstream_err))) => {
            return Err(AppError::UpstreamUnavailable(upstream_err.to_string()))
        }
        Ok(Ok(Ok(distribution))) => distribution,
    };

    let decision = decision::decide(&distribution, state.config.fallback_threshold)?;

    state.drift.record(decision.confidence)?;
    state.counters.predictions.fetch_add(1, Ordering::Relaxed);
    if !decision.accepted {
        state.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Fallback triggered: confidence {:.3} below threshold {:.3}",
            decision.confidence,
            state.config.fallback_threshold
        );
    }

    if state.drift.is_degraded(state.config.drift_threshold) {
        if let Some(avg) = state.drift.snapshot().rolling_average {
            // Signal only. Retraining belongs to external governance.
            tracing::warn!(
                "Model confidence degradation: rolling average {:.3} below {:.3}",
                avg,
                state.config.drift_threshold
            );
        }
    }

    Ok(Json(decision.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::handlers::metrics::ServingCounters;
    use crate::logic::drift::DriftMonitor;
    use crate::logic::encoder::FeatureEncoder;
    use crate::logic::model::Predictor;
    use crate::logic::UpstreamError;
    use crate::models::{CandidateProfile, LabelDistribution};
    use crate::{create_router, AppState};

    struct StubEncoder;

    impl FeatureEncoder for StubEncoder {
        fn encode(&self, _profile: &CandidateProfile) -> Result<Vec<f64>, UpstreamError> {
            Ok(vec![1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct StubPredictor {
        entries: Vec<(String, f64)>,
        delay: Option<Duration>,
        fail: bool,
    }

    impl StubPredictor {
        fn returning(entries: &[(&str, f64)]) -> Self {
            Self {
                entries: entries.iter().map(|(l, p)| (l.to_string(), *p)).collect(),
                delay: None,
                fail: false,
            }
        }
    }

    impl Predictor for StubPredictor {
        fn predict(&self, _features: &[f64]) -> Result<LabelDistribution, UpstreamError> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            if self.fail {
                return Err(UpstreamError("model backend down".into()));
            }
            Ok(LabelDistribution::new(self.entries.clone()))
        }

        fn labels(&self) -> &[String] {
            &[]
        }
    }

    fn test_config() -> Config {
        Config {
            port: 0,
            model_path: "unused".into(),
            fallback_threshold: 0.6,
            drift_threshold: 0.5,
            window_capacity: 10,
            upstream_timeout: Duration::from_millis(250),
        }
    }

    fn state_with(predictor: Option<StubPredictor>) -> AppState {
        AppState {
            config: test_config(),
            encoder: Arc::new(StubEncoder),
            predictor: predictor.map(|p| Arc::new(p) as Arc<dyn Predictor>),
            model_info: None,
            drift: Arc::new(DriftMonitor::new(10).unwrap()),
            counters: Arc::new(ServingCounters::default()),
        }
    }

    fn predict_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn valid_body() -> serde_json::Value {
        serde_json::json!({
            "skills": "Python, Machine Learning, Docker",
            "qualification": "M.Sc",
            "experience_level": 8.0
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_confident_prediction_round_trip() {
        let state = state_with(Some(StubPredictor::returning(&[
            ("Data_Scientist", 0.9),
            ("Backend_Dev", 0.1),
        ])));
        let drift = state.drift.clone();
        let app = create_router(state);

        let response = app.oneshot(predict_request(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["predicted_label"], "Data_Scientist");
        assert_eq!(body["confidence"], 0.9);
        assert_eq!(body["accepted"], true);
        assert!(body.get("fallback_label").is_none());

        // The served confidence landed in the drift window
        let snap = drift.snapshot();
        assert_eq!(snap.sample_count, 1);
        assert_eq!(snap.rolling_average, Some(0.9));
    }

    #[tokio::test]
    async fn test_low_confidence_returns_fallback_marker() {
        let state = state_with(Some(StubPredictor::returning(&[
            ("Backend_Dev", 0.4),
            ("Data_Scientist", 0.35),
            ("Frontend_Dev", 0.25),
        ])));
        let counters = state.counters.clone();
        let app = create_router(state);

        let response = app.oneshot(predict_request(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["accepted"], false);
        assert_eq!(body["fallback_label"], "Generalist_Candidate_Review_Required");
        assert_eq!(
            counters.fallbacks.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_without_recording() {
        let state = state_with(Some(StubPredictor::returning(&[("A", 1.0)])));
        let drift = state.drift.clone();
        let app = create_router(state);

        let body = serde_json::json!({
            "skills": "x",
            "qualification": "B.Sc",
            "experience_level": 2.0
        });
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(drift.snapshot().sample_count, 0);
    }

    #[tokio::test]
    async fn test_predictor_failure_maps_to_bad_gateway() {
        let mut predictor = StubPredictor::returning(&[("A", 1.0)]);
        predictor.fail = true;

        let state = state_with(Some(predictor));
        let drift = state.drift.clone();
        let app = create_router(state);

        let response = app.oneshot(predict_request(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        // Failed requests never feed the drift signal
        assert_eq!(drift.snapshot().sample_count, 0);
    }

    #[tokio::test]
    async fn test_missing_model_maps_to_bad_gateway() {
        let app = create_router(state_with(None));
        let response = app.oneshot(predict_request(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_slow_predictor_times_out() {
        let mut predictor = StubPredictor::returning(&[("A", 1.0)]);
        predictor.delay = Some(Duration::from_millis(1500));

        let state = state_with(Some(predictor));
        let drift = state.drift.clone();
        let app = create_router(state);

        let response = app.oneshot(predict_request(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(drift.snapshot().sample_count, 0);
    }

    #[tokio::test]
    async fn test_metrics_reflect_served_requests() {
        let state = state_with(Some(StubPredictor::returning(&[
            ("Backend_Dev", 0.8),
            ("Data_Scientist", 0.2),
        ])));
        let app = create_router(state);

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(predict_request(valid_body()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["sample_count"], 3);
        assert_eq!(body["window_capacity"], 10);
        assert_eq!(body["predictions_total"], 3);
        assert_eq!(body["fallbacks_total"], 0);
        assert_eq!(body["degraded"], false);
        let avg = body["rolling_average"].as_f64().unwrap();
        assert!((avg - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_metrics_report_unknown_average_before_traffic() {
        let app = create_router(state_with(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["sample_count"], 0);
        assert!(body["rolling_average"].is_null());
    }

    #[tokio::test]
    async fn test_health_reports_model_state() {
        let app = create_router(state_with(None));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_loaded"], false);
    }
}
