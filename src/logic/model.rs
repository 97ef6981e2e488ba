//! Predictor - Opaque model capability
//!
//! The core treats "the model" as a capability mapping a feature vector to a
//! probability distribution over a fixed label set. The bundled
//! `LinearModel` loads a JSON artifact exported by the training pipeline and
//! serves softmax scores; swapping it for another engine only means another
//! `Predictor` impl.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LabelDistribution;

use super::UpstreamError;

/// Maps a fixed-length feature vector to a probability distribution over the
/// label set established at load time. Must not mutate shared state.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<LabelDistribution, UpstreamError>;

    /// The fixed label set, in output order.
    fn labels(&self) -> &[String];
}

/// On-disk model artifact, one weight row and one bias per label.
#[derive(Debug, Deserialize)]
pub struct ModelArtifact {
    pub labels: Vec<String>,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Loaded-model metadata surfaced through the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub source: String,
    pub label_count: usize,
    pub feature_dim: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Linear scorer with a softmax head over the artifact's label set.
pub struct LinearModel {
    labels: Vec<String>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    feature_dim: usize,
    loaded_at: DateTime<Utc>,
    source: String,
}

impl LinearModel {
    /// Load a model artifact from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading model artifact from {}", path.display());

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).context("model artifact is not valid JSON")?;

        let model = Self::from_artifact(artifact, path.display().to_string())?;
        tracing::info!(
            "Model loaded: {} labels, {} features",
            model.labels.len(),
            model.feature_dim
        );
        Ok(model)
    }

    pub fn from_artifact(artifact: ModelArtifact, source: String) -> anyhow::Result<Self> {
        if artifact.labels.is_empty() {
            anyhow::bail!("model artifact has no labels");
        }
        if artifact.weights.len() != artifact.labels.len() {
            anyhow::bail!(
                "weight rows ({}) do not match labels ({})",
                artifact.weights.len(),
                artifact.labels.len()
            );
        }
        if artifact.bias.len() != artifact.labels.len() {
            anyhow::bail!(
                "bias entries ({}) do not match labels ({})",
                artifact.bias.len(),
                artifact.labels.len()
            );
        }

        let feature_dim = artifact.weights[0].len();
        if feature_dim == 0 || artifact.weights.iter().any(|row| row.len() != feature_dim) {
            anyhow::bail!("weight rows must share one non-zero feature dimension");
        }

        Ok(Self {
            labels: artifact.labels,
            weights: artifact.weights,
            bias: artifact.bias,
            feature_dim,
            loaded_at: Utc::now(),
            source,
        })
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            source: self.source.clone(),
            label_count: self.labels.len(),
            feature_dim: self.feature_dim,
            loaded_at: self.loaded_at,
        }
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<LabelDistribution, UpstreamError> {
        if features.len() != self.feature_dim {
            return Err(UpstreamError(format!(
                "feature vector has {} entries, model expects {}",
                features.len(),
                self.feature_dim
            )));
        }

        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + bias
            })
            .collect();

        // Stable softmax: shift by the max score before exponentiating
        let max_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max_score).exp()).collect();
        let total: f64 = exps.iter().sum();

        Ok(LabelDistribution::new(
            self.labels
                .iter()
                .zip(&exps)
                .map(|(label, e)| (label.clone(), e / total))
                .collect(),
        ))
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}
