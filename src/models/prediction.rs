//! Prediction models

use serde::{Deserialize, Serialize};

/// Ordered probability distribution over the fixed label set.
///
/// Ordering follows the model's label order; invariants (non-empty,
/// probabilities in [0,1] summing to 1) are enforced where the distribution
/// is consumed, not silently repaired here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDistribution {
    entries: Vec<(String, f64)>,
}

impl LabelDistribution {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One served decision. Created fresh per request, immutable once returned,
/// never persisted by the core.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub predicted_label: String,
    /// Maximum probability in the distribution.
    pub confidence: f64,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_label: Option<String>,
}

/// Wire response for `POST /predict`.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_label: String,
    pub confidence: f64,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_label: Option<String>,
}

impl From<Decision> for PredictionResponse {
    fn from(decision: Decision) -> Self {
        Self {
            predicted_label: decision.predicted_label,
            confidence: decision.confidence,
            accepted: decision.accepted,
            fallback_label: decision.fallback_label,
        }
    }
}
