//! Decision Engine
//!
//! Turns a model probability distribution into an accept/fallback decision
//! under a configurable confidence threshold. Pure function of its inputs;
//! the threshold comes from config, never from hidden state.

use crate::models::{Decision, LabelDistribution};

use super::CoreError;

/// Marker returned instead of an automated decision when confidence is too low.
pub const FALLBACK_LABEL: &str = "Generalist_Candidate_Review_Required";

/// Tolerance on the sum-to-one invariant.
const DISTRIBUTION_EPSILON: f64 = 1e-6;

/// Decide whether to trust a prediction.
///
/// Picks the label with the maximum probability (ties broken by the
/// lexicographically smallest label so identical inputs always decide the
/// same way). Below `threshold` the decision is not to be acted on
/// automatically: `accepted` is false and the fallback marker is set, but the
/// predicted label is still reported for auditability.
pub fn decide(distribution: &LabelDistribution, threshold: f64) -> Result<Decision, CoreError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CoreError::Configuration(format!(
            "fallback threshold must be within [0, 1], got {threshold}"
        )));
    }

    validate_distribution(distribution)?;

    let mut best: Option<(&str, f64)> = None;
    for (label, probability) in distribution.iter() {
        let better = match best {
            None => true,
            Some((best_label, best_prob)) => {
                *probability > best_prob
                    || (*probability == best_prob && label.as_str() < best_label)
            }
        };
        if better {
            best = Some((label.as_str(), *probability));
        }
    }

    // validate_distribution rejected the empty case already
    let (predicted_label, confidence) =
        best.ok_or_else(|| CoreError::InvalidDistribution("empty distribution".into()))?;

    let accepted = confidence >= threshold;
    Ok(Decision {
        predicted_label: predicted_label.to_string(),
        confidence,
        accepted,
        fallback_label: (!accepted).then(|| FALLBACK_LABEL.to_string()),
    })
}

fn validate_distribution(distribution: &LabelDistribution) -> Result<(), CoreError> {
    if distribution.is_empty() {
        return Err(CoreError::InvalidDistribution("empty distribution".into()));
    }

    let mut sum = 0.0;
    for (label, probability) in distribution.iter() {
        if !probability.is_finite() || !(0.0..=1.0).contains(probability) {
            return Err(CoreError::InvalidDistribution(format!(
                "probability for '{label}' out of range: {probability}"
            )));
        }
        sum += probability;
    }

    if (sum - 1.0).abs() > DISTRIBUTION_EPSILON {
        return Err(CoreError::InvalidDistribution(format!(
            "probabilities sum to {sum}, expected 1"
        )));
    }

    Ok(())
}
