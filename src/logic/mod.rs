//! Logic Module - Serving decision core
//!
//! - `decision` - Threshold decision over a probability distribution
//! - `drift` - Rolling confidence window and drift snapshot
//! - `encoder` - FeatureEncoder collaborator contract + default impl
//! - `model` - Predictor collaborator contract + artifact-backed model

pub mod decision;
pub mod drift;
pub mod encoder;
pub mod model;

use thiserror::Error;

/// Internal contract violations. These indicate a bug in the wiring, not a
/// bad request: the serving layer logs them loudly and masks the detail.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Probability distribution violates its invariants (empty, probability
    /// out of [0,1], or sum not within epsilon of 1).
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A configuration value is outside its documented domain.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A caller passed a value that breaks a component's input contract.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

/// Failure inside an upstream collaborator (encoder or predictor).
/// Transient from the caller's point of view; safe for the caller to retry.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UpstreamError(pub String);

