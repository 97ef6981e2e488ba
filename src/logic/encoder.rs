//! Feature Encoder - Upstream collaborator contract
//!
//! The core consumes an encoder, it does not specify one. The bundled
//! `HashingEncoder` is the minimal deterministic wiring: skills tokens are
//! hashed into a fixed number of buckets, the qualification lands in its own
//! bucket slot, and the experience level is appended as a scaled scalar.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::models::CandidateProfile;

use super::UpstreamError;

/// Maps a raw candidate profile to a fixed-length feature vector.
/// Must be deterministic for identical input.
pub trait FeatureEncoder: Send + Sync {
    fn encode(&self, profile: &CandidateProfile) -> Result<Vec<f64>, UpstreamError>;

    /// Length of every vector `encode` produces.
    fn dimension(&self) -> usize;
}

/// Token-hashing encoder over a fixed bucket count.
pub struct HashingEncoder {
    skill_buckets: usize,
    qualification_buckets: usize,
}

/// Scale that maps a plausible experience range into roughly [0, 1].
const EXPERIENCE_SCALE: f64 = 50.0;

impl HashingEncoder {
    pub fn new(skill_buckets: usize, qualification_buckets: usize) -> Self {
        Self {
            skill_buckets,
            qualification_buckets,
        }
    }

    fn bucket(token: &str, buckets: usize) -> usize {
        // DefaultHasher uses fixed keys, so bucket assignment is stable
        // across processes.
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() % buckets as u64) as usize
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(64, 8)
    }
}

impl FeatureEncoder for HashingEncoder {
    fn encode(&self, profile: &CandidateProfile) -> Result<Vec<f64>, UpstreamError> {
        let mut features = vec![0.0; self.dimension()];

        let tokens = profile
            .skills
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let mut token_count = 0usize;
        for token in tokens {
            let idx = Self::bucket(&token.to_lowercase(), self.skill_buckets);
            features[idx] += 1.0;
            token_count += 1;
        }
        if token_count == 0 {
            return Err(UpstreamError("no skill tokens to encode".into()));
        }

        let qual_idx = self.skill_buckets
            + Self::bucket(
                &profile.qualification.trim().to_lowercase(),
                self.qualification_buckets,
            );
        features[qual_idx] = 1.0;

        let last = self.dimension() - 1;
        features[last] = (f64::from(profile.experience_level) / EXPERIENCE_SCALE).min(1.0);

        Ok(features)
    }

    fn dimension(&self) -> usize {
        self.skill_buckets + self.qualification_buckets + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(skills: &str, qualification: &str, experience_level: f32) -> CandidateProfile {
        CandidateProfile {
            skills: skills.to_string(),
            qualification: qualification.to_string(),
            experience_level,
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = HashingEncoder::default();
        let p = profile("Python, Machine Learning, Docker", "M.Sc", 8.0);

        assert_eq!(encoder.encode(&p).unwrap(), encoder.encode(&p).unwrap());
    }

    #[test]
    fn test_vector_has_fixed_dimension() {
        let encoder = HashingEncoder::new(16, 4);

        let short = encoder.encode(&profile("Rust", "B.Sc", 1.0)).unwrap();
        let long = encoder
            .encode(&profile("Rust, Go, C, Java, SQL, Bash", "PhD", 20.0))
            .unwrap();

        assert_eq!(short.len(), encoder.dimension());
        assert_eq!(long.len(), encoder.dimension());
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let encoder = HashingEncoder::default();
        let a = encoder.encode(&profile("Python, Docker", "M.Sc", 5.0)).unwrap();
        let b = encoder.encode(&profile("Docker, Python", "M.Sc", 5.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_skills_fail() {
        let encoder = HashingEncoder::default();
        assert!(encoder.encode(&profile("  , ", "B.Sc", 2.0)).is_err());
    }

    #[test]
    fn test_experience_is_capped() {
        let encoder = HashingEncoder::default();
        let features = encoder.encode(&profile("Rust", "B.Sc", 500.0)).unwrap();
        assert_eq!(*features.last().unwrap(), 1.0);
    }
}
