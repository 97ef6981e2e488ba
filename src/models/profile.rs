//! Candidate profile model

use serde::Deserialize;
use validator::Validate;

/// Inbound prediction request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CandidateProfile {
    /// Free-text skills, comma or whitespace separated.
    #[validate(length(min = 2, message = "skills must be at least 2 characters"))]
    pub skills: String,

    #[validate(length(min = 1, message = "qualification must not be empty"))]
    pub qualification: String,

    /// Years of experience; bounded to catch unit mistakes upstream.
    #[validate(range(min = 0.0, max = 80.0, message = "experience_level out of range"))]
    pub experience_level: f32,
}
