//! Scoring configuration errors.
//!
//! Scoring itself never fails; only building an engine from an invalid
//! policy table does.

use hygiene_models::DetectionCategory;
use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Category weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("No scoring policy configured for {0}")]
    MissingCategory(DetectionCategory),

    #[error("Invalid policy for {category}: {message}")]
    InvalidPolicy {
        category: DetectionCategory,
        message: String,
    },
}

impl ScoringError {
    pub fn invalid_policy(category: DetectionCategory, message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            category,
            message: message.into(),
        }
    }
}
