//! Category aggregation and weighted hygiene scoring.
//!
//! Pure transformations from per-frame detections to an [`AnalysisResult`]:
//! - [`Aggregator`] folds frame records into per-category aggregates and
//!   applies cross-category exclusions
//! - [`ScoringEngine`] maps detection rates through per-category curves,
//!   combines them with fixed weights and emits ranked findings
//! - [`suggest`] turns findings and weak categories into remediation text
//!
//! Every policy constant lives in [`ScoringConfig`].
//!
//! [`AnalysisResult`]: hygiene_models::AnalysisResult

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod findings;
pub mod suggestions;
pub mod summary;

pub use aggregator::Aggregator;
pub use config::{CategoryPolicy, Exclusion, FindingTrigger, ScoringConfig};
pub use engine::{detection_rate, ScoringEngine};
pub use error::{ScoringError, ScoringResult};
pub use suggestions::suggest;
pub use summary::{summarize, ScoreBucket};
