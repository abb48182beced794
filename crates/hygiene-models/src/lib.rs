//! Shared data models for the kitchen hygiene analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - The closed set of detection categories and their polarity
//! - Sampled frames and per-frame detection records
//! - Per-category aggregates built over one analysis run
//! - Findings, per-category scores and the final analysis result
//! - Progress notifications emitted while a run is in flight

pub mod aggregate;
pub mod category;
pub mod detection;
pub mod finding;
pub mod frame;
pub mod progress;
pub mod result;

// Re-export common types
pub use aggregate::CategoryAggregate;
pub use category::{DetectionCategory, Polarity, UnknownCategory};
pub use detection::{FrameDetection, FrameDetections};
pub use finding::{Finding, Severity};
pub use frame::Frame;
pub use progress::{AnalysisProgress, AnalysisStage};
pub use result::{AnalysisResult, CategoryScore};
