//! Frame detector clients.
//!
//! This crate sends sampled frames to an external image-understanding
//! backend and normalizes whatever comes back into one
//! [`FrameDetections`](hygiene_models::FrameDetections) record per frame.
//!
//! Two backend shapes are supported behind the [`FrameDetector`] trait:
//! - [`VisionModelDetector`]: a vision-language model returning a structured
//!   object with one entry per category
//! - [`LabelDetector`]: a label-list service whose free-text labels are
//!   mapped to categories through a [`KeywordTable`]
//!
//! [`detect_batch`] fans out one call per frame and tolerates partial
//! failure.

pub mod batch;
pub mod client;
pub mod detector;
pub mod error;
pub mod keywords;
pub mod label;
pub mod metrics;
pub mod parse;
pub mod vision;

pub use batch::{detect_batch, detect_batch_with_progress, BatchOutcome, FrameFailure};
pub use client::{build_detector, DetectorBackend, DetectorClientConfig};
pub use detector::FrameDetector;
pub use error::{DetectError, DetectResult, FailureKind};
pub use keywords::{KeywordTable, Label};
pub use label::LabelDetector;
pub use vision::VisionModelDetector;
