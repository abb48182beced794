//! Kitchen hygiene analysis pipeline.
//!
//! This crate wires the sampler, detector client and scoring engine into
//! one entry point, [`HygieneAnalyzer::analyze`], and provides:
//! - The fatal error taxonomy with user-facing messages
//! - Environment-driven configuration
//! - Structured per-run logging and monotonic progress reporting

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod progress;

pub use config::AnalyzerConfig;
pub use error::{AnalysisError, AnalyzeResult};
pub use logging::AnalysisLogger;
pub use pipeline::HygieneAnalyzer;
pub use progress::{ProgressCallback, ProgressReporter};
