//! Structured analysis logging utilities.
//!
//! Provides consistent lifecycle logging for analysis runs with tracing
//! spans and contextual information.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Analysis logger for structured logging with consistent formatting.
///
/// Every event carries the analysis id and operation so one run can be
/// followed through interleaved logs.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    analysis_id: String,
    operation: String,
}

impl AnalysisLogger {
    /// Create a logger with a fresh analysis id.
    pub fn new(operation: &str) -> Self {
        Self::from_string(&Uuid::new_v4().to_string(), operation)
    }

    /// Create a logger for an existing analysis id.
    pub fn from_string(analysis_id: &str, operation: &str) -> Self {
        Self {
            analysis_id: analysis_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis completed: {}", message
        );
    }

    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            analysis_id = %self.analysis_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = AnalysisLogger::new("analyze");
        let b = AnalysisLogger::new("analyze");
        assert_ne!(a.analysis_id(), b.analysis_id());
        assert!(Uuid::parse_str(a.analysis_id()).is_ok());
        assert_eq!(a.operation(), "analyze");
    }

    #[test]
    fn test_from_string() {
        let logger = AnalysisLogger::from_string("run-42", "analyze_file");
        assert_eq!(logger.analysis_id(), "run-42");
        assert_eq!(logger.operation(), "analyze_file");
    }
}
