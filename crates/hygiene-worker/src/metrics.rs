//! Analysis metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Completed analyses by outcome.
    pub const ANALYSES_TOTAL: &str = "hygiene_analyses_total";

    /// Overall score of successful analyses.
    pub const OVERALL_SCORE: &str = "hygiene_overall_score";

    /// End-to-end analysis duration in seconds.
    pub const DURATION_SECONDS: &str = "hygiene_analysis_duration_seconds";
}

/// Record a finished analysis; `outcome` is `ok` or an error label.
pub fn record_analysis(outcome: &'static str, duration_ms: f64) {
    counter!(names::ANALYSES_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::DURATION_SECONDS, "outcome" => outcome).record(duration_ms / 1000.0);
}

pub fn record_score(score: u8) {
    histogram!(names::OVERALL_SCORE).record(score as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_analysis("ok", 1500.0);
        record_score(87);
    }
}
