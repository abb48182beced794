//! Detector metrics.
//!
//! Counters are no-ops unless the embedding process installs a recorder.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Per-frame detection calls by backend and outcome.
    pub const FRAMES_TOTAL: &str = "hygiene_detect_frames_total";

    /// Responses that could not be mapped and degraded to "nothing detected".
    pub const PARSE_FALLBACKS_TOTAL: &str = "hygiene_detect_parse_fallbacks_total";

    /// Per-frame call latency in seconds by backend.
    pub const LATENCY_SECONDS: &str = "hygiene_detect_latency_seconds";
}

/// Record a settled per-frame detection call.
pub fn record_frame(backend: &'static str, outcome: &'static str, latency_ms: f64) {
    counter!(names::FRAMES_TOTAL, "backend" => backend, "outcome" => outcome).increment(1);
    histogram!(names::LATENCY_SECONDS, "backend" => backend).record(latency_ms / 1000.0);
}

/// Record a response that fell back to "nothing detected".
pub fn record_parse_fallback(backend: &'static str) {
    counter!(names::PARSE_FALLBACKS_TOTAL, "backend" => backend).increment(1);
}
