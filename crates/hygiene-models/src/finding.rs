//! Findings emitted by the scoring engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::DetectionCategory;

/// Finding severity. Ordering puts the most severe first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

/// A single compliance issue observed in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub category: DetectionCategory,
    pub severity: Severity,
    pub description: String,
    /// Earliest moment the issue was seen; 0 means "throughout"
    pub timestamp_secs: u32,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        let mut severities = vec![Severity::Minor, Severity::Critical, Severity::Major];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Major, Severity::Minor]
        );
    }
}
