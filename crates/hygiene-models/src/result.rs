//! Analysis result value object.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::DetectionCategory;
use crate::finding::{Finding, Severity};

/// Score breakdown for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryScore {
    /// 0-100
    pub score: f64,
    pub weight: f64,
    /// Percentage of sampled frames that flagged the category (0-100)
    pub detection_rate: f64,
    /// Average confidence of contributing frames
    pub confidence: f64,
}

/// The sole output of an analysis run.
///
/// Persistence and rendering treat this as an opaque value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Weighted sum of category scores, rounded (0-100)
    pub overall_score: u8,
    pub category_scores: BTreeMap<DetectionCategory, CategoryScore>,
    /// Ranked most severe first
    pub findings: Vec<Finding>,
    pub suggestions: Vec<String>,
    pub summary: String,
    /// Frames that produced a detection record
    pub frames_analyzed: u32,
    /// Frames whose detection call failed and were excluded
    #[serde(default)]
    pub frames_failed: u32,
}

impl AnalysisResult {
    /// Number of findings at the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn has_critical(&self) -> bool {
        self.count_severity(Severity::Critical) > 0
    }

    pub fn score_for(&self, category: DetectionCategory) -> Option<&CategoryScore> {
        self.category_scores.get(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_schema_matches_wire_names() {
        let schema = serde_json::to_value(schemars::schema_for!(AnalysisResult)).unwrap();

        let properties = schema["properties"].as_object().unwrap();
        for field in [
            "overall_score",
            "category_scores",
            "findings",
            "suggestions",
            "summary",
            "frames_analyzed",
            "frames_failed",
        ] {
            assert!(properties.contains_key(field), "missing {}", field);
        }

        // Older payloads without a failure count still validate
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"overall_score"));
        assert!(!required.contains(&"frames_failed"));

        let categories: Vec<&str> = schema["definitions"]["DetectionCategory"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let expected: Vec<&str> = DetectionCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(categories, expected);
    }
}
