//! Per-frame detection records.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::DetectionCategory;

/// Detector verdict for one category in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameDetection {
    pub detected: bool,
    /// Always within [0, 1]
    pub confidence: f64,
    #[serde(default)]
    pub details: String,
}

impl FrameDetection {
    /// Create a detection, clamping confidence into [0, 1].
    ///
    /// Non-finite confidences are treated as 0.
    pub fn new(detected: bool, confidence: f64, details: impl Into<String>) -> Self {
        Self {
            detected,
            confidence: clamp_confidence(confidence),
            details: details.into(),
        }
    }

    /// A "nothing seen" record.
    pub fn not_detected() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            details: String::new(),
        }
    }
}

/// Clamp a raw confidence into [0, 1].
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Normalized detector output for one frame, keyed by category.
///
/// Every category is always present; categories the backend did not report
/// are filled with [`FrameDetection::not_detected`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameDetections {
    pub frame_index: u32,
    pub timestamp_secs: u32,
    pub categories: BTreeMap<DetectionCategory, FrameDetection>,
}

impl FrameDetections {
    /// A record where no category was detected.
    pub fn nothing_detected(frame_index: u32, timestamp_secs: u32) -> Self {
        let categories = DetectionCategory::ALL
            .iter()
            .map(|c| (*c, FrameDetection::not_detected()))
            .collect();

        Self {
            frame_index,
            timestamp_secs,
            categories,
        }
    }

    /// Build from a partial map, filling missing categories.
    pub fn from_partial(
        frame_index: u32,
        timestamp_secs: u32,
        partial: BTreeMap<DetectionCategory, FrameDetection>,
    ) -> Self {
        let mut record = Self::nothing_detected(frame_index, timestamp_secs);
        record.categories.extend(partial);
        record
    }

    /// Set one category's verdict.
    pub fn with(mut self, category: DetectionCategory, detection: FrameDetection) -> Self {
        self.categories.insert(category, detection);
        self
    }

    pub fn get(&self, category: DetectionCategory) -> Option<&FrameDetection> {
        self.categories.get(&category)
    }

    pub fn is_detected(&self, category: DetectionCategory) -> bool {
        self.get(category).map(|d| d.detected).unwrap_or(false)
    }

    /// Number of categories flagged in this frame.
    pub fn detected_count(&self) -> usize {
        self.categories.values().filter(|d| d.detected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(FrameDetection::new(true, 1.7, "").confidence, 1.0);
        assert_eq!(FrameDetection::new(true, -0.2, "").confidence, 0.0);
        assert_eq!(FrameDetection::new(true, f64::NAN, "").confidence, 0.0);
    }

    #[test]
    fn test_nothing_detected_covers_all_categories() {
        let record = FrameDetections::nothing_detected(1, 0);
        assert_eq!(record.categories.len(), DetectionCategory::ALL.len());
        assert_eq!(record.detected_count(), 0);
    }

    #[test]
    fn test_from_partial_fills_missing() {
        let mut partial = BTreeMap::new();
        partial.insert(
            DetectionCategory::PestSigns,
            FrameDetection::new(true, 0.8, "droppings near bin"),
        );

        let record = FrameDetections::from_partial(3, 2, partial);
        assert!(record.is_detected(DetectionCategory::PestSigns));
        assert!(!record.is_detected(DetectionCategory::ProtectiveGloves));
        assert_eq!(record.categories.len(), 8);
    }
}
