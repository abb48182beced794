//! Per-category aggregates over one analysis run.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::category::DetectionCategory;

/// Everything one category accumulated across the sampled frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryAggregate {
    pub category: DetectionCategory,
    /// Timestamps (seconds) of contributing frames, deduplicated
    pub detected_timestamps: BTreeSet<u32>,
    /// One per contributing frame
    pub total_detections: u32,
    /// Running mean over contributing frames only
    pub average_confidence: f64,
}

impl CategoryAggregate {
    pub fn new(category: DetectionCategory) -> Self {
        Self {
            category,
            detected_timestamps: BTreeSet::new(),
            total_detections: 0,
            average_confidence: 0.0,
        }
    }

    /// Fold one contributing frame into the aggregate.
    pub fn record(&mut self, timestamp_secs: u32, confidence: f64) {
        self.detected_timestamps.insert(timestamp_secs);
        self.total_detections += 1;
        let n = self.total_detections as f64;
        self.average_confidence += (confidence - self.average_confidence) / n;
    }

    /// Earliest contributing timestamp, if any.
    pub fn first_timestamp(&self) -> Option<u32> {
        self.detected_timestamps.iter().next().copied()
    }

    /// Number of distinct contributing moments.
    pub fn detected_frames(&self) -> usize {
        self.detected_timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detected_timestamps.is_empty()
    }
}
