//! Category aggregation over one analysis run.

use std::collections::{BTreeMap, BTreeSet};

use hygiene_models::{CategoryAggregate, DetectionCategory, FrameDetections};
use tracing::debug;

use crate::config::{Exclusion, ScoringConfig};

/// Folds per-frame detections into one [`CategoryAggregate`] per category.
///
/// A frame contributes to a category when its `detected` flag is set.
/// Exclusions then drop every contributing frame of the suppressed
/// category whose timestamp also contributed to the positive one, so a
/// gloved frame never counts as a bare-hand violation.
#[derive(Debug, Clone)]
pub struct Aggregator {
    exclusions: Vec<Exclusion>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl Aggregator {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            exclusions: config.exclusions.clone(),
        }
    }

    /// Aggregate every category; categories nobody flagged come back empty.
    pub fn aggregate(
        &self,
        frames: &[FrameDetections],
    ) -> BTreeMap<DetectionCategory, CategoryAggregate> {
        let excluded = self.excluded_timestamps(frames);

        let mut aggregates: BTreeMap<DetectionCategory, CategoryAggregate> = DetectionCategory::ALL
            .iter()
            .map(|&category| (category, CategoryAggregate::new(category)))
            .collect();

        let mut suppressed = 0usize;
        for frame in frames {
            for (category, detection) in &frame.categories {
                if !detection.detected {
                    continue;
                }
                if excluded
                    .get(category)
                    .is_some_and(|set| set.contains(&frame.timestamp_secs))
                {
                    suppressed += 1;
                    continue;
                }
                if let Some(aggregate) = aggregates.get_mut(category) {
                    aggregate.record(frame.timestamp_secs, detection.confidence);
                }
            }
        }

        debug!(
            frames = frames.len(),
            suppressed,
            "Aggregated frame detections"
        );

        aggregates
    }

    /// Timestamps to drop, keyed by the suppressed category.
    fn excluded_timestamps(
        &self,
        frames: &[FrameDetections],
    ) -> BTreeMap<DetectionCategory, BTreeSet<u32>> {
        let mut excluded: BTreeMap<DetectionCategory, BTreeSet<u32>> = BTreeMap::new();

        for exclusion in &self.exclusions {
            let positive = frames
                .iter()
                .filter(|f| f.is_detected(exclusion.positive))
                .map(|f| f.timestamp_secs);
            excluded
                .entry(exclusion.suppressed)
                .or_default()
                .extend(positive);
        }

        excluded
    }
}
