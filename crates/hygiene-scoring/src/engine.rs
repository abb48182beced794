//! Weighted scoring engine.

use std::collections::BTreeMap;

use hygiene_models::{AnalysisResult, CategoryAggregate, CategoryScore, DetectionCategory};
use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::error::ScoringResult;
use crate::findings;
use crate::suggestions::suggest;
use crate::summary::summarize;

/// Percentage of sampled frames in which the category was flagged.
///
/// Zero frames yields 0 rather than a division by zero.
pub fn detection_rate(aggregate: &CategoryAggregate, total_frames: u32) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    (aggregate.detected_frames() as f64 / total_frames as f64 * 100.0).clamp(0.0, 100.0)
}

/// Converts category aggregates into a complete [`AnalysisResult`].
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Build an engine; the policy table is validated once here.
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one run. Never fails: missing aggregates count as empty.
    pub fn score(
        &self,
        aggregates: &BTreeMap<DetectionCategory, CategoryAggregate>,
        total_frames: u32,
    ) -> AnalysisResult {
        let mut category_scores = BTreeMap::new();
        let mut found = Vec::new();
        let mut weighted = 0.0;

        for (category, policy) in &self.config.policies {
            let empty;
            let aggregate = match aggregates.get(category) {
                Some(aggregate) => aggregate,
                None => {
                    empty = CategoryAggregate::new(*category);
                    &empty
                }
            };

            let rate = detection_rate(aggregate, total_frames);
            let score = policy.score(rate);
            weighted += score * policy.weight;

            debug!(
                category = %category,
                rate,
                score,
                detections = aggregate.total_detections,
                "Scored category"
            );

            if let Some(finding) = findings::evaluate(policy, aggregate, rate) {
                found.push(finding);
            }

            category_scores.insert(
                *category,
                CategoryScore {
                    score,
                    weight: policy.weight,
                    detection_rate: rate,
                    confidence: aggregate.average_confidence,
                },
            );
        }

        findings::rank(&mut found);

        let overall_score = weighted.round().clamp(0.0, 100.0) as u8;
        let suggestions = suggest(&found, &category_scores, &self.config);
        let summary = summarize(overall_score, &category_scores);

        info!(
            overall_score,
            findings = found.len(),
            total_frames,
            "Scoring complete"
        );

        AnalysisResult {
            overall_score,
            category_scores,
            findings: found,
            suggestions,
            summary,
            frames_analyzed: total_frames,
            frames_failed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use hygiene_models::{FrameDetection, FrameDetections, Severity};
    use rand::Rng;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringConfig::default()).unwrap()
    }

    fn aggregate_with(category: DetectionCategory, timestamps: &[u32]) -> CategoryAggregate {
        let mut aggregate = CategoryAggregate::new(category);
        for &ts in timestamps {
            aggregate.record(ts, 0.8);
        }
        aggregate
    }

    fn empty_aggregates() -> BTreeMap<DetectionCategory, CategoryAggregate> {
        Aggregator::default().aggregate(&[])
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ScoringConfig::default();
        config.policies.remove(&DetectionCategory::ProperApron);
        assert!(ScoringEngine::new(config).is_err());
    }

    #[test]
    fn test_zero_frames_does_not_divide_by_zero() {
        let result = engine().score(&empty_aggregates(), 0);
        assert!(result.category_scores.values().all(|s| s.detection_rate == 0.0));
        assert!(result.overall_score <= 100);
        assert_eq!(result.frames_analyzed, 0);
    }

    #[test]
    fn test_zero_detections_is_not_a_perfect_score() {
        let result = engine().score(&empty_aggregates(), 10);

        for (category, score) in &result.category_scores {
            if category.is_violation() {
                assert_eq!(score.score, 100.0, "{category}");
            } else {
                assert_eq!(score.score, 0.0, "{category}");
            }
        }
        // Only the violation weights (0.15 + 0.10 + 0.05) earn credit
        assert_eq!(result.overall_score, 30);
        assert!(result.has_critical());
        assert!(result
            .findings
            .iter()
            .all(|f| !f.category.is_violation() && f.timestamp_secs == 0));
    }

    #[test]
    fn test_pest_scenario() {
        let mut aggregates = empty_aggregates();
        aggregates.insert(
            DetectionCategory::PestSigns,
            aggregate_with(DetectionCategory::PestSigns, &[6, 2]),
        );

        let result = engine().score(&aggregates, 10);
        let pests = result.score_for(DetectionCategory::PestSigns).unwrap();
        assert!((pests.detection_rate - 20.0).abs() < 1e-9);
        assert!(result.overall_score < 60);

        let finding = result
            .findings
            .iter()
            .find(|f| f.category == DetectionCategory::PestSigns)
            .unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.timestamp_secs, 2);
        assert_eq!(result.findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_bare_hands_rate_after_exclusion() {
        let frames: Vec<FrameDetections> = (1..=10u32)
            .map(|i| {
                let mut record = FrameDetections::nothing_detected(i, i - 1);
                if i <= 9 {
                    record = record.with(
                        DetectionCategory::ProtectiveGloves,
                        FrameDetection::new(true, 0.9, "gloves"),
                    );
                }
                if matches!(i, 1 | 2 | 10) {
                    record = record.with(
                        DetectionCategory::BareHands,
                        FrameDetection::new(true, 0.7, "bare hand"),
                    );
                }
                record
            })
            .collect();

        let aggregates = Aggregator::default().aggregate(&frames);
        let result = engine().score(&aggregates, frames.len() as u32);

        let bare = result.score_for(DetectionCategory::BareHands).unwrap();
        assert!((bare.detection_rate - 10.0).abs() < 1e-9);
        let gloves = result.score_for(DetectionCategory::ProtectiveGloves).unwrap();
        assert_eq!(gloves.score, 100.0);
        assert!(result
            .findings
            .iter()
            .all(|f| f.category != DetectionCategory::BareHands));
    }

    #[test]
    fn test_overall_is_rounded_weighted_sum_random_rates() {
        let engine = engine();
        let mut rng = rand::rng();

        for _ in 0..500 {
            let total_frames: u32 = rng.random_range(0..=60);
            let aggregates: BTreeMap<_, _> = DetectionCategory::ALL
                .iter()
                .map(|&category| {
                    let hits = if total_frames == 0 {
                        0
                    } else {
                        rng.random_range(0..=total_frames)
                    };
                    let timestamps: Vec<u32> = (0..hits).collect();
                    (category, aggregate_with(category, &timestamps))
                })
                .collect();

            let result = engine.score(&aggregates, total_frames);

            let weighted: f64 = result
                .category_scores
                .values()
                .map(|s| s.score * s.weight)
                .sum();
            assert!(result.overall_score <= 100);
            assert_eq!(result.overall_score as f64, weighted.round().clamp(0.0, 100.0));

            for score in result.category_scores.values() {
                assert!((0.0..=100.0).contains(&score.score));
                assert!((0.0..=100.0).contains(&score.detection_rate));
            }
            assert!(!result.suggestions.is_empty());
            assert!(!result.summary.is_empty());
        }
    }

    #[test]
    fn test_spotless_kitchen_gets_all_clear() {
        let mut aggregates = empty_aggregates();
        let all: Vec<u32> = (0..10).collect();
        for category in DetectionCategory::ALL.iter().filter(|c| !c.is_violation()) {
            aggregates.insert(*category, aggregate_with(*category, &all));
        }

        let result = engine().score(&aggregates, 10);
        assert_eq!(result.overall_score, 100);
        assert!(result.findings.is_empty());
        assert_eq!(result.suggestions, vec![engine().config().all_clear_message.clone()]);
        assert!(result.summary.contains("excellent"));
    }

    #[test]
    fn test_missing_aggregates_count_as_empty() {
        let result = engine().score(&BTreeMap::new(), 5);
        assert_eq!(result.category_scores.len(), DetectionCategory::ALL.len());
        assert_eq!(result, engine().score(&empty_aggregates(), 5));
    }
}
