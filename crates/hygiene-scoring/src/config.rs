//! Scoring policy table.
//!
//! One [`CategoryPolicy`] per category: weight, score curve, finding trigger
//! and remediation text. The defaults are product policy, not measured
//! ground truth; tests and deployments override them freely as long as
//! [`ScoringConfig::validate`] passes.

use std::collections::BTreeMap;

use hygiene_models::{DetectionCategory, Polarity, Severity};
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// When a category's detection rate produces a finding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rate", rename_all = "snake_case")]
pub enum FindingTrigger {
    /// Rate strictly below the given percentage
    Below(f64),
    /// Rate at or above the given percentage
    AtLeast(f64),
    /// Any detection at all
    Any,
}

impl FindingTrigger {
    pub fn fires(&self, rate: f64) -> bool {
        match *self {
            FindingTrigger::Below(threshold) => rate < threshold,
            FindingTrigger::AtLeast(threshold) => rate >= threshold,
            FindingTrigger::Any => rate > 0.0,
        }
    }
}

/// Everything the engine needs to know about one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    pub category: DetectionCategory,
    /// Share of the overall score (0-1)
    pub weight: f64,
    /// Detection rate (%) that earns full credit for positive categories
    /// or zero credit (before the floor) for violations
    pub full_credit_rate: f64,
    /// Minimum score (0-100)
    pub floor: f64,
    pub trigger: FindingTrigger,
    pub severity: Severity,
    /// Short statement of the problem, used as the finding's lead
    pub issue: String,
    /// Remediation text, one per category
    pub suggestion: String,
}

impl CategoryPolicy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: DetectionCategory,
        weight: f64,
        full_credit_rate: f64,
        floor: f64,
        trigger: FindingTrigger,
        severity: Severity,
        issue: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            category,
            weight,
            full_credit_rate,
            floor,
            trigger,
            severity,
            issue: issue.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn polarity(&self) -> Polarity {
        self.category.polarity()
    }

    /// Map a detection rate (%) onto a 0-100 score.
    ///
    /// Positive: `max(F, min(100, rate / T * 100))`.
    /// Violation: `max(F, 100 - rate / T * 100)`.
    pub fn score(&self, rate: f64) -> f64 {
        let rate = if rate.is_finite() { rate.clamp(0.0, 100.0) } else { 0.0 };
        let ratio = rate / self.full_credit_rate * 100.0;

        let curve = match self.polarity() {
            Polarity::Positive => ratio.min(100.0),
            Polarity::Violation => 100.0 - ratio,
        };

        curve.max(self.floor).clamp(0.0, 100.0)
    }

    fn validate(&self) -> ScoringResult<()> {
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(ScoringError::invalid_policy(
                self.category,
                format!("weight {} outside [0, 1]", self.weight),
            ));
        }
        if !(self.full_credit_rate > 0.0 && self.full_credit_rate <= 100.0) {
            return Err(ScoringError::invalid_policy(
                self.category,
                format!("full-credit rate {} outside (0, 100]", self.full_credit_rate),
            ));
        }
        if !(0.0..100.0).contains(&self.floor) {
            return Err(ScoringError::invalid_policy(
                self.category,
                format!("floor {} outside [0, 100)", self.floor),
            ));
        }
        if self.polarity() == Polarity::Violation && self.floor <= 0.0 {
            return Err(ScoringError::invalid_policy(
                self.category,
                "violation categories need a floor above 0",
            ));
        }
        Ok(())
    }
}

/// A positive category whose timestamps are removed from a violation
/// category's aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub positive: DetectionCategory,
    pub suppressed: DetectionCategory,
}

/// Immutable scoring policy passed into the aggregator and engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub policies: BTreeMap<DetectionCategory, CategoryPolicy>,
    pub exclusions: Vec<Exclusion>,
    /// Categories scoring below this get a suggestion even without a finding
    pub low_score_threshold: f64,
    /// Emitted when nothing else was suggested
    pub all_clear_message: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        use DetectionCategory::*;
        use FindingTrigger::*;

        let policies = [
            CategoryPolicy::new(
                ProtectiveGloves,
                0.20,
                80.0,
                0.0,
                Below(60.0),
                Severity::Critical,
                "Food handled without protective gloves",
                "Require disposable gloves for all ready-to-eat food handling and change them between tasks.",
            ),
            CategoryPolicy::new(
                BareHands,
                0.15,
                50.0,
                10.0,
                AtLeast(20.0),
                Severity::Critical,
                "Bare-hand contact with food",
                "Stop bare-hand contact with ready-to-eat food; use gloves, tongs or deli paper.",
            ),
            CategoryPolicy::new(
                HairCovering,
                0.15,
                80.0,
                0.0,
                Below(50.0),
                Severity::Major,
                "Hair restraints missing",
                "Make hair nets or caps mandatory for everyone in the preparation area.",
            ),
            CategoryPolicy::new(
                CleanSurface,
                0.15,
                70.0,
                0.0,
                Below(50.0),
                Severity::Major,
                "Preparation surfaces not visibly clean",
                "Clean and sanitize work surfaces between tasks and keep them free of clutter.",
            ),
            CategoryPolicy::new(
                ProperApron,
                0.10,
                70.0,
                0.0,
                Below(50.0),
                Severity::Minor,
                "Staff not wearing clean aprons",
                "Provide clean aprons for each shift and replace them when soiled.",
            ),
            CategoryPolicy::new(
                HandwashStation,
                0.10,
                30.0,
                0.0,
                Below(10.0),
                Severity::Major,
                "No handwashing station visible",
                "Keep a stocked handwashing station with soap and paper towels within reach of the preparation area.",
            ),
            CategoryPolicy::new(
                PestSigns,
                0.10,
                10.0,
                5.0,
                Any,
                Severity::Critical,
                "Signs of pest activity",
                "Call a licensed pest control service and seal entry points immediately.",
            ),
            CategoryPolicy::new(
                CrossContamination,
                0.05,
                30.0,
                10.0,
                AtLeast(10.0),
                Severity::Critical,
                "Cross-contamination risk between raw and ready-to-eat food",
                "Separate raw and ready-to-eat foods and use color-coded boards and utensils.",
            ),
        ]
        .into_iter()
        .map(|p| (p.category, p))
        .collect();

        Self {
            policies,
            exclusions: vec![Exclusion {
                positive: ProtectiveGloves,
                suppressed: BareHands,
            }],
            low_score_threshold: 70.0,
            all_clear_message:
                "Great work! Keep up the current hygiene practices and continue regular self-checks."
                    .to_string(),
        }
    }
}

impl ScoringConfig {
    /// Replace one category's policy.
    pub fn with_policy(mut self, policy: CategoryPolicy) -> Self {
        self.policies.insert(policy.category, policy);
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<Exclusion>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn policy(&self, category: DetectionCategory) -> Option<&CategoryPolicy> {
        self.policies.get(&category)
    }

    pub fn weight_sum(&self) -> f64 {
        self.policies.values().map(|p| p.weight).sum()
    }

    /// Check the table is complete and its weights sum to 1.
    pub fn validate(&self) -> ScoringResult<()> {
        for category in DetectionCategory::ALL {
            let policy = self
                .policies
                .get(&category)
                .ok_or(ScoringError::MissingCategory(category))?;
            if policy.category != category {
                return Err(ScoringError::invalid_policy(
                    category,
                    format!("policy is keyed under {} but describes {}", category, policy.category),
                ));
            }
            policy.validate()?;
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ScoringError::WeightSum { sum });
        }

        for exclusion in &self.exclusions {
            if exclusion.positive.polarity() != Polarity::Positive
                || exclusion.suppressed.polarity() != Polarity::Violation
            {
                return Err(ScoringError::invalid_policy(
                    exclusion.suppressed,
                    format!(
                        "exclusion must pair a positive category with a violation, got {} -> {}",
                        exclusion.positive, exclusion.suppressed
                    ),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScoringConfig::default();
        config.validate().unwrap();
        assert_eq!(config.policies.len(), DetectionCategory::ALL.len());
        assert!((config.weight_sum() - 1.0).abs() <= WEIGHT_EPSILON);
    }

    #[test]
    fn test_weight_sum_enforced() {
        let config = ScoringConfig::default();
        let mut gloves = config.policy(DetectionCategory::ProtectiveGloves).unwrap().clone();
        gloves.weight = 0.25;

        let err = config.with_policy(gloves).validate().unwrap_err();
        assert!(matches!(err, ScoringError::WeightSum { .. }));
    }

    #[test]
    fn test_random_rebalanced_weights_validate() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let raw: Vec<f64> = (0..DetectionCategory::ALL.len())
                .map(|_| rng.random_range(0.01..1.0))
                .collect();
            let total: f64 = raw.iter().sum();

            let mut config = ScoringConfig::default();
            for (category, w) in DetectionCategory::ALL.iter().zip(raw) {
                if let Some(policy) = config.policies.get_mut(category) {
                    policy.weight = w / total;
                }
            }
            config.validate().unwrap();
            assert!((config.weight_sum() - 1.0).abs() <= WEIGHT_EPSILON);
        }
    }

    #[test]
    fn test_missing_category_rejected() {
        let mut config = ScoringConfig::default();
        config.policies.remove(&DetectionCategory::PestSigns);
        assert!(matches!(
            config.validate(),
            Err(ScoringError::MissingCategory(DetectionCategory::PestSigns))
        ));
    }

    #[test]
    fn test_violation_floor_required() {
        let config = ScoringConfig::default();
        let mut pests = config.policy(DetectionCategory::PestSigns).unwrap().clone();
        pests.floor = 0.0;
        assert!(matches!(
            config.with_policy(pests).validate(),
            Err(ScoringError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn test_positive_curve() {
        let config = ScoringConfig::default();
        let gloves = config.policy(DetectionCategory::ProtectiveGloves).unwrap();
        assert_eq!(gloves.score(0.0), 0.0);
        assert!((gloves.score(40.0) - 50.0).abs() < 1e-9);
        assert_eq!(gloves.score(80.0), 100.0);
        assert_eq!(gloves.score(100.0), 100.0);
    }

    #[test]
    fn test_positive_floor_applies() {
        let config = ScoringConfig::default();
        let mut apron = config.policy(DetectionCategory::ProperApron).unwrap().clone();
        apron.floor = 20.0;
        assert_eq!(apron.score(0.0), 20.0);
        assert!((apron.score(35.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_violation_curve_bottoms_at_floor() {
        let config = ScoringConfig::default();
        let bare = config.policy(DetectionCategory::BareHands).unwrap();
        assert_eq!(bare.score(0.0), 100.0);
        assert!((bare.score(10.0) - 80.0).abs() < 1e-9);
        assert_eq!(bare.score(50.0), 10.0);
        assert_eq!(bare.score(100.0), 10.0);

        let pests = config.policy(DetectionCategory::PestSigns).unwrap();
        assert_eq!(pests.score(20.0), 5.0);
    }

    #[test]
    fn test_non_finite_rate_scores_as_zero_rate() {
        let config = ScoringConfig::default();
        let gloves = config.policy(DetectionCategory::ProtectiveGloves).unwrap();
        assert_eq!(gloves.score(f64::NAN), 0.0);
    }

    #[test]
    fn test_triggers() {
        assert!(FindingTrigger::Below(60.0).fires(59.9));
        assert!(!FindingTrigger::Below(60.0).fires(60.0));
        assert!(FindingTrigger::AtLeast(10.0).fires(10.0));
        assert!(!FindingTrigger::Any.fires(0.0));
        assert!(FindingTrigger::Any.fires(0.5));
    }

    #[test]
    fn test_config_serializes() {
        let json = serde_json::to_value(ScoringConfig::default()).unwrap();
        assert_eq!(
            json["policies"]["pest_signs"]["trigger"]["kind"],
            serde_json::json!("any")
        );
    }
}
