//! Remediation suggestions.

use std::collections::{BTreeMap, BTreeSet};

use hygiene_models::{CategoryScore, DetectionCategory, Finding};

use crate::config::ScoringConfig;

/// Derive suggestions, at most one per category.
///
/// Categories that produced a finding come first, in finding order; then
/// any remaining category scoring below the configured threshold. An empty
/// result is replaced by the all-clear message.
pub fn suggest(
    findings: &[Finding],
    scores: &BTreeMap<DetectionCategory, CategoryScore>,
    config: &ScoringConfig,
) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut suggestions = Vec::new();

    let from_findings = findings.iter().map(|f| f.category);
    let from_scores = scores
        .iter()
        .filter(|(_, s)| s.score < config.low_score_threshold)
        .map(|(category, _)| *category);

    for category in from_findings.chain(from_scores) {
        if !seen.insert(category) {
            continue;
        }
        if let Some(policy) = config.policy(category) {
            suggestions.push(policy.suggestion.clone());
        }
    }

    if suggestions.is_empty() {
        suggestions.push(config.all_clear_message.clone());
    }

    suggestions
}
