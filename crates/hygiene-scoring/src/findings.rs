//! Finding generation.

use hygiene_models::{CategoryAggregate, Finding};

use crate::config::{CategoryPolicy, FindingTrigger};

/// Emit a finding when the category's trigger fires.
///
/// The timestamp is the earliest contributing frame, or 0 when the
/// condition is an absence that held throughout. An absence finding has
/// nothing to average, so it carries full confidence.
pub fn evaluate(policy: &CategoryPolicy, aggregate: &CategoryAggregate, rate: f64) -> Option<Finding> {
    if !policy.trigger.fires(rate) {
        return None;
    }

    let confidence = if aggregate.is_empty() {
        1.0
    } else {
        aggregate.average_confidence
    };

    Some(Finding {
        category: policy.category,
        severity: policy.severity,
        description: describe(policy, aggregate, rate),
        timestamp_secs: aggregate.first_timestamp().unwrap_or(0),
        confidence,
    })
}

fn describe(policy: &CategoryPolicy, aggregate: &CategoryAggregate, rate: f64) -> String {
    let name = policy.category.display_name();
    let detail = match policy.trigger {
        FindingTrigger::Below(threshold) if aggregate.is_empty() => format!(
            "{} not observed in any sampled frame (expected at least {:.0}%)",
            name, threshold
        ),
        FindingTrigger::Below(threshold) => format!(
            "{} observed in only {:.0}% of sampled frames (expected at least {:.0}%)",
            name, rate, threshold
        ),
        FindingTrigger::AtLeast(_) => format!(
            "{} observed in {:.0}% of sampled frames, first at {}s",
            name,
            rate,
            aggregate.first_timestamp().unwrap_or(0)
        ),
        FindingTrigger::Any => format!(
            "{} observed in {} sampled frame(s), first at {}s",
            name,
            aggregate.detected_frames(),
            aggregate.first_timestamp().unwrap_or(0)
        ),
    };
    format!("{}: {}", policy.issue, detail)
}

/// Order findings most severe first; ties keep category order.
pub fn rank(findings: &mut [Finding]) {
    findings.sort_by_key(|f| f.severity);
}
