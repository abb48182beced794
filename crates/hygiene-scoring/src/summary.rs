//! Human-readable result summary.

use std::collections::BTreeMap;

use hygiene_models::{CategoryScore, DetectionCategory};

/// Overall score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBucket {
    Excellent,
    Good,
    Acceptable,
    BelowStandard,
    Critical,
}

impl ScoreBucket {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            80..=89 => Self::Good,
            70..=79 => Self::Acceptable,
            60..=69 => Self::BelowStandard,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::BelowStandard => "below standard",
            Self::Critical => "critical",
        }
    }

    fn lead(&self) -> &'static str {
        match self {
            Self::Excellent => "The kitchen shows excellent hygiene practices.",
            Self::Good => "The kitchen shows good hygiene practices with minor room for improvement.",
            Self::Acceptable => "Hygiene practices are acceptable but several areas need attention.",
            Self::BelowStandard => "Hygiene practices are below standard and need prompt corrective action.",
            Self::Critical => "Hygiene practices are at a critical level and require immediate action.",
        }
    }
}

/// Summarize the run from its overall score and the weakest and strongest
/// categories.
pub fn summarize(overall: u8, scores: &BTreeMap<DetectionCategory, CategoryScore>) -> String {
    let bucket = ScoreBucket::from_score(overall);
    let mut text = format!("Overall score {}/100 ({}). {}", overall, bucket.as_str(), bucket.lead());

    // Ties resolve to the earliest category
    let lowest = scores
        .iter()
        .min_by(|a, b| a.1.score.total_cmp(&b.1.score));
    let highest = scores
        .iter()
        .rev()
        .max_by(|a, b| a.1.score.total_cmp(&b.1.score));

    match (lowest, highest) {
        (Some((low, low_score)), Some((high, high_score)))
            if low_score.score < high_score.score =>
        {
            text.push_str(&format!(
                " Strongest area: {} ({:.0}/100). Needs the most attention: {} ({:.0}/100).",
                high.display_name(),
                high_score.score,
                low.display_name(),
                low_score.score
            ));
        }
        (Some(_), Some((_, score))) => {
            text.push_str(&format!(
                " All categories scored {:.0}/100.",
                score.score
            ));
        }
        _ => {}
    }

    text
}
