//! Detection categories.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a higher detection rate improves or worsens the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// More detections raise the score.
    Positive,
    /// More detections lower the score.
    Violation,
}

/// The closed set of hygiene categories a frame is checked for.
///
/// Declaration order is the canonical report order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DetectionCategory {
    ProtectiveGloves,
    BareHands,
    HairCovering,
    CleanSurface,
    ProperApron,
    HandwashStation,
    PestSigns,
    CrossContamination,
}

impl DetectionCategory {
    /// Every category, in canonical order.
    pub const ALL: [DetectionCategory; 8] = [
        DetectionCategory::ProtectiveGloves,
        DetectionCategory::BareHands,
        DetectionCategory::HairCovering,
        DetectionCategory::CleanSurface,
        DetectionCategory::ProperApron,
        DetectionCategory::HandwashStation,
        DetectionCategory::PestSigns,
        DetectionCategory::CrossContamination,
    ];

    /// Wire name (snake_case), as used in structured detector output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProtectiveGloves => "protective_gloves",
            Self::BareHands => "bare_hands",
            Self::HairCovering => "hair_covering",
            Self::CleanSurface => "clean_surface",
            Self::ProperApron => "proper_apron",
            Self::HandwashStation => "handwash_station",
            Self::PestSigns => "pest_signs",
            Self::CrossContamination => "cross_contamination",
        }
    }

    /// Human-readable name for findings and summaries.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ProtectiveGloves => "Protective gloves",
            Self::BareHands => "Bare-hand food contact",
            Self::HairCovering => "Hair covering",
            Self::CleanSurface => "Clean work surfaces",
            Self::ProperApron => "Proper apron",
            Self::HandwashStation => "Handwash station",
            Self::PestSigns => "Pest control",
            Self::CrossContamination => "Cross-contamination",
        }
    }

    /// Intrinsic polarity of the category.
    pub fn polarity(&self) -> Polarity {
        match self {
            Self::BareHands | Self::PestSigns | Self::CrossContamination => Polarity::Violation,
            _ => Polarity::Positive,
        }
    }

    /// Returns true if more detections are bad.
    pub fn is_violation(&self) -> bool {
        self.polarity() == Polarity::Violation
    }
}

impl fmt::Display for DetectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown detection category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for DetectionCategory {
    type Err = UnknownCategory;

    /// Parses snake_case, camelCase, kebab-case and the short aliases
    /// vision models tend to emit ("gloves", "hairnet", "pests", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let category = match normalized.as_str() {
            "protectivegloves" | "gloves" | "glove" => Self::ProtectiveGloves,
            "barehands" | "barehand" | "nogloves" => Self::BareHands,
            "haircovering" | "hairnet" | "haircover" | "hairnets" => Self::HairCovering,
            "cleansurface" | "cleansurfaces" | "surfaces" => Self::CleanSurface,
            "properapron" | "apron" | "aprons" => Self::ProperApron,
            "handwashstation" | "handwashing" | "handwashingstation" | "sink" => {
                Self::HandwashStation
            }
            "pestsigns" | "pests" | "pest" | "pestactivity" => Self::PestSigns,
            "crosscontamination" | "contamination" => Self::CrossContamination,
            _ => return Err(UnknownCategory(s.to_string())),
        };

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_wire_names() {
        for category in DetectionCategory::ALL {
            assert_eq!(category.as_str().parse::<DetectionCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(
            "protectiveGloves".parse::<DetectionCategory>(),
            Ok(DetectionCategory::ProtectiveGloves)
        );
        assert_eq!(
            "Hair-Covering".parse::<DetectionCategory>(),
            Ok(DetectionCategory::HairCovering)
        );
        assert_eq!("pests".parse::<DetectionCategory>(), Ok(DetectionCategory::PestSigns));
        assert!("forklift".parse::<DetectionCategory>().is_err());
    }

    #[test]
    fn test_polarity() {
        let violations: Vec<_> = DetectionCategory::ALL
            .iter()
            .filter(|c| c.is_violation())
            .collect();
        assert_eq!(violations.len(), 3);
        assert_eq!(DetectionCategory::ProtectiveGloves.polarity(), Polarity::Positive);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&DetectionCategory::HandwashStation).unwrap();
        assert_eq!(json, "\"handwash_station\"");
    }
}
