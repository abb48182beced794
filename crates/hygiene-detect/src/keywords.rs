//! Keyword mapping for label-list backends.

use std::collections::BTreeMap;

use hygiene_models::{DetectionCategory, FrameDetection};
use serde::{Deserialize, Serialize};

/// A free-text label with its backend score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub description: String,
    pub score: f64,
}

impl Label {
    pub fn new(description: impl Into<String>, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }
}

/// Category → keyword list used to interpret free-text labels.
///
/// A label matches a keyword when the keyword's words appear as a
/// contiguous run of whole words in the label, case-insensitively
/// ("Hand" matches `hand`, "Handwash station" does not).
#[derive(Debug, Clone)]
pub struct KeywordTable {
    keywords: BTreeMap<DetectionCategory, Vec<String>>,
    /// Labels scored below this are ignored
    pub min_score: f64,
}

impl Default for KeywordTable {
    fn default() -> Self {
        let mut keywords: BTreeMap<DetectionCategory, Vec<String>> = BTreeMap::new();
        let mut put = |category: DetectionCategory, words: &[&str]| {
            keywords.insert(category, words.iter().map(|w| w.to_string()).collect());
        };

        put(
            DetectionCategory::ProtectiveGloves,
            &["glove", "gloves", "disposable glove", "nitrile", "latex", "medical glove"],
        );
        put(
            DetectionCategory::BareHands,
            &["hand", "hands", "bare hand", "finger", "fingers", "thumb", "nail"],
        );
        put(
            DetectionCategory::HairCovering,
            &[
                "hairnet", "hair net", "chef hat", "toque", "cap", "hat", "bandana", "headgear",
                "bouffant cap",
            ],
        );
        put(
            DetectionCategory::CleanSurface,
            &["countertop", "counter top", "worktop", "stainless steel", "clean", "tidy"],
        );
        put(
            DetectionCategory::ProperApron,
            &["apron", "chef uniform", "chef coat", "chef whites", "uniform"],
        );
        put(
            DetectionCategory::HandwashStation,
            &[
                "sink", "tap", "faucet", "soap", "soap dispenser", "hand dryer", "paper towel",
                "plumbing fixture",
            ],
        );
        put(
            DetectionCategory::PestSigns,
            &[
                "pest", "insect", "cockroach", "rodent", "rat", "mouse", "fly", "ant",
                "droppings", "cobweb", "spider web", "arthropod",
            ],
        );
        put(
            DetectionCategory::CrossContamination,
            &[
                "raw meat", "raw chicken", "raw poultry", "raw fish", "meat juice", "blood",
            ],
        );

        Self {
            keywords,
            min_score: 0.6,
        }
    }
}

impl KeywordTable {
    /// Empty table.
    pub fn empty(min_score: f64) -> Self {
        Self {
            keywords: BTreeMap::new(),
            min_score,
        }
    }

    /// Replace one category's keywords.
    pub fn with_keywords<I, S>(mut self, category: DetectionCategory, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords
            .insert(category, words.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn keywords(&self, category: DetectionCategory) -> &[String] {
        self.keywords
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First keyword of `category` matched by `label`, if any.
    pub fn matching_keyword(&self, category: DetectionCategory, label: &str) -> Option<&str> {
        let label_words = words(label);
        self.keywords(category)
            .iter()
            .find(|kw| contains_run(&label_words, &words(kw)))
            .map(String::as_str)
    }

    /// Map a label list onto every category.
    ///
    /// A category is detected when at least one label above `min_score`
    /// matches; its confidence is the best matching label's score.
    pub fn map_labels(&self, labels: &[Label]) -> BTreeMap<DetectionCategory, FrameDetection> {
        DetectionCategory::ALL
            .iter()
            .map(|&category| {
                let mut matched: Vec<&Label> = labels
                    .iter()
                    .filter(|l| l.score >= self.min_score)
                    .filter(|l| self.matching_keyword(category, &l.description).is_some())
                    .collect();

                if matched.is_empty() {
                    return (category, FrameDetection::not_detected());
                }

                matched.sort_by(|a, b| b.score.total_cmp(&a.score));
                let details = matched
                    .iter()
                    .map(|l| format!("{} ({:.2})", l.description, l.score))
                    .collect::<Vec<_>>()
                    .join(", ");

                (
                    category,
                    FrameDetection::new(true, matched[0].score, format!("labels: {}", details)),
                )
            })
            .collect()
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}
