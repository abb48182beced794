//! Tolerant parsing of structured detector output.
//!
//! Vision models do not always honour "return only JSON". A response is
//! tried as-is, then as the contents of a fenced code block, then as the
//! outermost `{...}` span inside surrounding prose. The first candidate
//! that yields at least one well-formed category entry wins.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use hygiene_models::{DetectionCategory, FrameDetection};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Keys a model may wrap the category object in.
const WRAPPER_KEYS: [&str; 4] = ["detections", "categories", "results", "findings"];

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*\n?(.*?)```").expect("fence pattern is valid")
    })
}

/// Parse a model response into per-category detections.
///
/// Returns `None` when no strategy produced a usable entry; callers treat
/// that as "nothing detected".
pub fn parse_structured_response(text: &str) -> Option<BTreeMap<DetectionCategory, FrameDetection>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(map) = parse_candidate(text) {
        debug!(strategy = "direct", categories = map.len(), "Parsed detector response");
        return Some(map);
    }

    for block in fenced_blocks(text) {
        if let Some(map) = parse_candidate(block) {
            debug!(strategy = "fenced", categories = map.len(), "Parsed detector response");
            return Some(map);
        }
    }

    if let Some(map) = embedded_object(text).and_then(parse_candidate) {
        debug!(strategy = "embedded", categories = map.len(), "Parsed detector response");
        return Some(map);
    }

    None
}

fn fenced_blocks(text: &str) -> Vec<&str> {
    fence_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim()))
        .collect()
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_candidate(candidate: &str) -> Option<BTreeMap<DetectionCategory, FrameDetection>> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let map = detections_from_value(&value);
    (!map.is_empty()).then_some(map)
}

/// Map an already-decoded JSON value onto categories.
///
/// Accepts a category-keyed object, the same object under a wrapper key, or
/// an array of entries carrying a `category` field. Unknown categories and
/// malformed entries are dropped.
pub fn detections_from_value(value: &Value) -> BTreeMap<DetectionCategory, FrameDetection> {
    match value {
        Value::Object(obj) => {
            for key in WRAPPER_KEYS {
                if let Some(inner) = obj.get(key) {
                    let map = detections_from_value(inner);
                    if !map.is_empty() {
                        return map;
                    }
                }
            }
            from_keyed_object(obj)
        }
        Value::Array(items) => from_entry_list(items),
        _ => BTreeMap::new(),
    }
}

fn from_keyed_object(obj: &Map<String, Value>) -> BTreeMap<DetectionCategory, FrameDetection> {
    obj.iter()
        .filter_map(|(key, entry)| {
            let category = key.parse::<DetectionCategory>().ok()?;
            let detection = parse_entry(entry)?;
            Some((category, detection))
        })
        .collect()
}

fn from_entry_list(items: &[Value]) -> BTreeMap<DetectionCategory, FrameDetection> {
    items
        .iter()
        .filter_map(|entry| {
            let category = entry
                .get("category")
                .and_then(Value::as_str)?
                .parse::<DetectionCategory>()
                .ok()?;
            let detection = parse_entry(entry)?;
            Some((category, detection))
        })
        .collect()
}

/// One `{detected, confidence, details}` triple.
///
/// `detected` and `confidence` are required; booleans and numbers given as
/// strings are accepted. `details` falls back to `reason`/`description`.
fn parse_entry(entry: &Value) -> Option<FrameDetection> {
    let obj = entry.as_object()?;

    let detected = match obj.get("detected")? {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => true,
            "false" | "no" => false,
            _ => return None,
        },
        _ => return None,
    };

    let confidence = match obj.get("confidence")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let details = ["details", "reason", "description"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or_default();

    Some(FrameDetection::new(detected, confidence, details))
}
