//! Vision-language-model backend.
//!
//! Sends each frame inline to a Gemini-style `generateContent` endpoint and
//! asks for one `{detected, confidence, details}` entry per category.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hygiene_models::{DetectionCategory, Frame, FrameDetections};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{post_for_text, sniff_mime, DetectorClientConfig};
use crate::detector::FrameDetector;
use crate::error::DetectResult;
use crate::metrics;
use crate::parse::parse_structured_response;

const BACKEND: &str = "vision_model";

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    temperature: f32,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Detector backed by a vision-language model.
pub struct VisionModelDetector {
    http: Client,
    config: DetectorClientConfig,
    api_key: String,
}

impl VisionModelDetector {
    /// Create a new detector; fails without an API key.
    pub fn new(config: DetectorClientConfig) -> DetectResult<Self> {
        let api_key = config.require_api_key()?;
        let http = config.http_client()?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, frame: &Frame) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: build_prompt(frame),
                    },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: sniff_mime(&frame.image).to_string(),
                            data: BASE64.encode(&frame.image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.0,
            },
        }
    }
}

/// Build the per-frame prompt.
fn build_prompt(frame: &Frame) -> String {
    let checklist = DetectionCategory::ALL
        .iter()
        .map(|c| format!("- \"{}\": {}", c.as_str(), category_question(*c)))
        .collect::<Vec<_>>()
        .join("\n");

    let schema = DetectionCategory::ALL
        .iter()
        .map(|c| {
            format!(
                "  \"{}\": {{\"detected\": false, \"confidence\": 0.0, \"details\": \"\"}}",
                c.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"You are a food safety inspector reviewing a still frame from a commercial kitchen.
This is frame {index}, captured {timestamp} seconds into the video.

For each item below, decide whether it is clearly visible in this frame:
{checklist}

Return ONLY a single JSON object with exactly these keys:
{{
{schema}
}}

Rules:
- "detected" is true only if the item is clearly visible in this frame.
- "confidence" is a number between 0 and 1.
- "details" is one short sentence describing what you saw, or "" if nothing.
"#,
        index = frame.index,
        timestamp = frame.timestamp_secs,
    )
}

fn category_question(category: DetectionCategory) -> &'static str {
    match category {
        DetectionCategory::ProtectiveGloves => "food handlers wearing disposable or protective gloves",
        DetectionCategory::BareHands => "bare hands touching food or food-contact surfaces",
        DetectionCategory::HairCovering => "hair nets, caps or other hair restraints on staff",
        DetectionCategory::CleanSurface => "clean, uncluttered food preparation surfaces",
        DetectionCategory::ProperApron => "staff wearing clean aprons or kitchen uniforms",
        DetectionCategory::HandwashStation => "a handwashing sink, soap or paper towels",
        DetectionCategory::PestSigns => "insects, rodents, droppings or other signs of pests",
        DetectionCategory::CrossContamination => {
            "raw meat or poultry in contact with ready-to-eat food, or shared boards and utensils"
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(body: &str) -> Option<String> {
    let response: GenerateResponse = serde_json::from_str(body).ok()?;
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl FrameDetector for VisionModelDetector {
    async fn detect(&self, frame: &Frame) -> DetectResult<FrameDetections> {
        let request = self.build_request(frame);
        debug!(frame = frame.index, model = %self.config.model, "Requesting vision analysis");

        let body = post_for_text(&self.http, &self.endpoint(), &self.api_key, &request).await?;

        let parsed = response_text(&body).and_then(|text| parse_structured_response(&text));

        match parsed {
            Some(map) => Ok(FrameDetections::from_partial(
                frame.index,
                frame.timestamp_secs,
                map,
            )),
            None => {
                warn!(
                    frame = frame.index,
                    "Vision response could not be mapped to categories, treating as nothing detected"
                );
                metrics::record_parse_fallback(BACKEND);
                Ok(FrameDetections::nothing_detected(
                    frame.index,
                    frame.timestamp_secs,
                ))
            }
        }
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{DetectorBackend, API_KEY_HEADER};
    use crate::error::{DetectError, FailureKind};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn frame() -> Frame {
        Frame::new(2, 1, vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    fn gemini_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    async fn detector_for(server: &MockServer) -> VisionModelDetector {
        VisionModelDetector::new(DetectorClientConfig::for_backend(
            DetectorBackend::VisionModel,
            server.uri(),
        ))
        .unwrap()
    }

    #[test]
    fn test_prompt_lists_every_category() {
        let prompt = build_prompt(&frame());
        for category in DetectionCategory::ALL {
            assert!(prompt.contains(category.as_str()));
        }
        assert!(prompt.contains("frame 2"));
    }

    #[test]
    fn test_request_serialization() {
        let detector = VisionModelDetector::new(DetectorClientConfig::for_backend(
            DetectorBackend::VisionModel,
            "http://localhost",
        ))
        .unwrap();

        let value = serde_json::to_value(detector.build_request(&frame())).unwrap();
        let parts = &value["contents"][0]["parts"];
        assert!(parts[0]["text"].is_string());
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/4A==");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }

    #[tokio::test]
    async fn test_detect_structured_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
                r#"{"protective_gloves": {"detected": true, "confidence": 0.88, "details": "blue gloves"},
                    "hair_covering": {"detected": true, "confidence": 0.7, "details": "hairnet"}}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let detections = detector_for(&server).await.detect(&frame()).await.unwrap();
        assert_eq!(detections.frame_index, 2);
        assert_eq!(detections.timestamp_secs, 1);
        assert!(detections.is_detected(DetectionCategory::ProtectiveGloves));
        assert!(detections.is_detected(DetectionCategory::HairCovering));
        assert!(!detections.is_detected(DetectionCategory::PestSigns));
        assert_eq!(detections.categories.len(), 8);
    }

    #[tokio::test]
    async fn test_fenced_response_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
                "```json\n{\"pest_signs\": {\"detected\": true, \"confidence\": 0.9, \"details\": \"droppings\"}}\n```",
            )))
            .mount(&server)
            .await;

        let detections = detector_for(&server).await.detect(&frame()).await.unwrap();
        assert!(detections.is_detected(DetectionCategory::PestSigns));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_nothing_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_body("Sorry, I can't help with that image.")),
            )
            .mount(&server)
            .await;

        let detections = detector_for(&server).await.detect(&frame()).await.unwrap();
        assert_eq!(detections.detected_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_candidates_is_nothing_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let detections = detector_for(&server).await.detect(&frame()).await.unwrap();
        assert_eq!(detections.detected_count(), 0);
    }

    #[tokio::test]
    async fn test_http_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Resource has been exhausted"))
            .mount(&server)
            .await;

        let err = detector_for(&server).await.detect(&frame()).await.unwrap_err();
        assert!(matches!(err, DetectError::Http { status: 429, .. }));
        assert_eq!(err.kind(), FailureKind::RateLimit);
    }

    #[tokio::test]
    async fn test_unreachable_backend_does_not_leak_key() {
        let mut config =
            DetectorClientConfig::for_backend(DetectorBackend::VisionModel, "http://127.0.0.1:1");
        config.api_key = Some("SECRET-KEY-123".to_string());
        let detector = VisionModelDetector::new(config).unwrap();

        let err = crate::batch::detect_batch(&detector, &[frame()])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Network);
        let text = err.to_string();
        assert!(!text.contains("SECRET-KEY-123"), "{}", text);
        assert!(!text.contains("127.0.0.1"), "{}", text);
    }
}
