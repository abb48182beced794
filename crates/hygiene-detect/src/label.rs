//! Label-list backend.
//!
//! Asks an image-annotation API for ranked free-text labels and localized
//! objects, then maps them onto categories through a [`KeywordTable`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hygiene_models::{Frame, FrameDetections};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{post_for_text, DetectorClientConfig};
use crate::detector::FrameDetector;
use crate::error::{DetectError, DetectResult, FailureKind};
use crate::keywords::{KeywordTable, Label};
use crate::metrics;

const BACKEND: &str = "label_list";

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct ObjectAnnotation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl ImageResponse {
    fn labels(self) -> Vec<Label> {
        self.label_annotations
            .into_iter()
            .map(|l| Label::new(l.description, l.score))
            .chain(
                self.localized_object_annotations
                    .into_iter()
                    .map(|o| Label::new(o.name, o.score)),
            )
            .filter(|l| !l.description.trim().is_empty())
            .collect()
    }
}

/// Detector backed by a label-list annotation API.
pub struct LabelDetector {
    http: Client,
    config: DetectorClientConfig,
    api_key: String,
    keywords: KeywordTable,
}

impl LabelDetector {
    /// Create a new detector; fails without an API key.
    pub fn new(config: DetectorClientConfig, keywords: KeywordTable) -> DetectResult<Self> {
        let api_key = config.require_api_key()?;
        let http = config.http_client()?;
        Ok(Self {
            http,
            config,
            api_key,
            keywords,
        })
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/images:annotate",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request(&self, frame: &Frame) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: BASE64.encode(&frame.image),
                },
                features: vec![
                    Feature {
                        kind: "LABEL_DETECTION",
                        max_results: self.config.max_labels,
                    },
                    Feature {
                        kind: "OBJECT_LOCALIZATION",
                        max_results: self.config.max_labels,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl FrameDetector for LabelDetector {
    async fn detect(&self, frame: &Frame) -> DetectResult<FrameDetections> {
        let request = self.build_request(frame);
        debug!(frame = frame.index, "Requesting image labels");

        let body = post_for_text(&self.http, &self.endpoint(), &self.api_key, &request).await?;

        let response = match serde_json::from_str::<AnnotateResponse>(&body) {
            Ok(envelope) => envelope.responses.into_iter().next().unwrap_or_default(),
            Err(e) => {
                warn!(frame = frame.index, error = %e, "Label response not understood, treating as nothing detected");
                metrics::record_parse_fallback(BACKEND);
                return Ok(FrameDetections::nothing_detected(
                    frame.index,
                    frame.timestamp_secs,
                ));
            }
        };

        if let Some(status) = &response.error {
            if status.code != 0 {
                return Err(DetectError::Rejected {
                    kind: FailureKind::from_rpc_code(status.code, &status.message),
                    message: status.message.clone(),
                });
            }
        }

        let labels = response.labels();
        debug!(frame = frame.index, labels = labels.len(), "Mapping labels");

        Ok(FrameDetections::from_partial(
            frame.index,
            frame.timestamp_secs,
            self.keywords.map_labels(&labels),
        ))
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}
