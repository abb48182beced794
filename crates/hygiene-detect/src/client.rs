//! Detector client configuration and shared HTTP plumbing.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::detector::FrameDetector;
use crate::error::{DetectError, DetectResult};
use crate::keywords::KeywordTable;
use crate::label::LabelDetector;
use crate::vision::VisionModelDetector;

pub const DEFAULT_VISION_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LABEL_BASE_URL: &str = "https://vision.googleapis.com";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";

/// Credentials travel in a header so they never appear in request URLs.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Which backend shape to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorBackend {
    /// Structured per-category output from a vision-language model
    VisionModel,
    /// Ranked free-text labels mapped through keywords
    LabelList,
}

impl FromStr for DetectorBackend {
    type Err = DetectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vision" | "vlm" | "gemini" => Ok(Self::VisionModel),
            "labels" | "label" | "cloud-vision" => Ok(Self::LabelList),
            other => Err(DetectError::config(format!("unknown detector backend '{}'", other))),
        }
    }
}

/// Configuration for detector clients.
#[derive(Debug, Clone)]
pub struct DetectorClientConfig {
    pub backend: DetectorBackend,
    /// Base URL of the backend API
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model name (vision backend only)
    pub model: String,
    /// Per-call timeout; no call is retried
    pub timeout: Duration,
    /// Labels requested per frame (label backend only)
    pub max_labels: u32,
}

impl Default for DetectorClientConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::VisionModel,
            base_url: DEFAULT_VISION_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_VISION_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            max_labels: 30,
        }
    }
}

impl DetectorClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> DetectResult<Self> {
        let backend = match std::env::var("DETECTOR_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => DetectorBackend::VisionModel,
        };

        let default_base = match backend {
            DetectorBackend::VisionModel => DEFAULT_VISION_BASE_URL,
            DetectorBackend::LabelList => DEFAULT_LABEL_BASE_URL,
        };

        Ok(Self {
            backend,
            base_url: std::env::var("DETECTOR_BASE_URL")
                .unwrap_or_else(|_| default_base.to_string()),
            api_key: std::env::var("DETECTOR_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("DETECTOR_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("DETECTOR_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_labels: std::env::var("DETECTOR_MAX_LABELS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Test/local convenience: point at `base_url` with a fixed key.
    pub fn for_backend(backend: DetectorBackend, base_url: impl Into<String>) -> Self {
        Self {
            backend,
            base_url: base_url.into(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn require_api_key(&self) -> DetectResult<String> {
        self.api_key
            .clone()
            .ok_or_else(|| DetectError::MissingCredentials("DETECTOR_API_KEY not set".to_string()))
    }

    pub(crate) fn http_client(&self) -> DetectResult<Client> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(DetectError::from)
    }
}

/// Build the configured detector.
pub fn build_detector(
    config: &DetectorClientConfig,
    keywords: KeywordTable,
) -> DetectResult<Arc<dyn FrameDetector>> {
    let detector: Arc<dyn FrameDetector> = match config.backend {
        DetectorBackend::VisionModel => Arc::new(VisionModelDetector::new(config.clone())?),
        DetectorBackend::LabelList => Arc::new(LabelDetector::new(config.clone(), keywords)?),
    };
    Ok(detector)
}

/// POST a JSON body and return the raw response text.
///
/// Non-2xx responses become [`DetectError::Http`] so they can be
/// classified; decoding is left to the caller.
pub(crate) async fn post_for_text<B: Serialize + ?Sized>(
    http: &Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> DetectResult<String> {
    let response = http
        .post(url)
        .header(API_KEY_HEADER, api_key)
        .json(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "Detector request failed");
        return Err(DetectError::http(status.as_u16(), text));
    }

    Ok(text)
}

/// Best-effort MIME type of an encoded frame.
pub(crate) fn sniff_mime(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}
