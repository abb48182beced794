//! Detector error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;

/// Coarse classification of a detector failure, used to pick a
/// user-facing remediation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Auth,
    Billing,
    Quota,
    RateLimit,
    Network,
    Unknown,
}

impl FailureKind {
    /// Classify an HTTP failure from its status code and body.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let body = body.to_lowercase();

        if body.contains("billing") || status == 402 {
            return FailureKind::Billing;
        }

        match status {
            401 | 403 => FailureKind::Auth,
            429 if mentions_quota(&body) => FailureKind::Quota,
            429 => FailureKind::RateLimit,
            // Gemini reports a bad key as 400 INVALID_ARGUMENT
            400 if body.contains("api key") || body.contains("api_key_invalid") => {
                FailureKind::Auth
            }
            408 | 502 | 503 | 504 => FailureKind::Network,
            _ => FailureKind::Unknown,
        }
    }

    /// Classify a backend-reported error that carries a gRPC-style status.
    pub fn from_rpc_code(code: i64, message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("billing") {
            return FailureKind::Billing;
        }

        match code {
            7 | 16 => FailureKind::Auth,
            8 if mentions_quota(&lower) => FailureKind::Quota,
            8 => FailureKind::RateLimit,
            4 | 14 => FailureKind::Network,
            _ => FailureKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Billing => "billing",
            Self::Quota => "quota",
            Self::RateLimit => "rate_limit",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }

    /// What the user should do about it.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Auth => {
                "The image analysis service rejected our credentials. Check the detector API key configuration."
            }
            Self::Billing => {
                "The image analysis account has a billing problem. Update the billing details with the provider and try again."
            }
            Self::Quota => {
                "The image analysis quota has been used up. Wait for the quota to reset or raise the limit, then try again."
            }
            Self::RateLimit => {
                "The image analysis service is receiving too many requests. Wait a minute and try again."
            }
            Self::Network => {
                "Could not reach the image analysis service. Check the network connection and try again."
            }
            Self::Unknown => "The image analysis service failed unexpectedly. Please try again later.",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mentions_quota(lower: &str) -> bool {
    lower.contains("quota")
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Detector returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Detector rejected the request ({kind}): {message}")]
    Rejected { kind: FailureKind, message: String },

    #[error("Detector credentials missing: {0}")]
    MissingCredentials(String),

    #[error("Invalid detector configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Detection unavailable: all {attempted} frame detections failed ({kind}): {message}")]
    Unavailable {
        kind: FailureKind,
        attempted: usize,
        message: String,
    },
}

impl From<reqwest::Error> for DetectError {
    // reqwest renders the request URL in its message; drop it so
    // endpoints never leak into logs or user-facing text.
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}

impl DetectError {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Failure classification for user messaging.
    pub fn kind(&self) -> FailureKind {
        match self {
            DetectError::Http { status, body } => FailureKind::from_http_status(*status, body),
            DetectError::Rejected { kind, .. } => *kind,
            DetectError::MissingCredentials(_) => FailureKind::Auth,
            DetectError::Network(e) if e.is_decode() => FailureKind::Unknown,
            DetectError::Network(e) => match e.status() {
                Some(status) => FailureKind::from_http_status(status.as_u16(), ""),
                None => FailureKind::Network,
            },
            DetectError::Unavailable { kind, .. } => *kind,
            DetectError::Config(_) | DetectError::Json(_) => FailureKind::Unknown,
        }
    }

    /// True for the batch-level "every frame failed" error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DetectError::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_http_status() {
        assert_eq!(FailureKind::from_http_status(401, ""), FailureKind::Auth);
        assert_eq!(FailureKind::from_http_status(403, "forbidden"), FailureKind::Auth);
        assert_eq!(FailureKind::from_http_status(402, ""), FailureKind::Billing);
        assert_eq!(
            FailureKind::from_http_status(403, "Billing account disabled"),
            FailureKind::Billing
        );
        assert_eq!(
            FailureKind::from_http_status(429, "Too Many Requests"),
            FailureKind::RateLimit
        );
        assert_eq!(
            FailureKind::from_http_status(429, "You exceeded your current quota"),
            FailureKind::Quota
        );
        assert_eq!(
            FailureKind::from_http_status(400, "API key not valid. Please pass a valid API key."),
            FailureKind::Auth
        );
        assert_eq!(FailureKind::from_http_status(503, ""), FailureKind::Network);
        assert_eq!(FailureKind::from_http_status(500, ""), FailureKind::Unknown);
    }

    #[test]
    fn test_classify_rpc_codes() {
        assert_eq!(FailureKind::from_rpc_code(16, "unauthenticated"), FailureKind::Auth);
        assert_eq!(
            FailureKind::from_rpc_code(8, "Quota exceeded for quota metric"),
            FailureKind::Quota
        );
        assert_eq!(FailureKind::from_rpc_code(8, "try later"), FailureKind::RateLimit);
        assert_eq!(FailureKind::from_rpc_code(13, "internal"), FailureKind::Unknown);
    }

    #[test]
    fn test_remediation_messages_distinct() {
        let kinds = [
            FailureKind::Auth,
            FailureKind::Billing,
            FailureKind::Quota,
            FailureKind::RateLimit,
            FailureKind::Network,
            FailureKind::Unknown,
        ];
        let messages: std::collections::HashSet<_> =
            kinds.iter().map(|k| k.remediation()).collect();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(DetectError::http(429, "slow down").kind(), FailureKind::RateLimit);
        assert_eq!(
            DetectError::MissingCredentials("DETECTOR_API_KEY".into()).kind(),
            FailureKind::Auth
        );
    }
}
