//! Analysis error types.

use hygiene_detect::{DetectError, FailureKind};
use hygiene_media::MediaError;
use hygiene_scoring::ScoringError;
use thiserror::Error;

pub type AnalyzeResult<T> = Result<T, AnalysisError>;

/// Fatal errors of one analysis run.
///
/// The first four variants are the user-facing taxonomy; the rest are
/// setup or infrastructure failures.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Video duration {duration:.1}s is outside the supported range of {min}-{max} seconds")]
    InvalidDuration { duration: f64, min: u32, max: u32 },

    #[error("Could not decode video: {0}")]
    VideoDecode(String),

    #[error("Insufficient lighting (average luminance {luminance:.1}, minimum {threshold:.1})")]
    InsufficientLighting { luminance: f64, threshold: f64 },

    #[error("Detection unavailable ({kind}): {message}")]
    DetectionUnavailable {
        kind: FailureKind,
        attempted: usize,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[source] MediaError),

    #[error("Detector error: {0}")]
    Detect(#[source] DetectError),

    #[error("Scoring configuration error: {0}")]
    Scoring(#[from] ScoringError),
}

impl From<MediaError> for AnalysisError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::InvalidDuration { duration, min, max } => {
                Self::InvalidDuration { duration, min, max }
            }
            MediaError::VideoDecode(message) => Self::VideoDecode(message),
            MediaError::InsufficientLighting {
                luminance,
                threshold,
            } => Self::InsufficientLighting {
                luminance,
                threshold,
            },
            other => Self::Media(other),
        }
    }
}

impl From<DetectError> for AnalysisError {
    fn from(e: DetectError) -> Self {
        match e {
            DetectError::Unavailable {
                kind,
                attempted,
                message,
            } => Self::DetectionUnavailable {
                kind,
                attempted,
                message,
            },
            DetectError::MissingCredentials(msg) | DetectError::Config(msg) => Self::Config(msg),
            other => Self::Detect(other),
        }
    }
}

impl AnalysisError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label for metrics and logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::VideoDecode(_) => "video_decode",
            Self::InsufficientLighting { .. } => "insufficient_lighting",
            Self::DetectionUnavailable { .. } => "detection_unavailable",
            Self::Config(_) | Self::Scoring(_) => "config",
            Self::Media(_) => "media",
            Self::Detect(_) => "detect",
        }
    }

    /// Detector failure classification, when detection was the cause.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::DetectionUnavailable { kind, .. } => Some(*kind),
            Self::Detect(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// True when the user can fix the problem by changing the video or
    /// their account, as opposed to an operator-side failure.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration { .. }
                | Self::VideoDecode(_)
                | Self::InsufficientLighting { .. }
                | Self::DetectionUnavailable { .. }
        )
    }

    /// Text shown to the person who submitted the video.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDuration { min, max, .. } => format!(
                "Please record a video between {} and {} seconds long.",
                min, max
            ),
            Self::VideoDecode(_) => {
                "We couldn't read this video. Please record it again or upload an MP4 or MOV file."
                    .to_string()
            }
            Self::InsufficientLighting { .. } => {
                "The video is too dark to analyze. Turn on the kitchen lights and record again."
                    .to_string()
            }
            Self::DetectionUnavailable { kind, .. } => kind.remediation().to_string(),
            Self::Config(_) | Self::Scoring(_) => {
                "The analysis service is not configured correctly. Please contact support."
                    .to_string()
            }
            Self::Media(_) | Self::Detect(_) => {
                "Something went wrong while analyzing the video. Please try again.".to_string()
            }
        }
    }
}
