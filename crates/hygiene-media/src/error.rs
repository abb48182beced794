//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while sampling a video.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Video duration {duration:.1}s is outside the supported range of {min}-{max} seconds")]
    InvalidDuration { duration: f64, min: u32, max: u32 },

    #[error("Could not decode video: {0}")]
    VideoDecode(String),

    #[error("Lighting too dark for analysis (average luminance {luminance:.1}, minimum {threshold:.1})")]
    InsufficientLighting { luminance: f64, threshold: f64 },

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a decode failure error.
    pub fn video_decode(message: impl Into<String>) -> Self {
        Self::VideoDecode(message.into())
    }

    /// True for the three pre-detection rejections a user can act on.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidDuration { .. }
                | MediaError::VideoDecode(_)
                | MediaError::InsufficientLighting { .. }
        )
    }
}
