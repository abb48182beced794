//! Frame sampler.
//!
//! Turns a video of known duration into a bounded, evenly-spaced sequence
//! of frames at whole-second granularity, after gating on duration and
//! lighting so unusable footage never reaches the detector.

use hygiene_models::Frame;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::extract::FrameSource;
use crate::lighting::check_lighting;

/// Sampler configuration.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Take one candidate frame every N seconds
    pub stride_secs: u32,
    /// Upper bound on frames sent to the detector
    pub max_frames: usize,
    /// Shortest accepted video
    pub min_duration_secs: u32,
    /// Longest accepted video
    pub max_duration_secs: u32,
    /// Minimum average luminance (0-255) of the midpoint frame
    pub min_luminance: f64,
    /// Width extracted frames are scaled to
    pub frame_width: u32,
    /// Per-frame extraction timeout
    pub extract_timeout_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            stride_secs: 1,
            max_frames: 30,
            min_duration_secs: 5,
            max_duration_secs: 300,
            min_luminance: 40.0,
            frame_width: 640,
            extract_timeout_secs: 30,
        }
    }
}

impl SamplingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            stride_secs: std::env::var("SAMPLER_STRIDE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.stride_secs),
            max_frames: std::env::var("SAMPLER_MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_frames),
            min_duration_secs: std::env::var("SAMPLER_MIN_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_duration_secs),
            max_duration_secs: std::env::var("SAMPLER_MAX_DURATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_duration_secs),
            min_luminance: std::env::var("SAMPLER_MIN_LUMINANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_luminance),
            frame_width: std::env::var("SAMPLER_FRAME_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_width),
            extract_timeout_secs: std::env::var("SAMPLER_EXTRACT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.extract_timeout_secs),
        }
    }
}

/// Output of a sampling pass.
#[derive(Debug, Clone)]
pub struct SampledFrames {
    /// Ordered by timestamp, 1-based indices
    pub frames: Vec<Frame>,
    /// Luminance measured on the midpoint frame
    pub midpoint_luminance: f64,
    /// Planned timestamps whose extraction failed
    pub skipped: usize,
}

/// Evenly-spaced frame sampler.
#[derive(Debug, Clone, Default)]
pub struct FrameSampler {
    config: SamplingConfig,
}

impl FrameSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Check the caller's duration estimate and return it in whole seconds.
    pub fn validate_duration(&self, duration_secs: f64) -> MediaResult<u32> {
        let min = self.config.min_duration_secs;
        let max = self.config.max_duration_secs;

        if !duration_secs.is_finite()
            || duration_secs < min as f64
            || duration_secs > max as f64
        {
            return Err(MediaError::InvalidDuration {
                duration: duration_secs,
                min,
                max,
            });
        }

        Ok(duration_secs.floor() as u32)
    }

    /// Timestamps to extract for a video of `duration_secs` whole seconds.
    ///
    /// Candidates are every `stride_secs` seconds in `[0, duration)`; when
    /// there are more than `max_frames` of them, `max_frames` are picked at
    /// even spacing across the candidates.
    pub fn plan_timestamps(&self, duration_secs: u32) -> Vec<u32> {
        let stride = self.config.stride_secs.max(1) as usize;
        let candidates: Vec<u32> = (0..duration_secs).step_by(stride).collect();

        let cap = self.config.max_frames.max(1);
        if candidates.len() <= cap {
            return candidates;
        }

        (0..cap)
            .map(|i| candidates[i * candidates.len() / cap])
            .collect()
    }

    /// Sample `source`.
    pub async fn sample(
        &self,
        source: &dyn FrameSource,
        duration_secs: f64,
    ) -> MediaResult<SampledFrames> {
        self.sample_with_progress(source, duration_secs, |_, _| {})
            .await
    }

    /// Sample `source`, calling `on_frame(done, total)` after each extraction.
    ///
    /// Fails with `InvalidDuration` before touching the source, with
    /// `InsufficientLighting` if the midpoint frame is too dark, and with
    /// `VideoDecode` if FFmpeg rejects the midpoint or every planned frame
    /// fails. Other midpoint errors are returned as they are.
    pub async fn sample_with_progress<F>(
        &self,
        source: &dyn FrameSource,
        duration_secs: f64,
        mut on_frame: F,
    ) -> MediaResult<SampledFrames>
    where
        F: FnMut(usize, usize) + Send,
    {
        let whole_secs = self.validate_duration(duration_secs)?;
        let plan = self.plan_timestamps(whole_secs);

        let midpoint = whole_secs / 2;
        // Only a rejected input is a decode failure; a missing binary, I/O
        // error or timeout is ours to fix and passes through unchanged.
        let midpoint_frame = source.frame_at(midpoint).await.map_err(|e| match e {
            MediaError::FfmpegFailed { .. } => MediaError::video_decode(format!(
                "midpoint frame at {}s could not be extracted: {}",
                midpoint, e
            )),
            other => other,
        })?;
        let midpoint_luminance = check_lighting(&midpoint_frame, self.config.min_luminance)?;

        info!(
            source = source.name(),
            duration_secs = whole_secs,
            planned = plan.len(),
            midpoint_luminance,
            "Sampling frames"
        );

        let total = plan.len();
        let mut frames = Vec::with_capacity(total);
        let mut skipped = 0;

        for (i, &timestamp) in plan.iter().enumerate() {
            let image = if timestamp == midpoint {
                Ok(midpoint_frame.clone())
            } else {
                source.frame_at(timestamp).await
            };

            match image {
                Ok(image) => {
                    let index = frames.len() as u32 + 1;
                    debug!(index, timestamp, bytes = image.len(), "Extracted frame");
                    frames.push(Frame::new(index, timestamp, image));
                }
                Err(e) => {
                    warn!(timestamp, "Frame extraction failed, skipping: {}", e);
                    skipped += 1;
                }
            }

            on_frame(i + 1, total);
        }

        if frames.is_empty() {
            return Err(MediaError::video_decode(
                "no frames could be extracted from the video",
            ));
        }

        Ok(SampledFrames {
            frames,
            midpoint_luminance,
            skipped,
        })
    }
}
