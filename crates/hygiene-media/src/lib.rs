//! Frame sampling for kitchen hygiene analysis.
//!
//! This crate provides:
//! - Duration validation and the evenly-spaced sampling plan
//! - FFmpeg command building and single-frame extraction
//! - FFprobe video information
//! - The lighting gate run on the temporal midpoint frame

pub mod command;
pub mod error;
pub mod extract;
pub mod lighting;
pub mod probe;
pub mod sampler;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use extract::{FfmpegFrameSource, FrameSource};
pub use lighting::{average_luminance, check_lighting};
pub use probe::{get_duration, probe_video, VideoInfo};
pub use sampler::{FrameSampler, SampledFrames, SamplingConfig};
