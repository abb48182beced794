//! Frame extraction sources.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Something that can produce an encoded still at a given second.
///
/// Extraction is inherently sequential (seek then decode), so the sampler
/// calls this one timestamp at a time.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Encoded image (JPEG or PNG) at `timestamp_secs`.
    async fn frame_at(&self, timestamp_secs: u32) -> MediaResult<Vec<u8>>;

    /// Source name for logging.
    fn name(&self) -> &'static str;
}

/// FFmpeg-backed frame source over a video on disk.
pub struct FfmpegFrameSource {
    path: PathBuf,
    /// Keeps an uploaded byte stream alive for the source's lifetime
    _temp: Option<NamedTempFile>,
    frame_width: u32,
    jpeg_quality: u8,
    runner: FfmpegRunner,
}

impl FfmpegFrameSource {
    /// Source over an existing file.
    pub fn from_path(path: impl AsRef<Path>, frame_width: u32) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            _temp: None,
            frame_width,
            jpeg_quality: 3,
            runner: FfmpegRunner::new(),
        })
    }

    /// Source over an uploaded byte stream, spooled to a temp file.
    pub fn from_bytes(video: &[u8], frame_width: u32) -> MediaResult<Self> {
        if video.is_empty() {
            return Err(MediaError::video_decode("video stream is empty"));
        }

        let mut temp = tempfile::Builder::new()
            .prefix("hygiene-upload-")
            .suffix(".video")
            .tempfile()?;
        temp.write_all(video)?;
        temp.flush()?;

        debug!(bytes = video.len(), path = %temp.path().display(), "Spooled upload");

        Ok(Self {
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
            frame_width,
            jpeg_quality: 3,
            runner: FfmpegRunner::new(),
        })
    }

    /// Bound every extraction call.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command_for(&self, timestamp_secs: u32) -> FfmpegCommand {
        FfmpegCommand::to_stdout(&self.path)
            .seek(timestamp_secs as f64)
            .jpeg_frame()
            .video_filter(format!("scale={}:-2", self.frame_width))
            .jpeg_quality(self.jpeg_quality)
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn frame_at(&self, timestamp_secs: u32) -> MediaResult<Vec<u8>> {
        let cmd = self.command_for(timestamp_secs);
        let bytes = self.runner.capture(&cmd).await?;

        // Seeking past the last decodable frame exits 0 with no output
        if bytes.is_empty() {
            return Err(MediaError::video_decode(format!(
                "no frame decoded at {}s",
                timestamp_secs
            )));
        }

        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_upload_rejected() {
        assert!(matches!(
            FfmpegFrameSource::from_bytes(&[], 640),
            Err(MediaError::VideoDecode(_))
        ));
    }

    #[test]
    fn test_upload_spooled_and_cleaned_up() {
        let source = FfmpegFrameSource::from_bytes(b"\x00\x00\x00\x18ftypmp42", 640).unwrap();
        let path = source.path().to_path_buf();
        assert!(path.exists());

        drop(source);
        assert!(!path.exists());
    }

    #[test]
    fn test_command_for_timestamp() {
        let source = FfmpegFrameSource::from_bytes(b"video", 480).unwrap();
        let args = source.command_for(7).build_args();
        assert!(args.contains(&"7.000".to_string()));
        assert!(args.contains(&"scale=480:-2".to_string()));
    }

    #[test]
    fn test_missing_path() {
        assert!(matches!(
            FfmpegFrameSource::from_path("/definitely/not/here.mp4", 640),
            Err(MediaError::FileNotFound(_))
        ));
    }
}
