//! Sampled video frames.

use std::fmt;

/// A still image sampled from the source video.
///
/// Frames are produced by the sampler, handed to the detector once and then
/// dropped; they are never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// 1-based position in the sampled sequence
    pub index: u32,
    /// Offset from the start of the video, whole seconds
    pub timestamp_secs: u32,
    /// Encoded image (JPEG)
    pub image: Vec<u8>,
}

impl Frame {
    pub fn new(index: u32, timestamp_secs: u32, image: Vec<u8>) -> Self {
        Self {
            index,
            timestamp_secs,
            image,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("index", &self.index)
            .field("timestamp_secs", &self.timestamp_secs)
            .field("image_bytes", &self.image.len())
            .finish()
    }
}
