//! Detector trait.

use async_trait::async_trait;
use hygiene_models::{Frame, FrameDetections};

use crate::error::DetectResult;

/// One image-understanding backend.
///
/// Calls are independent and stateless. An `Err` means the call itself
/// failed (transport, auth, quota...); a response that could not be mapped
/// onto the category schema is returned as
/// [`FrameDetections::nothing_detected`] instead.
#[async_trait]
pub trait FrameDetector: Send + Sync {
    /// Detect every category in one frame.
    async fn detect(&self, frame: &Frame) -> DetectResult<FrameDetections>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
