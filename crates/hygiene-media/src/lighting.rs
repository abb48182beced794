//! Lighting gate.
//!
//! Footage that is too dark produces useless detections, so one
//! representative frame is checked before any detector call is made.

use image::GenericImageView;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Longest edge the frame is reduced to before averaging.
const LUMA_SAMPLE_EDGE: u32 = 160;

/// Average luminance (0-255) of an encoded image.
pub fn average_luminance(encoded: &[u8]) -> MediaResult<f64> {
    let img = image::load_from_memory(encoded)
        .map_err(|e| MediaError::video_decode(format!("frame is not a readable image: {}", e)))?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::video_decode("frame has no pixels"));
    }

    let sample = if width.max(height) > LUMA_SAMPLE_EDGE {
        img.thumbnail(LUMA_SAMPLE_EDGE, LUMA_SAMPLE_EDGE)
    } else {
        img
    };

    let rgb = sample.to_rgb8();
    let pixel_count = (rgb.width() as u64) * (rgb.height() as u64);

    // ITU-R BT.601 luma
    let total: f64 = rgb
        .pixels()
        .map(|p| 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64)
        .sum();

    Ok(total / pixel_count as f64)
}

/// Fail with [`MediaError::InsufficientLighting`] when the frame is darker
/// than `min_luminance`. Returns the measured luminance otherwise.
pub fn check_lighting(encoded: &[u8], min_luminance: f64) -> MediaResult<f64> {
    let luminance = average_luminance(encoded)?;
    debug!(luminance, min_luminance, "Lighting check");

    if luminance < min_luminance {
        return Err(MediaError::InsufficientLighting {
            luminance,
            threshold: min_luminance,
        });
    }

    Ok(luminance)
}
