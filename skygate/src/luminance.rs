//! Luminance sampling for night-sky classification.
//!
//! Computes per-pixel perceptual luminance aggregates over a decoded image.
//! The image is downsampled to a bounded working size first so the cost of
//! a gate check is independent of upload resolution, and so the client and
//! server checks see the same statistics for the same bytes.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest edge of the working image after downsampling, in pixels.
pub const MAX_WORKING_EDGE: u32 = 256;

/// Luminance below this is counted as a dark pixel.
pub const DARK_LUMA: f64 = 40.0;
/// Luminance above this is counted as a bright pixel.
pub const BRIGHT_LUMA: f64 = 180.0;
/// Luminance above this is counted as a very bright pixel.
pub const VERY_BRIGHT_LUMA: f64 = 230.0;

/// Error types for luminance sampling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// Image is too small to produce meaningful statistics.
    #[error("image too small to sample: {width}x{height} (need at least 2x2)")]
    ImageTooSmall { width: u32, height: u32 },
}

/// Aggregate luminance statistics for one image.
///
/// All fraction fields lie in `[0, 1]`. Immutable once computed; the gate
/// consumes these directly and the server echoes them back to the client
/// as rejection diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LuminanceStats {
    /// Fraction of pixels with Y < [`DARK_LUMA`]
    pub dark_fraction: f64,
    /// Fraction of pixels with Y > [`BRIGHT_LUMA`]
    pub bright_fraction: f64,
    /// Fraction of pixels with Y > [`VERY_BRIGHT_LUMA`]
    pub very_bright_fraction: f64,
    /// Mean luminance over all pixels
    pub mean: f64,
    /// Population standard deviation of luminance
    pub std_dev: f64,
}

impl LuminanceStats {
    /// All-zero statistics, returned alongside the unusable-image error.
    pub fn zeroed() -> Self {
        Self {
            dark_fraction: 0.0,
            bright_fraction: 0.0,
            very_bright_fraction: 0.0,
            mean: 0.0,
            std_dev: 0.0,
        }
    }
}

/// Perceptual luminance of one RGB pixel, channels in `[0, 255]`.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

/// Downsample to the bounded working size and strip alpha.
///
/// Images already within [`MAX_WORKING_EDGE`] are converted without
/// resampling so small inputs keep their exact pixel values.
pub fn working_image(image: &DynamicImage) -> RgbImage {
    let (width, height) = (image.width(), image.height());
    if width.max(height) > MAX_WORKING_EDGE {
        // resize() preserves aspect ratio within the bounding box
        image
            .resize(MAX_WORKING_EDGE, MAX_WORKING_EDGE, FilterType::Triangle)
            .to_rgb8()
    } else {
        image.to_rgb8()
    }
}

/// Compute luminance statistics over an RGB working image.
///
/// Single pass: band counts plus running sum and sum-of-squares. The
/// variance is clamped at zero to absorb floating-point cancellation on
/// near-flat images.
pub fn sample(image: &RgbImage) -> Result<LuminanceStats, SampleError> {
    let (width, height) = image.dimensions();
    if width < 2 || height < 2 {
        return Err(SampleError::ImageTooSmall { width, height });
    }

    let mut dark = 0usize;
    let mut bright = 0usize;
    let mut very_bright = 0usize;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let y = luminance(r, g, b);

        if y < DARK_LUMA {
            dark += 1;
        }
        if y > BRIGHT_LUMA {
            bright += 1;
        }
        if y > VERY_BRIGHT_LUMA {
            very_bright += 1;
        }
        sum += y;
        sum_sq += y * y;
    }

    let n = (width as usize * height as usize) as f64;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).max(0.0);

    Ok(LuminanceStats {
        dark_fraction: dark as f64 / n,
        bright_fraction: bright as f64 / n,
        very_bright_fraction: very_bright as f64 / n,
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Downsample, strip alpha, and sample in one call.
pub fn sample_image(image: &DynamicImage) -> Result<LuminanceStats, SampleError> {
    sample(&working_image(image))
}
