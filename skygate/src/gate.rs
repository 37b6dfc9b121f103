//! Night-sky admissibility gate.
//!
//! Applies a fixed threshold policy to [`LuminanceStats`]: night-sky
//! photographs are predominantly dark with sparse small bright points and
//! enough contrast to rule out flat frames. The thresholds were chosen
//! empirically upstream; they are kept as named constants and must not be
//! altered without new calibration data.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::luminance::{self, LuminanceStats, SampleError};

/// Minimum fraction of dark pixels.
pub const MIN_DARK_FRACTION: f64 = 0.55;
/// Bright pixels must exist (stars) but stay sparse.
pub const MIN_BRIGHT_FRACTION: f64 = 0.001;
pub const MAX_BRIGHT_FRACTION: f64 = 0.12;
/// Large saturated regions indicate daylight or indoor scenes.
pub const MAX_VERY_BRIGHT_FRACTION: f64 = 0.02;
/// Maximum mean luminance.
pub const MAX_MEAN: f64 = 110.0;
/// Minimum contrast; rejects flat or blank frames.
pub const MIN_STD_DEV: f64 = 25.0;

/// Outcomes where no verdict could be produced at all.
///
/// Distinct from a policy rejection: the caller presents "could not
/// validate" guidance rather than "not a night-sky image".
#[derive(Error, Debug)]
pub enum GateError {
    /// Image bytes could not be decoded into pixels.
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// Image decoded but is too degenerate to sample.
    #[error("could not sample image: {0}")]
    Unusable(#[from] SampleError),
}

/// Result of one gate evaluation.
///
/// Created once per submission and consumed immediately by the upload
/// flow; never stored. The metrics ride along so a rejection is auditable
/// rather than a bare boolean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Whether the image passed the night-sky policy
    pub admitted: bool,
    /// The statistics the decision was made from
    pub metrics: LuminanceStats,
}

/// Apply the threshold policy to already-computed statistics.
///
/// Purely functional. Every clause must hold for admission. This exact
/// function runs on both the client pre-check and the server re-check;
/// divergence between the two is a defect, not a tolerance.
pub fn evaluate(metrics: LuminanceStats) -> GateDecision {
    let admitted = metrics.dark_fraction >= MIN_DARK_FRACTION
        && metrics.bright_fraction >= MIN_BRIGHT_FRACTION
        && metrics.bright_fraction <= MAX_BRIGHT_FRACTION
        && metrics.very_bright_fraction <= MAX_VERY_BRIGHT_FRACTION
        && metrics.mean <= MAX_MEAN
        && metrics.std_dev >= MIN_STD_DEV;

    debug!(
        admitted,
        dark = metrics.dark_fraction,
        bright = metrics.bright_fraction,
        very_bright = metrics.very_bright_fraction,
        mean = metrics.mean,
        std_dev = metrics.std_dev,
        "gate evaluated"
    );

    GateDecision { admitted, metrics }
}

/// Decode raw image bytes and run the full sampler + gate pipeline.
///
/// This is the single entry point both call sites use: decode, downsample
/// to the working size, sample luminance, apply policy.
pub fn gate_image_bytes(bytes: &[u8]) -> Result<GateDecision, GateError> {
    let image = image::load_from_memory(bytes)?;
    let stats = luminance::sample_image(&image)?;
    Ok(evaluate(stats))
}
