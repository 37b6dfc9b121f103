//! Kernel-weighted density grid for the heatmap overlay.
//!
//! Each grid cell accumulates an inverse-distance weight from every star
//! within a fixed influence radius of its center. The raw sums are
//! normalized against a fixed saturation constant, so the numeric field is
//! reproducible from star positions alone; color mapping is layered on by
//! the renderer.

use serde::{Deserialize, Serialize};

use crate::projection::ProjectedPoint;

/// Grid cell edge length in pixels.
pub const CELL_SIZE: f64 = 25.0;
/// Stars beyond this multiple of the cell size contribute nothing.
pub const INFLUENCE_RADIUS_FACTOR: f64 = 2.5;
/// Softening length of the `1 / (1 + d / SOFTENING)` falloff.
pub const KERNEL_SOFTENING: f64 = 15.0;
/// Raw density at which a cell saturates to 1.0.
pub const SATURATION_DENSITY: f64 = 8.0;
/// Normalized densities below this are not rendered.
pub const VISIBILITY_FLOOR: f64 = 0.05;

/// One cell of the density field. Derived per render pass; ephemeral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityCell {
    pub grid_x: usize,
    pub grid_y: usize,
    /// Normalized density in `[0, 1]`
    pub density: f64,
}

impl DensityCell {
    /// Whether the cell is dense enough to draw.
    pub fn visible(&self) -> bool {
        self.density > VISIBILITY_FLOOR
    }

    /// Top-left pixel corner of this cell.
    pub fn origin(&self) -> (f64, f64) {
        (self.grid_x as f64 * CELL_SIZE, self.grid_y as f64 * CELL_SIZE)
    }
}

/// Raw (pre-normalization) density at a cell center.
///
/// Sums `1 / (1 + d / KERNEL_SOFTENING)` over stars within the influence
/// radius: a star at zero distance contributes exactly 1, a star just
/// outside the radius contributes nothing. Monotonic in local star count.
pub fn raw_density(points: &[ProjectedPoint], center_x: f64, center_y: f64) -> f64 {
    let influence = CELL_SIZE * INFLUENCE_RADIUS_FACTOR;
    points
        .iter()
        .map(|p| (p.x - center_x).hypot(p.y - center_y))
        .filter(|&d| d < influence)
        .map(|d| 1.0 / (1.0 + d / KERNEL_SOFTENING))
        .sum()
}

/// Compute the full normalized density grid for a canvas.
pub fn density_grid(points: &[ProjectedPoint], width: f64, height: f64) -> Vec<DensityCell> {
    let cols = (width / CELL_SIZE).ceil() as usize;
    let rows = (height / CELL_SIZE).ceil() as usize;
    let mut cells = Vec::with_capacity(cols * rows);

    for grid_y in 0..rows {
        for grid_x in 0..cols {
            let center_x = grid_x as f64 * CELL_SIZE + CELL_SIZE / 2.0;
            let center_y = grid_y as f64 * CELL_SIZE + CELL_SIZE / 2.0;
            let raw = raw_density(points, center_x, center_y);
            let density = (raw / SATURATION_DENSITY).min(1.0);
            cells.push(DensityCell {
                grid_x,
                grid_y,
                density,
            });
        }
    }

    cells
}
