//! Spatial star-field layout engine.
//!
//! Takes the star and constellation lists produced by the upstream
//! analysis step and lays them out on a 2D drawing surface: celestial
//! coordinates are projected into pixel space, crowded markers are shrunk
//! rather than dropped, a coarse density field drives the heatmap overlay,
//! and constellation polylines get non-overlapping label anchors.
//!
//! All derived structures are recomputed from scratch on any input change;
//! one [`scene::Scene`] is one atomic render pass.

pub mod constellation;
pub mod density;
pub mod placement;
pub mod projection;
pub mod render;
pub mod scene;

pub use projection::{ProjectedPoint, Projector};
pub use render::{Color, PixmapSurface, RenderError, RenderSurface, TextAlign};
pub use scene::{RenderOptions, Scene};
