//! Linear projection from celestial coordinates to drawing-surface pixels.
//!
//! One [`Projector`] is built per render pass from the current star set
//! and canvas dimensions, and is the single source of truth for pixel
//! placement: markers, the density heatmap, and constellation lines all
//! go through the same instance so they stay geometrically consistent.

use serde::{Deserialize, Serialize};
use skygate::Star;

/// Default margin between the plotted field and the canvas edge.
pub const DEFAULT_PADDING: f64 = 50.0;

/// Full natural RA domain, substituted when the star set spans no RA range.
pub const FULL_RA_SPAN: f64 = 360.0;
/// Full natural Dec domain, substituted when the star set spans no Dec range.
pub const FULL_DEC_SPAN: f64 = 180.0;

/// A position in drawing-surface pixel space. Derived, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Maps `(ra, dec)` into pixel space for one star set and canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    ra_min: f64,
    ra_range: f64,
    dec_min: f64,
    dec_range: f64,
    width: f64,
    height: f64,
    padding: f64,
}

impl Projector {
    /// Build a projector from the bounding range of `stars`.
    ///
    /// Degenerate ranges (empty star set, or all stars sharing one
    /// coordinate) substitute the full natural domain as the denominator
    /// so projection never divides by zero.
    pub fn from_stars(stars: &[Star], width: f64, height: f64, padding: f64) -> Self {
        let mut ra_min = f64::INFINITY;
        let mut ra_max = f64::NEG_INFINITY;
        let mut dec_min = f64::INFINITY;
        let mut dec_max = f64::NEG_INFINITY;

        for star in stars {
            ra_min = ra_min.min(star.ra);
            ra_max = ra_max.max(star.ra);
            dec_min = dec_min.min(star.dec);
            dec_max = dec_max.max(star.dec);
        }

        if stars.is_empty() {
            ra_min = 0.0;
            dec_min = -90.0;
        }

        let ra_range = match ra_max - ra_min {
            r if r > 0.0 => r,
            _ => FULL_RA_SPAN,
        };
        let dec_range = match dec_max - dec_min {
            r if r > 0.0 => r,
            _ => FULL_DEC_SPAN,
        };

        Self {
            ra_min,
            ra_range,
            dec_min,
            dec_range,
            width,
            height,
            padding,
        }
    }

    /// Project a celestial coordinate into pixel space.
    pub fn project(&self, ra: f64, dec: f64) -> ProjectedPoint {
        let x = self.padding + (ra - self.ra_min) / self.ra_range * (self.width - 2.0 * self.padding);
        let y = self.padding
            + (dec - self.dec_min) / self.dec_range * (self.height - 2.0 * self.padding);
        ProjectedPoint { x, y }
    }

    /// Project a star's position.
    pub fn project_star(&self, star: &Star) -> ProjectedPoint {
        self.project(star.ra, star.dec)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn star(ra: f64, dec: f64) -> Star {
        Star::new(ra, dec, 5.0)
    }

    #[test]
    fn test_bounds_map_to_padded_corners() {
        let stars = vec![star(10.0, -20.0), star(110.0, 40.0), star(60.0, 10.0)];
        let projector = Projector::from_stars(&stars, 800.0, 600.0, 50.0);

        let min_corner = projector.project(10.0, -20.0);
        assert!(approx_eq!(f64, min_corner.x, 50.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, min_corner.y, 50.0, epsilon = 1e-9));

        let max_corner = projector.project(110.0, 40.0);
        assert!(approx_eq!(f64, max_corner.x, 750.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, max_corner.y, 550.0, epsilon = 1e-9));
    }

    #[test]
    fn test_full_domain_projection_exact_coordinates() {
        // Stars spanning the whole celestial domain on an 800x600 canvas
        let stars = vec![star(0.0, 0.0), star(360.0, -90.0), star(180.0, 90.0)];
        let projector = Projector::from_stars(&stars, 800.0, 600.0, 50.0);

        let p0 = projector.project_star(&stars[0]);
        assert!(approx_eq!(f64, p0.x, 50.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, p0.y, 300.0, epsilon = 1e-9));

        let p1 = projector.project_star(&stars[1]);
        assert!(approx_eq!(f64, p1.x, 750.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, p1.y, 50.0, epsilon = 1e-9));

        let p2 = projector.project_star(&stars[2]);
        assert!(approx_eq!(f64, p2.x, 400.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, p2.y, 550.0, epsilon = 1e-9));
    }

    #[test]
    fn test_degenerate_single_value_range_uses_natural_domain() {
        // All stars share one coordinate; denominators fall back to 360/180
        let stars = vec![star(45.0, 10.0), star(45.0, 10.0)];
        let projector = Projector::from_stars(&stars, 800.0, 600.0, 50.0);

        let p = projector.project(45.0, 10.0);
        assert!(p.x.is_finite() && p.y.is_finite());
        assert!(approx_eq!(f64, p.x, 50.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, p.y, 50.0, epsilon = 1e-9));

        // A degree of offset moves by canvas_span / natural_domain
        let q = projector.project(46.0, 11.0);
        assert!(approx_eq!(f64, q.x - p.x, 700.0 / 360.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, q.y - p.y, 500.0 / 180.0, epsilon = 1e-9));
    }

    #[test]
    fn test_empty_star_set_is_finite() {
        let projector = Projector::from_stars(&[], 800.0, 600.0, 50.0);
        let p = projector.project(180.0, 0.0);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn test_distance() {
        let a = ProjectedPoint::new(0.0, 0.0);
        let b = ProjectedPoint::new(3.0, 4.0);
        assert!(approx_eq!(f64, a.distance_to(&b), 5.0, epsilon = 1e-12));
    }
}
