//! Collision-avoiding marker placement.
//!
//! Stars are placed in input order against the growing set of markers
//! already on the canvas. A star landing within [`MIN_MARKER_DISTANCE`] of
//! an existing marker is still placed, only shrunk, so dense fields stay
//! legible without losing data. Label anchor offsets are jittered through
//! an injected RNG; the drawn marker position itself is never jittered.
//!
//! The pairwise distance check is O(n²), which is fine at the expected
//! scale of a few hundred stars. If star counts grow, replace it with a
//! bucket grid keyed by rounded pixel coordinates.

use rand::Rng;
use serde::{Deserialize, Serialize};
use skygate::Star;

use crate::projection::{ProjectedPoint, Projector};

/// Minimum center-to-center distance before two markers count as colliding.
pub const MIN_MARKER_DISTANCE: f64 = 12.0;
/// Radius multiplier applied to a colliding marker.
pub const COLLISION_RADIUS_SCALE: f64 = 0.6;
/// Brightness multiplier applied to a colliding marker.
pub const COLLISION_BRIGHTNESS_SCALE: f64 = 0.7;
/// Label jitter magnitude band in pixels.
pub const LABEL_JITTER_MIN: f64 = 4.0;
pub const LABEL_JITTER_MAX: f64 = 12.0;

/// Offset from a marker position to its label anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelOffset {
    pub dx: f64,
    pub dy: f64,
}

/// One retained star on the canvas.
///
/// Created during one layout pass and discarded when the pass re-runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedMarker {
    /// Drawn position in pixel space
    pub position: ProjectedPoint,
    /// Visual radius in pixels
    pub radius: f64,
    /// Effective brightness after any collision down-weighting
    pub brightness: f64,
    /// Jittered anchor offset for this marker's label
    pub label_offset: LabelOffset,
    /// Whether this marker was shrunk due to crowding
    pub collided: bool,
}

/// Base marker radius for a star's brightness, clamped to the 0-10 scale.
pub fn base_radius(brightness: f64) -> f64 {
    (brightness.min(10.0) / 10.0) * 3.0 + 0.8
}

/// Draw one label offset from the jitter band: random magnitude in
/// `[LABEL_JITTER_MIN, LABEL_JITTER_MAX)`, random angle.
pub fn label_jitter<R: Rng>(rng: &mut R) -> LabelOffset {
    let magnitude = rng.random_range(LABEL_JITTER_MIN..LABEL_JITTER_MAX);
    let angle = rng.random_range(0.0..std::f64::consts::TAU);
    LabelOffset {
        dx: angle.cos() * magnitude,
        dy: angle.sin() * magnitude,
    }
}

/// Place every star, shrinking markers that crowd already-placed ones.
///
/// The collision test is deterministic for a given star order; only the
/// label jitter consumes the RNG, so a seeded RNG reproduces the whole
/// layout exactly.
pub fn place_markers<R: Rng>(
    stars: &[Star],
    projector: &Projector,
    rng: &mut R,
) -> Vec<PlacedMarker> {
    let mut markers: Vec<PlacedMarker> = Vec::with_capacity(stars.len());

    for star in stars {
        let position = projector.project_star(star);
        let brightness = star.brightness.min(10.0);
        let label_offset = label_jitter(rng);

        let collided = markers
            .iter()
            .any(|m| m.position.distance_to(&position) < MIN_MARKER_DISTANCE);

        let (radius, brightness) = if collided {
            (
                base_radius(brightness) * COLLISION_RADIUS_SCALE,
                brightness * COLLISION_BRIGHTNESS_SCALE,
            )
        } else {
            (base_radius(brightness), brightness)
        };

        markers.push(PlacedMarker {
            position,
            radius,
            brightness,
            label_offset,
            collided,
        });
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spread_projector() -> Projector {
        // Identity-ish field: full domain over a large canvas
        let corner_stars = vec![Star::new(0.0, -90.0, 1.0), Star::new(360.0, 90.0, 1.0)];
        Projector::from_stars(&corner_stars, 800.0, 600.0, 50.0)
    }

    #[test]
    fn test_every_star_gets_a_marker() {
        let stars: Vec<Star> = (0..50)
            .map(|i| Star::new(i as f64 * 7.0 % 360.0, (i as f64 * 3.0) % 90.0, 5.0))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let markers = place_markers(&stars, &spread_projector(), &mut rng);
        assert_eq!(markers.len(), stars.len());
    }

    #[test]
    fn test_near_duplicates_shrink_but_survive() {
        // Two stars at the same coordinate: second collides with first
        let stars = vec![Star::new(100.0, 20.0, 8.0), Star::new(100.0, 20.0, 8.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let markers = place_markers(&stars, &spread_projector(), &mut rng);

        assert_eq!(markers.len(), 2);
        assert!(!markers[0].collided);
        assert!(markers[1].collided);
        assert_relative_eq!(
            markers[1].radius,
            base_radius(8.0) * COLLISION_RADIUS_SCALE,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            markers[1].brightness,
            8.0 * COLLISION_BRIGHTNESS_SCALE,
            epsilon = 1e-12
        );
        // Drawn positions are identical; only labels are jittered apart
        assert_eq!(markers[0].position, markers[1].position);
    }

    #[test]
    fn test_distant_stars_keep_full_size() {
        let stars = vec![Star::new(0.0, -90.0, 10.0), Star::new(360.0, 90.0, 10.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let markers = place_markers(&stars, &spread_projector(), &mut rng);
        assert!(markers.iter().all(|m| !m.collided));
        assert_relative_eq!(markers[0].radius, 3.8, epsilon = 1e-12);
    }

    #[test]
    fn test_layout_is_deterministic_under_a_fixed_seed() {
        let stars: Vec<Star> = (0..120)
            .map(|i| {
                Star::new(
                    (i as f64 * 13.7) % 360.0,
                    ((i as f64 * 5.3) % 180.0) - 90.0,
                    (i % 10) as f64,
                )
            })
            .collect();
        let projector = spread_projector();

        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let a = place_markers(&stars, &projector, &mut rng_a);
        let b = place_markers(&stars, &projector, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_label_jitter_stays_in_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let offset = label_jitter(&mut rng);
            let magnitude = offset.dx.hypot(offset.dy);
            assert!(magnitude >= LABEL_JITTER_MIN - 1e-9);
            assert!(magnitude < LABEL_JITTER_MAX + 1e-9);
        }
    }

    #[test]
    fn test_brightness_clamped_to_scale() {
        assert_relative_eq!(base_radius(25.0), base_radius(10.0), epsilon = 1e-12);
        assert_relative_eq!(base_radius(0.0), 0.8, epsilon = 1e-12);
    }
}
