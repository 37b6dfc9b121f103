//! One atomic render pass over a star set.
//!
//! A [`Scene`] owns every derived structure for one pass: projected
//! markers, the density field, and the constellation layout. Nothing is
//! patched incrementally; when stars, dimensions, or overlay toggles
//! change, the caller builds a fresh `Scene` and all derived state is
//! recomputed from scratch.

use rand::Rng;
use serde::{Deserialize, Serialize};
use skygate::{Constellation, Star};
use tracing::debug;

use crate::constellation::{layout_constellations, ConstellationLayout};
use crate::density::{self, DensityCell, CELL_SIZE};
use crate::placement::{place_markers, PlacedMarker};
use crate::projection::{ProjectedPoint, Projector, DEFAULT_PADDING};
use crate::render::{hsl_to_rgb, Color, RenderSurface, TextAlign};

const BACKGROUND: Color = Color::rgb(15, 15, 30);
const MARKER_HUE: (u8, u8, u8) = (0, 217, 255);
const LABEL_GRAY: (u8, u8, u8) = (160, 160, 176);
const CONSTELLATION_DASH: (f64, f64) = (6.0, 4.0);
const CONSTELLATION_LINE_WIDTH: f64 = 1.2;
const STAR_LABEL_SIZE: f64 = 12.0;
const CONSTELLATION_LABEL_SIZE: f64 = 13.0;
const AXIS_LABEL_SIZE: f64 = 12.0;

/// Canvas dimensions and overlay toggles for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub padding: f64,
    pub show_heatmap: bool,
    pub show_constellations: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            padding: DEFAULT_PADDING,
            show_heatmap: false,
            show_constellations: false,
        }
    }
}

/// Fully laid-out star field, ready to draw onto any [`RenderSurface`].
#[derive(Debug, Clone)]
pub struct Scene {
    options: RenderOptions,
    markers: Vec<PlacedMarker>,
    star_labels: Vec<String>,
    density: Vec<DensityCell>,
    constellations: ConstellationLayout,
}

impl Scene {
    /// Run the full layout pass: project, place, estimate density, and
    /// lay out constellations, all against one shared projector.
    ///
    /// `star_labels` pairs with `stars` by index and may be empty. The RNG
    /// drives only label jitter; seed it for reproducible layouts.
    pub fn layout<R: Rng>(
        stars: &[Star],
        constellations: &[Constellation],
        star_labels: &[String],
        options: RenderOptions,
        rng: &mut R,
    ) -> Self {
        let width = f64::from(options.width);
        let height = f64::from(options.height);
        let projector = Projector::from_stars(stars, width, height, options.padding);

        let markers = place_markers(stars, &projector, rng);
        let positions: Vec<ProjectedPoint> = markers.iter().map(|m| m.position).collect();
        let density = if options.show_heatmap {
            density::density_grid(&positions, width, height)
        } else {
            Vec::new()
        };
        let constellations = if options.show_constellations {
            layout_constellations(constellations, stars, &projector, rng)
        } else {
            ConstellationLayout::default()
        };

        debug!(
            stars = stars.len(),
            markers = markers.len(),
            edges = constellations.edges.len(),
            cells = density.len(),
            "scene laid out"
        );

        Self {
            options,
            markers,
            star_labels: star_labels.to_vec(),
            density,
            constellations,
        }
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }

    pub fn density(&self) -> &[DensityCell] {
        &self.density
    }

    pub fn constellations(&self) -> &ConstellationLayout {
        &self.constellations
    }

    /// Draw the whole scene. Completes synchronously; once this returns
    /// the surface can be exported immediately.
    pub fn render<S: RenderSurface>(&self, surface: &mut S) {
        let width = f64::from(self.options.width);
        let height = f64::from(self.options.height);
        let (mr, mg, mb) = MARKER_HUE;
        let (lr, lg, lb) = LABEL_GRAY;

        surface.fill_rect(0.0, 0.0, width, height, BACKGROUND);

        for cell in self.density.iter().filter(|c| c.visible()) {
            let hue = 190.0 - cell.density * 80.0;
            let lightness = 0.20 + cell.density * 0.25;
            let (x, y) = cell.origin();
            surface.fill_rect(x, y, CELL_SIZE, CELL_SIZE, hsl_to_rgb(hue, 0.65, lightness));
        }

        for edge in &self.constellations.edges {
            surface.stroke_line(
                edge.from,
                edge.to,
                CONSTELLATION_LINE_WIDTH,
                Color::rgba(mr, mg, mb, 0.25),
                Some(CONSTELLATION_DASH),
            );
        }

        for (index, marker) in self.markers.iter().enumerate() {
            let p = marker.position;
            let b = marker.brightness;

            surface.fill_circle(p.x, p.y, marker.radius * 3.5, Color::rgba(mr, mg, mb, 0.1 + b / 50.0));
            surface.fill_circle(p.x, p.y, marker.radius, Color::rgba(mr, mg, mb, 0.8 + b / 20.0));
            surface.fill_circle(
                p.x,
                p.y,
                marker.radius * 0.35,
                Color::rgba(255, 255, 255, 0.6 + b / 30.0),
            );

            if let Some(label) = self.star_labels.get(index) {
                surface.fill_text(
                    label,
                    p.x + marker.label_offset.dx + 8.0,
                    p.y + marker.label_offset.dy - 8.0,
                    STAR_LABEL_SIZE,
                    Color::rgba(255, 255, 255, 0.85),
                    TextAlign::Left,
                );
            }
        }

        for label in &self.constellations.labels {
            // Box sized from measured text, computed before drawing
            let text_width = surface.measure_text(&label.name, CONSTELLATION_LABEL_SIZE);
            surface.fill_rect(
                label.anchor.x - text_width / 2.0 - 6.0,
                label.anchor.y - 18.0,
                text_width + 12.0,
                16.0,
                Color::rgba(15, 15, 30, 0.6),
            );
            surface.fill_text(
                &label.name,
                label.anchor.x,
                label.anchor.y - 10.0,
                CONSTELLATION_LABEL_SIZE,
                Color::rgba(lr, lg, lb, 0.8),
                TextAlign::Center,
            );
        }

        surface.fill_text(
            "Right Ascension (RA)",
            width / 2.0,
            height - 12.0,
            AXIS_LABEL_SIZE,
            Color::rgba(lr, lg, lb, 0.4),
            TextAlign::Center,
        );
        surface.fill_text(
            "Declination (Dec)",
            8.0,
            height / 2.0,
            AXIS_LABEL_SIZE,
            Color::rgba(lr, lg, lb, 0.4),
            TextAlign::Left,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Records draw calls so layout-to-draw behavior can be asserted
    /// without rasterizing.
    #[derive(Default)]
    struct RecordingSurface {
        rects: Vec<(f64, f64, f64, f64)>,
        circles: usize,
        lines: usize,
        texts: Vec<String>,
    }

    impl RenderSurface for RecordingSurface {
        fn width(&self) -> f64 {
            800.0
        }
        fn height(&self) -> f64 {
            600.0
        }
        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, _color: Color) {
            self.rects.push((x, y, w, h));
        }
        fn fill_circle(&mut self, _cx: f64, _cy: f64, _radius: f64, _color: Color) {
            self.circles += 1;
        }
        fn stroke_line(
            &mut self,
            _from: ProjectedPoint,
            _to: ProjectedPoint,
            _width: f64,
            _color: Color,
            _dash: Option<(f64, f64)>,
        ) {
            self.lines += 1;
        }
        fn fill_text(
            &mut self,
            text: &str,
            _x: f64,
            _y: f64,
            _size: f64,
            _color: Color,
            _align: TextAlign,
        ) {
            self.texts.push(text.to_string());
        }
        fn measure_text(&self, text: &str, _size: f64) -> f64 {
            // Fixed-width stand-in so box sizes are predictable
            text.chars().count() as f64 * 10.0
        }
    }

    fn sample_stars() -> Vec<Star> {
        vec![
            Star::new(0.0, -90.0, 9.0),
            Star::new(90.0, -30.0, 6.0),
            Star::new(180.0, 0.0, 4.0),
            Star::new(270.0, 30.0, 7.0),
            Star::new(360.0, 90.0, 2.0),
        ]
    }

    #[test]
    fn test_markers_drawn_as_three_circles_each() {
        let stars = sample_stars();
        let scene = Scene::layout(
            &stars,
            &[],
            &[],
            RenderOptions::default(),
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        let mut surface = RecordingSurface::default();
        scene.render(&mut surface);

        assert_eq!(surface.circles, stars.len() * 3);
        // Background rect only; no heatmap cells, no constellation boxes
        assert_eq!(surface.rects.len(), 1);
        assert_eq!(surface.lines, 0);
    }

    #[test]
    fn test_heatmap_cells_only_when_enabled() {
        let stars = sample_stars();
        let options = RenderOptions {
            show_heatmap: true,
            ..RenderOptions::default()
        };
        let scene = Scene::layout(
            &stars,
            &[],
            &[],
            options,
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        assert!(!scene.density().is_empty());

        let mut surface = RecordingSurface::default();
        scene.render(&mut surface);
        // Background plus one rect per visible cell
        let visible = scene.density().iter().filter(|c| c.visible()).count();
        assert_eq!(surface.rects.len(), 1 + visible);
        assert!(visible > 0);
    }

    #[test]
    fn test_constellation_label_box_sized_from_measured_text() {
        let stars = sample_stars();
        let constellations = vec![Constellation::new("Orion", vec![0, 1, 2])];
        let options = RenderOptions {
            show_constellations: true,
            ..RenderOptions::default()
        };
        let scene = Scene::layout(
            &stars,
            &constellations,
            &[],
            options,
            &mut ChaCha8Rng::seed_from_u64(3),
        );

        let mut surface = RecordingSurface::default();
        scene.render(&mut surface);

        assert_eq!(surface.lines, 2);
        // "Orion" measures 50 px with the stand-in metric; box is width + 12
        let label_box = surface.rects.last().unwrap();
        assert_eq!(label_box.2, 50.0 + 12.0);
        assert_eq!(label_box.3, 16.0);
        assert!(surface.texts.contains(&"Orion".to_string()));
    }

    #[test]
    fn test_dangling_constellation_renders_nothing_extra() {
        let stars = sample_stars();
        let constellations = vec![Constellation::new("X", vec![100, 999])];
        let options = RenderOptions {
            show_constellations: true,
            ..RenderOptions::default()
        };
        let scene = Scene::layout(
            &stars,
            &constellations,
            &[],
            options,
            &mut ChaCha8Rng::seed_from_u64(3),
        );

        assert!(scene.constellations().edges.is_empty());
        assert!(scene.constellations().labels.is_empty());

        let mut surface = RecordingSurface::default();
        scene.render(&mut surface);
        assert_eq!(surface.lines, 0);
        assert_eq!(surface.rects.len(), 1);
    }

    #[test]
    fn test_star_labels_drawn_when_provided() {
        let stars = sample_stars();
        let labels: Vec<String> = (0..stars.len()).map(|i| format!("S-{i}")).collect();
        let scene = Scene::layout(
            &stars,
            &[],
            &labels,
            RenderOptions::default(),
            &mut ChaCha8Rng::seed_from_u64(4),
        );
        let mut surface = RecordingSurface::default();
        scene.render(&mut surface);

        for label in &labels {
            assert!(surface.texts.contains(label));
        }
    }

    #[test]
    fn test_axis_captions_always_present() {
        let scene = Scene::layout(
            &sample_stars(),
            &[],
            &[],
            RenderOptions::default(),
            &mut ChaCha8Rng::seed_from_u64(5),
        );
        let mut surface = RecordingSurface::default();
        scene.render(&mut surface);
        assert!(surface.texts.iter().any(|t| t.contains("Right Ascension")));
        assert!(surface.texts.iter().any(|t| t.contains("Declination")));
    }

    #[test]
    fn test_relayout_recomputes_identically_with_same_seed() {
        let stars = sample_stars();
        let constellations = vec![Constellation::new("Orion", vec![0, 1, 2])];
        let options = RenderOptions {
            show_heatmap: true,
            show_constellations: true,
            ..RenderOptions::default()
        };

        let a = Scene::layout(
            &stars,
            &constellations,
            &[],
            options,
            &mut ChaCha8Rng::seed_from_u64(9),
        );
        let b = Scene::layout(
            &stars,
            &constellations,
            &[],
            options,
            &mut ChaCha8Rng::seed_from_u64(9),
        );

        assert_eq!(a.markers(), b.markers());
        assert_eq!(a.density(), b.density());
        assert_eq!(a.constellations(), b.constellations());
    }
}
