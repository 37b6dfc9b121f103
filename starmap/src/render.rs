//! Render surface contract and the tiny-skia raster backend.
//!
//! The layout engine draws through the [`RenderSurface`] trait: circles,
//! lines, rectangles, and text with measured widths, on caller-supplied
//! pixel dimensions. [`PixmapSurface`] is the production implementation;
//! it renders synchronously into a tiny-skia pixmap and exports a finished
//! PNG, so a snapshot is always complete when the report pipeline asks
//! for it.

use rusttype::{point, Font, Scale};
use thiserror::Error;
use tiny_skia::{
    FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Stroke, StrokeDash,
    Transform,
};

use crate::projection::ProjectedPoint;

/// Width estimate per character when no font is loaded, as a fraction of
/// the text size. Matches a typical monospace aspect ratio.
const FALLBACK_CHAR_ASPECT: f64 = 0.6;

/// Errors from surface construction and export.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("could not parse font data")]
    FontParse,
    #[error("png encoding failed: {0}")]
    PngEncode(String),
}

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opacity given as a fraction in `[0, 1]`, clamped.
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }

    fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Convert an HSL color (hue in degrees, saturation/lightness in `[0,1]`)
/// to RGB. Used by the heatmap's hue ramp.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Color {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    Color::rgb(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Horizontal alignment for [`RenderSurface::fill_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Drawing primitives the layout engine needs from a target surface.
///
/// `measure_text` must reflect the same metrics `fill_text` renders with;
/// label background boxes are sized from it after the fact, never from an
/// assumed width.
pub trait RenderSurface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color);
    fn stroke_line(
        &mut self,
        from: ProjectedPoint,
        to: ProjectedPoint,
        width: f64,
        color: Color,
        dash: Option<(f64, f64)>,
    );
    /// Draw text with `y` as the baseline.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Color, align: TextAlign);
    /// Rendered width of `text` at `size`, in pixels.
    fn measure_text(&self, text: &str, size: f64) -> f64;
}

/// Raster surface backed by a tiny-skia pixmap.
///
/// Text needs a font: pass TTF/OTF bytes to [`PixmapSurface::set_font`].
/// Without one, `fill_text` is a no-op and `measure_text` falls back to a
/// monospace estimate so layout geometry stays well-defined.
pub struct PixmapSurface {
    pixmap: Pixmap,
    font: Option<Font<'static>>,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap, font: None })
    }

    /// Load a TTF/OTF font for text rendering and measurement.
    pub fn set_font(&mut self, font_bytes: Vec<u8>) -> Result<(), RenderError> {
        self.font = Some(Font::try_from_vec(font_bytes).ok_or(RenderError::FontParse)?);
        Ok(())
    }

    /// Export the finished surface as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::PngEncode(e.to_string()))
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn solid_paint(color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.anti_alias = true;
        paint
    }

    /// Alpha-composite one coverage sample over the pixmap.
    fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return;
        }
        let alpha = f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        let index = (y as u32 * width + x as u32) as usize;
        let pixels = self.pixmap.pixels_mut();
        let dst = pixels[index];
        let inv = 1.0 - alpha;

        // Source-over in premultiplied space
        let a = (alpha * 255.0 + f32::from(dst.alpha()) * inv).min(255.0);
        let r = (f32::from(color.r) * alpha + f32::from(dst.red()) * inv).min(a);
        let g = (f32::from(color.g) * alpha + f32::from(dst.green()) * inv).min(a);
        let b = (f32::from(color.b) * alpha + f32::from(dst.blue()) * inv).min(a);

        if let Some(blended) =
            PremultipliedColorU8::from_rgba(r as u8, g as u8, b as u8, a as u8)
        {
            pixels[index] = blended;
        }
    }

    fn draw_glyphs(&mut self, text: &str, x: f64, y: f64, size: f64, color: Color) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let scale = Scale::uniform(size as f32);
        for glyph in font.layout(text, scale, point(x as f32, y as f32)) {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                self.blend_pixel(
                    i64::from(bounds.min.x) + i64::from(gx),
                    i64::from(bounds.min.y) + i64::from(gy),
                    color,
                    coverage,
                );
            });
        }
    }
}

impl RenderSurface for PixmapSurface {
    fn width(&self) -> f64 {
        f64::from(self.pixmap.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.pixmap.height())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) else {
            return;
        };
        self.pixmap.fill_rect(
            rect,
            &Self::solid_paint(color),
            Transform::identity(),
            None,
        );
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let Some(path) = PathBuilder::from_circle(cx as f32, cy as f32, radius as f32) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &Self::solid_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_line(
        &mut self,
        from: ProjectedPoint,
        to: ProjectedPoint,
        width: f64,
        color: Color,
        dash: Option<(f64, f64)>,
    ) {
        let mut builder = PathBuilder::new();
        builder.move_to(from.x as f32, from.y as f32);
        builder.line_to(to.x as f32, to.y as f32);
        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width: width as f32,
            dash: dash.and_then(|(on, off)| StrokeDash::new(vec![on as f32, off as f32], 0.0)),
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::solid_paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Color, align: TextAlign) {
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - self.measure_text(text, size) / 2.0,
        };
        self.draw_glyphs(text, x, y, size, color);
    }

    fn measure_text(&self, text: &str, size: f64) -> f64 {
        match &self.font {
            Some(font) => {
                let scale = Scale::uniform(size as f32);
                font.layout(text, scale, point(0.0, 0.0))
                    .last()
                    .map(|glyph| {
                        f64::from(glyph.position().x)
                            + f64::from(glyph.unpositioned().h_metrics().advance_width)
                    })
                    .unwrap_or(0.0)
            }
            None => text.chars().count() as f64 * size * FALLBACK_CHAR_ASPECT,
        }
    }
}
