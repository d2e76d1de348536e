//! Raster canvas
//!
//! Paints overlay layers onto a copy of the reference image with tiny-skia.
//! Image space has `y` growing upward from the bottom edge, so every point is
//! flipped to pixel rows before drawing.

use image::{imageops, RgbaImage};
use planimeter_core::{
    Canvas, Color, ImageBounds, ImagePoint, LayerId, LayerShape, LayerStyle, OverlayLayer,
};
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, StrokeDash,
    Transform,
};

/// Approximate glyph advance used to size label plates
const LABEL_CHAR_WIDTH: f32 = 8.0;

/// Label plate height
const LABEL_HEIGHT: f32 = 20.0;

/// Horizontal padding around label text
const LABEL_PADDING: f32 = 4.0;

/// Errors raised while composing the final image
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("nothing to render: no reference image on the canvas")]
    NoBackdrop,
    #[error("invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Canvas that composes its layers into an `RgbaImage`
///
/// Marker radii and stroke widths are given in screen pixels and drawn at
/// `scale` pixels per unit (1.0 by default).
#[derive(Debug)]
pub struct RasterCanvas {
    pixels: Option<RgbaImage>,
    layers: Vec<OverlayLayer>,
    fitted: Option<ImageBounds>,
    scale: f32,
}

impl RasterCanvas {
    /// Canvas without pixels; a blank white backdrop is used when composing
    pub fn new() -> Self {
        Self { pixels: None, layers: Vec::new(), fitted: None, scale: 1.0 }
    }

    /// Canvas painting over the decoded reference image
    pub fn with_pixels(pixels: RgbaImage) -> Self {
        Self { pixels: Some(pixels), ..Self::new() }
    }

    /// Sets the screen-pixel scale for radii and stroke widths.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the reference pixels, e.g. after a new image was loaded
    pub fn set_pixels(&mut self, pixels: RgbaImage) {
        self.pixels = Some(pixels);
    }

    pub fn layers(&self) -> &[OverlayLayer] {
        &self.layers
    }

    pub fn fitted_bounds(&self) -> Option<ImageBounds> {
        self.fitted
    }

    /// Paint every live layer, bottom first
    ///
    /// # Errors
    /// Fails when no backdrop layer has been added or its bounds are empty.
    pub fn compose(&self) -> Result<RgbaImage, RenderError> {
        let bounds = self
            .layers
            .iter()
            .find_map(|layer| match &layer.shape {
                LayerShape::Image { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .ok_or(RenderError::NoBackdrop)?;

        let mut pixmap = Pixmap::new(bounds.width, bounds.height)
            .ok_or(RenderError::InvalidSize { width: bounds.width, height: bounds.height })?;
        self.paint_backdrop(&mut pixmap, bounds);

        let height = bounds.height as f32;
        for layer in &self.layers {
            draw_layer(&mut pixmap, layer, height, self.scale);
        }

        Ok(to_rgba_image(&pixmap))
    }

    fn paint_backdrop(&self, pixmap: &mut Pixmap, bounds: ImageBounds) {
        let Some(pixels) = &self.pixels else {
            pixmap.fill(tiny_skia::Color::WHITE);
            return;
        };

        let resized;
        let source = if pixels.dimensions() == (bounds.width, bounds.height) {
            pixels
        } else {
            log::warn!(
                "backdrop is {}x{} but layer bounds are {}x{}, resizing",
                pixels.width(),
                pixels.height(),
                bounds.width,
                bounds.height
            );
            resized = imageops::resize(
                pixels,
                bounds.width,
                bounds.height,
                imageops::FilterType::Triangle,
            );
            &resized
        };

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(source.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }
}

impl Default for RasterCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for RasterCanvas {
    fn add_layer(&mut self, layer: &OverlayLayer) {
        self.layers.push(layer.clone());
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.retain(|layer| layer.id != id);
    }

    fn fit_bounds(&mut self, bounds: ImageBounds) {
        self.fitted = Some(bounds);
    }
}

fn draw_layer(pixmap: &mut Pixmap, layer: &OverlayLayer, height: f32, scale: f32) {
    let flip = |p: &ImagePoint| (p.x as f32, height - p.y as f32);

    match &layer.shape {
        LayerShape::Image { .. } => {}
        LayerShape::Marker { center, radius } => {
            let (cx, cy) = flip(center);
            if let Some(path) = PathBuilder::from_circle(cx, cy, radius * scale) {
                fill_and_stroke(pixmap, &path, &layer.style, scale);
            }
        }
        LayerShape::Segment { from, to } => {
            let (x1, y1) = flip(from);
            let (x2, y2) = flip(to);
            let mut pb = PathBuilder::new();
            pb.move_to(x1, y1);
            pb.line_to(x2, y2);
            if let Some(path) = pb.finish() {
                stroke(pixmap, &path, &layer.style, scale);
            }
        }
        LayerShape::Polygon { points } => {
            let mut pb = PathBuilder::new();
            for (i, point) in points.iter().enumerate() {
                let (x, y) = flip(point);
                if i == 0 {
                    pb.move_to(x, y);
                } else {
                    pb.line_to(x, y);
                }
            }
            pb.close();
            if let Some(path) = pb.finish() {
                fill_and_stroke(pixmap, &path, &layer.style, scale);
            }
        }
        LayerShape::Label { anchor, text } => {
            let (cx, cy) = flip(anchor);
            let chars = text.chars().count() as f32;
            let width = (chars * LABEL_CHAR_WIDTH + 2.0 * LABEL_PADDING) * scale;
            let height = LABEL_HEIGHT * scale;
            let plate = Rect::from_xywh(cx - width / 2.0, cy - height / 2.0, width, height);
            if let (Some(rect), Some(fill)) = (plate, layer.style.fill_color) {
                pixmap.fill_rect(rect, &paint(fill), Transform::identity(), None);
            }
        }
    }
}

fn fill_and_stroke(pixmap: &mut Pixmap, path: &tiny_skia::Path, style: &LayerStyle, scale: f32) {
    if let Some(fill) = style.fill_color {
        pixmap.fill_path(path, &paint(fill), FillRule::Winding, Transform::identity(), None);
    }
    stroke(pixmap, path, style, scale);
}

fn stroke(pixmap: &mut Pixmap, path: &tiny_skia::Path, style: &LayerStyle, scale: f32) {
    if style.stroke_width <= 0.0 {
        return;
    }

    let dash = if style.dash_pattern.is_empty() {
        None
    } else {
        StrokeDash::new(style.dash_pattern.iter().map(|d| d * scale).collect(), 0.0)
    };

    let stroke = Stroke {
        width: style.stroke_width * scale,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash,
        ..Default::default()
    };
    pixmap.stroke_path(path, &paint(style.stroke_color), &stroke, Transform::identity(), None);
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use planimeter_core::{ImageInfo, LayerKind, MeasureSession, OverlayStyle, TextPanel};

    fn plan(width: u32, height: u32) -> ImageInfo {
        ImageInfo { source: "plan.png".to_owned(), width, height }
    }

    #[test]
    fn test_compose_without_backdrop_fails() {
        let canvas = RasterCanvas::new();
        assert!(matches!(canvas.compose(), Err(RenderError::NoBackdrop)));
    }

    #[test]
    fn test_blank_backdrop_is_white() {
        let mut canvas = RasterCanvas::new();
        let mut panel = TextPanel::new();
        let mut session = MeasureSession::new();
        session.load_image(plan(20, 10), &mut canvas, &mut panel);

        let img = canvas.compose().unwrap();
        assert_eq!(img.dimensions(), (20, 10));
        assert_eq!(img.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.fitted_bounds(), Some(ImageBounds::new(20, 10)));
    }

    #[test]
    fn test_closed_polygon_is_filled() {
        let backdrop = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let mut canvas = RasterCanvas::with_pixels(backdrop);
        let mut panel = TextPanel::new();
        let mut session = MeasureSession::new();
        session.load_image(plan(100, 100), &mut canvas, &mut panel);

        for (x, y) in [(10.0, 10.0), (90.0, 10.0), (90.0, 40.0), (10.0, 40.0)] {
            session.click(ImagePoint::new(x, y), &mut canvas, &mut panel);
        }
        session.close(&mut canvas, &mut panel).unwrap();

        let img = canvas.compose().unwrap();
        // Image-space y=38 is pixel row 62; the accent fill tints the black backdrop
        let inside = img.get_pixel(20, 62);
        assert!(inside[2] > 0, "fill should add blue: {inside:?}");
        // Outside the polygon the backdrop is untouched
        assert_eq!(img.get_pixel(20, 20), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_vertex_marker_is_drawn_with_flipped_y() {
        let mut canvas = RasterCanvas::new();
        let mut panel = TextPanel::new();
        let mut session = MeasureSession::with_style(OverlayStyle::default(), 2);
        session.load_image(plan(50, 50), &mut canvas, &mut panel);
        session.click(ImagePoint::new(10.0, 40.0), &mut canvas, &mut panel);

        assert_eq!(canvas.layers().iter().filter(|l| l.kind == LayerKind::VertexMarker).count(), 1);

        let img = canvas.compose().unwrap();
        let marker = img.get_pixel(10, 10);
        assert_eq!(marker, &Rgba([0x00, 0xd2, 0xff, 255]));
        assert_eq!(img.get_pixel(10, 40), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_mismatched_backdrop_is_resized() {
        let backdrop = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let mut canvas = RasterCanvas::with_pixels(backdrop);
        let mut panel = TextPanel::new();
        let mut session = MeasureSession::new();
        session.load_image(plan(30, 20), &mut canvas, &mut panel);

        let img = canvas.compose().unwrap();
        assert_eq!(img.dimensions(), (30, 20));
        assert_eq!(img.get_pixel(15, 10), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_scale_enlarges_markers() {
        let accent = Rgba([0x00, 0xd2, 0xff, 255]);
        let white = Rgba([255, 255, 255, 255]);

        for (scale, expected) in [(1.0, white), (2.0, accent)] {
            let mut canvas = RasterCanvas::new().with_scale(scale);
            let mut panel = TextPanel::new();
            let mut session = MeasureSession::new();
            session.load_image(plan(50, 50), &mut canvas, &mut panel);
            session.click(ImagePoint::new(25.0, 25.0), &mut canvas, &mut panel);

            let img = canvas.compose().unwrap();
            assert_eq!(img.get_pixel(25, 25), &accent);
            // Six pixels from the center: outside a radius-4 marker, inside radius 8
            assert_eq!(img.get_pixel(31, 25), &expected, "scale {scale}");
        }
    }

    #[test]
    fn test_set_pixels_replaces_backdrop() {
        let mut canvas = RasterCanvas::new();
        let mut panel = TextPanel::new();
        let mut session = MeasureSession::new();
        session.load_image(plan(10, 10), &mut canvas, &mut panel);
        assert_eq!(canvas.compose().unwrap().get_pixel(5, 5), &Rgba([255, 255, 255, 255]));

        canvas.set_pixels(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])));
        assert_eq!(canvas.compose().unwrap().get_pixel(5, 5), &Rgba([0, 0, 0, 255]));
    }
}
