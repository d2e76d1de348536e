//! Fit-to-image view computation
//!
//! Zoom levels are powers of two: at zoom `z` one image pixel covers `2^z`
//! screen pixels.

use crate::geometry::{ImageBounds, ImagePoint};
use serde::Serialize;

/// Visible region of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub zoom: i32,
    pub center: ImagePoint,
}

impl ViewState {
    /// Largest zoom at which the whole image fits the viewport
    ///
    /// The result is clamped to `min_zoom..=max_zoom`, so a very large image
    /// may still overflow the viewport at `min_zoom`.
    pub fn fit(
        bounds: ImageBounds,
        viewport_width: u32,
        viewport_height: u32,
        min_zoom: i32,
        max_zoom: i32,
    ) -> Self {
        let center = bounds.center();
        if bounds.width == 0 || bounds.height == 0 || viewport_width == 0 || viewport_height == 0 {
            return Self { zoom: min_zoom, center };
        }

        let scale_x = viewport_width as f64 / bounds.width as f64;
        let scale_y = viewport_height as f64 / bounds.height as f64;
        let zoom = scale_x.min(scale_y).log2().floor() as i32;

        Self { zoom: zoom.clamp(min_zoom, max_zoom), center }
    }

    /// Screen pixels per image pixel
    pub fn scale(&self) -> f64 {
        2f64.powi(self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_exact() {
        let view = ViewState::fit(ImageBounds::new(800, 600), 800, 600, -2, 2);
        assert_eq!(view.zoom, 0);
        assert_eq!(view.center, ImagePoint::new(400.0, 300.0));
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn test_fit_large_image_zooms_out() {
        // 1.25x larger than the viewport needs zoom -1 to fit
        let view = ViewState::fit(ImageBounds::new(1000, 750), 800, 600, -2, 2);
        assert_eq!(view.zoom, -1);
        assert_eq!(view.scale(), 0.5);
    }

    #[test]
    fn test_fit_small_image_zooms_in() {
        let view = ViewState::fit(ImageBounds::new(200, 100), 800, 600, -2, 2);
        assert_eq!(view.zoom, 2);
    }

    #[test]
    fn test_fit_clamps_to_limits() {
        let huge = ViewState::fit(ImageBounds::new(20_000, 20_000), 800, 600, -2, 2);
        assert_eq!(huge.zoom, -2);

        let tiny = ViewState::fit(ImageBounds::new(10, 10), 800, 600, -2, 2);
        assert_eq!(tiny.zoom, 2);
    }

    #[test]
    fn test_fit_degenerate_viewport() {
        let view = ViewState::fit(ImageBounds::new(100, 100), 0, 600, -2, 2);
        assert_eq!(view.zoom, -2);
    }
}
