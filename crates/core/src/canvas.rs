//! Canvas collaborator
//!
//! The session draws through this trait and never inspects what the canvas
//! does with a layer. Pan, zoom and hit-testing belong to the implementation.

use crate::geometry::ImageBounds;
use crate::layer::{LayerId, LayerKind, OverlayLayer};

/// Surface that renders overlay layers over the reference image
pub trait Canvas {
    /// Draw a new layer on top of the existing ones
    fn add_layer(&mut self, layer: &OverlayLayer);

    /// Remove a previously added layer. Unknown ids are ignored.
    fn remove_layer(&mut self, id: LayerId);

    /// Move the view so the whole image is visible
    fn fit_bounds(&mut self, bounds: ImageBounds);
}

/// In-memory canvas that keeps the live layers in draw order
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    layers: Vec<OverlayLayer>,
    fitted: Option<ImageBounds>,
    draw_ops: usize,
    remove_ops: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers currently drawn, bottom first
    pub fn layers(&self) -> &[OverlayLayer] {
        &self.layers
    }

    pub fn layers_of(&self, kind: LayerKind) -> impl Iterator<Item = &OverlayLayer> {
        self.layers.iter().filter(move |layer| layer.kind == kind)
    }

    pub fn count_of(&self, kind: LayerKind) -> usize {
        self.layers_of(kind).count()
    }

    /// Bounds of the last fit-to-view request
    pub fn fitted_bounds(&self) -> Option<ImageBounds> {
        self.fitted
    }

    pub fn draw_ops(&self) -> usize {
        self.draw_ops
    }

    pub fn remove_ops(&self) -> usize {
        self.remove_ops
    }
}

impl Canvas for RecordingCanvas {
    fn add_layer(&mut self, layer: &OverlayLayer) {
        self.draw_ops += 1;
        self.layers.push(layer.clone());
    }

    fn remove_layer(&mut self, id: LayerId) {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id != id);
        if self.layers.len() != before {
            self.remove_ops += 1;
        }
    }

    fn fit_bounds(&mut self, bounds: ImageBounds) {
        self.fitted = Some(bounds);
    }
}
