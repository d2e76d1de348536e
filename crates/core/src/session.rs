//! Polygon measurement session
//!
//! Owns all measurement state and drives the canvas and display collaborators.
//! Every transition runs to completion inside the call that triggered it.
//!
//! Lifecycle:
//! - `Empty` --click--> `Drawing`
//! - `Drawing` --click--> `Drawing`
//! - `Drawing` --close (n >= 3)--> `Closed`
//! - `Drawing` --close (n < 3)--> `Drawing`, with a warning
//! - `Closed` --click--> implicit reset, then `Drawing` with one vertex
//! - any --reset--> `Empty`

use crate::area::{measure, DEFAULT_AREA_DECIMALS};
use crate::canvas::Canvas;
use crate::display::DisplayPanel;
use crate::error::MeasureError;
use crate::geometry::{bounding_box, ImagePoint};
use crate::layer::{LayerKind, LayerRegistry, LayerShape, OverlayLayer, OverlayStyle};
use crate::loader::ImageInfo;
use crate::tracker::VertexTracker;
use serde::{Deserialize, Serialize};

/// Where the session is in the drawing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No vertices placed
    Empty,
    /// At least one vertex placed, polygon still open
    Drawing,
    /// Polygon closed and measured
    Closed,
}

/// A measured polygon, fixed at the moment it was closed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedPolygon {
    points: Vec<ImagePoint>,
    area: f64,
    label_anchor: ImagePoint,
    label: String,
}

impl ClosedPolygon {
    pub fn points(&self) -> &[ImagePoint] {
        &self.points
    }

    /// Area in square image pixels
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Center of the polygon's bounding box
    pub fn label_anchor(&self) -> ImagePoint {
        self.label_anchor
    }

    /// Text drawn on the area label, e.g. `"12.00 px²"`
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Input accepted by [`MeasureSession::apply`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// Canvas click already mapped to image space
    Click { x: f64, y: f64 },
    /// Close the polygon and measure it
    Close,
    /// Discard the current drawing
    Reset,
    /// A new reference image finished loading
    LoadImage(ImageInfo),
}

/// Result of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

/// Owned measurement state
pub struct MeasureSession {
    tracker: VertexTracker,
    closed: Option<ClosedPolygon>,
    layers: LayerRegistry,
    image: Option<ImageInfo>,
    style: OverlayStyle,
    area_decimals: usize,
}

impl MeasureSession {
    /// Create an empty session with default styling
    pub fn new() -> Self {
        Self::with_style(OverlayStyle::default(), DEFAULT_AREA_DECIMALS)
    }

    pub fn with_style(style: OverlayStyle, area_decimals: usize) -> Self {
        Self {
            tracker: VertexTracker::new(),
            closed: None,
            layers: LayerRegistry::new(),
            image: None,
            style,
            area_decimals,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.closed.is_some() {
            Phase::Closed
        } else if self.tracker.is_empty() {
            Phase::Empty
        } else {
            Phase::Drawing
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.tracker.count()
    }

    pub fn vertices(&self) -> &[ImagePoint] {
        self.tracker.points()
    }

    pub fn closed(&self) -> Option<&ClosedPolygon> {
        self.closed.as_ref()
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    /// Layers this session currently has on the canvas
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// Place a vertex
    ///
    /// Clicking after a polygon was closed starts a new polygon.
    pub fn click(
        &mut self,
        point: ImagePoint,
        canvas: &mut dyn Canvas,
        panel: &mut dyn DisplayPanel,
    ) {
        if self.closed.is_some() {
            log::debug!("click after close, starting a new polygon");
            self.reset(canvas, panel);
        }

        let previous = self.tracker.last();
        self.tracker.add_point(point);

        self.draw(
            canvas,
            LayerKind::VertexMarker,
            LayerShape::Marker { center: point, radius: self.style.marker_radius },
        );
        if let Some(from) = previous {
            self.draw(canvas, LayerKind::Edge, LayerShape::Segment { from, to: point });
        }

        panel.set_vertex_count(self.tracker.count());
        log::debug!("vertex {} at ({}, {})", self.tracker.count(), point.x, point.y);
    }

    /// Close the polygon and measure it
    ///
    /// Vertex markers and edges are replaced by a filled outline and an area
    /// label. Closing an already closed polygon returns it unchanged.
    ///
    /// # Errors
    /// [`MeasureError::InsufficientVertices`] with fewer than three vertices; the
    /// warning is also sent to the panel and the drawing is left untouched.
    pub fn close(
        &mut self,
        canvas: &mut dyn Canvas,
        panel: &mut dyn DisplayPanel,
    ) -> Result<ClosedPolygon, MeasureError> {
        if let Some(closed) = &self.closed {
            return Ok(closed.clone());
        }

        let measurement = measure(self.tracker.points()).map_err(|err| {
            log::warn!("close rejected: {err}");
            panel.alert(&err.to_string());
            err
        })?;

        let points = self.tracker.snapshot();
        let label_anchor =
            bounding_box(&points).map(|bbox| bbox.center()).unwrap_or(ImagePoint::new(0.0, 0.0));
        let label = measurement.label(self.area_decimals);

        self.remove_kinds(canvas, &LayerKind::TEMPORARY);
        self.draw(canvas, LayerKind::Outline, LayerShape::Polygon { points: points.clone() });
        self.draw(
            canvas,
            LayerKind::AreaLabel,
            LayerShape::Label { anchor: label_anchor, text: label.clone() },
        );
        panel.set_area(measurement.area);

        log::debug!("closed polygon with {} vertices, area {}", points.len(), measurement.area);

        let closed = ClosedPolygon { points, area: measurement.area, label_anchor, label };
        self.closed = Some(closed.clone());
        Ok(closed)
    }

    /// Remove every measurement artifact and start over
    ///
    /// The reference image stays on the canvas.
    pub fn reset(&mut self, canvas: &mut dyn Canvas, panel: &mut dyn DisplayPanel) {
        self.remove_kinds(canvas, &LayerKind::MEASUREMENT);
        self.tracker.clear();
        self.closed = None;
        panel.set_area(0.0);
        panel.set_vertex_count(0);
        log::debug!("session reset");
    }

    /// Swap in a newly loaded reference image and fit the view to it
    pub fn load_image(
        &mut self,
        info: ImageInfo,
        canvas: &mut dyn Canvas,
        panel: &mut dyn DisplayPanel,
    ) {
        self.reset(canvas, panel);
        self.remove_kinds(canvas, &[LayerKind::Backdrop]);

        let bounds = info.bounds();
        self.draw(
            canvas,
            LayerKind::Backdrop,
            LayerShape::Image { bounds, source: info.source.clone() },
        );
        canvas.fit_bounds(bounds);

        log::debug!("loaded image {} ({}x{})", info.source, info.width, info.height);
        self.image = Some(info);
    }

    /// Apply one event, reporting the phase change
    ///
    /// # Errors
    /// Propagates [`MeasureError`] from [`MeasureSession::close`].
    pub fn apply(
        &mut self,
        event: SessionEvent,
        canvas: &mut dyn Canvas,
        panel: &mut dyn DisplayPanel,
    ) -> Result<Transition, MeasureError> {
        let from = self.phase();
        match event {
            SessionEvent::Click { x, y } => self.click(ImagePoint::new(x, y), canvas, panel),
            SessionEvent::Close => {
                self.close(canvas, panel)?;
            }
            SessionEvent::Reset => self.reset(canvas, panel),
            SessionEvent::LoadImage(info) => self.load_image(info, canvas, panel),
        }
        Ok(Transition { from, to: self.phase() })
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, kind: LayerKind, shape: LayerShape) {
        let layer = OverlayLayer::new(kind, shape, self.style.for_kind(kind));
        canvas.add_layer(&layer);
        self.layers.insert(layer.id, kind);
    }

    fn remove_kinds(&mut self, canvas: &mut dyn Canvas, kinds: &[LayerKind]) {
        for kind in kinds {
            for id in self.layers.remove_kind(*kind) {
                canvas.remove_layer(id);
            }
        }
    }
}

impl Default for MeasureSession {
    fn default() -> Self {
        Self::new()
    }
}
