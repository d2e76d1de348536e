//! Image-space geometry
//!
//! Points, bounds and the shoelace area used by the measurement session.
//! All coordinates are stored in image-pixel space.

use serde::{Deserialize, Serialize};

/// Image-pixel coordinate
///
/// Uses the overlay coordinate system:
/// - Origin (0, 0) at bottom-left of the image
/// - X increases to the right
/// - Y increases upward
/// - Units are source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    /// Create a new image point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &ImagePoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// `[y, x]` pair, the ordering map-style canvases expect
    pub fn to_lat_lng(self) -> [f64; 2] {
        [self.y, self.x]
    }
}

/// Axis-aligned box around a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the box, where area labels are anchored
    pub fn center(&self) -> ImagePoint {
        ImagePoint::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Bounding box of a point sequence, `None` when empty
pub fn bounding_box(points: &[ImagePoint]) -> Option<BoundingBox> {
    let (first, rest) = points.split_first()?;
    let mut bbox = BoundingBox { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
    for point in rest {
        bbox.min_x = bbox.min_x.min(point.x);
        bbox.max_x = bbox.max_x.max(point.x);
        bbox.min_y = bbox.min_y.min(point.y);
        bbox.max_y = bbox.max_y.max(point.y);
    }
    Some(bbox)
}

/// Planar polygon area using the shoelace formula
///
/// The polygon is implicitly closed (last vertex connects back to the first).
/// The result is independent of the starting vertex and of winding direction.
/// Fewer than three points enclose nothing and yield 0.0.
pub fn polygon_area(points: &[ImagePoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area.abs() / 2.0
}

/// Pixel dimensions of the loaded reference image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl ImageBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Overlay corners as `[[0, 0], [height, width]]`
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[0.0, 0.0], [self.height as f64, self.width as f64]]
    }

    pub fn center(&self) -> ImagePoint {
        ImagePoint::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn contains(&self, point: &ImagePoint) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.width as f64
            && point.y <= self.height as f64
    }
}
