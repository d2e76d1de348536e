//! Ordered vertex storage for the polygon being drawn

use crate::error::MIN_POLYGON_VERTICES;
use crate::geometry::ImagePoint;

/// In-progress polygon vertices in click order
///
/// Insertion order defines the polygon edges. The tracker never touches
/// rendering; the session decides what to draw for each vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexTracker {
    points: Vec<ImagePoint>,
}

impl VertexTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex. Always succeeds.
    pub fn add_point(&mut self, point: ImagePoint) {
        self.points.push(point);
    }

    /// Drop every vertex. Calling it on an empty tracker does nothing.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ImagePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<ImagePoint> {
        self.points.last().copied()
    }

    /// Whether enough vertices exist to enclose an area
    pub fn is_closeable(&self) -> bool {
        self.points.len() >= MIN_POLYGON_VERTICES
    }

    /// Copy of the current vertices, taken when a polygon is closed
    pub fn snapshot(&self) -> Vec<ImagePoint> {
        self.points.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut tracker = VertexTracker::new();
        assert!(tracker.is_empty());

        tracker.add_point(ImagePoint::new(1.0, 2.0));
        tracker.add_point(ImagePoint::new(3.0, 4.0));

        assert_eq!(tracker.count(), 2);
        assert_eq!(tracker.last(), Some(ImagePoint::new(3.0, 4.0)));
        assert_eq!(tracker.points()[0], ImagePoint::new(1.0, 2.0));
        assert!(!tracker.is_closeable());

        tracker.add_point(ImagePoint::new(5.0, 0.0));
        assert!(tracker.is_closeable());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut tracker = VertexTracker::new();
        tracker.add_point(ImagePoint::new(1.0, 2.0));

        tracker.clear();
        assert_eq!(tracker.count(), 0);
        tracker.clear();
        assert_eq!(tracker.count(), 0);
        assert_eq!(tracker.last(), None);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut tracker = VertexTracker::new();
        tracker.add_point(ImagePoint::new(0.0, 0.0));
        let snapshot = tracker.snapshot();

        tracker.clear();
        assert_eq!(snapshot.len(), 1);
    }
}
