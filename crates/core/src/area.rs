//! Area measurement over a closed vertex sequence
//!
//! Values are reported in square pixels of the loaded image; no scale
//! conversion is applied.

use crate::error::{MeasureError, MIN_POLYGON_VERTICES};
use crate::geometry::{polygon_area, ImagePoint};
use serde::Serialize;

/// Decimal places used for displayed areas
pub const DEFAULT_AREA_DECIMALS: usize = 2;

/// Unit suffix appended to on-canvas area labels
pub const AREA_UNIT: &str = "px²";

/// Computed area for a vertex sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaMeasurement {
    pub vertices: usize,
    pub area: f64,
}

impl AreaMeasurement {
    /// Display string, e.g. `"12.00"`
    pub fn formatted(&self, decimals: usize) -> String {
        format_area(self.area, decimals)
    }

    /// On-canvas label, e.g. `"12.00 px²"`
    pub fn label(&self, decimals: usize) -> String {
        format!("{} {}", self.formatted(decimals), AREA_UNIT)
    }
}

/// Format an area with a fixed number of decimals
///
/// Ties round away from zero (`0.125` shows as `"0.13"`), not to even.
pub fn format_area(area: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    format!("{:.*}", decimals, (area * factor).round() / factor)
}

/// Measure the polygon enclosed by `points`
///
/// # Errors
/// Returns [`MeasureError::InsufficientVertices`] for fewer than three points.
pub fn measure(points: &[ImagePoint]) -> Result<AreaMeasurement, MeasureError> {
    if points.len() < MIN_POLYGON_VERTICES {
        return Err(MeasureError::InsufficientVertices { count: points.len() });
    }
    Ok(AreaMeasurement { vertices: points.len(), area: polygon_area(points) })
}
