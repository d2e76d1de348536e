//! Planimeter Render Library
//!
//! Raster canvas that paints measurement overlays onto the reference image.

pub mod raster;

pub use raster::{RasterCanvas, RenderError};
