//! Planimeter Core Library
//!
//! Polygon area measurement over a reference image: geometry, the vertex
//! lifecycle, tagged overlay layers and the collaborator traits the lifecycle
//! draws through.

pub mod area;
pub mod canvas;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod loader;
pub mod session;
pub mod tracker;
pub mod view;

pub use area::{format_area, measure, AreaMeasurement, AREA_UNIT, DEFAULT_AREA_DECIMALS};
pub use canvas::{Canvas, RecordingCanvas};
pub use config::PlanimeterConfig;
pub use display::{DisplayPanel, TextPanel};
pub use error::{ConfigError, LoadError, LoadResult, MeasureError, MIN_POLYGON_VERTICES};
pub use geometry::{bounding_box, polygon_area, BoundingBox, ImageBounds, ImagePoint};
pub use layer::{
    Color, LayerId, LayerKind, LayerRegistry, LayerShape, LayerStyle, OverlayLayer, OverlayStyle,
};
pub use loader::{read_image_info, ImageInfo, ImageLoader, ImageSource, PendingImage};
pub use session::{ClosedPolygon, MeasureSession, Phase, SessionEvent, Transition};
pub use tracker::VertexTracker;
pub use view::ViewState;
