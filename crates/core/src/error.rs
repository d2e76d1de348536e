//! Error types for measurement, image loading and configuration

use std::path::PathBuf;

/// Minimum number of vertices that enclose an area
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Errors raised by the measurement lifecycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeasureError {
    #[error("at least 3 vertices are needed to close a polygon (have {count})")]
    InsufficientVertices { count: usize },
}

/// Errors raised while reading a reference image
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("failed to read image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("image loader thread panicked")]
    WorkerPanicked,
}

/// Errors raised while building the runtime configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
