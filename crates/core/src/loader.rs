//! Reference image loading
//!
//! Only the pixel dimensions are needed to set up the overlay coordinate
//! space, so images are probed for their header and never fully decoded here.
//! Loading can run on a background thread; the caller waits on the returned
//! handle before handing the result to the session.

use crate::error::{LoadError, LoadResult};
use crate::geometry::ImageBounds;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::PathBuf;
use std::thread::JoinHandle;

/// Where a reference image comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Image file on local disk
    Path(PathBuf),
    /// Bytes already read by a file picker, with a display name
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    /// Human-readable origin, used as the backdrop's source label
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

/// Dimensions of a loaded reference image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn bounds(&self) -> ImageBounds {
        ImageBounds::new(self.width, self.height)
    }
}

/// Read the pixel dimensions of an image
///
/// # Errors
/// Fails if the file is missing, is not a regular file, cannot be recognised
/// as an image, or has a zero dimension.
pub fn read_image_info(source: &ImageSource) -> LoadResult<ImageInfo> {
    let (width, height) = match source {
        ImageSource::Path(path) => {
            if !path.exists() {
                return Err(LoadError::NotFound(path.clone()));
            }
            if !path.is_file() {
                return Err(LoadError::NotAFile(path.clone()));
            }
            image::image_dimensions(path)?
        }
        ImageSource::Bytes { data, .. } => image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?,
    };

    if width == 0 || height == 0 {
        return Err(LoadError::EmptyImage { width, height });
    }

    log::debug!("probed image {} ({width}x{height})", source.describe());

    Ok(ImageInfo { source: source.describe(), width, height })
}

/// Spawns single-shot image loads off the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLoader;

impl ImageLoader {
    pub fn new() -> Self {
        Self
    }

    /// Start probing `source` on a background thread
    pub fn spawn(&self, source: ImageSource) -> PendingImage {
        let handle = std::thread::spawn(move || read_image_info(&source));
        PendingImage { handle }
    }
}

/// Handle to an in-flight image load
#[derive(Debug)]
pub struct PendingImage {
    handle: JoinHandle<LoadResult<ImageInfo>>,
}

impl PendingImage {
    /// Check whether the load has finished
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the load completes and return its result
    pub fn wait(self) -> LoadResult<ImageInfo> {
        self.handle.join().map_err(|_| LoadError::WorkerPanicked)?
    }
}
