//! Image loading utilities.

use std::path::Path;

use crate::error::{Error, Result};

use super::PixelBuffer;

/// Load an image from disk into a pixel buffer.
///
/// The image keeps its native dimensions; the pipeline resizes to the model
/// resolution itself. Non-RGB inputs are converted to RGB.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<PixelBuffer> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(PixelBuffer::from_rgb_image(&img.to_rgb8()))
}
