//! Image saving utilities.

use std::path::Path;

use crate::error::{Error, Result};

use super::PixelBuffer;

/// Save a pixel buffer as an image file.
///
/// The format is inferred from the file extension. For JPEG output the
/// given quality (1-100) is applied; other formats ignore it.
///
/// # Errors
///
/// Returns an error if the image cannot be encoded or written.
pub fn save_image<P: AsRef<Path>>(buffer: &PixelBuffer, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();

    let img = buffer.to_rgb_image();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let mut output = std::fs::File::create(path)?;
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            img.write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            img.save(path).map_err(|source| Error::ImageSave {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::load_image;

    #[test]
    fn test_png_round_trip() {
        let buffer = PixelBuffer::from_pixels(2, 2, vec![0x00FF0000, 0x0000FF00, 0x000000FF, 0]);
        let path = std::env::temp_dir().join("cyclestyle_save_test.png");

        save_image(&buffer, &path, 95).unwrap();
        let loaded = load_image(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, buffer);
    }
}
