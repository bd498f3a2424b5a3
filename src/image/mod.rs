//! Pixel buffer type and image file I/O.

mod load;
mod save;

pub use load::load_image;
pub use save::save_image;

use image::RgbImage;
use ndarray::Array4;

/// Image tensor in NHWC format (batch, height, width, channels).
/// Values are normalized to [0, 1] on encode; decode passes out-of-range
/// model output through without clamping.
pub type ImageTensor = Array4<f32>;

/// Native input resolution of the style generator models.
pub const STYLE_IMAGE_SIZE: u32 = 256;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Row-major grid of packed `0x00RRGGBB` pixels.
///
/// New buffers are allocated for pipeline outputs rather than mutated in
/// place; the only sanctioned mutation is decoding into a caller-provided
/// destination via [`crate::codec::decode_into`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Create a zeroed (black) buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize)],
        }
    }

    /// Create a buffer from packed pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`; a mismatched buffer is a
    /// caller bug, not a recoverable condition.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "pixel data length must equal width * height"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Packed pixel at (x, y).
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Overwrite the pixel at (x, y) with a packed value.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) {
        self.pixels[(y * self.width + x) as usize] = value;
    }

    /// Flat row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Convert to an 8-bit RGB image, masking each channel to its low byte.
    #[must_use]
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixel(x, y);
            image::Rgb([
                ((px >> 16) & 0xFF) as u8,
                ((px >> 8) & 0xFF) as u8,
                (px & 0xFF) as u8,
            ])
        })
    }

    /// Pack an 8-bit RGB image into a buffer.
    #[must_use]
    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_accessors() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.set_pixel(1, 0, 0x00FF7F00);

        assert_eq!(buffer.pixel(1, 0), 0x00FF7F00);
        assert_eq!(buffer.pixel(0, 0), 0);
        assert_eq!(buffer.pixels().len(), 4);
    }

    #[test]
    fn test_rgb_image_round_trip() {
        let buffer = PixelBuffer::from_pixels(2, 1, vec![0x00112233, 0x00FFEEDD]);
        let img = buffer.to_rgb_image();

        assert_eq!(img.get_pixel(0, 0).0, [0x11, 0x22, 0x33]);
        assert_eq!(PixelBuffer::from_rgb_image(&img), buffer);
    }

    #[test]
    fn test_rgb_image_masks_overflowed_channels() {
        // Unclamped decode output can carry bits above the blue byte; the
        // 8-bit view keeps only each channel's low byte.
        let buffer = PixelBuffer::from_pixels(1, 1, vec![0x13_2A_FF_01]);
        let img = buffer.to_rgb_image();

        assert_eq!(img.get_pixel(0, 0).0, [0x2A, 0xFF, 0x01]);
    }
}
