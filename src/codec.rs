//! Conversion between pixel buffers and the float tensors the style
//! generators consume.
//!
//! Encoding normalizes 8-bit channels to [0, 1]; decoding multiplies back by
//! 255 and truncates toward zero without clamping, so out-of-range model
//! output passes through to the packed pixel arithmetic unchanged.

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::error::{Error, Result};
use crate::image::{ImageTensor, PixelBuffer, RGB_CHANNELS};

/// Resize a buffer to the requested dimensions with a bilinear filter.
///
/// Target dimensions are applied directly; aspect ratio is not preserved.
/// Deterministic for identical inputs.
///
/// # Errors
///
/// Returns [`Error::InvalidDimension`] if either target dimension is zero.
pub fn resize(buffer: &PixelBuffer, target_w: u32, target_h: u32) -> Result<PixelBuffer> {
    if target_w == 0 || target_h == 0 {
        return Err(Error::InvalidDimension {
            width: target_w,
            height: target_h,
        });
    }

    let img = DynamicImage::ImageRgb8(buffer.to_rgb_image());
    let resized = img.resize_exact(target_w, target_h, FilterType::Triangle);

    Ok(PixelBuffer::from_rgb_image(&resized.to_rgb8()))
}

/// Encode a buffer into a normalized `[1, height, width, 3]` tensor.
///
/// Channels are appended in (R, G, B) order, each divided by 255.0. The
/// input buffer is not mutated.
#[must_use]
pub fn encode(buffer: &PixelBuffer) -> ImageTensor {
    let (width, height) = (buffer.width() as usize, buffer.height() as usize);

    let mut tensor = Array4::<f32>::zeros((1, height, width, RGB_CHANNELS));

    for y in 0..height {
        for x in 0..width {
            let px = buffer.pixel(x as u32, y as u32);
            tensor[[0, y, x, 0]] = ((px >> 16) & 0xFF) as f32 / 255.0;
            tensor[[0, y, x, 1]] = ((px >> 8) & 0xFF) as f32 / 255.0;
            tensor[[0, y, x, 2]] = (px & 0xFF) as f32 / 255.0;
        }
    }

    tensor
}

/// Decode a tensor into a freshly allocated buffer sized from the tensor's
/// height and width dimensions.
#[must_use]
pub fn decode(tensor: &ImageTensor) -> PixelBuffer {
    let shape = tensor.shape();
    let mut buffer = PixelBuffer::new(shape[2] as u32, shape[1] as u32);
    decode_into(tensor, &mut buffer);
    buffer
}

/// Decode a tensor into an existing destination buffer.
///
/// The destination's own dimensions decide how many float triples are
/// consumed; excess tensor data is ignored silently. Each channel is
/// multiplied by 255.0 and truncated toward zero, then packed as
/// `(r << 16) | (g << 8) | b` with no clamping -- overflow bleeds into the
/// higher channel bits and negative values wrap per two's complement.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn decode_into(tensor: &ImageTensor, dest: &mut PixelBuffer) {
    let mut channels = tensor.iter();

    for y in 0..dest.height() {
        for x in 0..dest.width() {
            let (Some(&r), Some(&g), Some(&b)) =
                (channels.next(), channels.next(), channels.next())
            else {
                return;
            };

            let r = (r * 255.0) as i32;
            let g = (g * 255.0) as i32;
            let b = (b * 255.0) as i32;

            dest.set_pixel(x, y, ((r << 16) | (g << 8) | b) as u32);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_encode_shape() {
        let buffer = PixelBuffer::new(5, 3);
        let tensor = encode(&buffer);

        assert_eq!(tensor.shape(), &[1, 3, 5, 3]);
    }

    #[test]
    fn test_encode_normalizes_channels() {
        let buffer = PixelBuffer::from_pixels(1, 1, vec![0x00FF7F00]);
        let tensor = encode(&buffer);

        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < f32::EPSILON);
        assert!((tensor[[0, 0, 0, 1]] - 127.0 / 255.0).abs() < f32::EPSILON);
        assert!(tensor[[0, 0, 0, 2]].abs() < f32::EPSILON);
    }

    #[test]
    fn test_mid_gray_encodes_near_half() {
        let buffer = PixelBuffer::from_pixels(2, 2, vec![0x007F7F7F; 4]);
        let tensor = encode(&buffer);

        for &v in &tensor {
            assert!((v - 0.498_039_2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decode_truncates_toward_zero() {
        // 0.498 * 255 = 126.99, truncated to 126 rather than rounded to 127.
        let tensor = Array4::from_elem((1, 2, 2, 3), 0.498_f32);
        let buffer = decode(&tensor);

        for &px in buffer.pixels() {
            assert_eq!(px, 0x007E7E7E);
        }
    }

    #[test]
    fn test_round_trip_identity() {
        let pixels: Vec<u32> = vec![0x00000000, 0x00FFFFFF, 0x007F7F7F, 0x00123456];
        let buffer = PixelBuffer::from_pixels(2, 2, pixels);

        assert_eq!(decode(&encode(&buffer)), buffer);
    }

    #[test]
    fn test_decode_does_not_clamp_overflow() {
        // 1.2 * 255 = 306, which bleeds past the red byte when shifted.
        let mut tensor = Array4::<f32>::zeros((1, 1, 1, 3));
        tensor[[0, 0, 0, 0]] = 1.2;
        let buffer = decode(&tensor);

        assert_eq!(buffer.pixel(0, 0), (306_u32) << 16);
    }

    #[test]
    fn test_decode_does_not_clamp_negative() {
        // -0.1 * 255 = -25.5, truncated to -25 and wrapped as u32.
        let mut tensor = Array4::<f32>::zeros((1, 1, 1, 3));
        tensor[[0, 0, 0, 2]] = -0.1;
        let buffer = decode(&tensor);

        assert_eq!(buffer.pixel(0, 0), (-25_i32) as u32);
    }

    #[test]
    fn test_decode_into_ignores_excess_tensor_data() {
        let tensor = Array4::from_elem((1, 4, 4, 3), 1.0_f32);
        let mut dest = PixelBuffer::new(2, 2);
        decode_into(&tensor, &mut dest);

        for &px in dest.pixels() {
            assert_eq!(px, 0x00FFFFFF);
        }
    }

    #[test]
    fn test_resize_is_deterministic() {
        let pixels: Vec<u32> = (0..16).map(|i| i * 0x00111111 / 2).collect();
        let buffer = PixelBuffer::from_pixels(4, 4, pixels);

        let a = resize(&buffer, 2, 2).unwrap();
        let b = resize(&buffer, 2, 2).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.width(), 2);
        assert_eq!(a.height(), 2);
    }

    #[test]
    fn test_resize_ignores_aspect_ratio() {
        let buffer = PixelBuffer::new(8, 2);
        let resized = resize(&buffer, 3, 5).unwrap();

        assert_eq!((resized.width(), resized.height()), (3, 5));
    }

    #[test]
    fn test_resize_zero_dimension_fails() {
        let buffer = PixelBuffer::from_pixels(1, 1, vec![0x00ABCDEF]);
        let original = buffer.clone();

        let err = resize(&buffer, 0, 256).unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidDimension {
                width: 0,
                height: 256
            }
        ));
        assert_eq!(buffer, original);
    }
}
