//! RGBA pixel buffer helpers
//!
//! A [`PixelBuffer`] is an `image::RgbaImage`: `width * height * 4` bytes,
//! interleaved R, G, B, A, row-major from the top row down.

use crate::{GlitchEffectError, GlitchEffectResult};
use image::RgbaImage;

pub type PixelBuffer = RgbaImage;

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// Wrap decoded RGBA bytes into a buffer, rejecting partial pixels
pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> GlitchEffectResult<PixelBuffer> {
    let expected = width as usize * height as usize * CHANNELS;
    let actual = bytes.len();

    if actual != expected {
        return Err(GlitchEffectError::BufferSize { expected, actual });
    }

    RgbaImage::from_raw(width, height, bytes)
        .ok_or(GlitchEffectError::BufferSize { expected, actual })
}

/// Byte offset of pixel `(x, y)` in a buffer `width` pixels wide
#[inline]
pub fn pixel_offset(width: usize, x: usize, y: usize) -> usize {
    (y * width + x) * CHANNELS
}

#[inline]
pub fn copy_pixel(src: &[u8], src_offset: usize, dst: &mut [u8], dst_offset: usize) {
    dst[dst_offset..dst_offset + CHANNELS].copy_from_slice(&src[src_offset..src_offset + CHANNELS]);
}

/// Source-over blend of an opaque `color` onto one pixel.
///
/// `out = color * alpha + dst * (1 - alpha)` on the colour channels,
/// destination alpha is left as is.
#[inline]
pub fn blend_over(pixel: &mut [u8], color: [u8; 3], alpha: f64) {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    for i in 0..3 {
        let value = color[i] as f64 * alpha + pixel[i] as f64 * (1.0 - alpha);
        pixel[i] = value.round().clamp(0.0, 255.0) as u8;
    }
}

/// Number of pixels whose bytes differ between two equally sized buffers
pub fn changed_pixels(a: &PixelBuffer, b: &PixelBuffer) -> usize {
    if a.dimensions() != b.dimensions() {
        return (a.width() as usize * a.height() as usize)
            .max(b.width() as usize * b.height() as usize);
    }

    a.as_raw()
        .chunks_exact(CHANNELS)
        .zip(b.as_raw().chunks_exact(CHANNELS))
        .filter(|(pa, pb)| pa != pb)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_validates_length() {
        let buffer = from_rgba(2, 1, vec![0; 8]).unwrap();
        assert_eq!(buffer.dimensions(), (2, 1));

        let err = from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            GlitchEffectError::BufferSize {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_pixel_offset() {
        assert_eq!(pixel_offset(3, 0, 0), 0);
        assert_eq!(pixel_offset(3, 2, 0), 8);
        assert_eq!(pixel_offset(3, 1, 2), 28);
    }

    #[test]
    fn test_copy_pixel() {
        let src = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut dst = [0u8; 8];
        copy_pixel(&src, 4, &mut dst, 0);
        assert_eq!(dst, [5, 6, 7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn test_blend_over_darken_and_lighten() {
        let mut pixel = [200, 100, 0, 77];
        blend_over(&mut pixel, [0, 0, 0], 0.5);
        assert_eq!(pixel, [100, 50, 0, 77]);

        let mut pixel = [0, 100, 255, 9];
        blend_over(&mut pixel, [255, 255, 255], 0.5);
        assert_eq!(pixel, [128, 178, 255, 9]);
    }

    #[test]
    fn test_blend_over_zero_alpha_is_identity() {
        let mut pixel = [13, 14, 15, 16];
        blend_over(&mut pixel, [255, 255, 255], 0.0);
        assert_eq!(pixel, [13, 14, 15, 16]);
    }

    #[test]
    fn test_changed_pixels() {
        let a = from_rgba(2, 1, vec![1, 1, 1, 1, 2, 2, 2, 2]).unwrap();
        let mut b = a.clone();
        assert_eq!(changed_pixels(&a, &b), 0);

        let raw: &mut [u8] = &mut b;
        raw[5] = 9;
        assert_eq!(changed_pixels(&a, &b), 1);
    }
}
