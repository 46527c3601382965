//! Chromatic aberration
//!
//! Red is sampled `offset` pixels to the left, blue `offset` pixels to the
//! right, green and alpha stay in place. Samples past the left or right edge
//! clamp to the edge column, which stretches the border colours.

use crate::{
    Effect,
    buffer::{PixelBuffer, pixel_offset},
};
use derivative::Derivative;
use derive_setters::Setters;
use rand::Rng;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ChannelShiftConfig {
    #[derivative(Default(value = "8"))]
    offset: i32, // pixels, negative swaps the fringe sides
}

impl ChannelShiftConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ChannelShiftConfig {
    fn apply<R: Rng>(&self, image: PixelBuffer, _rng: &mut R) -> PixelBuffer {
        let (width, height) = (image.width() as usize, image.height() as usize);
        if self.offset == 0 || width == 0 || height == 0 {
            return image;
        }

        let dx = self.offset as i64;
        let max_x = width as i64 - 1;
        let src = image.as_raw();
        let mut output = PixelBuffer::new(image.width(), image.height());
        let dst: &mut [u8] = &mut output;

        for y in 0..height {
            for x in 0..width {
                let o = pixel_offset(width, x, y);
                let xr = (x as i64 - dx).clamp(0, max_x) as usize;
                let xb = (x as i64 + dx).clamp(0, max_x) as usize;

                dst[o] = src[pixel_offset(width, xr, y)];
                dst[o + 1] = src[o + 1];
                dst[o + 2] = src[pixel_offset(width, xb, y) + 2];
                dst[o + 3] = src[o + 3];
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::from_rgba;
    use rand::{SeedableRng, rngs::StdRng};

    fn reference_row() -> PixelBuffer {
        from_rgba(
            3,
            1,
            vec![10, 20, 30, 255, 40, 50, 60, 255, 70, 80, 90, 255],
        )
        .unwrap()
    }

    #[test]
    fn test_shift_by_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let output = ChannelShiftConfig::new()
            .with_offset(1)
            .apply(reference_row(), &mut rng);

        assert_eq!(
            output.as_raw(),
            &vec![10, 20, 60, 255, 10, 50, 90, 255, 40, 80, 90, 255]
        );
    }

    #[test]
    fn test_negative_shift_swaps_sides() {
        let mut rng = StdRng::seed_from_u64(0);
        let output = ChannelShiftConfig::new()
            .with_offset(-1)
            .apply(reference_row(), &mut rng);

        assert_eq!(
            output.as_raw(),
            &vec![40, 20, 30, 255, 70, 50, 30, 255, 70, 80, 60, 255]
        );
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let output = ChannelShiftConfig::new()
            .with_offset(0)
            .apply(reference_row(), &mut rng);

        assert_eq!(output, reference_row());
    }

    #[test]
    fn test_shift_wider_than_image_clamps() {
        let mut rng = StdRng::seed_from_u64(0);
        let output = ChannelShiftConfig::new()
            .with_offset(100)
            .apply(reference_row(), &mut rng);

        // Every red sample hits the left edge, every blue sample the right edge
        assert_eq!(
            output.as_raw(),
            &vec![10, 20, 90, 255, 10, 50, 90, 255, 10, 80, 90, 255]
        );
    }

    #[test]
    fn test_alpha_untouched() {
        let mut rng = StdRng::seed_from_u64(0);
        let image = from_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let output = ChannelShiftConfig::new()
            .with_offset(1)
            .apply(image, &mut rng);

        assert_eq!(output.as_raw()[3], 4);
        assert_eq!(output.as_raw()[7], 8);
    }
}
