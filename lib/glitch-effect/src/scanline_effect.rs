//! CRT scanline overlay
//!
//! Paints a translucent black band every `period` rows, starting at row 0.
//! Bands may be fractionally thick: a row only partly covered by a band is
//! darkened in proportion to its coverage, the way an anti-aliased canvas
//! fill rasterizes a 2.5 px tall rectangle.

use crate::{
    Effect,
    buffer::{CHANNELS, PixelBuffer, blend_over},
};
use derivative::Derivative;
use derive_setters::Setters;
use rand::Rng;

const BLACK: [u8; 3] = [0, 0, 0];

/// Opacity of a band at full strength
pub const MAX_ALPHA: f64 = 0.5;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ScanlineConfig {
    #[derivative(Default(value = "0.15"))]
    strength: f64, // [0.0, 1.0]

    #[derivative(Default(value = "5"))]
    period: u32,

    #[derivative(Default(value = "2.5"))]
    thickness: f64,
}

impl ScanlineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of row `row` covered by the band starting at `band_start`
    fn coverage(&self, band_start: u32, row: u32) -> f64 {
        let top = band_start as f64;
        let bottom = top + self.thickness;
        let overlap = bottom.min(row as f64 + 1.0) - top.max(row as f64);
        overlap.clamp(0.0, 1.0)
    }
}

impl Effect for ScanlineConfig {
    fn apply<R: Rng>(&self, mut image: PixelBuffer, _rng: &mut R) -> PixelBuffer {
        let strength = self.strength.clamp(0.0, 1.0);
        if strength.is_nan()
            || strength <= 0.0
            || self.thickness.is_nan()
            || self.thickness <= 0.0
        {
            return image;
        }

        let alpha = MAX_ALPHA * strength;
        let (width, height) = (image.width() as usize, image.height());
        let row_bytes = width * CHANNELS;
        let rows_per_band = self.thickness.ceil() as u32;
        let data: &mut [u8] = &mut image;

        for band_start in (0..height).step_by(self.period.max(1) as usize) {
            let band_end = (band_start + rows_per_band).min(height);

            for row in band_start..band_end {
                let row_alpha = alpha * self.coverage(band_start, row);
                if row_alpha <= 0.0 {
                    continue;
                }

                let start = row as usize * row_bytes;
                for pixel in data[start..start + row_bytes].chunks_exact_mut(CHANNELS) {
                    blend_over(pixel, BLACK, row_alpha);
                }
            }
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rand::{SeedableRng, rngs::StdRng};

    fn flat(width: u32, height: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([value, value, value, 200]))
    }

    fn row_value(image: &RgbaImage, y: u32) -> [u8; 4] {
        image.get_pixel(0, y).0
    }

    #[test]
    fn test_coverage() {
        let config = ScanlineConfig::new();
        assert_eq!(config.coverage(0, 0), 1.0);
        assert_eq!(config.coverage(0, 1), 1.0);
        assert_eq!(config.coverage(0, 2), 0.5);
        assert_eq!(config.coverage(0, 3), 0.0);
    }

    #[test]
    fn test_band_pattern() {
        let mut rng = StdRng::seed_from_u64(0);
        let output = ScanlineConfig::new()
            .with_strength(1.0)
            .apply(flat(3, 11, 200), &mut rng);

        // alpha 0.5 on full rows, 0.25 on the half covered row
        let expected = [100, 100, 150, 200, 200, 100, 100, 150, 200, 200, 100];
        for (y, value) in expected.into_iter().enumerate() {
            assert_eq!(row_value(&output, y as u32), [value, value, value, 200], "row {y}");
        }
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let mut rng = StdRng::seed_from_u64(0);
        let image = flat(4, 9, 77);

        let output = ScanlineConfig::new()
            .with_strength(0.0)
            .apply(image.clone(), &mut rng);
        assert_eq!(output, image);

        let output = ScanlineConfig::new()
            .with_strength(-1.0)
            .apply(image.clone(), &mut rng);
        assert_eq!(output, image);

        let output = ScanlineConfig::new()
            .with_strength(f64::NAN)
            .apply(image.clone(), &mut rng);
        assert_eq!(output, image);

        let output = ScanlineConfig::new()
            .with_strength(1.0)
            .with_thickness(f64::NAN)
            .apply(image.clone(), &mut rng);
        assert_eq!(output, image);
    }

    #[test]
    fn test_stronger_is_darker() {
        let mut rng = StdRng::seed_from_u64(0);
        let image = flat(8, 20, 180);

        let total = |strength: f64, rng: &mut StdRng| -> u64 {
            ScanlineConfig::new()
                .with_strength(strength)
                .apply(image.clone(), rng)
                .as_raw()
                .iter()
                .map(|v| *v as u64)
                .sum()
        };

        let levels = [0.0, 0.25, 0.5, 0.75, 1.0];
        let totals: Vec<u64> = levels.iter().map(|s| total(*s, &mut rng)).collect();
        for pair in totals.windows(2) {
            assert!(pair[1] < pair[0], "{totals:?}");
        }
    }

    #[test]
    fn test_short_image() {
        let mut rng = StdRng::seed_from_u64(0);
        let output = ScanlineConfig::new()
            .with_strength(1.0)
            .apply(flat(2, 1, 100), &mut rng);

        assert_eq!(row_value(&output, 0), [50, 50, 50, 200]);
    }
}
