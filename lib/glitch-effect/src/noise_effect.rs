use crate::{
    Effect,
    buffer::{CHANNELS, PixelBuffer, blend_over, pixel_offset},
};
use derivative::Derivative;
use derive_setters::Setters;
use rand::Rng;

const WHITE: [u8; 3] = [255, 255, 255];

/// Share of the pixel count plotted as dots at full strength
pub const MAX_DENSITY: f64 = 0.1;

/// Opacity of a dot at full strength
pub const MAX_ALPHA: f64 = 0.5;

/// White speckle noise. Dot positions are drawn independently, so the same
/// pixel can be hit more than once.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct NoiseConfig {
    #[derivative(Default(value = "0.08"))]
    strength: f64, // [0.0, 1.0]
}

impl NoiseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dot_count(&self, width: u32, height: u32) -> usize {
        let strength = self.strength.clamp(0.0, 1.0);
        if strength.is_nan() || strength <= 0.0 {
            return 0;
        }

        let density = MAX_DENSITY * strength;
        (width as f64 * height as f64 * density).floor() as usize
    }
}

impl Effect for NoiseConfig {
    fn apply<R: Rng>(&self, mut image: PixelBuffer, rng: &mut R) -> PixelBuffer {
        let (width, height) = (image.width(), image.height());
        let count = self.dot_count(width, height);
        if count == 0 {
            return image;
        }

        let alpha = MAX_ALPHA * self.strength.clamp(0.0, 1.0);
        let data: &mut [u8] = &mut image;

        for _ in 0..count {
            let x = rng.random_range(0..width) as usize;
            let y = rng.random_range(0..height) as usize;
            let o = pixel_offset(width as usize, x, y);
            blend_over(&mut data[o..o + CHANNELS], WHITE, alpha);
        }

        image
    }
}
