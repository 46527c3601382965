//! Fixed order effect chain
//!
//! Every render starts from a fresh copy of the source image and runs
//! displacement, channel shift, scanlines and noise in that order. Later
//! stages sample what earlier stages wrote, so the overlays sit on top of the
//! displaced and shifted image.

use crate::{
    Effect, GlitchEffect,
    buffer::PixelBuffer,
    channel_effect::ChannelShiftConfig,
    displacement_effect::DisplacementMode,
    noise_effect::NoiseConfig,
    params::Parameters,
    scanline_effect::ScanlineConfig,
};
use derive_setters::Setters;
use log::debug;
use rand::Rng;

#[derive(Debug, Clone, Default, Setters)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct Pipeline {
    displacement_mode: DisplacementMode,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displacement_mode(&self) -> DisplacementMode {
        self.displacement_mode
    }

    pub fn set_displacement_mode(&mut self, mode: DisplacementMode) {
        self.displacement_mode = mode;
    }

    /// Stages a render of a `width` pixels wide image runs, in order
    pub fn stages(&self, params: &Parameters, width: u32) -> Vec<GlitchEffect> {
        vec![
            self.displacement_mode.effect(params.displacement_t()),
            GlitchEffect::ChannelShift(
                ChannelShiftConfig::new().with_offset(params.rgb_shift_px(width)),
            ),
            GlitchEffect::Scanlines(
                ScanlineConfig::new().with_strength(params.scanlines_strength()),
            ),
            GlitchEffect::Noise(NoiseConfig::new().with_strength(params.noise_strength())),
        ]
    }

    /// Render `source` with `params`. The source is only read, so renders
    /// never build on each other.
    pub fn render<R: Rng>(
        &self,
        source: &PixelBuffer,
        params: &Parameters,
        rng: &mut R,
    ) -> PixelBuffer {
        debug!(
            "render {}x{} mode={} params={params:?}",
            source.width(),
            source.height(),
            self.displacement_mode
        );

        if params.is_identity() {
            return source.clone();
        }

        let mut image = source.clone();
        for stage in self.stages(params, source.width()) {
            image = stage.apply(image, rng);
        }

        image
    }
}
