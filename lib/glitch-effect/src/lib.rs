pub mod buffer;
pub mod channel_effect;
pub mod displacement_effect;
pub mod noise_effect;
pub mod params;
pub mod pipeline;
pub mod scanline_effect;
pub mod session;

pub use buffer::PixelBuffer;
pub use displacement_effect::DisplacementMode;
pub use params::{ParamKey, Parameters};
pub use pipeline::Pipeline;
pub use session::PreviewSession;

use rand::Rng;

pub type GlitchEffectResult<T> = Result<T, GlitchEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum GlitchEffectError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

/// A single pass over a pixel buffer.
///
/// Takes the buffer by value and hands back the result. A pass at zero
/// intensity returns its input untouched.
pub trait Effect {
    fn apply<R: Rng>(&self, image: PixelBuffer, rng: &mut R) -> PixelBuffer;
}

#[derive(Debug, Clone)]
pub enum GlitchEffect {
    // Displacement effects
    BlockDisplacement(displacement_effect::BlockDisplacementConfig),
    RowDisplacement(displacement_effect::RowDisplacementConfig),
    ColumnDisplacement(displacement_effect::ColumnDisplacementConfig),

    // Colour effects
    ChannelShift(channel_effect::ChannelShiftConfig),

    // Overlays
    Scanlines(scanline_effect::ScanlineConfig),
    Noise(noise_effect::NoiseConfig),
}

impl GlitchEffect {
    pub fn name(&self) -> &'static str {
        match self {
            GlitchEffect::BlockDisplacement(_) => "Block Displacement",
            GlitchEffect::RowDisplacement(_) => "Row Displacement",
            GlitchEffect::ColumnDisplacement(_) => "Column Displacement",
            GlitchEffect::ChannelShift(_) => "RGB Shift",
            GlitchEffect::Scanlines(_) => "Scanlines",
            GlitchEffect::Noise(_) => "Noise",
        }
    }
}

impl Effect for GlitchEffect {
    fn apply<R: Rng>(&self, image: PixelBuffer, rng: &mut R) -> PixelBuffer {
        match self {
            GlitchEffect::BlockDisplacement(config) => config.apply(image, rng),
            GlitchEffect::RowDisplacement(config) => config.apply(image, rng),
            GlitchEffect::ColumnDisplacement(config) => config.apply(image, rng),
            GlitchEffect::ChannelShift(config) => config.apply(image, rng),
            GlitchEffect::Scanlines(config) => config.apply(image, rng),
            GlitchEffect::Noise(config) => config.apply(image, rng),
        }
    }
}
