//! Effect intensity parameters
//!
//! A [`Parameters`] value is the snapshot the pipeline reads at the start of
//! every render. The application layer owns it and applies updates keyed by
//! the wire names `displacement`, `rgbShift`, `scanlines` and `noise`.

use crate::{GlitchEffectError, GlitchEffectResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Upper bound of the percentage based parameters
pub const PERCENT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ParamKey {
    #[strum(serialize = "displacement")]
    Displacement,
    #[strum(serialize = "rgbShift")]
    RgbShift,
    #[strum(serialize = "scanlines")]
    Scanlines,
    #[strum(serialize = "noise")]
    Noise,
}

impl ParamKey {
    pub fn all_keys() -> Vec<ParamKey> {
        ParamKey::iter().collect()
    }

    /// Whether the value is a percentage in `[0, 100]` rather than a pixel count
    pub fn is_percent(&self) -> bool {
        !matches!(self, ParamKey::RgbShift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameters {
    pub displacement: f64,
    pub rgb_shift: f64,
    pub scanlines: f64,
    pub noise: f64,
}

impl Parameters {
    /// All intensities at zero, rendering reproduces the source
    pub fn new() -> Self {
        Self::default()
    }

    /// Slider positions the preview starts with
    pub fn ui_defaults() -> Self {
        Self {
            displacement: 0.0,
            rgb_shift: 8.0,
            scanlines: 15.0,
            noise: 8.0,
        }
    }

    pub fn get(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::Displacement => self.displacement,
            ParamKey::RgbShift => self.rgb_shift,
            ParamKey::Scanlines => self.scanlines,
            ParamKey::Noise => self.noise,
        }
    }

    pub fn set(&mut self, key: ParamKey, value: f64) -> GlitchEffectResult<()> {
        if !value.is_finite() {
            return Err(GlitchEffectError::InvalidParameter(format!(
                "{key} must be a finite number, got {value}"
            )));
        }

        let slot = match key {
            ParamKey::Displacement => &mut self.displacement,
            ParamKey::RgbShift => &mut self.rgb_shift,
            ParamKey::Scanlines => &mut self.scanlines,
            ParamKey::Noise => &mut self.noise,
        };
        *slot = value;

        Ok(())
    }

    /// Apply an update addressed by its wire name, e.g. `("rgbShift", 4.0)`.
    /// Keys not named keep their last value.
    pub fn update(&mut self, name: &str, value: f64) -> GlitchEffectResult<()> {
        let key = ParamKey::from_str(name)
            .map_err(|_| GlitchEffectError::UnknownParameter(name.to_string()))?;
        self.set(key, value)
    }

    /// Parse a `key=value` assignment such as `rgbShift=12`
    pub fn parse_assignment(assignment: &str) -> GlitchEffectResult<(ParamKey, f64)> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            GlitchEffectError::InvalidParameter(format!("expected key=value, got `{assignment}`"))
        })?;

        let name = name.trim();
        let key = ParamKey::from_str(name)
            .map_err(|_| GlitchEffectError::UnknownParameter(name.to_string()))?;

        let value = value.trim().parse::<f64>().map_err(|e| {
            GlitchEffectError::InvalidParameter(format!("{key}: `{}` {e}", value.trim()))
        })?;

        Ok((key, value))
    }

    /// Parse a `key=value` assignment and apply it
    pub fn apply_assignment(&mut self, assignment: &str) -> GlitchEffectResult<ParamKey> {
        let (key, value) = Self::parse_assignment(assignment)?;
        self.set(key, value)?;
        Ok(key)
    }

    pub fn displacement_t(&self) -> f64 {
        normalize_percent(self.displacement)
    }

    pub fn scanlines_strength(&self) -> f64 {
        normalize_percent(self.scanlines)
    }

    pub fn noise_strength(&self) -> f64 {
        normalize_percent(self.noise)
    }

    /// Channel offset in whole pixels, half rounds up, magnitude at most `width`
    pub fn rgb_shift_px(&self, width: u32) -> i32 {
        let limit = width as f64;
        self.rounded_shift().clamp(-limit, limit) as i32
    }

    /// True when every stage of a render would pass its input through
    pub fn is_identity(&self) -> bool {
        self.displacement_t() <= 0.0
            && self.scanlines_strength() <= 0.0
            && self.noise_strength() <= 0.0
            && self.rounded_shift() == 0.0
    }

    fn rounded_shift(&self) -> f64 {
        if !self.rgb_shift.is_finite() {
            return 0.0;
        }

        (self.rgb_shift + 0.5).floor()
    }
}

fn normalize_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }

    value.clamp(0.0, PERCENT_MAX) / PERCENT_MAX
}
