//! Preview state owned by the application layer
//!
//! Holds the loaded source image, the current parameter snapshot and the
//! random generator. The application calls [`PreviewSession::render`] after
//! loading an image or changing a parameter.

use crate::{
    DisplacementMode, GlitchEffectResult, ParamKey, Parameters, Pipeline,
    buffer::{self, PixelBuffer},
};
use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use std::time::Instant;

#[derive(Debug)]
pub struct PreviewSession {
    source: Option<PixelBuffer>,
    params: Parameters,
    pipeline: Pipeline,
    rng: StdRng,
}

impl PreviewSession {
    pub fn new(params: Parameters) -> Self {
        Self {
            source: None,
            params,
            pipeline: Pipeline::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Session whose renders are reproducible
    pub fn with_seed(params: Parameters, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(params)
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Replace the source image. The previous one is dropped.
    pub fn load_image(&mut self, image: PixelBuffer) {
        info!("loaded source image {}x{}", image.width(), image.height());
        self.source = Some(image);
    }

    pub fn load_rgba(&mut self, width: u32, height: u32, bytes: Vec<u8>) -> GlitchEffectResult<()> {
        let image = buffer::from_rgba(width, height, bytes)?;
        self.load_image(image);
        Ok(())
    }

    pub fn unload(&mut self) -> Option<PixelBuffer> {
        self.source.take()
    }

    pub fn source(&self) -> Option<&PixelBuffer> {
        self.source.as_ref()
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn set_params(&mut self, params: Parameters) {
        self.params = params;
    }

    pub fn set_param(&mut self, key: ParamKey, value: f64) -> GlitchEffectResult<()> {
        self.params.set(key, value)?;
        debug!("{key} = {value}");
        Ok(())
    }

    pub fn update_param(&mut self, name: &str, value: f64) -> GlitchEffectResult<()> {
        self.params.update(name, value)?;
        debug!("{name} = {value}");
        Ok(())
    }

    pub fn displacement_mode(&self) -> DisplacementMode {
        self.pipeline.displacement_mode()
    }

    pub fn set_displacement_mode(&mut self, mode: DisplacementMode) {
        self.pipeline.set_displacement_mode(mode);
    }

    /// Render the current snapshot over the source image, `None` when no
    /// image is loaded.
    pub fn render(&mut self) -> Option<PixelBuffer> {
        let source = self.source.as_ref()?;

        let start = Instant::now();
        let output = self.pipeline.render(source, &self.params, &mut self.rng);
        debug!("render took {:.3} ms", start.elapsed().as_secs_f64() * 1000.0);

        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn stripes(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            Rgba([(x * 9) as u8, 128, 255 - (x * 9) as u8, 255])
        })
    }

    #[test]
    fn test_no_image_no_render() {
        let mut session = PreviewSession::with_seed(Parameters::ui_defaults(), 1);
        assert!(session.source().is_none());
        assert!(session.render().is_none());
    }

    #[test]
    fn test_load_rgba_rejects_partial_pixels() {
        let mut session = PreviewSession::new(Parameters::new());
        assert!(session.load_rgba(2, 2, vec![0; 10]).is_err());
        assert!(session.source().is_none());

        session.load_rgba(2, 2, vec![0; 16]).unwrap();
        assert_eq!(session.source().map(|s| s.dimensions()), Some((2, 2)));
    }

    #[test]
    fn test_zero_params_reproduce_source() {
        let mut session = PreviewSession::with_seed(Parameters::new(), 1);
        session.load_image(stripes(20, 12));

        assert_eq!(session.render().as_ref(), session.source());
    }

    #[test]
    fn test_renders_do_not_compound() {
        let source = stripes(24, 24);
        let mut session = PreviewSession::with_seed(Parameters::new(), 1);
        session.load_image(source.clone());

        session.update_param("rgbShift", 3.0).unwrap();
        let first = session.render().unwrap();
        let second = session.render().unwrap();
        assert_eq!(first, second);

        session.update_param("rgbShift", 0.0).unwrap();
        assert_eq!(session.render().unwrap(), source);
    }

    #[test]
    fn test_replace_image() {
        let mut session = PreviewSession::with_seed(Parameters::ui_defaults(), 1);
        session.load_image(stripes(8, 8));
        session.load_image(stripes(5, 3));

        let output = session.render().unwrap();
        assert_eq!(output.dimensions(), (5, 3));

        assert!(session.unload().is_some());
        assert!(session.render().is_none());
    }

    #[test]
    fn test_mode_switch() {
        let mut session = PreviewSession::with_seed(Parameters::new(), 1);
        assert_eq!(session.displacement_mode(), DisplacementMode::Blocks);

        session.set_displacement_mode(DisplacementMode::Rows);
        assert_eq!(session.displacement_mode(), DisplacementMode::Rows);
    }
}
