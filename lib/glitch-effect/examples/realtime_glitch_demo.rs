//! Times each glitch stage and the full chain on a generated 1280x720 frame
//!
//! RUST_LOG=debug cargo run -p glitch-effect --example realtime_glitch_demo

use glitch_effect::{
    DisplacementMode, Effect, Parameters, Pipeline, buffer::changed_pixels,
};
use image::{Rgba, RgbaImage};
use rand::{SeedableRng, rngs::StdRng};
use std::time::Instant;

fn test_frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width) as u8;
        let g = (y * 255 / height) as u8;
        let b = ((x + y) * 255 / (width + height)) as u8;
        Rgba([r, g, b, 255])
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let source = test_frame(1280, 720);
    let params = Parameters {
        displacement: 50.0,
        ..Parameters::ui_defaults()
    };
    let mut rng = StdRng::seed_from_u64(2024);

    println!("Frame: {}x{}", source.width(), source.height());
    println!("Params: {params:?}\n");
    println!("{}", "=".repeat(72));
    println!(
        "{:<24} {:>12} {:>12} {:>18}",
        "Stage", "Time (ms)", "Max FPS", "Changed pixels"
    );
    println!("{}", "-".repeat(72));

    for mode in DisplacementMode::all_modes() {
        let pipeline = Pipeline::new().with_displacement_mode(*mode);

        for stage in pipeline.stages(&params, source.width()) {
            let start = Instant::now();
            let output = stage.apply(source.clone(), &mut rng);
            print_row(stage.name(), start, changed_pixels(&source, &output));
        }

        let start = Instant::now();
        let output = pipeline.render(&source, &params, &mut rng);
        print_row(
            &format!("Full chain ({})", mode),
            start,
            changed_pixels(&source, &output),
        );
        println!("{}", "-".repeat(72));
    }

    Ok(())
}

fn print_row(name: &str, start: Instant, changed: usize) {
    let time_ms = start.elapsed().as_secs_f64() * 1000.0;
    let max_fps = if time_ms > 0.0 { 1000.0 / time_ms } else { 0.0 };

    println!(
        "{:<24} {:>12.3} {:>12.0} {:>18}",
        name, time_ms, max_fps, changed
    );
}
