//! Glitch Preview
//!
//! Terminal front end for the `glitch-effect` pipeline. Loads an image,
//! renders it once, then re-renders on every parameter change read from
//! stdin.
//!
//! # Architecture
//! - `config`: TOML settings with the startup parameter snapshot
//! - `logic`: command parsing and the preview loop

#[macro_use]
extern crate derivative;

pub mod config;
pub mod logic;

use clap::Parser;
use glitch_effect::DisplacementMode;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Preview glitch effects on a still image")]
pub struct Cli {
    /// Image file to load
    pub image: PathBuf,

    /// Config file, defaults to the platform config directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Displacement variant: blocks, rows or columns
    #[arg(short, long)]
    pub mode: Option<DisplacementMode>,

    /// Seed for reproducible renders
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Parameter override, repeatable, e.g. `--set rgbShift=12`
    #[arg(short = 'p', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Render once, print the summary and exit
    #[arg(long)]
    pub once: bool,
}

/// Installs `env_logger` with a `[time level file line] message` format.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logger() {
    use std::io::Write;

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    config::init(cli.config.as_deref())?;
    logic::run(&cli, config::all())
}
