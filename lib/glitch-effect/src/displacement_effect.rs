//! Displacement glitch effects
//!
//! Copies randomly placed regions of the image to offset positions. The
//! square block variant is the one the default pipeline runs; the row band
//! and column band variants are selectable through [`DisplacementMode`].
//!
//! Every variant first plans its regions (clamped so they always fit inside
//! the buffer) and then copies pixels from the untouched input into a copy of
//! it, so a region never samples pixels written by an earlier region.

use crate::{
    Effect, GlitchEffect,
    buffer::{CHANNELS, PixelBuffer, copy_pixel, pixel_offset},
};
use derivative::Derivative;
use derive_setters::Setters;
use log::trace;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

const MIN_EXTENT: usize = 2;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DisplacementMode {
    #[default]
    Blocks = 0,
    Rows,
    Columns,
}

impl DisplacementMode {
    pub fn name(&self) -> &'static str {
        match self {
            DisplacementMode::Blocks => "Square Blocks",
            DisplacementMode::Rows => "Row Bands",
            DisplacementMode::Columns => "Column Bands",
        }
    }

    pub fn all_modes() -> &'static [DisplacementMode] {
        &[
            DisplacementMode::Blocks,
            DisplacementMode::Rows,
            DisplacementMode::Columns,
        ]
    }

    /// The displacement stage for this mode at intensity `t` in `[0, 1]`
    pub fn effect(&self, t: f64) -> GlitchEffect {
        match self {
            DisplacementMode::Blocks => {
                GlitchEffect::BlockDisplacement(BlockDisplacementConfig::new().with_intensity(t))
            }
            DisplacementMode::Rows => {
                GlitchEffect::RowDisplacement(RowDisplacementConfig::new().with_intensity(t))
            }
            DisplacementMode::Columns => {
                GlitchEffect::ColumnDisplacement(ColumnDisplacementConfig::new().with_intensity(t))
            }
        }
    }
}

/// A square of `side` pixels at `(x, y)` copied by `(dx, dy)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMove {
    pub x: usize,
    pub y: usize,
    pub side: usize,
    pub dx: i64,
    pub dy: i64,
}

/// `extent` rows (or columns) starting at `start`, shifted by `offset` pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandShift {
    pub start: usize,
    pub extent: usize,
    pub offset: i64,
}

fn scaled(base: f64, t: f64, span: f64) -> usize {
    (base + t * span).floor().max(0.0) as usize
}

/// Signed offset `floor((r * 2 - 1) * max)` with `r` uniform in `[0, 1)`
fn random_offset<R: Rng>(rng: &mut R, max: usize) -> i64 {
    ((rng.random::<f64>() * 2.0 - 1.0) * max as f64).floor() as i64
}

/// Uniform size in `[MIN_EXTENT, max]`, clamped so it fits in `limit`
fn random_extent<R: Rng>(rng: &mut R, max: usize, limit: usize) -> usize {
    rng.random_range(MIN_EXTENT..=max.max(MIN_EXTENT)).min(limit)
}

fn clamp_intensity(t: f64) -> Option<f64> {
    let t = t.clamp(0.0, 1.0);
    (t > 0.0).then_some(t)
}

pub fn plan_blocks<R: Rng>(t: f64, width: usize, height: usize, rng: &mut R) -> Vec<BlockMove> {
    let limit = width.min(height);
    if limit == 0 {
        return vec![];
    }

    let count = scaled(2.0, t, 38.0);
    let max_offset = scaled(5.0, t, 120.0);
    let max_side = scaled(6.0, t, 120.0);

    let mut moves = Vec::with_capacity(count);
    for _ in 0..count {
        let side = random_extent(rng, max_side, limit);
        let x = rng.random_range(0..=width - side);
        let y = rng.random_range(0..=height - side);
        let dx = random_offset(rng, max_offset);
        let dy = random_offset(rng, max_offset);

        if dx == 0 && dy == 0 {
            trace!("skip block at ({x}, {y}) with zero offset");
            continue;
        }

        moves.push(BlockMove { x, y, side, dx, dy });
    }

    moves
}

fn plan_bands<R: Rng>(t: f64, span: usize, rng: &mut R) -> Vec<BandShift> {
    if span == 0 {
        return vec![];
    }

    let count = scaled(2.0, t, 18.0);
    let max_offset = scaled(5.0, t, 120.0);
    let max_extent = scaled(6.0, t, 60.0);

    let mut bands = Vec::with_capacity(count);
    for _ in 0..count {
        let extent = random_extent(rng, max_extent, span);
        let start = rng.random_range(0..=span - extent);
        let offset = random_offset(rng, max_offset);

        if offset == 0 {
            continue;
        }

        bands.push(BandShift {
            start,
            extent,
            offset,
        });
    }

    bands
}

/// Horizontal bands of rows, each shifted left or right
pub fn plan_rows<R: Rng>(t: f64, width: usize, height: usize, rng: &mut R) -> Vec<BandShift> {
    if width == 0 {
        return vec![];
    }
    plan_bands(t, height, rng)
}

/// Vertical bands of columns, each shifted up or down
pub fn plan_columns<R: Rng>(t: f64, width: usize, height: usize, rng: &mut R) -> Vec<BandShift> {
    if height == 0 {
        return vec![];
    }
    plan_bands(t, width, rng)
}

pub fn apply_blocks(image: &PixelBuffer, moves: &[BlockMove]) -> PixelBuffer {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let mut output = image.clone();
    let src = image.as_raw();
    let dst: &mut [u8] = &mut output;

    // Later moves overwrite earlier ones where they land on the same pixels
    for m in moves {
        for y in m.y..m.y + m.side {
            let ny = y as i64 + m.dy;
            if ny < 0 || ny >= height {
                continue;
            }

            for x in m.x..m.x + m.side {
                let nx = x as i64 + m.dx;
                if nx < 0 || nx >= width {
                    continue;
                }

                copy_pixel(
                    src,
                    pixel_offset(width as usize, x, y),
                    dst,
                    pixel_offset(width as usize, nx as usize, ny as usize),
                );
            }
        }
    }

    output
}

pub fn apply_rows(image: &PixelBuffer, bands: &[BandShift]) -> PixelBuffer {
    let width = image.width() as usize;
    let row_bytes = width * CHANNELS;
    let mut output = image.clone();
    let src = image.as_raw();
    let dst: &mut [u8] = &mut output;

    for band in bands {
        let shift = band.offset.unsigned_abs() as usize;
        if shift >= width {
            continue;
        }

        let kept = (width - shift) * CHANNELS;
        let shift_bytes = shift * CHANNELS;

        for y in band.start..band.start + band.extent {
            let row = y * row_bytes;
            if band.offset > 0 {
                dst[row + shift_bytes..row + row_bytes].copy_from_slice(&src[row..row + kept]);
            } else {
                dst[row..row + kept].copy_from_slice(&src[row + shift_bytes..row + row_bytes]);
            }
        }
    }

    output
}

pub fn apply_columns(image: &PixelBuffer, bands: &[BandShift]) -> PixelBuffer {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut output = image.clone();
    let src = image.as_raw();
    let dst: &mut [u8] = &mut output;

    for band in bands {
        let shift = band.offset.unsigned_abs() as usize;
        if shift >= height {
            continue;
        }

        for x in band.start..band.start + band.extent {
            for y in 0..height - shift {
                let (from, to) = if band.offset > 0 {
                    (y, y + shift)
                } else {
                    (y + shift, y)
                };

                copy_pixel(
                    src,
                    pixel_offset(width, x, from),
                    dst,
                    pixel_offset(width, x, to),
                );
            }
        }
    }

    output
}

/// Square block displacement configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BlockDisplacementConfig {
    #[derivative(Default(value = "0.5"))]
    intensity: f64, // [0.0, 1.0]
}

impl BlockDisplacementConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for BlockDisplacementConfig {
    fn apply<R: Rng>(&self, image: PixelBuffer, rng: &mut R) -> PixelBuffer {
        let Some(t) = clamp_intensity(self.intensity) else {
            return image;
        };

        let moves = plan_blocks(t, image.width() as usize, image.height() as usize, rng);
        if moves.is_empty() {
            return image;
        }

        apply_blocks(&image, &moves)
    }
}

/// Row band displacement configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct RowDisplacementConfig {
    #[derivative(Default(value = "0.5"))]
    intensity: f64, // [0.0, 1.0]
}

impl RowDisplacementConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for RowDisplacementConfig {
    fn apply<R: Rng>(&self, image: PixelBuffer, rng: &mut R) -> PixelBuffer {
        let Some(t) = clamp_intensity(self.intensity) else {
            return image;
        };

        let bands = plan_rows(t, image.width() as usize, image.height() as usize, rng);
        if bands.is_empty() {
            return image;
        }

        apply_rows(&image, &bands)
    }
}

/// Column band displacement configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ColumnDisplacementConfig {
    #[derivative(Default(value = "0.5"))]
    intensity: f64, // [0.0, 1.0]
}

impl ColumnDisplacementConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ColumnDisplacementConfig {
    fn apply<R: Rng>(&self, image: PixelBuffer, rng: &mut R) -> PixelBuffer {
        let Some(t) = clamp_intensity(self.intensity) else {
            return image;
        };

        let bands = plan_columns(t, image.width() as usize, image.height() as usize, rng);
        if bands.is_empty() {
            return image;
        }

        apply_columns(&image, &bands)
    }
}
