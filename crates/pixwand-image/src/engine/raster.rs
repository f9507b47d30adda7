// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster engine — the default `ImageEngine`, built on `image` and `imageproc`.

use image::{Rgba, imageops};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use pixwand_core::channel_map::intensity;
use pixwand_core::{
    ALPHA, AffineMatrix, BLUE, Channel, ChannelSet, Color, MAX_RGB, NoiseType, PixwandError,
    QUANTUM_DEPTH, RED, Result, WandConfig, check_extent,
};
use tracing::{debug, instrument};

use super::{ImageEngine, noise};
use crate::handle::Rgba16Image;

/// Default engine: pure-Rust pixel operations on 16-bit RGBA rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterEngine {
    noise_seed: u64,
    /// Largest width or height a result may have.
    max_dimension: u32,
}

impl RasterEngine {
    pub fn new(noise_seed: u64, max_dimension: u32) -> Self {
        Self {
            noise_seed,
            max_dimension,
        }
    }

    pub fn from_config(config: &WandConfig) -> Self {
        Self::new(config.noise_seed, config.max_dimension)
    }

    pub fn noise_seed(&self) -> u64 {
        self.noise_seed
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    fn check_result_size(&self, columns: u32, rows: u32) -> Result<()> {
        check_extent(columns, rows, self.max_dimension)
            .map_err(|err| PixwandError::Engine(format!("result too large: {err}")))
    }
}

impl Default for RasterEngine {
    fn default() -> Self {
        Self::from_config(&WandConfig::default())
    }
}

impl ImageEngine for RasterEngine {
    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn adaptive_threshold(
        &self,
        src: &Rgba16Image,
        width: u32,
        height: u32,
        offset: i64,
    ) -> Result<Rgba16Image> {
        let (columns, rows) = src.dimensions();
        let mut out = src.clone();

        for slot in RED..=BLUE {
            let integral = compute_integral_image(src, slot);
            for y in 0..rows {
                for x in 0..columns {
                    let mean = window_mean(&integral, columns, rows, x, y, width, height);
                    let value = src.get_pixel(x, y).0[slot] as f64;
                    out.get_pixel_mut(x, y).0[slot] = if value > mean + offset as f64 {
                        MAX_RGB
                    } else {
                        0
                    };
                }
            }
        }

        debug!(width, height, offset, "Adaptive threshold applied");
        Ok(out)
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn add_noise(&self, src: &Rgba16Image, noise: NoiseType) -> Result<Rgba16Image> {
        Ok(noise::apply(src, noise, self.noise_seed))
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn affine_transform(&self, src: &Rgba16Image, matrix: &AffineMatrix) -> Result<Rgba16Image> {
        let (w, h) = (src.width() as f64, src.height() as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(x, y)| matrix.apply(x, y));

        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let out_w = (max_x - min_x).round().max(1.0);
        let out_h = (max_y - min_y).round().max(1.0);
        let limit = self.max_dimension as f64;
        if !(out_w.is_finite() && out_h.is_finite()) || out_w > limit || out_h > limit {
            return Err(PixwandError::Engine(format!(
                "affine result {out_w}x{out_h} is out of range"
            )));
        }
        self.check_result_size(out_w as u32, out_h as u32)?;

        // Shift the result so the transformed bounds start at the origin.
        let mut placed = *matrix;
        placed.tx -= min_x;
        placed.ty -= min_y;
        let projection = Projection::from_matrix(placed.to_row_major())
            .ok_or_else(|| PixwandError::Engine("affine matrix is not invertible".into()))?;

        let mut out = Rgba16Image::new(out_w as u32, out_h as u32);
        warp_into(
            src,
            &projection,
            Interpolation::Bilinear,
            Rgba(Color::TRANSPARENT.to_rgba16()),
            &mut out,
        );
        debug!(out_w, out_h, "Affine transform applied");
        Ok(out)
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn bilevel(
        &self,
        src: &Rgba16Image,
        threshold: f64,
        channels: ChannelSet,
    ) -> Result<Rgba16Image> {
        let mut out = src.clone();
        for px in out.pixels_mut() {
            for slot in channels.iter() {
                px.0[slot] = if px.0[slot] as f64 > threshold { MAX_RGB } else { 0 };
            }
        }
        Ok(out)
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn blur(
        &self,
        src: &Rgba16Image,
        radius: f64,
        sigma: f64,
        channels: ChannelSet,
    ) -> Result<Rgba16Image> {
        // Zero sigma falls back to half the radius.
        let sigma = if sigma > 0.0 { sigma } else { radius / 2.0 };
        if sigma <= 0.0 || channels.is_empty() {
            return Ok(src.clone());
        }

        let blurred = gaussian_blur_f32(src, sigma as f32);
        let mut out = src.clone();
        for (dst, px) in out.pixels_mut().zip(blurred.pixels()) {
            for slot in channels.iter() {
                dst.0[slot] = px.0[slot];
            }
        }
        debug!(radius, sigma, "Blur applied");
        Ok(out)
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn black_threshold(
        &self,
        src: &Rgba16Image,
        thresholds: [Option<f64>; 4],
    ) -> Result<Rgba16Image> {
        let mut out = src.clone();
        for px in out.pixels_mut() {
            for (slot, threshold) in thresholds.iter().enumerate() {
                if let Some(t) = threshold {
                    if (px.0[slot] as f64) < *t {
                        px.0[slot] = 0;
                    }
                }
            }
        }
        Ok(out)
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn border(
        &self,
        src: &Rgba16Image,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<Rgba16Image> {
        let columns = width.checked_mul(2).and_then(|w| w.checked_add(src.width()));
        let rows = height.checked_mul(2).and_then(|h| h.checked_add(src.height()));
        let (Some(columns), Some(rows)) = (columns, rows) else {
            return Err(PixwandError::Engine(format!(
                "border {width}x{height} makes the image too large"
            )));
        };
        self.check_result_size(columns, rows)?;

        let mut out = Rgba16Image::from_pixel(columns, rows, Rgba(color.to_rgba16()));
        imageops::replace(&mut out, src, width as i64, height as i64);
        Ok(out)
    }

    #[instrument(skip(self, src), fields(columns = src.width(), rows = src.height()))]
    fn separate_channel(&self, src: &Rgba16Image, channel: Channel) -> Result<Rgba16Image> {
        let mut out = src.clone();
        for px in out.pixels_mut() {
            let value = match channel {
                Channel::Opacity => MAX_RGB - px.0[ALPHA],
                Channel::Black => 0,
                Channel::Gray | Channel::All => intensity(px.0),
                other => other.slots().first().map(|slot| px.0[*slot]).unwrap_or(0),
            };
            *px = Rgba([value, value, value, MAX_RGB]);
        }
        Ok(out)
    }

    fn channel_depth(&self, src: &Rgba16Image, channels: ChannelSet) -> Result<u32> {
        let mut depth = 1;
        for px in src.pixels() {
            for slot in channels.iter() {
                while depth < QUANTUM_DEPTH && !representable(px.0[slot], depth) {
                    depth += 1;
                }
            }
            if depth == QUANTUM_DEPTH {
                break;
            }
        }
        Ok(depth)
    }
}

/// True when `sample` survives a round trip through `depth` bits.
fn representable(sample: u16, depth: u32) -> bool {
    let levels = ((1u32 << depth) - 1) as f64;
    let reduced = (sample as f64 * levels / MAX_RGB as f64).round();
    (reduced * MAX_RGB as f64 / levels).round() as u16 == sample
}

// -- Integral image helpers ---------------------------------------------------

/// Summed-area table of one sample slot.
///
/// `table[y * (width + 1) + x]` holds the sum over `[0, x) x [0, y)`; the
/// first row and column are zero.
fn compute_integral_image(src: &Rgba16Image, slot: usize) -> Vec<u64> {
    let (w, h) = src.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += src.get_pixel(x, y).0[slot] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean over a `win_w x win_h` window centred on `(cx, cy)`, clamped to the
/// image.
fn window_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    win_w: u32,
    win_h: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(win_w / 2) as usize;
    let y1 = cy.saturating_sub(win_h / 2) as usize;
    let x2 = (x1 + win_w.max(1) as usize).min(img_width as usize);
    let y2 = (y1 + win_h.max(1) as usize).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return MAX_RGB as f64 / 2.0;
    }

    let sum = integral[y2 * stride + x2] as f64
        - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}
