// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Differential noise generators, one per `NoiseType`.

use std::f64::consts::PI;

use image::Rgba;
use pixwand_core::{ALPHA, MAX_RGB, NoiseType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::handle::Rgba16Image;

const QUANTUM_RANGE: f64 = MAX_RGB as f64;

// Spread of each distribution, as a fraction of the quantum range.
const SIGMA_UNIFORM: f64 = 0.015625;
const SIGMA_GAUSSIAN: f64 = 0.015625;
const TAU_GAUSSIAN: f64 = 0.078125;
const SIGMA_MULTIPLICATIVE: f64 = 0.5;
const SIGMA_IMPULSE: f64 = 0.10;
const SIGMA_LAPLACIAN: f64 = 0.0390625;
const SIGMA_POISSON: f64 = 12.5;

/// Return `src` with every color sample perturbed. Alpha is kept.
///
/// The generator is seeded from `seed`, so equal inputs give equal output.
pub fn apply(src: &Rgba16Image, noise: NoiseType, seed: u64) -> Rgba16Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = src.clone();
    for px in out.pixels_mut() {
        let Rgba(mut samples) = *px;
        for (slot, sample) in samples.iter_mut().enumerate() {
            if slot == ALPHA {
                continue;
            }
            let value = differential(&mut rng, *sample as f64, noise);
            *sample = value.round().clamp(0.0, QUANTUM_RANGE) as u16;
        }
        *px = Rgba(samples);
    }
    out
}

/// Noisy replacement for one sample in `[0, QUANTUM_RANGE]`.
pub fn differential<R: Rng + ?Sized>(rng: &mut R, pixel: f64, noise: NoiseType) -> f64 {
    let alpha: f64 = rng.r#gen();
    match noise {
        NoiseType::Uniform => pixel + QUANTUM_RANGE * SIGMA_UNIFORM * (alpha - 0.5),
        NoiseType::Gaussian => {
            let (sigma, tau) = box_muller(rng, alpha);
            pixel + pixel.sqrt() * SIGMA_GAUSSIAN * sigma + QUANTUM_RANGE * TAU_GAUSSIAN * tau
        }
        NoiseType::MultiplicativeGaussian => {
            let (sigma, _) = box_muller(rng, alpha);
            pixel + pixel * SIGMA_MULTIPLICATIVE * sigma / 2.0
        }
        NoiseType::Impulse => {
            if alpha < SIGMA_IMPULSE / 2.0 {
                0.0
            } else if alpha >= 1.0 - SIGMA_IMPULSE / 2.0 {
                QUANTUM_RANGE
            } else {
                pixel
            }
        }
        NoiseType::Laplacian => {
            if alpha <= 0.5 {
                if alpha <= f64::EPSILON {
                    0.0
                } else {
                    pixel + QUANTUM_RANGE * SIGMA_LAPLACIAN * (2.0 * alpha).ln()
                }
            } else {
                let beta = 1.0 - alpha;
                if beta <= 0.5 * f64::EPSILON {
                    QUANTUM_RANGE
                } else {
                    pixel - QUANTUM_RANGE * SIGMA_LAPLACIAN * (2.0 * beta).ln()
                }
            }
        }
        NoiseType::Poisson => {
            let limit = (-SIGMA_POISSON * pixel / QUANTUM_RANGE).exp();
            let mut product = alpha;
            let mut count = 0u32;
            while product > limit && count < 1024 {
                product *= rng.r#gen::<f64>();
                count += 1;
            }
            QUANTUM_RANGE * count as f64 / SIGMA_POISSON
        }
    }
}

/// Polar Box-Muller pair: `(radius * cos, radius * sin)` of a unit normal.
fn box_muller<R: Rng + ?Sized>(rng: &mut R, alpha: f64) -> (f64, f64) {
    let alpha = alpha.max(f64::MIN_POSITIVE);
    let beta: f64 = rng.r#gen();
    let radius = (-2.0 * alpha.ln()).sqrt();
    (radius * (2.0 * PI * beta).cos(), radius * (2.0 * PI * beta).sin())
}
