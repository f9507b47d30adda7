// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image engine capability — the raster primitives the transform facade
// forwards to once arguments are validated.

pub mod noise;
pub mod raster;

use pixwand_core::{AffineMatrix, Channel, ChannelSet, Color, NoiseType, Result};

use crate::handle::Rgba16Image;

pub use raster::RasterEngine;

/// Raster primitives behind every transform.
///
/// Implementations receive arguments that the facade has already validated
/// and defaulted; they only do the pixel work. Every method returns a new
/// raster and leaves `src` untouched.
pub trait ImageEngine {
    /// Local-mean threshold over a `width x height` window, per color
    /// channel: samples above `mean + offset` become `MAX_RGB`, others `0`.
    fn adaptive_threshold(
        &self,
        src: &Rgba16Image,
        width: u32,
        height: u32,
        offset: i64,
    ) -> Result<Rgba16Image>;

    /// Perturb the color channels with noise of the given distribution.
    fn add_noise(&self, src: &Rgba16Image, noise: NoiseType) -> Result<Rgba16Image>;

    /// Warp through `matrix`; the canvas grows to the transformed bounds.
    fn affine_transform(&self, src: &Rgba16Image, matrix: &AffineMatrix) -> Result<Rgba16Image>;

    /// Samples in `channels` above `threshold` become `MAX_RGB`, others `0`.
    fn bilevel(&self, src: &Rgba16Image, threshold: f64, channels: ChannelSet)
    -> Result<Rgba16Image>;

    /// Gaussian blur restricted to `channels`.
    fn blur(
        &self,
        src: &Rgba16Image,
        radius: f64,
        sigma: f64,
        channels: ChannelSet,
    ) -> Result<Rgba16Image>;

    /// Samples below their slot's threshold become `0`. `None` leaves the
    /// slot alone.
    fn black_threshold(&self, src: &Rgba16Image, thresholds: [Option<f64>; 4])
    -> Result<Rgba16Image>;

    /// Surround with a `width`/`height` frame of `color`.
    fn border(&self, src: &Rgba16Image, width: u32, height: u32, color: Color)
    -> Result<Rgba16Image>;

    /// Opaque grayscale image of one channel's samples.
    fn separate_channel(&self, src: &Rgba16Image, channel: Channel) -> Result<Rgba16Image>;

    /// Smallest bit depth that represents every sample of `channels` exactly.
    fn channel_depth(&self, src: &Rgba16Image, channels: ChannelSet) -> Result<u32>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock engine that records calls and echoes its input.
    #[derive(Default)]
    pub struct RecordingEngine {
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl ImageEngine for RecordingEngine {
        fn adaptive_threshold(
            &self,
            src: &Rgba16Image,
            width: u32,
            height: u32,
            offset: i64,
        ) -> Result<Rgba16Image> {
            self.record(format!("adaptive_threshold({width},{height},{offset})"));
            Ok(src.clone())
        }

        fn add_noise(&self, src: &Rgba16Image, noise: NoiseType) -> Result<Rgba16Image> {
            self.record(format!("add_noise({noise})"));
            Ok(src.clone())
        }

        fn affine_transform(
            &self,
            src: &Rgba16Image,
            _matrix: &AffineMatrix,
        ) -> Result<Rgba16Image> {
            self.record("affine_transform".into());
            Ok(src.clone())
        }

        fn bilevel(
            &self,
            src: &Rgba16Image,
            threshold: f64,
            channels: ChannelSet,
        ) -> Result<Rgba16Image> {
            self.record(format!(
                "bilevel({threshold},{:?})",
                channels.iter().collect::<Vec<_>>()
            ));
            Ok(src.clone())
        }

        fn blur(
            &self,
            src: &Rgba16Image,
            radius: f64,
            sigma: f64,
            channels: ChannelSet,
        ) -> Result<Rgba16Image> {
            self.record(format!(
                "blur({radius},{sigma},{:?})",
                channels.iter().collect::<Vec<_>>()
            ));
            Ok(src.clone())
        }

        fn black_threshold(
            &self,
            src: &Rgba16Image,
            thresholds: [Option<f64>; 4],
        ) -> Result<Rgba16Image> {
            self.record(format!("black_threshold({thresholds:?})"));
            Ok(src.clone())
        }

        fn border(
            &self,
            src: &Rgba16Image,
            width: u32,
            height: u32,
            color: Color,
        ) -> Result<Rgba16Image> {
            self.record(format!("border({width},{height},{color})"));
            Ok(Rgba16Image::from_pixel(
                src.width() + 2 * width,
                src.height() + 2 * height,
                image::Rgba(color.to_rgba16()),
            ))
        }

        fn separate_channel(&self, src: &Rgba16Image, channel: Channel) -> Result<Rgba16Image> {
            self.record(format!("separate_channel({channel})"));
            Ok(src.clone())
        }

        fn channel_depth(&self, _src: &Rgba16Image, channels: ChannelSet) -> Result<u32> {
            self.record(format!(
                "channel_depth({:?})",
                channels.iter().collect::<Vec<_>>()
            ));
            Ok(8)
        }
    }
}
