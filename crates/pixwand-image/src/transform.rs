// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform facade — validates arguments, fills defaults, and forwards to an
// `ImageEngine`. Nothing reaches the engine until every check has passed.

use pixwand_core::{
    AffineMatrix, Channel, ChannelSet, Color, Geometry, NoiseType, PixwandError, Result,
    Samples, WandConfig, check_extent,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::engine::{ImageEngine, RasterEngine};
use crate::handle::Image;

/// Window and offset for [`Transformer::adaptive_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveThreshold {
    pub width: u32,
    pub height: u32,
    /// Added to the local mean, in quantum units.
    pub offset: i64,
}

impl AdaptiveThreshold {
    pub fn from_config(config: &WandConfig) -> Self {
        Self {
            width: config.adaptive_width,
            height: config.adaptive_height,
            offset: config.adaptive_offset,
        }
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            width: 3,
            height: 3,
            offset: 0,
        }
    }
}

/// Kernel parameters for the blur transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurOptions {
    pub radius: f64,
    pub sigma: f64,
}

impl BlurOptions {
    pub fn from_config(config: &WandConfig) -> Self {
        Self {
            radius: config.blur_radius,
            sigma: config.blur_sigma,
        }
    }
}

impl Default for BlurOptions {
    fn default() -> Self {
        Self {
            radius: 0.0,
            sigma: 1.0,
        }
    }
}

/// Typed entry point for every image transform.
///
/// Each method returns a new [`Image`] carrying the source's metadata, except
/// [`Transformer::border_in_place`], which replaces the pixels of the image it
/// is given.
#[derive(Debug, Clone)]
pub struct Transformer<E: ImageEngine = RasterEngine> {
    engine: E,
    config: WandConfig,
}

impl Transformer<RasterEngine> {
    /// Transformer backed by the [`RasterEngine`].
    pub fn new(config: WandConfig) -> Self {
        let engine = RasterEngine::from_config(&config);
        Self { engine, config }
    }
}

impl Default for Transformer<RasterEngine> {
    fn default() -> Self {
        Self::new(WandConfig::default())
    }
}

impl<E: ImageEngine> Transformer<E> {
    pub fn with_engine(engine: E, config: WandConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &WandConfig {
        &self.config
    }

    /// Border color used when a caller gives none.
    pub fn default_border_color(&self) -> Result<Color> {
        self.config.border_color.parse()
    }

    // -- Construction ---------------------------------------------------------

    /// White canvas, bounded by the configured maximum dimension.
    pub fn canvas(&self, columns: u32, rows: u32) -> Result<Image> {
        check_extent(columns, rows, self.config.max_dimension)?;
        Image::new(columns, rows)
    }

    /// [`Image::constitute`], bounded by the configured maximum dimension.
    pub fn constitute(
        &self,
        width: u32,
        height: u32,
        map: &str,
        samples: &Samples,
    ) -> Result<Image> {
        check_extent(width, height, self.config.max_dimension)?;
        Image::constitute(width, height, map, samples)
    }

    // -- Thresholds -----------------------------------------------------------

    #[instrument(skip(self, image))]
    pub fn adaptive_threshold(&self, image: &Image, opts: AdaptiveThreshold) -> Result<Image> {
        if opts.width == 0 || opts.height == 0 {
            return Err(PixwandError::InvalidArgument(format!(
                "adaptive threshold window must be non-empty (got {}x{})",
                opts.width, opts.height
            )));
        }
        let raster = image.raster()?;
        let out = self
            .engine
            .adaptive_threshold(raster, opts.width, opts.height, opts.offset)?;
        Ok(image.derive(out))
    }

    /// Binarize `channels` (red, green and blue when empty) at `threshold`.
    #[instrument(skip(self, image))]
    pub fn bilevel_channel(
        &self,
        image: &Image,
        threshold: f64,
        channels: &[Channel],
    ) -> Result<Image> {
        finite("threshold", threshold)?;
        let raster = image.raster()?;
        let out = self
            .engine
            .bilevel(raster, threshold, ChannelSet::from_channels(channels))?;
        Ok(image.derive(out))
    }

    /// Zero samples darker than the given thresholds.
    ///
    /// Values are read as red, green, blue, opacity. Green and blue fall back
    /// to the red value when omitted; opacity is left alone unless given.
    #[instrument(skip(self, image))]
    pub fn black_threshold(&self, image: &Image, thresholds: &[f64]) -> Result<Image> {
        if thresholds.is_empty() || thresholds.len() > 4 {
            return Err(PixwandError::arity(thresholds.len(), "1..4"));
        }
        for value in thresholds {
            finite("threshold", *value)?;
        }
        let red = thresholds[0];
        let per_slot = [
            Some(red),
            Some(thresholds.get(1).copied().unwrap_or(red)),
            Some(thresholds.get(2).copied().unwrap_or(red)),
            thresholds.get(3).copied(),
        ];
        let raster = image.raster()?;
        let out = self.engine.black_threshold(raster, per_slot)?;
        Ok(image.derive(out))
    }

    // -- Filters --------------------------------------------------------------

    #[instrument(skip(self, image))]
    pub fn add_noise(&self, image: &Image, noise: NoiseType) -> Result<Image> {
        let raster = image.raster()?;
        let out = self.engine.add_noise(raster, noise)?;
        Ok(image.derive(out))
    }

    #[instrument(skip(self, image))]
    pub fn blur_channel(
        &self,
        image: &Image,
        opts: BlurOptions,
        channels: &[Channel],
    ) -> Result<Image> {
        check_blur(opts)?;
        let raster = image.raster()?;
        let out = self.engine.blur(
            raster,
            opts.radius,
            opts.sigma,
            ChannelSet::from_channels(channels),
        )?;
        Ok(image.derive(out))
    }

    /// Blur the color channels.
    pub fn blur_image(&self, image: &Image, opts: BlurOptions) -> Result<Image> {
        self.blur_channel(image, opts, &[])
    }

    // -- Geometry -------------------------------------------------------------

    #[instrument(skip(self, image))]
    pub fn affine_transform(&self, image: &Image, matrix: &AffineMatrix) -> Result<Image> {
        let parts = [matrix.sx, matrix.rx, matrix.ry, matrix.sy, matrix.tx, matrix.ty];
        if parts.iter().any(|v| !v.is_finite()) {
            return Err(PixwandError::InvalidArgument(
                "affine matrix has non-finite entries".into(),
            ));
        }
        if matrix.inverse().is_none() {
            return Err(PixwandError::InvalidArgument(
                "affine matrix is singular".into(),
            ));
        }
        let raster = image.raster()?;
        let out = self.engine.affine_transform(raster, matrix)?;
        Ok(image.derive(out))
    }

    /// Frame the image, returning a new one.
    #[instrument(skip(self, image))]
    pub fn border(&self, image: &Image, width: u32, height: u32, color: Color) -> Result<Image> {
        self.check_border(image, width, height)?;
        let raster = image.raster()?;
        let out = self.engine.border(raster, width, height, color)?;
        Ok(image.derive(out))
    }

    /// Frame the image in place.
    #[instrument(skip(self, image))]
    pub fn border_in_place(
        &self,
        image: &mut Image,
        width: u32,
        height: u32,
        color: Color,
    ) -> Result<()> {
        self.check_border(image, width, height)?;
        let out = self.engine.border(image.raster()?, width, height, color)?;
        image.replace_raster(out);
        Ok(())
    }

    /// Resolve `geometry` against the image and hand the target size to
    /// `sizing`, whose result is returned unchanged.
    ///
    /// Only dimensions are read, so header-only images are accepted.
    pub fn change_geometry<T>(
        &self,
        image: &Image,
        geometry: &Geometry,
        sizing: impl FnOnce(u32, u32, &Image) -> T,
    ) -> Result<T> {
        let (columns, rows) = geometry.resolve(image.columns(), image.rows());
        debug!(%geometry, columns, rows, "Geometry resolved");
        Ok(sizing(columns, rows, image))
    }

    // -- Channels -------------------------------------------------------------

    /// Extract one channel as an opaque grayscale image.
    #[instrument(skip(self, image))]
    pub fn channel(&self, image: &Image, channel: Channel) -> Result<Image> {
        let raster = image.raster()?;
        let out = self.engine.separate_channel(raster, channel)?;
        Ok(image.derive(out))
    }

    /// Smallest bit depth that stores `channels` (red, green and blue when
    /// empty) without loss.
    #[instrument(skip(self, image))]
    pub fn channel_depth(&self, image: &Image, channels: &[Channel]) -> Result<u32> {
        let raster = image.raster()?;
        self.engine
            .channel_depth(raster, ChannelSet::from_channels(channels))
    }

    // -- Output ---------------------------------------------------------------

    /// Serialize in the image's format, or the configured default format.
    pub fn to_blob(&self, image: &Image) -> Result<Vec<u8>> {
        image.to_blob_or(self.config.default_format)
    }

    fn check_border(&self, image: &Image, width: u32, height: u32) -> Result<()> {
        let grow = |side: u32, by: u32| by.checked_mul(2).and_then(|b| b.checked_add(side));
        match (grow(image.columns(), width), grow(image.rows(), height)) {
            (Some(columns), Some(rows)) => check_extent(columns, rows, self.config.max_dimension),
            _ => Err(PixwandError::InvalidArgument(format!(
                "border {width}x{height} overflows the image size"
            ))),
        }
    }
}

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PixwandError::InvalidArgument(format!(
            "{name} must be finite (got {value})"
        )))
    }
}

fn check_blur(opts: BlurOptions) -> Result<()> {
    finite("radius", opts.radius)?;
    finite("sigma", opts.sigma)?;
    if opts.radius < 0.0 || opts.sigma < 0.0 {
        return Err(PixwandError::InvalidArgument(format!(
            "blur radius and sigma must be non-negative (got {}, {})",
            opts.radius, opts.sigma
        )));
    }
    Ok(())
}
