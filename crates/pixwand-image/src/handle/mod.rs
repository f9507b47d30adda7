// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image handle — owned pixel raster plus dimensions, depth, format tag,
// filename, and a string property table.

pub mod pixels;
pub mod properties;
pub mod signature;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use image::{DynamicImage, ImageBuffer, Rgba};
use pixwand_core::{
    Color, ImageFormat, MAX_DIMENSION, PixwandError, QUANTUM_DEPTH, Result, check_extent,
    quantize_to_depth,
};
use tracing::debug;

pub use signature::Signature;

/// In-memory raster: 16-bit RGBA, straight (non-premultiplied) alpha.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// An owned image.
///
/// Equality and ordering follow the content [`Signature`]: two images are
/// equal iff their signatures are equal, whatever their properties,
/// filenames, or formats.
///
/// Images produced by [`Image::ping`](crate::Image::ping) carry header data
/// only; any pixel access on them fails with [`PixwandError::NoPixelData`].
#[derive(Debug, Clone)]
pub struct Image {
    /// Pixel data, absent for pinged images.
    raster: Option<Rgba16Image>,
    columns: u32,
    rows: u32,
    /// Bits per sample of the source the pixels came from.
    depth: u32,
    format: Option<ImageFormat>,
    filename: Option<String>,
    pub(crate) properties: BTreeMap<String, String>,
    changed: bool,
    /// Lazily computed digest; reset on every pixel mutation.
    signature: OnceLock<Signature>,
}

impl Image {
    // -- Construction ---------------------------------------------------------

    /// Create a `columns x rows` opaque white canvas.
    pub fn new(columns: u32, rows: u32) -> Result<Self> {
        check_dimensions(columns, rows)?;
        let raster = Rgba16Image::from_pixel(columns, rows, Rgba(Color::WHITE.to_rgba16()));
        debug!(columns, rows, "New canvas created");
        Ok(Self::from_raster(raster, QUANTUM_DEPTH, None))
    }

    /// Wrap an existing 16-bit raster.
    pub fn from_raster(raster: Rgba16Image, depth: u32, format: Option<ImageFormat>) -> Self {
        let (columns, rows) = raster.dimensions();
        Self {
            raster: Some(raster),
            columns,
            rows,
            depth,
            format,
            filename: None,
            properties: BTreeMap::new(),
            changed: false,
            signature: OnceLock::new(),
        }
    }

    /// Wrap an already-decoded `DynamicImage`, keeping its sample depth.
    pub fn from_dynamic(image: DynamicImage, format: Option<ImageFormat>) -> Self {
        let color = image.color();
        let depth = (color.bits_per_pixel() as u32 / color.channel_count().max(1) as u32)
            .clamp(1, QUANTUM_DEPTH);
        Self::from_raster(image.into_rgba16(), depth, format)
    }

    /// Header-only image, as produced by `ping`.
    pub(crate) fn header_only(
        columns: u32,
        rows: u32,
        format: Option<ImageFormat>,
        filename: Option<String>,
    ) -> Self {
        Self {
            raster: None,
            columns,
            rows,
            depth: 8,
            format,
            filename,
            properties: BTreeMap::new(),
            changed: false,
            signature: OnceLock::new(),
        }
    }

    /// New image sharing this image's metadata but holding `raster`.
    ///
    /// Derived images count as changed: their pixels no longer match any
    /// decoded source. Samples are rounded to the storage depth so the
    /// result encodes back into its format unchanged.
    pub(crate) fn derive(&self, mut raster: Rgba16Image) -> Self {
        quantize_raster(&mut raster, self.storage_depth());
        let (columns, rows) = raster.dimensions();
        Self {
            raster: Some(raster),
            columns,
            rows,
            depth: self.depth,
            format: self.format,
            filename: self.filename.clone(),
            properties: self.properties.clone(),
            changed: true,
            signature: OnceLock::new(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Height in pixels.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Bits per sample of the pixel source.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The image's current format, if it came from (or was given) one.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Magick-style format tag, e.g. `"GIF"`; empty when unset.
    pub fn format_tag(&self) -> &'static str {
        self.format.map(|f| f.tag()).unwrap_or("")
    }

    /// Path the image was read from, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
    }

    /// True when the image holds pixel data (i.e. it was not pinged).
    pub fn has_pixels(&self) -> bool {
        self.raster.is_some()
    }

    /// True once the pixels were modified in place after creation or decode.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Borrow the pixel raster.
    pub fn raster(&self) -> Result<&Rgba16Image> {
        self.raster.as_ref().ok_or_else(|| self.no_pixels())
    }

    /// Mutably borrow the raster. Invalidates the cached signature and
    /// marks the image changed.
    pub(crate) fn raster_mut(&mut self) -> Result<&mut Rgba16Image> {
        if self.raster.is_none() {
            return Err(self.no_pixels());
        }
        self.signature = OnceLock::new();
        self.changed = true;
        self.raster.as_mut().ok_or_else(|| {
            PixwandError::NoPixelData("raster vanished during mutation".into())
        })
    }

    /// Swap in a new raster (in-place transform variants).
    pub(crate) fn replace_raster(&mut self, mut raster: Rgba16Image) {
        quantize_raster(&mut raster, self.storage_depth());
        let (columns, rows) = raster.dimensions();
        self.columns = columns;
        self.rows = rows;
        self.raster = Some(raster);
        self.signature = OnceLock::new();
        self.changed = true;
    }

    /// Convert to an `image::DynamicImage` (16-bit RGBA).
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgba16(self.raster()?.clone()))
    }

    // -- Single pixels --------------------------------------------------------

    /// Color of the pixel at `(x, y)`.
    pub fn pixel_color(&self, x: u32, y: u32) -> Result<Color> {
        self.check_point(x, y)?;
        let px = self.raster()?.get_pixel(x, y);
        Ok(Color::from_rgba16(px.0))
    }

    /// Overwrite the pixel at `(x, y)`, returning its previous color.
    pub fn set_pixel_color(&mut self, x: u32, y: u32, color: Color) -> Result<Color> {
        self.check_point(x, y)?;
        let raster = self.raster_mut()?;
        let previous = Color::from_rgba16(raster.get_pixel(x, y).0);
        raster.put_pixel(x, y, Rgba(color.to_rgba16()));
        Ok(previous)
    }

    // -- Helpers --------------------------------------------------------------

    /// Bits per sample the pixels keep: the source depth, capped at 8 for
    /// formats whose encoders store no more.
    pub(crate) fn storage_depth(&self) -> u32 {
        match self.format {
            Some(format) if format.is_eight_bit() => self.depth.min(8),
            _ => self.depth,
        }
    }

    fn check_point(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.columns || y >= self.rows {
            return Err(PixwandError::InvalidArgument(format!(
                "pixel ({x}, {y}) outside {}x{} image",
                self.columns, self.rows
            )));
        }
        Ok(())
    }

    fn no_pixels(&self) -> PixwandError {
        PixwandError::NoPixelData(
            self.filename
                .clone()
                .unwrap_or_else(|| format!("{}x{} header-only image", self.columns, self.rows)),
        )
    }
}

/// Reject empty or oversized images.
pub(crate) fn check_dimensions(columns: u32, rows: u32) -> Result<()> {
    check_extent(columns, rows, MAX_DIMENSION)
}

fn quantize_raster(raster: &mut Rgba16Image, depth: u32) {
    if depth >= QUANTUM_DEPTH {
        return;
    }
    for sample in raster.iter_mut() {
        *sample = quantize_to_depth(*sample, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixwand_core::MAX_RGB;

    #[test]
    fn new_canvas_is_white_and_unchanged() {
        let img = Image::new(20, 20).unwrap();
        assert_eq!((img.columns(), img.rows()), (20, 20));
        assert_eq!(img.depth(), QUANTUM_DEPTH);
        assert_eq!(img.format(), None);
        assert_eq!(img.format_tag(), "");
        assert!(!img.changed());
        assert_eq!(img.pixel_color(0, 0).unwrap(), Color::WHITE);
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            Image::new(0, 10),
            Err(PixwandError::InvalidArgument(_))
        ));
        assert!(Image::new(MAX_DIMENSION + 1, 1).is_err());
        assert!(matches!(
            Image::new(MAX_DIMENSION, MAX_DIMENSION),
            Err(PixwandError::InvalidArgument(_))
        ));
    }

    #[test]
    fn derived_eight_bit_images_keep_eight_bit_samples() {
        let gif = Image::from_raster(
            Rgba16Image::from_pixel(2, 2, Rgba([0, 0, 0, MAX_RGB])),
            8,
            Some(ImageFormat::Gif),
        );
        let out = gif.derive(Rgba16Image::from_pixel(2, 2, Rgba([62013, 129, 0, MAX_RGB])));
        let px = out.raster().unwrap().get_pixel(0, 0).0;
        assert_eq!(px, [241 * 257, 257, 0, MAX_RGB]);

        // Sixteen-bit sources keep full precision.
        let deep = Image::new(2, 2).unwrap();
        let out = deep.derive(Rgba16Image::from_pixel(2, 2, Rgba([62013, 129, 0, MAX_RGB])));
        assert_eq!(out.raster().unwrap().get_pixel(1, 1).0, [62013, 129, 0, MAX_RGB]);
    }

    #[test]
    fn setting_a_pixel_marks_changed() {
        let mut img = Image::new(20, 20).unwrap();
        let red: Color = "red".parse().unwrap();
        let previous = img.set_pixel_color(0, 0, red).unwrap();
        assert_eq!(previous, Color::WHITE);
        assert!(img.changed());
        assert_eq!(img.pixel_color(0, 0).unwrap(), Color::opaque(MAX_RGB, 0, 0));
    }

    #[test]
    fn out_of_bounds_pixel_is_invalid() {
        let mut img = Image::new(4, 4).unwrap();
        assert!(matches!(
            img.pixel_color(4, 0),
            Err(PixwandError::InvalidArgument(_))
        ));
        assert!(img.set_pixel_color(0, 9, Color::BLACK).is_err());
        assert!(!img.changed());
    }

    #[test]
    fn header_only_images_refuse_pixel_access() {
        let img = Image::header_only(127, 120, Some(ImageFormat::Gif), Some("x.gif".into()));
        assert!(!img.has_pixels());
        assert!(matches!(img.raster(), Err(PixwandError::NoPixelData(_))));
        assert!(img.pixel_color(0, 0).is_err());
    }

    #[test]
    fn from_dynamic_records_eight_bit_depth() {
        let rgb = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let img = Image::from_dynamic(DynamicImage::ImageRgb8(rgb), Some(ImageFormat::Png));
        assert_eq!(img.depth(), 8);
        assert_eq!(img.pixel_color(1, 1).unwrap(), Color::from_rgba8(10, 20, 30, 255));
    }
}
