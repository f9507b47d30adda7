// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blob codecs — serialize images to bytes in their current format and read
// them back from blobs, base64 text, or files.

pub mod miff;

use std::io::{Cursor, Read};
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageReader, RgbImage, RgbaImage};
use pixwand_core::{
    ALPHA, ImageFormat, PixwandError, Result, WandConfig, scale_quantum_to_u8,
};
use tracing::{debug, info, instrument};

use crate::handle::Image;

impl Image {
    // -- Encoding -------------------------------------------------------------

    /// Serialize in the image's current format, or the default
    /// [`WandConfig::default_format`] when it has none.
    ///
    /// [`Transformer::to_blob`](crate::Transformer::to_blob) applies a
    /// caller's configured default instead.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        self.to_blob_or(WandConfig::default().default_format)
    }

    /// Serialize in the image's current format, or `fallback` when it has
    /// none.
    pub fn to_blob_or(&self, fallback: ImageFormat) -> Result<Vec<u8>> {
        self.encode(self.format().unwrap_or(fallback))
    }

    /// Serialize in an explicit format.
    #[instrument(skip(self), fields(columns = self.columns(), rows = self.rows()))]
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        let blob = match format {
            ImageFormat::Miff => miff::encode(self)?,
            ImageFormat::Gif => encode_with(&DynamicImage::ImageRgba8(self.to_rgba8_cleared()?), format)?,
            ImageFormat::Jpeg => encode_with(&DynamicImage::ImageRgb8(self.to_rgb8()?), format)?,
            ImageFormat::Bmp => encode_with(&DynamicImage::ImageRgba8(self.to_rgba8_cleared()?), format)?,
            ImageFormat::Png | ImageFormat::Tiff => encode_with(&self.to_dynamic()?, format)?,
        };
        debug!(bytes = blob.len(), "Image encoded");
        Ok(blob)
    }

    /// Write the image to `path`. The format comes from the extension, then
    /// the image's own format, then MIFF.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let format = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .or(self.format())
            .unwrap_or(WandConfig::default().default_format);
        let blob = self.encode(format)?;
        std::fs::write(path.as_ref(), blob)?;
        info!(format = %format, "Image written");
        Ok(())
    }

    // -- Decoding -------------------------------------------------------------

    /// Decode every frame in `data`.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_blob(data: &[u8]) -> Result<Vec<Image>> {
        if miff::sniff(data) {
            return miff::decode(data);
        }
        let guessed = image::guess_format(data).map_err(|err| {
            PixwandError::UnsupportedFormat(format!("unrecognized blob: {err}"))
        })?;
        let format = from_image_format(guessed)?;

        let frames = if format == ImageFormat::Gif {
            decode_gif_frames(data)?
        } else {
            let decoded = image::load_from_memory_with_format(data, guessed).map_err(|err| {
                PixwandError::Decode(format!("failed to decode {format} blob: {err}"))
            })?;
            vec![Image::from_dynamic(decoded, Some(format))]
        };

        debug!(frames = frames.len(), format = %format, "Blob decoded");
        Ok(frames)
    }

    /// Decode base64 text, then behave like [`Image::from_blob`].
    ///
    /// Line breaks and other whitespace are ignored, as is a leading
    /// `data:<mime>;base64,` prefix.
    pub fn read_inline(text: &str) -> Result<Vec<Image>> {
        let body = match text.trim_start().strip_prefix("data:") {
            Some(rest) => rest
                .split_once(',')
                .map(|(_, payload)| payload)
                .ok_or_else(|| PixwandError::InvalidArgument("data URI lacks a payload".into()))?,
            None => text,
        };
        let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        let blob = STANDARD
            .decode(compact.as_bytes())
            .map_err(|err| PixwandError::Decode(format!("invalid base64 image: {err}")))?;
        Self::from_blob(&blob)
    }

    /// Read and fully decode a file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read(path: impl AsRef<Path>) -> Result<Vec<Image>> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut frames = Self::from_blob(&data)?;
        let filename = path.display().to_string();
        for frame in &mut frames {
            frame.set_filename(filename.clone());
        }
        if let Some(first) = frames.first() {
            info!(
                columns = first.columns(),
                rows = first.rows(),
                frames = frames.len(),
                "Image loaded"
            );
        }
        Ok(frames)
    }

    /// Read only the header of a file: format, dimensions, filename.
    ///
    /// The returned image carries no pixels.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn ping(path: impl AsRef<Path>) -> Result<Vec<Image>> {
        let path = path.as_ref();
        let filename = path.display().to_string();

        let file = std::fs::File::open(path)?;
        let mut magic = Vec::with_capacity(miff::MAGIC.len());
        file.take(miff::MAGIC.len() as u64).read_to_end(&mut magic)?;
        if miff::sniff(&magic) {
            // The MIFF header is read together with its payload.
            let mut frames = Self::read(path)?;
            for frame in &mut frames {
                *frame = Image::header_only(
                    frame.columns(),
                    frame.rows(),
                    Some(ImageFormat::Miff),
                    Some(filename.clone()),
                );
            }
            return Ok(frames);
        }

        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let guessed = reader.format().ok_or_else(|| {
            PixwandError::UnsupportedFormat(format!("cannot identify {filename}"))
        })?;
        let format = from_image_format(guessed)?;
        let (columns, rows) = reader.into_dimensions().map_err(|err| {
            PixwandError::Decode(format!("failed to read header of {filename}: {err}"))
        })?;
        debug!(columns, rows, format = %format, "Image pinged");
        Ok(vec![Image::header_only(columns, rows, Some(format), Some(filename))])
    }

    // -- Conversions ----------------------------------------------------------

    /// 8-bit RGBA with fully transparent pixels set to transparent black, so
    /// palette encoders see a single transparent color.
    fn to_rgba8_cleared(&self) -> Result<RgbaImage> {
        let raster = self.raster()?;
        Ok(RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
            let px = raster.get_pixel(x, y).0;
            if px[ALPHA] == 0 {
                image::Rgba([0, 0, 0, 0])
            } else {
                image::Rgba(px.map(scale_quantum_to_u8))
            }
        }))
    }

    fn to_rgb8(&self) -> Result<RgbImage> {
        let raster = self.raster()?;
        Ok(RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
            let px = raster.get_pixel(x, y).0;
            image::Rgb([
                scale_quantum_to_u8(px[0]),
                scale_quantum_to_u8(px[1]),
                scale_quantum_to_u8(px[2]),
            ])
        }))
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_with(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, to_image_format(format)?)
        .map_err(|err| PixwandError::Encode(format!("{format} encoding failed: {err}")))?;
    Ok(buffer)
}

/// Decode every GIF frame, composited to the full logical screen.
fn decode_gif_frames(data: &[u8]) -> Result<Vec<Image>> {
    let decoder = GifDecoder::new(Cursor::new(data))
        .map_err(|err| PixwandError::Decode(format!("failed to decode GIF blob: {err}")))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|err| PixwandError::Decode(format!("failed to decode GIF frame: {err}")))?;
    if frames.is_empty() {
        return Err(PixwandError::Decode("GIF blob has no frames".into()));
    }
    Ok(frames
        .into_iter()
        .map(|frame| {
            Image::from_dynamic(
                DynamicImage::ImageRgba8(frame.into_buffer()),
                Some(ImageFormat::Gif),
            )
        })
        .collect())
}

fn to_image_format(format: ImageFormat) -> Result<image::ImageFormat> {
    Ok(match format {
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Tiff => image::ImageFormat::Tiff,
        ImageFormat::Miff => {
            return Err(PixwandError::UnsupportedFormat(
                "MIFF is encoded by the built-in container".into(),
            ));
        }
    })
}

fn from_image_format(format: image::ImageFormat) -> Result<ImageFormat> {
    match format {
        image::ImageFormat::Gif => Ok(ImageFormat::Gif),
        image::ImageFormat::Png => Ok(ImageFormat::Png),
        image::ImageFormat::Jpeg => Ok(ImageFormat::Jpeg),
        image::ImageFormat::Bmp => Ok(ImageFormat::Bmp),
        image::ImageFormat::Tiff => Ok(ImageFormat::Tiff),
        other => Err(PixwandError::UnsupportedFormat(format!("{other:?}"))),
    }
}
