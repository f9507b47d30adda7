// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel marshaling — export a region as a flat sample sequence (dispatch)
// and build or patch images from one (constitute / import).

use image::Rgba;
use pixwand_core::{
    ChannelMap, ImageFormat, PixwandError, QUANTUM_DEPTH, Region, Result, SampleMode, Samples,
    quantum_to_normalized,
};
use tracing::{debug, instrument};

use super::{Image, Rgba16Image, check_dimensions};

impl Image {
    /// Export `region` as `region.width * region.height * map.len()` samples.
    ///
    /// Quantum samples lie in `[0, MAX_RGB]`, normalized ones in `[0.0, 1.0]`.
    #[instrument(skip(self), fields(columns = self.columns(), rows = self.rows()))]
    pub fn dispatch(&self, region: Region, map: &str, mode: SampleMode) -> Result<Samples> {
        let map: ChannelMap = map.parse()?;
        self.check_region(region)?;
        let raster = self.raster()?;

        let mut quantum = Vec::with_capacity(region.pixel_count() * map.len());
        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                map.export_pixel(raster.get_pixel(x, y).0, &mut quantum);
            }
        }
        debug!(samples = quantum.len(), %map, "Pixels dispatched");

        Ok(match mode {
            SampleMode::Quantum => Samples::Quantum(quantum),
            SampleMode::Normalized => {
                Samples::Normalized(quantum.into_iter().map(quantum_to_normalized).collect())
            }
        })
    }

    /// Build a new `width x height` image from a flat sample sequence.
    ///
    /// The result carries the intermediate MIFF format: it is pixel-equal to
    /// its source, not byte-equal to any particular encoding of it.
    #[instrument(skip(samples), fields(samples = samples.len()))]
    pub fn constitute(width: u32, height: u32, map: &str, samples: &Samples) -> Result<Image> {
        check_dimensions(width, height)?;
        let map: ChannelMap = map.parse()?;
        check_sample_count(samples, width as usize * height as usize * map.len())?;

        let mut raster = Rgba16Image::new(width, height);
        fill_from_samples(&mut raster, Region::new(0, 0, width, height), &map, samples);
        debug!(width, height, %map, "Image constituted");

        Ok(Image::from_raster(raster, QUANTUM_DEPTH, Some(ImageFormat::Miff)))
    }

    /// Overwrite `region` of this image from a flat sample sequence.
    #[instrument(skip(self, samples), fields(samples = samples.len()))]
    pub fn import_pixels(&mut self, region: Region, map: &str, samples: &Samples) -> Result<()> {
        let map: ChannelMap = map.parse()?;
        self.check_region(region)?;
        check_sample_count(samples, region.pixel_count() * map.len())?;
        let raster = self.raster_mut()?;
        fill_from_samples(raster, region, &map, samples);
        Ok(())
    }

    fn check_region(&self, region: Region) -> Result<()> {
        if !region.fits_within(self.columns(), self.rows()) {
            return Err(PixwandError::InvalidArgument(format!(
                "region {}x{}+{}+{} outside {}x{} image",
                region.width,
                region.height,
                region.x,
                region.y,
                self.columns(),
                self.rows()
            )));
        }
        Ok(())
    }
}

fn check_sample_count(samples: &Samples, expected: usize) -> Result<()> {
    if samples.len() != expected {
        return Err(PixwandError::InvalidArgument(format!(
            "expected {expected} samples, got {}",
            samples.len()
        )));
    }
    Ok(())
}

fn fill_from_samples(raster: &mut Rgba16Image, region: Region, map: &ChannelMap, samples: &Samples) {
    let per_pixel = map.len();
    let mut buf = vec![0u16; per_pixel];
    let mut index = 0usize;
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            for slot in buf.iter_mut() {
                *slot = samples.quantum_at(index).unwrap_or(0);
                index += 1;
            }
            raster.put_pixel(x, y, Rgba(map.import_pixel(&buf)));
        }
    }
}
