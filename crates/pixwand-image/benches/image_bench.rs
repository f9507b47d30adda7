// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pixwand-image crate: content signatures, the
// dispatch/constitute round trip, and the MIFF blob codec on a synthetic
// 256x256 image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::Rgba;

use pixwand_core::{ImageFormat, MAX_RGB, Region, SampleMode};
use pixwand_image::{Image, Rgba16Image};

fn gradient() -> Image {
    let raster = Rgba16Image::from_fn(256, 256, |x, y| {
        Rgba([(x * 256) as u16, (y * 256) as u16, ((x ^ y) * 256) as u16, MAX_RGB])
    });
    Image::from_raster(raster, 16, Some(ImageFormat::Png))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Signature of a fresh clone, so the cached digest is never reused.
fn bench_signature(c: &mut Criterion) {
    let img = gradient();
    c.bench_function("signature (256x256)", |b| {
        b.iter(|| {
            let fresh = Image::from_raster(img.raster().unwrap().clone(), 16, None);
            black_box(fresh.signature());
        });
    });
}

fn bench_dispatch_constitute(c: &mut Criterion) {
    let img = gradient();
    let region = Region::new(0, 0, 256, 256);
    c.bench_function("dispatch + constitute RGBA (256x256)", |b| {
        b.iter(|| {
            let samples = img
                .dispatch(black_box(region), "RGBA", SampleMode::Quantum)
                .unwrap();
            black_box(Image::constitute(256, 256, "RGBA", &samples).unwrap());
        });
    });
}

fn bench_miff_round_trip(c: &mut Criterion) {
    let img = gradient();
    c.bench_function("MIFF encode + decode (256x256)", |b| {
        b.iter(|| {
            let blob = img.encode(ImageFormat::Miff).unwrap();
            black_box(Image::from_blob(black_box(&blob)).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_signature,
    bench_dispatch_constitute,
    bench_miff_round_trip
);
criterion_main!(benches);
