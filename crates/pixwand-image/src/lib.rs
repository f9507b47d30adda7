// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixwand-image — Image handle and operations for pixwand.
//
// Provides the image handle with its property table, pixel marshaling
// (dispatch, constitute), blob codecs (GIF, PNG, JPEG, BMP, TIFF and a
// MIFF-style container), content signatures, and the transform facade with
// its dynamic argument binding.

pub mod binding;
pub mod codec;
pub mod engine;
pub mod handle;
pub mod transform;

// Re-export the primary types so callers can use `pixwand_image::Image` etc.
pub use binding::{Binding, Value};
pub use engine::{ImageEngine, RasterEngine};
pub use handle::{Image, Rgba16Image, Signature};
pub use transform::{AdaptiveThreshold, BlurOptions, Transformer};
