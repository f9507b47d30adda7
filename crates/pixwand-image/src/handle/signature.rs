// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content signatures — SHA-256 over dimensions and pixels, used for image
// equality and ordering.

use std::cmp::Ordering;

use pixwand_core::{ALPHA, PixwandError, Result};
use sha2::{Digest, Sha256};

use super::Image;

/// Lowercase hex SHA-256 digest of an image's pixel content.
///
/// Hex strings of equal length order the same way as the underlying bytes,
/// so ordering signatures as strings is ordering the digests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check `self` against an expected hex digest.
    pub fn verify(&self, expected_hex: &str) -> Result<()> {
        if self.0 == expected_hex {
            Ok(())
        } else {
            Err(PixwandError::Decode(format!(
                "signature mismatch: expected {expected_hex}, got {}",
                self.0
            )))
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Image {
    /// Deterministic content digest.
    ///
    /// Covers columns, rows and every RGBA sample at 16 bits. Fully
    /// transparent pixels hash as transparent black, since their color is
    /// not observable. Header-only images hash their dimensions alone.
    pub fn signature(&self) -> Signature {
        self.signature.get_or_init(|| compute(self)).clone()
    }
}

fn compute(image: &Image) -> Signature {
    let mut hasher = Sha256::new();
    hasher.update(image.columns().to_be_bytes());
    hasher.update(image.rows().to_be_bytes());
    if let Ok(raster) = image.raster() {
        let mut row = Vec::with_capacity(raster.width() as usize * 8);
        for line in raster.rows() {
            row.clear();
            for px in line {
                let samples = if px.0[ALPHA] == 0 { [0u16; 4] } else { px.0 };
                for s in samples {
                    row.extend_from_slice(&s.to_be_bytes());
                }
            }
            hasher.update(&row);
        }
    }
    Signature(hex::encode(hasher.finalize()))
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.signature() == other.signature()
    }
}

impl Eq for Image {}

impl PartialOrd for Image {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Image {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signature().cmp(&other.signature())
    }
}
