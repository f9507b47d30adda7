// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Runtime configuration for codecs and transform defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ImageFormat, MAX_DIMENSION};

/// Settings shared by the blob codecs and the transform facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandConfig {
    /// Format used by `to_blob` for images that have no source format.
    pub default_format: ImageFormat,
    /// Default blur radius (0 lets the engine pick one from sigma).
    pub blur_radius: f64,
    /// Default blur standard deviation.
    pub blur_sigma: f64,
    /// Default adaptive threshold window width.
    pub adaptive_width: u32,
    /// Default adaptive threshold window height.
    pub adaptive_height: u32,
    /// Default adaptive threshold offset, in quantum units.
    pub adaptive_offset: i64,
    /// Seed for noise generation; fixed so noisy output is reproducible.
    pub noise_seed: u64,
    /// Border color used when none is given.
    pub border_color: String,
    /// Largest width or height for new, constituted and transformed images.
    pub max_dimension: u32,
}

impl Default for WandConfig {
    fn default() -> Self {
        Self {
            default_format: ImageFormat::Miff,
            blur_radius: 0.0,
            blur_sigma: 1.0,
            adaptive_width: 3,
            adaptive_height: 3,
            adaptive_offset: 0,
            noise_seed: 0x5eed,
            border_color: "#dfdfdf".into(),
            max_dimension: MAX_DIMENSION,
        }
    }
}

impl WandConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PixwandError;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = WandConfig::from_json_str(r#"{ "blur_sigma": 2.5 }"#).unwrap();
        assert_eq!(cfg.blur_sigma, 2.5);
        assert_eq!(cfg.default_format, ImageFormat::Miff);
        assert_eq!(cfg.adaptive_width, 3);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = WandConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, PixwandError::Config(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wand.json");
        std::fs::write(&path, r#"{ "default_format": "Png", "noise_seed": 7 }"#).unwrap();
        let cfg = WandConfig::load(&path).unwrap();
        assert_eq!(cfg.default_format, ImageFormat::Png);
        assert_eq!(cfg.noise_seed, 7);

        let missing = WandConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, PixwandError::Io(_)));
    }
}
