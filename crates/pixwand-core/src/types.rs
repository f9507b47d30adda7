// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the image handle and the transform facade.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PixwandError;

/// Maximum integer sample value at the active quantum depth.
pub const MAX_RGB: u16 = u16::MAX;

/// Bits per sample in the in-memory pixel representation.
pub const QUANTUM_DEPTH: u32 = 16;

/// Largest width or height accepted for a new image.
pub const MAX_DIMENSION: u32 = 65_535;

/// Largest pixel count accepted for any image (2 GiB of RGBA16 samples).
pub const MAX_PIXELS: u64 = 1 << 28;

/// Sample slot indices inside an RGBA pixel.
pub const RED: usize = 0;
pub const GREEN: usize = 1;
pub const BLUE: usize = 2;
pub const ALPHA: usize = 3;

// -- Channels -----------------------------------------------------------------

/// Enumerated channel token accepted by channel-aware operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Opacity,
    Cyan,
    Magenta,
    Yellow,
    Black,
    Gray,
    All,
}

impl Channel {
    /// Every channel token, in declaration order.
    pub const VALUES: [Channel; 10] = [
        Channel::Red,
        Channel::Green,
        Channel::Blue,
        Channel::Opacity,
        Channel::Cyan,
        Channel::Magenta,
        Channel::Yellow,
        Channel::Black,
        Channel::Gray,
        Channel::All,
    ];

    /// Canonical token name, e.g. `RedChannel`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "RedChannel",
            Self::Green => "GreenChannel",
            Self::Blue => "BlueChannel",
            Self::Opacity => "OpacityChannel",
            Self::Cyan => "CyanChannel",
            Self::Magenta => "MagentaChannel",
            Self::Yellow => "YellowChannel",
            Self::Black => "BlackChannel",
            Self::Gray => "GrayChannel",
            Self::All => "AllChannels",
        }
    }

    /// RGBA sample slots this channel touches on an RGBA image.
    ///
    /// Cyan, magenta and yellow alias red, green and blue. Black is the CMYK
    /// index channel and has no RGBA slot.
    pub fn slots(&self) -> &'static [usize] {
        match self {
            Self::Red | Self::Cyan => &[RED],
            Self::Green | Self::Magenta => &[GREEN],
            Self::Blue | Self::Yellow => &[BLUE],
            Self::Opacity => &[ALPHA],
            Self::Black => &[],
            Self::Gray => &[RED, GREEN, BLUE],
            Self::All => &[RED, GREEN, BLUE, ALPHA],
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = PixwandError;

    /// Accepts both the short (`Red`) and the canonical (`RedChannel`) form.
    /// Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s
            .strip_suffix("Channels")
            .or_else(|| s.strip_suffix("Channel"))
            .unwrap_or(s);
        Channel::VALUES
            .iter()
            .copied()
            .find(|c| {
                let name = c.name();
                let bare = name
                    .strip_suffix("Channels")
                    .or_else(|| name.strip_suffix("Channel"))
                    .unwrap_or(name);
                bare == short
            })
            .ok_or_else(|| PixwandError::type_mismatch("ChannelType", s))
    }
}

/// Resolved set of RGBA sample slots selected by a channel list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSet {
    slots: [bool; 4],
}

impl ChannelSet {
    /// Red, green and blue; used when no channel is named.
    pub const DEFAULT: ChannelSet = ChannelSet {
        slots: [true, true, true, false],
    };

    /// Every RGBA slot.
    pub const ALL: ChannelSet = ChannelSet { slots: [true; 4] };

    /// Resolve a channel list. An empty list yields [`ChannelSet::DEFAULT`].
    pub fn from_channels(channels: &[Channel]) -> Self {
        if channels.is_empty() {
            return Self::DEFAULT;
        }
        let mut slots = [false; 4];
        for slot in channels.iter().flat_map(|c| c.slots()) {
            slots[*slot] = true;
        }
        Self { slots }
    }

    pub fn contains(&self, slot: usize) -> bool {
        self.slots.get(slot).copied().unwrap_or(false)
    }

    /// Selected slot indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..4).filter(move |&slot| self.slots[slot])
    }

    pub fn is_empty(&self) -> bool {
        !self.slots.iter().any(|s| *s)
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// -- Noise --------------------------------------------------------------------

/// Noise distributions understood by `add_noise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseType {
    Uniform,
    Gaussian,
    MultiplicativeGaussian,
    Impulse,
    Laplacian,
    Poisson,
}

impl NoiseType {
    pub const VALUES: [NoiseType; 6] = [
        NoiseType::Uniform,
        NoiseType::Gaussian,
        NoiseType::MultiplicativeGaussian,
        NoiseType::Impulse,
        NoiseType::Laplacian,
        NoiseType::Poisson,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "UniformNoise",
            Self::Gaussian => "GaussianNoise",
            Self::MultiplicativeGaussian => "MultiplicativeGaussianNoise",
            Self::Impulse => "ImpulseNoise",
            Self::Laplacian => "LaplacianNoise",
            Self::Poisson => "PoissonNoise",
        }
    }
}

impl std::fmt::Display for NoiseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoiseType {
    type Err = PixwandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s.strip_suffix("Noise").unwrap_or(s);
        NoiseType::VALUES
            .iter()
            .copied()
            .find(|n| n.name().strip_suffix("Noise") == Some(short))
            .ok_or_else(|| PixwandError::type_mismatch("NoiseType", s))
    }
}

// -- Affine -------------------------------------------------------------------

/// Affine matrix in the `(sx, rx, ry, sy, tx, ty)` convention:
///
/// ```text
/// x' = sx * x + ry * y + tx
/// y' = rx * x + sy * y + ty
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix {
    pub sx: f64,
    pub rx: f64,
    pub ry: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl AffineMatrix {
    pub fn new(sx: f64, rx: f64, ry: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            rx,
            ry,
            sy,
            tx,
            ty,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Map a point through the matrix.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.sx * x + self.ry * y + self.tx,
            self.rx * x + self.sy * y + self.ty,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.ry * self.rx
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let sx = self.sy / det;
        let ry = -self.ry / det;
        let rx = -self.rx / det;
        let sy = self.sx / det;
        let tx = -(sx * self.tx + ry * self.ty);
        let ty = -(rx * self.tx + sy * self.ty);
        Some(Self::new(sx, rx, ry, sy, tx, ty))
    }

    /// Row-major 3x3 form `[sx, ry, tx, rx, sy, ty, 0, 0, 1]`.
    pub fn to_row_major(&self) -> [f32; 9] {
        [
            self.sx as f32,
            self.ry as f32,
            self.tx as f32,
            self.rx as f32,
            self.sy as f32,
            self.ty as f32,
            0.0,
            0.0,
            1.0,
        ]
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

// -- Formats ------------------------------------------------------------------

/// Container formats an image can carry as its "current" format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Gif,
    Png,
    Jpeg,
    Bmp,
    Tiff,
    /// Uncompressed intermediate container used for constituted images.
    Miff,
}

impl ImageFormat {
    /// Magick-style format tag (`"GIF"`, `"MIFF"`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Gif => "GIF",
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
            Self::Miff => "MIFF",
        }
    }

    /// Parse a format tag, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "GIF" => Some(Self::Gif),
            "PNG" => Some(Self::Png),
            "JPEG" | "JPG" => Some(Self::Jpeg),
            "BMP" => Some(Self::Bmp),
            "TIFF" | "TIF" => Some(Self::Tiff),
            "MIFF" => Some(Self::Miff),
            _ => None,
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::from_tag(ext)
    }

    /// Whether the encoder stores at most 8 bits per sample.
    pub fn is_eight_bit(&self) -> bool {
        matches!(self, Self::Gif | Self::Jpeg | Self::Bmp)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// -- Regions and samples ------------------------------------------------------

/// Rectangular pixel region, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when the region is non-empty and lies inside `columns x rows`.
    pub fn fits_within(&self, columns: u32, rows: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= columns)
            && self.y.checked_add(self.height).is_some_and(|b| b <= rows)
    }
}

/// How dispatched samples are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleMode {
    /// Integers in `[0, MAX_RGB]`.
    #[default]
    Quantum,
    /// Floats in `[0.0, 1.0]`.
    Normalized,
}

impl From<bool> for SampleMode {
    fn from(normalize: bool) -> Self {
        if normalize {
            Self::Normalized
        } else {
            Self::Quantum
        }
    }
}

/// Flat sample sequence produced by `dispatch` and consumed by `constitute`.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Quantum(Vec<u16>),
    Normalized(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Self::Quantum(v) => v.len(),
            Self::Normalized(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `index` as a 16-bit quantum. Normalized values are clamped to
    /// `[0, 1]` before scaling.
    pub fn quantum_at(&self, index: usize) -> Option<u16> {
        match self {
            Self::Quantum(v) => v.get(index).copied(),
            Self::Normalized(v) => v.get(index).map(|f| normalized_to_quantum(*f)),
        }
    }
}

pub fn quantum_to_normalized(q: u16) -> f64 {
    q as f64 / MAX_RGB as f64
}

pub fn normalized_to_quantum(f: f64) -> u16 {
    if f.is_nan() {
        return 0;
    }
    (f.clamp(0.0, 1.0) * MAX_RGB as f64).round() as u16
}

/// Widen an 8-bit sample to the 16-bit quantum.
pub fn scale_u8_to_quantum(v: u8) -> u16 {
    v as u16 * 257
}

/// Narrow a 16-bit quantum to 8 bits with rounding.
pub fn scale_quantum_to_u8(v: u16) -> u8 {
    ((v as u32 + 128) / 257) as u8
}

/// Round a quantum to the nearest value a `depth`-bit sample can hold.
pub fn quantize_to_depth(v: u16, depth: u32) -> u16 {
    if depth >= QUANTUM_DEPTH {
        return v;
    }
    let levels = (1u64 << depth.max(1)) - 1;
    let max = MAX_RGB as u64;
    let step = (v as u64 * levels + max / 2) / max;
    ((step * max + levels / 2) / levels) as u16
}

/// Reject empty extents, sides over `max_dimension`, and areas over
/// [`MAX_PIXELS`].
pub fn check_extent(
    columns: u32,
    rows: u32,
    max_dimension: u32,
) -> crate::error::Result<()> {
    if columns == 0 || rows == 0 {
        return Err(PixwandError::InvalidArgument(format!(
            "image dimensions must be non-zero (got {columns}x{rows})"
        )));
    }
    if columns > max_dimension || rows > max_dimension {
        return Err(PixwandError::InvalidArgument(format!(
            "image dimensions {columns}x{rows} exceed {max_dimension}"
        )));
    }
    if columns as u64 * rows as u64 > MAX_PIXELS {
        return Err(PixwandError::InvalidArgument(format!(
            "image of {columns}x{rows} pixels exceeds {MAX_PIXELS} pixels"
        )));
    }
    Ok(())
}
