// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color values in 16-bit quantum, parsed from X11 names or hex notation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PixwandError;
use crate::types::{MAX_RGB, scale_quantum_to_u8, scale_u8_to_quantum};

/// An RGBA color with 16-bit samples. `a == MAX_RGB` is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Color {
    pub const WHITE: Color = Color::opaque(MAX_RGB, MAX_RGB, MAX_RGB);
    pub const BLACK: Color = Color::opaque(0, 0, 0);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn opaque(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b, a: MAX_RGB }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: scale_u8_to_quantum(r),
            g: scale_u8_to_quantum(g),
            b: scale_u8_to_quantum(b),
            a: scale_u8_to_quantum(a),
        }
    }

    pub fn to_rgba16(self) -> [u16; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba16(px: [u16; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }

    /// Lowercase `#rrggbbaa` form at 8 bits per sample.
    pub fn to_hex(self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            scale_quantum_to_u8(self.r),
            scale_quantum_to_u8(self.g),
            scale_quantum_to_u8(self.b),
            scale_quantum_to_u8(self.a)
        )
    }
}

/// X11 color names understood by [`Color::from_str`].
const NAMED: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("gray", [190, 190, 190, 255]),
    ("grey", [190, 190, 190, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [160, 32, 240, 255]),
    ("transparent", [0, 0, 0, 0]),
    ("none", [0, 0, 0, 0]),
];

impl FromStr for Color {
    type Err = PixwandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || PixwandError::InvalidArgument(format!("unrecognized color `{s}`"));

        if let Some(hex) = trimmed.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            let rgba = match digits.len() {
                3 => [digits[0] * 17, digits[1] * 17, digits[2] * 17, 255],
                6 | 8 => {
                    let byte = |i: usize| digits[i] * 16 + digits[i + 1];
                    let a = if digits.len() == 8 { byte(6) } else { 255 };
                    [byte(0), byte(2), byte(4), a]
                }
                _ => return Err(invalid()),
            };
            return Ok(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b, a])| Color::from_rgba8(*r, *g, *b, *a))
            .ok_or_else(invalid)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
