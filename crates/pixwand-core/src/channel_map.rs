// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Channel maps — strings such as "RGBA" or "I" naming the samples exported
// per pixel and their order.

use std::str::FromStr;

use crate::error::PixwandError;
use crate::types::{ALPHA, BLUE, GREEN, MAX_RGB, RED};

/// One letter of a channel map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapChannel {
    Red,
    Green,
    Blue,
    /// Alpha (`A`): `MAX_RGB` is opaque.
    Alpha,
    /// Opacity (`O`): inverse of alpha, `0` is opaque.
    Opacity,
    /// Rec. 601 luma (`I`).
    Intensity,
    /// Padding (`P`): always exported as `0`, ignored on import.
    Pad,
    Cyan,
    Magenta,
    Yellow,
    /// CMYK black (`K`): `0` for RGBA images.
    Black,
}

impl MapChannel {
    fn from_letter(c: char) -> Option<Self> {
        Some(match c.to_ascii_uppercase() {
            'R' => Self::Red,
            'G' => Self::Green,
            'B' => Self::Blue,
            'A' => Self::Alpha,
            'O' => Self::Opacity,
            'I' => Self::Intensity,
            'P' => Self::Pad,
            'C' => Self::Cyan,
            'M' => Self::Magenta,
            'Y' => Self::Yellow,
            'K' => Self::Black,
            _ => return None,
        })
    }

    fn letter(&self) -> char {
        match self {
            Self::Red => 'R',
            Self::Green => 'G',
            Self::Blue => 'B',
            Self::Alpha => 'A',
            Self::Opacity => 'O',
            Self::Intensity => 'I',
            Self::Pad => 'P',
            Self::Cyan => 'C',
            Self::Magenta => 'M',
            Self::Yellow => 'Y',
            Self::Black => 'K',
        }
    }
}

/// Parsed channel map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMap {
    channels: Vec<MapChannel>,
}

impl ChannelMap {
    /// Number of samples per pixel.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Export one RGBA pixel as `len()` samples, appended to `out`.
    pub fn export_pixel(&self, px: [u16; 4], out: &mut Vec<u16>) {
        for channel in &self.channels {
            out.push(match channel {
                MapChannel::Red => px[RED],
                MapChannel::Green => px[GREEN],
                MapChannel::Blue => px[BLUE],
                MapChannel::Alpha => px[ALPHA],
                MapChannel::Opacity => MAX_RGB - px[ALPHA],
                MapChannel::Intensity => intensity(px),
                MapChannel::Pad | MapChannel::Black => 0,
                MapChannel::Cyan => MAX_RGB - px[RED],
                MapChannel::Magenta => MAX_RGB - px[GREEN],
                MapChannel::Yellow => MAX_RGB - px[BLUE],
            });
        }
    }

    /// Build an RGBA pixel from `len()` samples. Channels the map does not
    /// name keep their defaults: black color, opaque alpha.
    pub fn import_pixel(&self, samples: &[u16]) -> [u16; 4] {
        let mut px = [0, 0, 0, MAX_RGB];
        let mut black = 0u16;
        for (channel, &v) in self.channels.iter().zip(samples) {
            match channel {
                MapChannel::Red => px[RED] = v,
                MapChannel::Green => px[GREEN] = v,
                MapChannel::Blue => px[BLUE] = v,
                MapChannel::Alpha => px[ALPHA] = v,
                MapChannel::Opacity => px[ALPHA] = MAX_RGB - v,
                MapChannel::Intensity => {
                    px[RED] = v;
                    px[GREEN] = v;
                    px[BLUE] = v;
                }
                MapChannel::Pad => {}
                MapChannel::Cyan => px[RED] = MAX_RGB - v,
                MapChannel::Magenta => px[GREEN] = MAX_RGB - v,
                MapChannel::Yellow => px[BLUE] = MAX_RGB - v,
                MapChannel::Black => black = v,
            }
        }
        if black > 0 {
            let keep = (MAX_RGB - black) as u32;
            for slot in [RED, GREEN, BLUE] {
                px[slot] = (px[slot] as u32 * keep / MAX_RGB as u32) as u16;
            }
        }
        px
    }
}

/// Rec. 601 luma of an RGBA pixel.
pub fn intensity(px: [u16; 4]) -> u16 {
    let luma = 0.299 * px[RED] as f64 + 0.587 * px[GREEN] as f64 + 0.114 * px[BLUE] as f64;
    luma.round().clamp(0.0, MAX_RGB as f64) as u16
}

impl FromStr for ChannelMap {
    type Err = PixwandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PixwandError::InvalidArgument(
                "channel map must name at least one channel".into(),
            ));
        }
        let channels = s
            .chars()
            .map(|c| {
                MapChannel::from_letter(c).ok_or_else(|| {
                    PixwandError::InvalidArgument(format!(
                        "invalid channel `{c}` in channel map `{s}`"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { channels })
    }
}

impl std::fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for channel in &self.channels {
            write!(f, "{}", channel.letter())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_maps() {
        assert_eq!("RGBA".parse::<ChannelMap>().unwrap().len(), 4);
        assert_eq!("RGB".parse::<ChannelMap>().unwrap().len(), 3);
        assert_eq!("I".parse::<ChannelMap>().unwrap().len(), 1);
        assert_eq!("bgr".parse::<ChannelMap>().unwrap().to_string(), "BGR");
    }

    #[test]
    fn rejects_empty_and_unknown_letters() {
        assert!(matches!(
            "".parse::<ChannelMap>(),
            Err(PixwandError::InvalidArgument(_))
        ));
        assert!(matches!(
            "RGBZ".parse::<ChannelMap>(),
            Err(PixwandError::InvalidArgument(_))
        ));
    }

    #[test]
    fn export_then_import_is_lossless_for_rgba() {
        let map: ChannelMap = "RGBA".parse().unwrap();
        let px = [1, 2000, 65535, 40000];
        let mut out = Vec::new();
        map.export_pixel(px, &mut out);
        assert_eq!(out, vec![1, 2000, 65535, 40000]);
        assert_eq!(map.import_pixel(&out), px);
    }

    #[test]
    fn opacity_is_inverse_alpha() {
        let map: ChannelMap = "O".parse().unwrap();
        let mut out = Vec::new();
        map.export_pixel([0, 0, 0, MAX_RGB], &mut out);
        assert_eq!(out, vec![0]);
        assert_eq!(map.import_pixel(&[MAX_RGB])[ALPHA], 0);
    }

    #[test]
    fn missing_channels_default_to_opaque_black() {
        let map: ChannelMap = "R".parse().unwrap();
        assert_eq!(map.import_pixel(&[500]), [500, 0, 0, MAX_RGB]);
    }

    #[test]
    fn intensity_of_white_is_max() {
        assert_eq!(intensity([MAX_RGB, MAX_RGB, MAX_RGB, MAX_RGB]), MAX_RGB);
        assert_eq!(intensity([0, 0, 0, MAX_RGB]), 0);
    }
}
