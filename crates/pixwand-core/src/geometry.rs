// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry strings — `WxH+X+Y` with optional resize flags.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PixwandError;

/// Resize modifiers trailing a geometry string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeometryFlags {
    /// `!` — use the exact size, ignoring aspect ratio.
    pub ignore_aspect: bool,
    /// `%` — width/height are percentages of the current size.
    pub percent: bool,
    /// `<` — only enlarge images smaller than the geometry.
    pub only_enlarge: bool,
    /// `>` — only shrink images larger than the geometry.
    pub only_shrink: bool,
    /// `@` — width is a maximum pixel area.
    pub area: bool,
    /// `^` — fill the geometry, overflowing one dimension.
    pub fill: bool,
}

/// A parsed geometry specification.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub x: i64,
    pub y: i64,
    pub flags: GeometryFlags,
}

impl Geometry {
    /// Plain `width x height` geometry with no offsets or flags.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width as f64),
            height: Some(height as f64),
            ..Self::default()
        }
    }

    /// Compute the target size for an image of `columns x rows`.
    ///
    /// Aspect ratio is preserved unless `!` is set. The result is never
    /// smaller than 1x1.
    pub fn resolve(&self, columns: u32, rows: u32) -> (u32, u32) {
        let cols = columns.max(1) as f64;
        let rws = rows.max(1) as f64;
        let flags = self.flags;

        let (mut w, mut h) = if flags.percent {
            let pw = self.width.or(self.height).unwrap_or(100.0);
            let ph = self.height.or(self.width).unwrap_or(100.0);
            (cols * pw / 100.0, rws * ph / 100.0)
        } else if flags.area {
            let area = self.width.unwrap_or(cols * rws);
            let scale = (area / (cols * rws)).sqrt();
            (cols * scale, rws * scale)
        } else {
            let gw = self.width;
            let gh = self.height;
            if flags.ignore_aspect {
                (gw.unwrap_or(cols), gh.unwrap_or(rws))
            } else {
                let sx = gw.map(|w| w / cols);
                let sy = gh.map(|h| h / rws);
                let scale = match (sx, sy) {
                    (Some(a), Some(b)) if flags.fill => a.max(b),
                    (Some(a), Some(b)) => a.min(b),
                    (Some(a), None) => a,
                    (None, Some(b)) => b,
                    (None, None) => 1.0,
                };
                (cols * scale, rws * scale)
            }
        };

        if flags.only_shrink && w >= cols && h >= rws {
            w = cols;
            h = rws;
        }
        if flags.only_enlarge && w <= cols && h <= rws {
            w = cols;
            h = rws;
        }

        (
            (w.round() as u32).max(1),
            (h.round() as u32).max(1),
        )
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(w) = self.width {
            write!(f, "{w}")?;
        }
        f.write_str("x")?;
        if let Some(h) = self.height {
            write!(f, "{h}")?;
        }
        if self.x != 0 || self.y != 0 {
            write!(f, "{:+}{:+}", self.x, self.y)?;
        }
        let flags = self.flags;
        for (set, c) in [
            (flags.ignore_aspect, '!'),
            (flags.percent, '%'),
            (flags.only_enlarge, '<'),
            (flags.only_shrink, '>'),
            (flags.area, '@'),
            (flags.fill, '^'),
        ] {
            if set {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Geometry {
    type Err = PixwandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PixwandError::InvalidArgument(format!("invalid geometry `{s}`"));

        let mut flags = GeometryFlags::default();
        let mut body = String::with_capacity(s.len());
        for c in s.trim().chars() {
            match c {
                '!' => flags.ignore_aspect = true,
                '%' => flags.percent = true,
                '<' => flags.only_enlarge = true,
                '>' => flags.only_shrink = true,
                '@' => flags.area = true,
                '^' => flags.fill = true,
                c if c.is_whitespace() => {}
                c => body.push(c),
            }
        }

        // Split off the offsets: everything from the first sign onward.
        let (size, offsets) = match body.find(['+', '-']) {
            Some(idx) => body.split_at(idx),
            None => (body.as_str(), ""),
        };

        let (width, height) = match size.find(['x', 'X']) {
            Some(idx) => {
                let (w, h) = size.split_at(idx);
                (parse_dimension(w, &invalid)?, parse_dimension(&h[1..], &invalid)?)
            }
            None => (parse_dimension(size, &invalid)?, None),
        };

        if width.is_none() && height.is_none() {
            return Err(invalid());
        }

        let (x, y) = parse_offsets(offsets, &invalid)?;

        Ok(Self {
            width,
            height,
            x,
            y,
            flags,
        })
    }
}

fn parse_dimension(
    text: &str,
    invalid: &dyn Fn() -> PixwandError,
) -> Result<Option<f64>, PixwandError> {
    if text.is_empty() {
        return Ok(None);
    }
    let value: f64 = text.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(Some(value))
}

fn parse_offsets(
    text: &str,
    invalid: &dyn Fn() -> PixwandError,
) -> Result<(i64, i64), PixwandError> {
    if text.is_empty() {
        return Ok((0, 0));
    }
    let mut values = Vec::with_capacity(2);
    let mut current = String::new();
    for c in text.chars() {
        if (c == '+' || c == '-') && !current.is_empty() {
            values.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    values.push(current);

    if values.len() > 2 {
        return Err(invalid());
    }
    let mut parsed = [0i64; 2];
    for (slot, v) in parsed.iter_mut().zip(&values) {
        *slot = v.parse().map_err(|_| invalid())?;
    }
    Ok((parsed[0], parsed[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_size() {
        let g: Geometry = "100x100".parse().unwrap();
        assert_eq!(g.width, Some(100.0));
        assert_eq!(g.height, Some(100.0));
        assert_eq!((g.x, g.y), (0, 0));
        assert_eq!(g.flags, GeometryFlags::default());
    }

    #[test]
    fn parses_offsets_and_flags() {
        let g: Geometry = "640x480+10-5!".parse().unwrap();
        assert_eq!((g.x, g.y), (10, -5));
        assert!(g.flags.ignore_aspect);

        let g: Geometry = "50%".parse().unwrap();
        assert!(g.flags.percent);
        assert_eq!(g.width, Some(50.0));
        assert_eq!(g.height, None);
    }

    #[test]
    fn single_dimension_forms() {
        let w: Geometry = "100x".parse().unwrap();
        assert_eq!((w.width, w.height), (Some(100.0), None));
        let h: Geometry = "x50".parse().unwrap();
        assert_eq!((h.width, h.height), (None, Some(50.0)));
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["sss", "", "x", "10x10+1+2+3", "axb", "-5x3"] {
            let err = bad.parse::<Geometry>().unwrap_err();
            assert!(
                matches!(err, PixwandError::InvalidArgument(_)),
                "expected invalid argument for {bad:?}"
            );
        }
    }

    #[test]
    fn resolve_preserves_aspect_by_default() {
        let g: Geometry = "100x100".parse().unwrap();
        assert_eq!(g.resolve(200, 100), (100, 50));
        assert_eq!(g.resolve(20, 20), (100, 100));
    }

    #[test]
    fn resolve_honours_flags() {
        let exact: Geometry = "30x10!".parse().unwrap();
        assert_eq!(exact.resolve(20, 20), (30, 10));

        let half: Geometry = "50%".parse().unwrap();
        assert_eq!(half.resolve(200, 100), (100, 50));

        let shrink_only: Geometry = "100x100>".parse().unwrap();
        assert_eq!(shrink_only.resolve(20, 20), (20, 20));

        let enlarge_only: Geometry = "10x10<".parse().unwrap();
        assert_eq!(enlarge_only.resolve(20, 20), (20, 20));

        let fill: Geometry = "100x100^".parse().unwrap();
        assert_eq!(fill.resolve(200, 100), (200, 100));

        let area: Geometry = "100@".parse().unwrap();
        assert_eq!(area.resolve(20, 20), (10, 10));
    }

    #[test]
    fn display_round_trips() {
        let g: Geometry = "64x32+4+8>".parse().unwrap();
        let again: Geometry = g.to_string().parse().unwrap();
        assert_eq!(g, again);
    }
}
