// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MIFF-style intermediate container.
//
// Layout per image:
//
//   id=ImageMagick  version=1.0
//   class=DirectClass  colorspace=sRGB  matte=True
//   columns=20  rows=20  depth=16
//   signature=<sha256 hex>
//   {key}={value}            <- one per property, braces escaped with '\'
//   \x0c\n:\x1a              <- header terminator
//   <columns * rows * 4 big-endian u16 samples, RGBA>
//
// Several images may follow each other in one blob.

use pixwand_core::{ImageFormat, PixwandError, Result};
use tracing::{debug, warn};

use crate::handle::{Image, Rgba16Image, check_dimensions};

/// Leading bytes that identify the container.
pub const MAGIC: &[u8] = b"id=ImageMagick";

const TERMINATOR: &[u8] = b"\x0c\n:\x1a";
const SAMPLE_DEPTH: u32 = 16;

/// True when `data` starts with a MIFF header.
pub fn sniff(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// Append one image to `out`.
pub fn encode_into(image: &Image, out: &mut Vec<u8>) -> Result<()> {
    let raster = image.raster()?;

    let mut header = String::new();
    header.push_str("id=ImageMagick  version=1.0\n");
    header.push_str("class=DirectClass  colorspace=sRGB  matte=True\n");
    header.push_str(&format!(
        "columns={}  rows={}  depth={}\n",
        image.columns(),
        image.rows(),
        SAMPLE_DEPTH
    ));
    header.push_str(&format!("signature={}\n", image.signature()));
    image.each_property(|key, value| {
        header.push_str(&format!("{{{}}}={{{}}}\n", escape(key), escape(value)));
    });

    out.reserve(header.len() + TERMINATOR.len() + raster.as_raw().len() * 2);
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(TERMINATOR);
    for sample in raster.as_raw() {
        out.extend_from_slice(&sample.to_be_bytes());
    }
    Ok(())
}

/// Encode a single image.
pub fn encode(image: &Image) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(image, &mut out)?;
    Ok(out)
}

/// Decode every image in `data`.
pub fn decode(data: &[u8]) -> Result<Vec<Image>> {
    let mut images = Vec::new();
    let mut rest = data;
    loop {
        rest = trim_leading_whitespace(rest);
        if rest.is_empty() {
            break;
        }
        let (image, remaining) = decode_one(rest)?;
        images.push(image);
        rest = remaining;
    }
    if images.is_empty() {
        return Err(PixwandError::Decode("empty MIFF blob".into()));
    }
    debug!(frames = images.len(), "MIFF blob decoded");
    Ok(images)
}

fn decode_one(data: &[u8]) -> Result<(Image, &[u8])> {
    if !sniff(data) {
        return Err(PixwandError::Decode("missing MIFF header".into()));
    }
    let header_end = find(data, TERMINATOR)
        .ok_or_else(|| PixwandError::Decode("unterminated MIFF header".into()))?;
    let header = std::str::from_utf8(&data[..header_end])
        .map_err(|err| PixwandError::Decode(format!("MIFF header is not UTF-8: {err}")))?;

    let mut columns = None;
    let mut rows = None;
    let mut expected_signature = None;
    let mut properties = Vec::new();

    for token in tokenize(header)? {
        match token {
            Token::Property(key, value) => properties.push((key, value)),
            Token::Field(key, value) => match key.as_str() {
                "columns" => columns = Some(parse_number(&key, &value)?),
                "rows" => rows = Some(parse_number(&key, &value)?),
                "depth" => {
                    if parse_number(&key, &value)? != SAMPLE_DEPTH {
                        return Err(PixwandError::Decode(format!(
                            "unsupported MIFF depth {value}"
                        )));
                    }
                }
                "class" if value != "DirectClass" => {
                    return Err(PixwandError::Decode(format!("unsupported MIFF class {value}")));
                }
                "signature" => expected_signature = Some(value),
                "id" | "version" | "class" | "colorspace" | "matte" => {}
                other => warn!(key = other, "Ignoring unknown MIFF header field"),
            },
        }
    }

    let columns = columns.ok_or_else(|| PixwandError::Decode("MIFF header lacks columns".into()))?;
    let rows = rows.ok_or_else(|| PixwandError::Decode("MIFF header lacks rows".into()))?;
    check_dimensions(columns, rows).map_err(|err| PixwandError::Decode(err.to_string()))?;

    let payload = &data[header_end + TERMINATOR.len()..];
    let byte_len = columns as usize * rows as usize * 4 * 2;
    if payload.len() < byte_len {
        return Err(PixwandError::Decode(format!(
            "truncated MIFF payload: need {byte_len} bytes, have {}",
            payload.len()
        )));
    }
    let samples: Vec<u16> = payload[..byte_len]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let raster = Rgba16Image::from_raw(columns, rows, samples)
        .ok_or_else(|| PixwandError::Decode("MIFF payload does not fit dimensions".into()))?;

    let mut image = Image::from_raster(raster, SAMPLE_DEPTH, Some(ImageFormat::Miff));
    for (key, value) in properties {
        image.set_property(key, value);
    }
    if let Some(expected) = expected_signature {
        image.signature().verify(&expected)?;
    }
    Ok((image, &payload[byte_len..]))
}

#[derive(Debug, PartialEq)]
enum Token {
    Field(String, String),
    Property(String, String),
}

/// Split a header into `key=value` tokens. Braced keys mark properties.
fn tokenize(header: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = header.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else { break };

        let (key, braced) = if first == '{' {
            chars.next();
            (read_braced(&mut chars)?, true)
        } else {
            let mut key = String::new();
            while let Some(&c) = chars.peek() {
                if c == '=' || c.is_whitespace() {
                    break;
                }
                key.push(c);
                chars.next();
            }
            (key, false)
        };

        if chars.next() != Some('=') {
            return Err(PixwandError::Decode(format!("malformed MIFF header near `{key}`")));
        }

        let value = if chars.peek() == Some(&'{') {
            chars.next();
            read_braced(&mut chars)?
        } else {
            let mut value = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
            value
        };

        tokens.push(if braced {
            Token::Property(key, value)
        } else {
            Token::Field(key, value)
        });
    }
    Ok(tokens)
}

fn read_braced(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(c) => out.push(c),
                None => break,
            },
            Some('}') => return Ok(out),
            Some(c) => out.push(c),
            None => break,
        }
    }
    Err(PixwandError::Decode("unterminated braced value in MIFF header".into()))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '{' | '}' | '\u{1a}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| PixwandError::Decode(format!("bad MIFF {key} value `{value}`")))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[start..]
}
