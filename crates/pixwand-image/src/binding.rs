// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dynamic argument binding — method-name dispatch over loosely typed values,
// for hosts that call into pixwand with positional argument lists.
//
// Every method checks arity and argument kinds here, then calls the typed
// API. Optional trailing parameters accept 0..K values; channel-accepting
// methods take their channel tokens after the numeric parameters.

use pixwand_core::{
    AffineMatrix, Channel, Color, Geometry, MAX_RGB, NoiseType, PixwandError, Region, Result,
    Samples, WandConfig,
};
use tracing::debug;

use crate::engine::{ImageEngine, RasterEngine};
use crate::handle::Image;
use crate::transform::{AdaptiveThreshold, BlurOptions, Transformer};

/// A loosely typed argument or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Channel(Channel),
    Noise(NoiseType),
    Affine(AffineMatrix),
    Geometry(Geometry),
    List(Vec<Value>),
    Image(Box<Image>),
    Bytes(Vec<u8>),
}

impl Value {
    /// Kind name used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "Nil",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Str(_) => "String",
            Self::Channel(_) => "ChannelType",
            Self::Noise(_) => "NoiseType",
            Self::Affine(_) => "AffineMatrix",
            Self::Geometry(_) => "Geometry",
            Self::List(_) => "List",
            Self::Image(_) => "Image",
            Self::Bytes(_) => "Bytes",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Everything except `Nil` and `Bool(false)` counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Int(i) => Ok(*i as f64),
            Self::Float(f) => Ok(*f),
            other => Err(PixwandError::type_mismatch("Numeric", other.type_name())),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            Self::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            other => Err(PixwandError::type_mismatch("Integer", other.type_name())),
        }
    }

    pub fn as_u32(&self) -> Result<u32> {
        let value = self.as_i64()?;
        u32::try_from(value).map_err(|_| {
            PixwandError::InvalidArgument(format!("{value} is out of range for an unsigned size"))
        })
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(PixwandError::type_mismatch("String", other.type_name())),
        }
    }

    /// A channel token, given directly or by name.
    pub fn as_channel(&self) -> Result<Channel> {
        match self {
            Self::Channel(c) => Ok(*c),
            Self::Str(s) => s.parse(),
            other => Err(PixwandError::type_mismatch("ChannelType", other.type_name())),
        }
    }

    pub fn into_image(self) -> Option<Image> {
        match self {
            Self::Image(img) => Some(*img),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Channel> for Value {
    fn from(v: Channel) -> Self {
        Self::Channel(v)
    }
}

impl From<Image> for Value {
    fn from(v: Image) -> Self {
        Self::Image(Box::new(v))
    }
}

/// Caller-supplied block, invoked with positional values.
pub type Block<'a> = &'a mut dyn FnMut(&[Value]) -> Value;

/// Method-name front end over a [`Transformer`].
#[derive(Debug, Clone)]
pub struct Binding<E: ImageEngine = RasterEngine> {
    transformer: Transformer<E>,
}

impl Binding<RasterEngine> {
    pub fn new(config: WandConfig) -> Self {
        Self {
            transformer: Transformer::new(config),
        }
    }
}

impl Default for Binding<RasterEngine> {
    fn default() -> Self {
        Self::new(WandConfig::default())
    }
}

impl<E: ImageEngine> Binding<E> {
    pub fn with_transformer(transformer: Transformer<E>) -> Self {
        Self { transformer }
    }

    pub fn transformer(&self) -> &Transformer<E> {
        &self.transformer
    }

    /// Call an instance method on `image`.
    ///
    /// Methods ending in `!` modify `image` and return `Nil`; the others
    /// leave it untouched.
    pub fn invoke(
        &self,
        image: &mut Image,
        method: &str,
        args: &[Value],
        block: Option<Block<'_>>,
    ) -> Result<Value> {
        debug!(method, argc = args.len(), "Invoking image method");
        let t = &self.transformer;
        match method {
            "dispatch" => {
                expect_arity(args, 5, 6)?;
                let region = Region::new(
                    args[0].as_u32()?,
                    args[1].as_u32()?,
                    args[2].as_u32()?,
                    args[3].as_u32()?,
                );
                let map = args[4].as_str()?;
                let normalize = args.get(5).is_some_and(Value::is_truthy);
                Ok(samples_to_value(image.dispatch(region, map, normalize.into())?))
            }
            "adaptive_threshold" => {
                expect_arity(args, 0, 3)?;
                let mut opts = AdaptiveThreshold::from_config(t.config());
                if let Some(v) = args.first() {
                    opts.width = v.as_u32()?;
                }
                if let Some(v) = args.get(1) {
                    opts.height = v.as_u32()?;
                }
                if let Some(v) = args.get(2) {
                    opts.offset = v.as_i64()?;
                }
                Ok(t.adaptive_threshold(image, opts)?.into())
            }
            "add_noise" => {
                expect_arity(args, 1, 1)?;
                let noise = match &args[0] {
                    Value::Noise(n) => *n,
                    Value::Str(s) => s.parse()?,
                    other => {
                        return Err(PixwandError::type_mismatch("NoiseType", other.type_name()));
                    }
                };
                Ok(t.add_noise(image, noise)?.into())
            }
            "affine_transform" => {
                expect_arity(args, 1, 1)?;
                let Value::Affine(matrix) = &args[0] else {
                    return Err(PixwandError::type_mismatch(
                        "AffineMatrix",
                        args[0].type_name(),
                    ));
                };
                Ok(t.affine_transform(image, matrix)?.into())
            }
            "bilevel_channel" => {
                let (numbers, channels) = split_channels(args, 1, 1)?;
                Ok(t.bilevel_channel(image, numbers[0], &channels)?.into())
            }
            "blur_channel" => {
                let (numbers, channels) = split_channels(args, 0, 2)?;
                Ok(t.blur_channel(image, blur_options(t.config(), &numbers), &channels)?
                    .into())
            }
            "blur_image" => {
                let numbers = numeric_args(args, 0, 2)?;
                Ok(t.blur_image(image, blur_options(t.config(), &numbers))?.into())
            }
            "black_threshold" => {
                let numbers = numeric_args(args, 1, 4)?;
                Ok(t.black_threshold(image, &numbers)?.into())
            }
            "border" => {
                let (width, height, color) = border_args(t, args)?;
                Ok(t.border(image, width, height, color)?.into())
            }
            "border!" => {
                let (width, height, color) = border_args(t, args)?;
                t.border_in_place(image, width, height, color)?;
                Ok(Value::Nil)
            }
            "change_geometry" => {
                expect_arity(args, 1, 1)?;
                let geometry = match &args[0] {
                    Value::Geometry(g) => *g,
                    Value::Str(s) => s.parse()?,
                    other => {
                        return Err(PixwandError::InvalidArgument(format!(
                            "geometry must be a string or Geometry, not {}",
                            other.type_name()
                        )));
                    }
                };
                let block = block
                    .ok_or_else(|| PixwandError::MissingCallback("change_geometry".into()))?;
                t.change_geometry(image, &geometry, |columns, rows, img| {
                    block(&[
                        Value::Int(columns as i64),
                        Value::Int(rows as i64),
                        Value::Image(Box::new(img.clone())),
                    ])
                })
            }
            "channel" => {
                expect_arity(args, 1, 1)?;
                Ok(t.channel(image, args[0].as_channel()?)?.into())
            }
            "channel_depth" => {
                let (_, channels) = split_channels(args, 0, 0)?;
                Ok(Value::Int(t.channel_depth(image, &channels)? as i64))
            }
            "pixel_color" => {
                expect_arity(args, 2, 3)?;
                let (x, y) = (args[0].as_u32()?, args[1].as_u32()?);
                let color = match args.get(2) {
                    Some(value) => image.set_pixel_color(x, y, value.as_str()?.parse()?)?,
                    None => image.pixel_color(x, y)?,
                };
                Ok(Value::Str(color.to_hex()))
            }
            "changed?" => {
                expect_arity(args, 0, 0)?;
                Ok(Value::Bool(image.changed()))
            }
            "[]" => {
                expect_arity(args, 1, 1)?;
                Ok(image
                    .property(args[0].as_str()?)
                    .map_or(Value::Nil, |v| Value::Str(v.to_string())))
            }
            "[]=" => {
                expect_arity(args, 2, 2)?;
                let key = args[0].as_str()?.to_string();
                match &args[1] {
                    Value::Nil => {
                        image.remove_property(&key);
                    }
                    value => image.set_property(key, value.as_str()?),
                }
                Ok(args[1].clone())
            }
            "properties" => {
                expect_arity(args, 0, 0)?;
                match block {
                    Some(block) => {
                        image.each_property(|key, value| {
                            block(&[Value::from(key), Value::from(value)]);
                        });
                        Ok(Value::Nil)
                    }
                    None => Ok(Value::List(
                        image
                            .properties()
                            .into_iter()
                            .map(|(k, v)| Value::List(vec![Value::Str(k), Value::Str(v)]))
                            .collect(),
                    )),
                }
            }
            "signature" => {
                expect_arity(args, 0, 0)?;
                Ok(Value::Str(image.signature().to_string()))
            }
            "to_blob" => {
                expect_arity(args, 0, 0)?;
                Ok(Value::Bytes(t.to_blob(image)?))
            }
            "columns" => {
                expect_arity(args, 0, 0)?;
                Ok(Value::Int(image.columns() as i64))
            }
            "rows" => {
                expect_arity(args, 0, 0)?;
                Ok(Value::Int(image.rows() as i64))
            }
            "depth" => {
                expect_arity(args, 0, 0)?;
                Ok(Value::Int(image.depth() as i64))
            }
            "format" => {
                expect_arity(args, 0, 0)?;
                Ok(image
                    .format()
                    .map_or(Value::Nil, |f| Value::Str(f.tag().to_string())))
            }
            "filename" => {
                expect_arity(args, 0, 0)?;
                Ok(image
                    .filename()
                    .map_or(Value::Nil, |f| Value::Str(f.to_string())))
            }
            other => Err(PixwandError::InvalidArgument(format!(
                "undefined method `{other}` for Image"
            ))),
        }
    }

    /// Call a constructor-style method that produces images.
    ///
    /// Decoders return a `List` of images, one per frame.
    pub fn invoke_class(&self, method: &str, args: &[Value]) -> Result<Value> {
        debug!(method, argc = args.len(), "Invoking class method");
        match method {
            "new" => {
                expect_arity(args, 2, 2)?;
                Ok(self
                    .transformer
                    .canvas(args[0].as_u32()?, args[1].as_u32()?)?
                    .into())
            }
            "constitute" => {
                expect_arity(args, 4, 4)?;
                let (width, height) = (args[0].as_u32()?, args[1].as_u32()?);
                let map = args[2].as_str()?;
                let Value::List(items) = &args[3] else {
                    return Err(PixwandError::type_mismatch("List", args[3].type_name()));
                };
                let samples = list_to_samples(items)?;
                Ok(self
                    .transformer
                    .constitute(width, height, map, &samples)?
                    .into())
            }
            "from_blob" => {
                expect_arity(args, 1, 1)?;
                let frames = match &args[0] {
                    Value::Bytes(b) => Image::from_blob(b)?,
                    Value::Str(s) => Image::from_blob(s.as_bytes())?,
                    other => {
                        return Err(PixwandError::type_mismatch("Bytes", other.type_name()));
                    }
                };
                Ok(images_to_value(frames))
            }
            "read_inline" => {
                expect_arity(args, 1, 1)?;
                Ok(images_to_value(Image::read_inline(args[0].as_str()?)?))
            }
            "read" => {
                expect_arity(args, 1, 1)?;
                Ok(images_to_value(Image::read(args[0].as_str()?)?))
            }
            "ping" => {
                expect_arity(args, 1, 1)?;
                Ok(images_to_value(Image::ping(args[0].as_str()?)?))
            }
            other => Err(PixwandError::InvalidArgument(format!(
                "undefined class method `{other}` for Image"
            ))),
        }
    }
}

// -- Argument helpers ---------------------------------------------------------

fn expect_arity(args: &[Value], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min}..{max}")
        };
        return Err(PixwandError::arity(args.len(), &expected));
    }
    Ok(())
}

/// All-numeric argument list of `min..=max` values.
fn numeric_args(args: &[Value], min: usize, max: usize) -> Result<Vec<f64>> {
    let numbers = args.iter().map(Value::as_f64).collect::<Result<Vec<_>>>()?;
    expect_arity(args, min, max)?;
    Ok(numbers)
}

/// Split `[numbers..., channels...]`.
///
/// The trailing run of non-numeric values is read as channel tokens; the
/// numeric prefix must hold `min..=max` values.
fn split_channels(args: &[Value], min: usize, max: usize) -> Result<(Vec<f64>, Vec<Channel>)> {
    let split = args
        .iter()
        .rposition(Value::is_numeric)
        .map_or(0, |idx| idx + 1);
    let channels = args[split..]
        .iter()
        .map(Value::as_channel)
        .collect::<Result<Vec<_>>>()?;
    let numbers = numeric_args(&args[..split], min, max)?;
    Ok((numbers, channels))
}

fn blur_options(config: &WandConfig, numbers: &[f64]) -> BlurOptions {
    let mut opts = BlurOptions::from_config(config);
    if let Some(radius) = numbers.first() {
        opts.radius = *radius;
    }
    if let Some(sigma) = numbers.get(1) {
        opts.sigma = *sigma;
    }
    opts
}

fn border_args<E: ImageEngine>(t: &Transformer<E>, args: &[Value]) -> Result<(u32, u32, Color)> {
    expect_arity(args, 2, 3)?;
    let color = match args.get(2) {
        Some(value) => value.as_str()?.parse()?,
        None => t.default_border_color()?,
    };
    Ok((args[0].as_u32()?, args[1].as_u32()?, color))
}

fn list_to_samples(items: &[Value]) -> Result<Samples> {
    if items.iter().any(|v| matches!(v, Value::Float(_))) {
        let floats = items.iter().map(Value::as_f64).collect::<Result<Vec<_>>>()?;
        return Ok(Samples::Normalized(floats));
    }
    let quanta = items
        .iter()
        .map(|v| {
            let n = v.as_i64()?;
            u16::try_from(n).map_err(|_| {
                PixwandError::InvalidArgument(format!("sample {n} outside 0..{MAX_RGB}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Samples::Quantum(quanta))
}

fn samples_to_value(samples: Samples) -> Value {
    Value::List(match samples {
        Samples::Quantum(v) => v.into_iter().map(|s| Value::Int(s as i64)).collect(),
        Samples::Normalized(v) => v.into_iter().map(Value::Float).collect(),
    })
}

fn images_to_value(images: Vec<Image>) -> Value {
    Value::List(images.into_iter().map(Value::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::RecordingEngine;

    fn mocked() -> Binding<RecordingEngine> {
        Binding::with_transformer(Transformer::with_engine(
            RecordingEngine::new(),
            WandConfig::default(),
        ))
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    fn assert_invalid(result: Result<Value>) {
        assert!(
            matches!(result, Err(PixwandError::InvalidArgument(_))),
            "expected InvalidArgument, got {result:?}"
        );
    }

    fn assert_type_mismatch(result: Result<Value>) {
        assert!(
            matches!(result, Err(PixwandError::TypeMismatch { .. })),
            "expected TypeMismatch, got {result:?}"
        );
    }

    #[test]
    fn dispatch_requires_five_or_six_arguments() {
        let b = mocked();
        let mut img = Image::new(20, 20).unwrap();
        let mut args = ints(&[0, 0, 20, 20]);
        args.push("RGBA".into());

        for n in 0..5 {
            assert_invalid(b.invoke(&mut img, "dispatch", &args[..n], None));
        }
        let Value::List(samples) = b.invoke(&mut img, "dispatch", &args, None).unwrap() else {
            panic!("dispatch returns a list");
        };
        assert_eq!(samples.len(), 20 * 20 * 4);

        args.push(Value::Bool(false));
        assert!(b.invoke(&mut img, "dispatch", &args, None).is_ok());
        args.push(Value::Bool(false));
        assert_invalid(b.invoke(&mut img, "dispatch", &args, None));
    }

    #[test]
    fn dispatch_normalized_returns_floats() {
        let b = mocked();
        let mut img = Image::new(2, 2).unwrap();
        let mut args = ints(&[0, 0, 2, 2]);
        args.push("I".into());
        args.push(Value::Bool(true));
        let Value::List(samples) = b.invoke(&mut img, "dispatch", &args, None).unwrap() else {
            panic!("dispatch returns a list");
        };
        assert!(samples.iter().all(|s| *s == Value::Float(1.0)));
    }

    #[test]
    fn constitute_round_trip_through_values() {
        let b = mocked();
        let mut img = Image::new(3, 2).unwrap();
        img.set_pixel_color(1, 1, Color::BLACK).unwrap();
        let mut args = ints(&[0, 0, 3, 2]);
        args.push("RGBA".into());
        let pixels = b.invoke(&mut img, "dispatch", &args, None).unwrap();

        let rebuilt = b
            .invoke_class(
                "constitute",
                &[Value::Int(3), Value::Int(2), "RGBA".into(), pixels],
            )
            .unwrap()
            .into_image()
            .unwrap();
        assert_eq!(rebuilt, img);
    }

    #[test]
    fn constitute_rejects_out_of_range_integers() {
        let b = mocked();
        let result = b.invoke_class(
            "constitute",
            &[
                Value::Int(1),
                Value::Int(1),
                "RGB".into(),
                Value::List(ints(&[0, 70_000, 0])),
            ],
        );
        assert_invalid(result);
    }

    #[test]
    fn channel_operations_split_numbers_and_tokens() {
        let b = mocked();
        let mut img = Image::new(4, 4).unwrap();
        b.invoke(
            &mut img,
            "bilevel_channel",
            &[Value::Int(100), Channel::Red.into(), "GreenChannel".into()],
            None,
        )
        .unwrap();
        b.invoke(&mut img, "blur_channel", &[Value::Int(1), Channel::All.into()], None)
            .unwrap();
        assert_eq!(
            b.transformer().engine().calls(),
            vec!["bilevel(100,[0, 1])", "blur(1,1,[0, 1, 2, 3])"]
        );
    }

    #[test]
    fn surplus_numbers_before_channels_are_arity_errors() {
        let b = mocked();
        let mut img = Image::new(4, 4).unwrap();
        assert_invalid(b.invoke(&mut img, "bilevel_channel", &ints(&[100, 2]), None));
        assert_invalid(b.invoke(&mut img, "bilevel_channel", &[], None));
        assert_invalid(b.invoke(&mut img, "blur_channel", &ints(&[1, 2, 2]), None));
        assert_invalid(b.invoke(&mut img, "blur_image", &ints(&[1, 2, 3]), None));
        assert_invalid(b.invoke(&mut img, "channel_depth", &ints(&[2]), None));
        assert!(b.transformer().engine().calls().is_empty());
    }

    #[test]
    fn unknown_channel_token_is_a_type_mismatch() {
        let b = mocked();
        let mut img = Image::new(4, 4).unwrap();
        assert_type_mismatch(b.invoke(
            &mut img,
            "bilevel_channel",
            &[Value::Int(100), "Purple".into()],
            None,
        ));
        assert_type_mismatch(b.invoke(&mut img, "channel_depth", &[Value::Bool(true)], None));
        assert!(b.transformer().engine().calls().is_empty());
    }

    #[test]
    fn enumerated_tokens_reject_integers() {
        let b = mocked();
        let mut img = Image::new(4, 4).unwrap();
        assert_type_mismatch(b.invoke(&mut img, "channel", &ints(&[2]), None));
        assert_type_mismatch(b.invoke(&mut img, "add_noise", &ints(&[0]), None));
        assert_type_mismatch(b.invoke(&mut img, "affine_transform", &ints(&[0]), None));
        assert_invalid(b.invoke(&mut img, "add_noise", &[], None));
        assert!(b.transformer().engine().calls().is_empty());

        let out = b
            .invoke(&mut img, "channel", &[Channel::Red.into()], None)
            .unwrap();
        assert!(matches!(out, Value::Image(_)));
    }

    #[test]
    fn black_threshold_arity() {
        let b = mocked();
        let mut img = Image::new(4, 4).unwrap();
        assert_invalid(b.invoke(&mut img, "black_threshold", &[], None));
        assert_invalid(b.invoke(&mut img, "black_threshold", &ints(&[1, 2, 3, 4, 5]), None));
        for n in 1..=4 {
            let args = ints(&[50, 60, 70, 80][..n]);
            assert!(b.invoke(&mut img, "black_threshold", &args, None).is_ok());
        }
        assert_eq!(b.transformer().engine().calls().len(), 4);
    }

    #[test]
    fn adaptive_threshold_takes_up_to_three_values() {
        let b = mocked();
        let mut img = Image::new(4, 4).unwrap();
        b.invoke(&mut img, "adaptive_threshold", &[], None).unwrap();
        b.invoke(&mut img, "adaptive_threshold", &ints(&[5, 5, 1]), None)
            .unwrap();
        assert_invalid(b.invoke(&mut img, "adaptive_threshold", &ints(&[1, 2, 3, 4]), None));
        assert_eq!(
            b.transformer().engine().calls(),
            vec!["adaptive_threshold(3,3,0)", "adaptive_threshold(5,5,1)"]
        );
    }

    #[test]
    fn border_variants() {
        let b = Binding::default();
        let mut img = Image::new(20, 20).unwrap();
        let args = [Value::Int(2), Value::Int(2), "red".into()];

        let framed = b
            .invoke(&mut img, "border", &args, None)
            .unwrap()
            .into_image()
            .unwrap();
        assert_eq!(framed.columns(), 24);
        assert_eq!(img.columns(), 20);
        assert!(!img.changed());

        assert_eq!(b.invoke(&mut img, "border!", &args, None).unwrap(), Value::Nil);
        assert_eq!(img.columns(), 24);
        assert!(img.changed());
        assert_eq!(img, framed);
    }

    #[test]
    fn change_geometry_contracts() {
        let b = mocked();
        let mut img = Image::new(20, 20).unwrap();

        let mut seen = Vec::new();
        let mut block = |args: &[Value]| {
            seen.extend_from_slice(&args[..2]);
            Value::Bool(true)
        };
        let result = b
            .invoke(&mut img, "change_geometry", &["10x5!".into()], Some(&mut block))
            .unwrap();
        assert_eq!(result, Value::Bool(true));
        assert_eq!(seen, ints(&[10, 5]));

        assert!(matches!(
            b.invoke(&mut img, "change_geometry", &["10x10".into()], None),
            Err(PixwandError::MissingCallback(_))
        ));

        let mut noop = |_: &[Value]| Value::Nil;
        assert_invalid(b.invoke(&mut img, "change_geometry", &["sss".into()], Some(&mut noop)));
        assert_invalid(b.invoke(
            &mut img,
            "change_geometry",
            &[Value::List(ints(&[1, 2]))],
            Some(&mut noop),
        ));
        assert_invalid(b.invoke(&mut img, "change_geometry", &[], Some(&mut noop)));
    }

    #[test]
    fn property_methods() {
        let b = mocked();
        let mut img = Image::new(2, 2).unwrap();
        assert_eq!(b.invoke(&mut img, "[]", &["a".into()], None).unwrap(), Value::Nil);

        b.invoke(&mut img, "[]=", &["a".into(), "str_1".into()], None)
            .unwrap();
        b.invoke(&mut img, "[]=", &["b".into(), "str_2".into()], None)
            .unwrap();
        assert_eq!(
            b.invoke(&mut img, "[]", &["a".into()], None).unwrap(),
            Value::from("str_1")
        );

        let mut count = 0;
        let mut visit = |args: &[Value]| {
            assert_eq!(args.len(), 2);
            count += 1;
            Value::Nil
        };
        b.invoke(&mut img, "properties", &[], Some(&mut visit)).unwrap();
        assert_eq!(count, 2);

        b.invoke(&mut img, "[]=", &["a".into(), Value::Nil], None)
            .unwrap();
        assert_eq!(img.property_count(), 1);
    }

    #[test]
    fn pixel_color_reads_and_writes() {
        let b = mocked();
        let mut img = Image::new(2, 2).unwrap();
        let old = b
            .invoke(&mut img, "pixel_color", &[Value::Int(0), Value::Int(0), "red".into()], None)
            .unwrap();
        assert_eq!(old, Value::from("#ffffffff"));
        let now = b
            .invoke(&mut img, "pixel_color", &ints(&[0, 0]), None)
            .unwrap();
        assert_eq!(now, Value::from("#ff0000ff"));
        assert_eq!(b.invoke(&mut img, "changed?", &[], None).unwrap(), Value::Bool(true));
    }

    #[test]
    fn blob_class_methods_return_frame_lists() {
        let b = mocked();
        let mut img = Image::new(5, 5).unwrap();
        let Value::Bytes(blob) = b.invoke(&mut img, "to_blob", &[], None).unwrap() else {
            panic!("to_blob returns bytes");
        };
        let Value::List(frames) = b.invoke_class("from_blob", &[Value::Bytes(blob)]).unwrap()
        else {
            panic!("from_blob returns a list");
        };
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0], Value::from(img));
    }

    #[test]
    fn class_constructors_honor_the_configured_limit() {
        let config = WandConfig {
            max_dimension: 16,
            ..WandConfig::default()
        };
        let b = Binding::with_transformer(Transformer::with_engine(RecordingEngine::new(), config));
        assert!(b.invoke_class("new", &ints(&[16, 16])).is_ok());
        assert_invalid(b.invoke_class("new", &ints(&[17, 4])));
        assert_invalid(b.invoke_class(
            "constitute",
            &[
                Value::Int(20),
                Value::Int(1),
                Value::from("I"),
                Value::List(ints(&[0; 20])),
            ],
        ));

        let mut img = Image::new(10, 10).unwrap();
        assert_invalid(b.invoke(&mut img, "border!", &ints(&[4, 4]), None));
        assert!(b.transformer().engine().calls().is_empty());
    }

    #[test]
    fn unknown_methods_are_rejected() {
        let b = mocked();
        let mut img = Image::new(1, 1).unwrap();
        assert_invalid(b.invoke(&mut img, "explode", &[], None));
        assert_invalid(b.invoke_class("explode", &[]));
    }
}
