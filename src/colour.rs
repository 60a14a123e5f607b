// src/colour.rs

//! Pixel values and the per-pixel compositing algebra.
//!
//! A [`Colour`] holds between one and four colour channels plus an optional
//! alpha channel, all stored as `f32`. Values are never clamped on storage so
//! that intermediate results (convolution kernels, HDR data, differences) can
//! go negative or exceed 1. When present, alpha always occupies the last slot.
//!
//! The free functions [`zip`], [`blend`] and [`lerp`] combine two pixel values
//! of matching colour channel count. Broadcasting a single-channel mask across
//! a wider operand is handled one level up, in [`crate::algebra`].

use crate::utils::error::{ImageError, Result};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Largest supported number of colour channels (alpha excluded).
pub const MAX_COLOUR_CHANNELS: usize = 4;

/// Largest supported number of stored channels (colour plus alpha).
pub const MAX_CHANNELS: usize = MAX_COLOUR_CHANNELS + 1;

/// Exponent of the perceptual curve used by gamma-aware dithering.
pub const GAMMA: f32 = 2.2;

/// The channel configuration of a pixel value or image buffer.
///
/// Fixed when a value is constructed and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    colour: u8,
    alpha: bool,
}

impl ChannelLayout {
    /// A single colour channel without alpha; the broadcast operand shape.
    pub const MASK: ChannelLayout = ChannelLayout::new(1, false);
    pub const GREY_ALPHA: ChannelLayout = ChannelLayout::new(1, true);
    pub const RGB: ChannelLayout = ChannelLayout::new(3, false);
    pub const RGBA: ChannelLayout = ChannelLayout::new(3, true);

    /// Creates a layout, panicking when `colour_channels` is not in `1..=4`.
    pub const fn new(colour_channels: usize, alpha: bool) -> Self {
        assert!(
            colour_channels >= 1 && colour_channels <= MAX_COLOUR_CHANNELS,
            "colour channel count must be between 1 and 4"
        );
        ChannelLayout {
            colour: colour_channels as u8,
            alpha,
        }
    }

    /// Checked variant of [`ChannelLayout::new`].
    pub fn try_new(colour_channels: usize, alpha: bool) -> Result<Self> {
        if (1..=MAX_COLOUR_CHANNELS).contains(&colour_channels) {
            Ok(Self::new(colour_channels, alpha))
        } else {
            Err(ImageError::InvalidArg(format!(
                "colour channel count {} outside 1..={}",
                colour_channels, MAX_COLOUR_CHANNELS
            )))
        }
    }

    pub const fn colour_channels(self) -> usize {
        self.colour as usize
    }

    pub const fn has_alpha(self) -> bool {
        self.alpha
    }

    /// Total stored channels, `colour_channels() + has_alpha()`.
    pub const fn channels(self) -> usize {
        self.colour as usize + self.alpha as usize
    }

    pub const fn alpha_index(self) -> Option<usize> {
        if self.alpha {
            Some(self.colour as usize)
        } else {
            None
        }
    }

    pub const fn is_mask(self) -> bool {
        self.colour == 1 && !self.alpha
    }

    pub const fn without_alpha(self) -> Self {
        ChannelLayout {
            colour: self.colour,
            alpha: false,
        }
    }

    pub const fn with_alpha(self) -> Self {
        ChannelLayout {
            colour: self.colour,
            alpha: true,
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.colour, if self.alpha { "A" } else { "" })
    }
}

/// A single pixel value: `colour_channels()` colour values followed by an
/// optional alpha value.
///
/// Storage has room for [`MAX_CHANNELS`] values; slots past `channels()` are
/// always zero so that derived equality compares only meaningful data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    layout: ChannelLayout,
    v: [f32; MAX_CHANNELS],
}

impl Colour {
    /// All channels zero, including alpha.
    pub fn new(layout: ChannelLayout) -> Self {
        Colour {
            layout,
            v: [0.0; MAX_CHANNELS],
        }
    }

    /// Every channel, alpha included, set to `value`.
    pub fn splat(layout: ChannelLayout, value: f32) -> Self {
        let mut c = Colour::new(layout);
        c.as_mut_slice().fill(value);
        c
    }

    /// Builds a colour from exactly `layout.channels()` values.
    pub fn from_slice(layout: ChannelLayout, values: &[f32]) -> Result<Self> {
        if values.len() != layout.channels() {
            return Err(ImageError::LengthMismatch {
                expected: layout.channels(),
                actual: values.len(),
            });
        }
        let mut c = Colour::new(layout);
        c.as_mut_slice().copy_from_slice(values);
        Ok(c)
    }

    pub fn grey(v: f32) -> Self {
        Colour::splat(ChannelLayout::MASK, v)
    }

    pub fn grey_alpha(v: f32, a: f32) -> Self {
        let mut c = Colour::new(ChannelLayout::GREY_ALPHA);
        c.v[0] = v;
        c.v[1] = a;
        c
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        let mut c = Colour::new(ChannelLayout::RGB);
        c.v[..3].copy_from_slice(&[r, g, b]);
        c
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        let mut c = Colour::new(ChannelLayout::RGBA);
        c.v[..4].copy_from_slice(&[r, g, b, a]);
        c
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn colour_channels(&self) -> usize {
        self.layout.colour_channels()
    }

    pub fn has_alpha(&self) -> bool {
        self.layout.has_alpha()
    }

    pub fn alpha(&self) -> Option<f32> {
        self.layout.alpha_index().map(|i| self.v[i])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.v[..self.layout.channels()]
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        let n = self.layout.channels();
        &mut self.v[..n]
    }

    /// Negates the colour channels; alpha is carried over.
    pub fn unm(&self) -> Colour {
        self.map_colour(|v| -v)
    }

    /// Absolute value of the colour channels; alpha is carried over.
    pub fn abs(&self) -> Colour {
        self.map_colour(f32::abs)
    }

    fn map_colour(&self, f: impl Fn(f32) -> f32) -> Colour {
        let mut r = *self;
        for v in &mut r.v[..self.layout.colour_channels()] {
            *v = f(*v);
        }
        r
    }

    /// Applies `f(channel_index, value)` to every stored channel.
    pub(crate) fn map_channels(&self, f: impl Fn(usize, f32) -> f32) -> Colour {
        let mut r = *self;
        for (c, v) in r.as_mut_slice().iter_mut().enumerate() {
            *v = f(c, *v);
        }
        r
    }
}

impl Index<usize> for Colour {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.as_slice()[i]
    }
}

impl IndexMut<usize> for Colour {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.as_mut_slice()[i]
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Colour{}{:?}", self.layout, self.as_slice())
    }
}

fn assert_colour_channels(a: &Colour, b: &Colour, op: &str) {
    assert!(
        a.colour_channels() == b.colour_channels(),
        "{}: colour channel mismatch ({} vs {})",
        op,
        a.layout,
        b.layout
    );
}

/// Combines `a` into `b` channel by channel with `op`.
///
/// When `a` carries alpha it weights the effect of the operation:
/// `r = (1-α)·b + α·op(a, b)`. The result takes `b`'s layout and alpha.
pub fn zip<F>(a: &Colour, b: &Colour, op: F) -> Colour
where
    F: Fn(f32, f32) -> f32,
{
    assert_colour_channels(a, b, "zip");
    let ch = b.colour_channels();
    let mut r = Colour::new(b.layout);
    match a.alpha() {
        Some(alpha) => {
            for c in 0..ch {
                r.v[c] = (1.0 - alpha) * b.v[c] + alpha * op(a.v[c], b.v[c]);
            }
        }
        None => {
            for c in 0..ch {
                r.v[c] = op(a.v[c], b.v[c]);
            }
        }
    }
    if let Some(i) = b.layout.alpha_index() {
        r.v[i] = b.v[i];
    }
    r
}

/// Composites `a` over `b`.
///
/// A missing alpha on `a` means fully opaque: `a`'s colour replaces `b`'s and
/// `b`'s alpha, if any, is left untouched.
pub fn blend(a: &Colour, b: &Colour) -> Colour {
    assert_colour_channels(a, b, "blend");
    let ch = b.colour_channels();
    let mut r = Colour::new(b.layout);
    match (a.alpha(), b.alpha()) {
        (Some(alpha), Some(old_alpha)) => {
            let alpha = alpha.clamp(0.0, 1.0);
            let old_alpha = old_alpha.clamp(0.0, 1.0);
            let new_alpha = 1.0 - (1.0 - alpha) * (1.0 - old_alpha);
            if alpha == 0.0 {
                // Nothing drawn; keep whichever colour has coverage.
                let src = if old_alpha == 0.0 { a } else { b };
                r.v[..ch].copy_from_slice(&src.v[..ch]);
            } else {
                let k = alpha / new_alpha;
                for c in 0..ch {
                    r.v[c] = k * a.v[c] + (1.0 - k) * b.v[c];
                }
            }
            r.v[ch] = new_alpha;
        }
        (Some(alpha), None) => {
            let alpha = alpha.clamp(0.0, 1.0);
            for c in 0..ch {
                r.v[c] = alpha * a.v[c] + (1.0 - alpha) * b.v[c];
            }
        }
        (None, _) => {
            r.v[..ch].copy_from_slice(&a.v[..ch]);
            if let Some(i) = b.layout.alpha_index() {
                r.v[i] = b.v[i];
            }
        }
    }
    r
}

/// Linear interpolation over every channel, alpha included.
///
/// Both operands must share the same layout.
pub fn lerp(a: &Colour, b: &Colour, t: f32) -> Colour {
    assert!(
        a.layout == b.layout,
        "lerp: layout mismatch ({} vs {})",
        a.layout,
        b.layout
    );
    let mut r = Colour::new(b.layout);
    for c in 0..b.channels() {
        r.v[c] = (1.0 - t) * a.v[c] + t * b.v[c];
    }
    r
}

/// `sign(x)·|x|^n`, keeping negative values negative.
#[inline]
pub fn signed_pow(x: f32, n: f32) -> f32 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    sign * x.abs().powf(n)
}

/// Encoded (perceptual) to linear light.
#[inline]
pub fn gamma_decode(x: f32) -> f32 {
    signed_pow(x, GAMMA)
}

/// Linear light to encoded (perceptual).
#[inline]
pub fn gamma_encode(x: f32) -> f32 {
    signed_pow(x, 1.0 / GAMMA)
}

/// Adds a linear-light amount to an encoded value.
#[inline]
pub(crate) fn add_gamma(a: &mut f32, linear: f32) {
    *a = gamma_encode(gamma_decode(*a) + linear);
}
