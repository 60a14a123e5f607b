// src/image/buffer.rs

//! The owned floating-point image buffer.
//!
//! An [`Image`] stores `width × height` pixels row-major, each pixel as
//! `layout.channels()` interleaved `f32` values. Row 0 is the bottom row; the
//! geometric operations take `left`/`bottom` offsets accordingly.
//!
//! [`Raster`] is the capability interface shared by images and single
//! colours, so that a constant colour can stand in for an image anywhere an
//! operand is accepted.

use crate::colour::{ChannelLayout, Colour};
use crate::utils::error::{ImageError, Result};
use std::fmt;

/// Something that yields a pixel value for every coordinate.
pub trait Raster {
    /// Channel configuration of every sampled pixel.
    fn layout(&self) -> ChannelLayout;

    /// `(width, height)` for images, `None` for values broadcast everywhere.
    fn extent(&self) -> Option<(u32, u32)>;

    /// The pixel at `(x, y)`. Scalars ignore the coordinate.
    fn sample(&self, x: u32, y: u32) -> Colour;
}

impl Raster for Colour {
    fn layout(&self) -> ChannelLayout {
        Colour::layout(self)
    }

    fn extent(&self) -> Option<(u32, u32)> {
        None
    }

    fn sample(&self, _x: u32, _y: u32) -> Colour {
        *self
    }
}

/// A 2D buffer of floating-point pixels with a fixed channel layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<f32>,
}

/// Number of `f32` values a `width × height` buffer holds, or `None` if that
/// does not fit in `usize`.
pub(crate) fn buffer_len(width: u32, height: u32, layout: ChannelLayout) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(layout.channels())
}

fn checked_len(width: u32, height: u32, layout: ChannelLayout) -> usize {
    match buffer_len(width, height, layout) {
        Some(n) => n,
        None => panic!("image size {}x{}x{} overflows usize", width, height, layout),
    }
}

impl Image {
    /// Creates an image with every channel of every pixel set to zero.
    pub fn new(width: u32, height: u32, layout: ChannelLayout) -> Self {
        Image {
            width,
            height,
            layout,
            data: vec![0.0; checked_len(width, height, layout)],
        }
    }

    /// Creates an image filled with a single colour.
    pub fn filled(width: u32, height: u32, colour: &Colour) -> Self {
        let mut img = Image::new(width, height, colour.layout());
        for px in img.data.chunks_exact_mut(colour.channels()) {
            px.copy_from_slice(colour.as_slice());
        }
        img
    }

    /// Wraps raw interleaved channel data, row-major from the bottom row.
    pub fn from_vec(width: u32, height: u32, layout: ChannelLayout, data: Vec<f32>) -> Result<Self> {
        let expected = buffer_len(width, height, layout).ok_or_else(|| {
            ImageError::InvalidArg(format!("image size {}x{}x{} overflows usize", width, height, layout))
        })?;
        if data.len() != expected {
            return Err(ImageError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Image {
            width,
            height,
            layout,
            data,
        })
    }

    /// Builds an image from a list of pixel values in row-major order.
    ///
    /// Every colour must have `layout`.
    pub fn from_colours(width: u32, height: u32, layout: ChannelLayout, pixels: &[Colour]) -> Result<Self> {
        let expected = buffer_len(width, height, ChannelLayout::MASK).ok_or_else(|| {
            ImageError::InvalidArg(format!("image size {}x{} overflows usize", width, height))
        })?;
        if pixels.len() != expected {
            return Err(ImageError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        if let Some(bad) = pixels.iter().find(|c| c.layout() != layout) {
            return Err(ImageError::InvalidArg(format!(
                "pixel layout {} does not match image layout {}",
                bad.layout(),
                layout
            )));
        }
        Ok(Image::from_fn(width, height, layout, |x, y| {
            pixels[y as usize * width as usize + x as usize]
        }))
    }

    /// Creates an image by calling a function for each pixel.
    pub fn from_fn<F>(width: u32, height: u32, layout: ChannelLayout, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Colour,
    {
        let mut data = Vec::with_capacity(checked_len(width, height, layout));
        for y in 0..height {
            for x in 0..width {
                let c = f(x, y);
                assert!(
                    c.layout() == layout,
                    "from_fn: pixel layout {} does not match image layout {}",
                    c.layout(),
                    layout
                );
                data.extend_from_slice(c.as_slice());
            }
        }
        Image {
            width,
            height,
            layout,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions as a tuple (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
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

    /// True when both images have exactly the same width and height.
    pub fn size_compatible_with(&self, other: &Image) -> bool {
        self.width == other.width && self.height == other.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} image",
            x,
            y,
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * self.layout.channels()
    }

    /// The channels of the pixel at `(x, y)`.
    pub fn pixel_slice(&self, x: u32, y: u32) -> &[f32] {
        let i = self.offset(x, y);
        &self.data[i..i + self.layout.channels()]
    }

    pub fn pixel_slice_mut(&mut self, x: u32, y: u32) -> &mut [f32] {
        let i = self.offset(x, y);
        let n = self.layout.channels();
        &mut self.data[i..i + n]
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Colour {
        let mut c = Colour::new(self.layout);
        c.as_mut_slice().copy_from_slice(self.pixel_slice(x, y));
        c
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, colour: &Colour) {
        assert!(
            colour.layout() == self.layout,
            "put_pixel: colour layout {} does not match image layout {}",
            colour.layout(),
            self.layout
        );
        self.pixel_slice_mut(x, y).copy_from_slice(colour.as_slice());
    }

    /// The pixel at a fractional coordinate, or `bg` when it lies outside.
    pub(crate) fn pixel_or(&self, x: f32, y: f32, bg: &Colour) -> Colour {
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return *bg;
        }
        self.get_pixel(x as u32, y as u32)
    }

    /// Raw interleaved channel data.
    pub fn as_raw(&self) -> &[f32] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Raw channel data as native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Iterates over the pixels row by row, bottom row first.
    pub fn pixels(&self) -> impl Iterator<Item = Colour> + '_ {
        let layout = self.layout;
        self.data.chunks_exact(layout.channels()).map(move |px| {
            let mut c = Colour::new(layout);
            c.as_mut_slice().copy_from_slice(px);
            c
        })
    }

    /// A new image of the same size produced by mapping every pixel.
    pub(crate) fn map_pixels<F>(&self, layout: ChannelLayout, f: F) -> Image
    where
        F: Fn(Colour) -> Colour,
    {
        let mut data = Vec::with_capacity(self.num_pixels() * layout.channels());
        for c in self.pixels() {
            data.extend_from_slice(f(c).as_slice());
        }
        Image {
            width: self.width,
            height: self.height,
            layout,
            data,
        }
    }

    /// Negates every colour channel; alpha is carried over.
    pub fn unm(&self) -> Image {
        self.map_pixels(self.layout, |c| c.unm())
    }

    /// Absolute value of every colour channel; alpha is carried over.
    pub fn abs(&self) -> Image {
        self.map_pixels(self.layout, |c| c.abs())
    }
}

impl Raster for Image {
    fn layout(&self) -> ChannelLayout {
        self.layout
    }

    fn extent(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn sample(&self, x: u32, y: u32) -> Colour {
        self.get_pixel(x, y)
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image ({},{})x{}{}",
            self.width,
            self.height,
            self.layout.colour_channels(),
            if self.layout.has_alpha() { "A" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_and_get_pixel() {
        let c = Colour::rgba(0.1, 0.2, 0.3, 0.4);
        let img = Image::filled(3, 2, &c);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.as_raw().len(), 3 * 2 * 4);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(img.get_pixel(x, y), c);
            }
        }
    }

    #[test]
    fn test_from_vec_checks_length() {
        let err = Image::from_vec(2, 2, ChannelLayout::RGB, vec![0.0; 11]).unwrap_err();
        assert!(matches!(err, ImageError::LengthMismatch { expected: 12, actual: 11 }));
        assert!(Image::from_vec(2, 2, ChannelLayout::RGB, vec![0.0; 12]).is_ok());
    }

    #[test]
    fn test_from_vec_rejects_overflowing_size() {
        let err = Image::from_vec(u32::MAX, u32::MAX, ChannelLayout::RGB, vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, ImageError::InvalidArg(_)));
        assert_eq!(buffer_len(u32::MAX, u32::MAX, ChannelLayout::RGB), None);
        assert_eq!(buffer_len(0, u32::MAX, ChannelLayout::RGBA), Some(0));
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn test_new_panics_on_overflowing_size() {
        Image::new(u32::MAX, u32::MAX, ChannelLayout::RGB);
    }

    #[test]
    fn test_from_colours_row_major() {
        let px = [Colour::grey(1.0), Colour::grey(2.0), Colour::grey(3.0), Colour::grey(4.0)];
        let img = Image::from_colours(2, 2, ChannelLayout::MASK, &px).unwrap();
        assert_eq!(img.get_pixel(1, 0)[0], 2.0);
        assert_eq!(img.get_pixel(0, 1)[0], 3.0);
        assert!(Image::from_colours(2, 2, ChannelLayout::RGB, &px).is_err());
    }

    #[test]
    fn test_put_pixel_round_trip() {
        let mut img = Image::new(4, 4, ChannelLayout::GREY_ALPHA);
        img.put_pixel(3, 1, &Colour::grey_alpha(0.5, 0.25));
        assert_eq!(img.get_pixel(3, 1), Colour::grey_alpha(0.5, 0.25));
        assert_eq!(img.get_pixel(2, 1), Colour::new(ChannelLayout::GREY_ALPHA));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_get_pixel_out_of_bounds_panics() {
        Image::new(2, 2, ChannelLayout::MASK).get_pixel(2, 0);
    }

    #[test]
    fn test_unm_abs() {
        let img = Image::filled(2, 1, &Colour::grey_alpha(-0.5, 0.7));
        assert_eq!(img.unm().get_pixel(0, 0), Colour::grey_alpha(0.5, 0.7));
        assert_eq!(img.abs().get_pixel(1, 0), Colour::grey_alpha(0.5, 0.7));
    }

    #[test]
    fn test_colour_is_a_scalar_raster() {
        let c = Colour::rgb(1.0, 2.0, 3.0);
        assert_eq!(c.extent(), None);
        assert_eq!(c.sample(100, 7), c);
    }

    #[test]
    fn test_display() {
        let img = Image::new(5, 7, ChannelLayout::RGBA);
        assert_eq!(img.to_string(), "Image (5,7)x3A");
        assert_eq!(img.as_bytes().len(), 5 * 7 * 4 * 4);
    }
}
