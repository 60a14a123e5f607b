// src/image/quantise.rs

//! Precision reduction with optional Floyd-Steinberg error diffusion.

use crate::colour::{Colour, add_gamma, gamma_decode};
use crate::image::buffer::Image;
use crate::utils::error::ImageError;
use log::debug;
use std::str::FromStr;

/// How quantisation error is handled by [`Image::quantise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherMode {
    /// Snap each value independently.
    #[default]
    None,
    /// Diffuse error measured in linear light; alpha uses the linear variant.
    FloydSteinberg,
    /// Diffuse the raw residual in stored space.
    FloydSteinbergLinear,
}

impl FromStr for DitherMode {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "none" => Ok(DitherMode::None),
            "floydsteinberg" | "fs" => Ok(DitherMode::FloydSteinberg),
            "floydsteinberglinear" | "fslinear" => Ok(DitherMode::FloydSteinbergLinear),
            _ => Err(ImageError::InvalidArg(format!("unknown dither mode '{}'", s))),
        }
    }
}

/// Forward neighbours of the classic kernel as `(dx, dy, weight)`.
///
/// `dy` is +1 here because the pass walks rows in storage order.
const FLOYD_STEINBERG: [(i64, i64, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

impl Image {
    /// Snaps every channel `c` to one of `resolution[c]` evenly spaced levels
    /// in `[0, 1]`: `round(v·(n-1))/(n-1)`.
    ///
    /// With a Floyd-Steinberg mode the pass runs in raster order over a copy
    /// of the source, pushing each pixel's residual onto its not yet visited
    /// neighbours. Neighbours outside the image are skipped.
    pub fn quantise(&self, mode: DitherMode, resolution: &Colour) -> Image {
        assert!(
            resolution.layout() == self.layout(),
            "quantise: resolution layout {} does not match image layout {}",
            resolution.layout(),
            self.layout()
        );
        debug!("quantise {} with {:?} to {:?}", self, mode, resolution.as_slice());

        let mut ret = self.clone();
        let (width, height) = self.dimensions();
        let colour_channels = self.colour_channels();

        for y in 0..height {
            for x in 0..width {
                for c in 0..self.channels() {
                    let levels = resolution[c] - 1.0;
                    let desired = ret.pixel_slice(x, y)[c] * levels;
                    let actual = (desired + 0.5).floor();
                    match mode {
                        DitherMode::FloydSteinberg if c < colour_channels => {
                            let err = gamma_decode(desired / levels) - gamma_decode(actual / levels);
                            ret.diffuse(x, y, |v, w| add_gamma(&mut v[c], err * w));
                        }
                        DitherMode::FloydSteinberg | DitherMode::FloydSteinbergLinear => {
                            let err = (desired - actual) / levels;
                            ret.diffuse(x, y, |v, w| v[c] += err * w);
                        }
                        DitherMode::None => {}
                    }
                    ret.pixel_slice_mut(x, y)[c] = actual / levels;
                }
            }
        }
        ret
    }

    /// Applies `f(pixel, weight)` to each in-bounds forward neighbour of `(x, y)`.
    fn diffuse<F>(&mut self, x: u32, y: u32, mut f: F)
    where
        F: FnMut(&mut [f32], f32),
    {
        for (dx, dy, w) in FLOYD_STEINBERG {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= self.width() as i64 || ny >= self.height() as i64 {
                continue;
            }
            f(self.pixel_slice_mut(nx as u32, ny as u32), w);
        }
    }
}
