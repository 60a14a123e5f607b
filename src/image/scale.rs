// src/image/scale.rs

//! Separable resampling with a choice of reconstruction filters.
//!
//! Scaling runs a horizontal pass into an intermediate `new_width × height`
//! buffer, then a vertical pass. Each pass precomputes, for every output
//! column (or row), the contributing source range and its normalised weights.
//! When minifying, the filter support is stretched by the inverse scale
//! factor so that every source pixel contributes.

use crate::colour::Colour;
use crate::image::buffer::Image;
use crate::utils::error::ImageError;
use log::{debug, trace};
use std::f64::consts::PI;
use std::str::FromStr;

/// Reconstruction kernel used by [`Image::scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFilter {
    /// Nearest/area box, support 0.5.
    Box,
    /// Triangle filter, support 1.
    #[default]
    Bilinear,
    /// Cubic B-spline (B=1, C=0), support 2. Smooth, not interpolating.
    BSpline,
    /// Mitchell-Netravali cubic (B=C=1/3), support 2.
    Bicubic,
    /// Catmull-Rom cubic (B=0, C=0.5), support 2.
    CatmullRom,
    /// Lanczos windowed sinc with three lobes, support 3.
    Lanczos3,
}

impl ScaleFilter {
    /// Radius of the filter in source pixels at unit scale.
    pub fn support(self) -> f64 {
        match self {
            ScaleFilter::Box => 0.5,
            ScaleFilter::Bilinear => 1.0,
            ScaleFilter::BSpline | ScaleFilter::Bicubic | ScaleFilter::CatmullRom => 2.0,
            ScaleFilter::Lanczos3 => 3.0,
        }
    }

    /// Kernel weight at distance `x` from the sample centre.
    pub fn weight(self, x: f64) -> f64 {
        let ax = x.abs();
        match self {
            ScaleFilter::Box => {
                if ax <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ScaleFilter::Bilinear => (1.0 - ax).max(0.0),
            ScaleFilter::BSpline => cubic_bc(ax, 1.0, 0.0),
            ScaleFilter::Bicubic => cubic_bc(ax, 1.0 / 3.0, 1.0 / 3.0),
            ScaleFilter::CatmullRom => cubic_bc(ax, 0.0, 0.5),
            ScaleFilter::Lanczos3 => {
                if ax < 3.0 {
                    sinc(ax) * sinc(ax / 3.0)
                } else {
                    0.0
                }
            }
        }
    }
}

impl FromStr for ScaleFilter {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "box" | "nearest" => Ok(ScaleFilter::Box),
            "bilinear" | "linear" | "triangle" => Ok(ScaleFilter::Bilinear),
            "bspline" => Ok(ScaleFilter::BSpline),
            "bicubic" | "cubic" | "mitchell" => Ok(ScaleFilter::Bicubic),
            "catmullrom" | "catrom" => Ok(ScaleFilter::CatmullRom),
            "lanczos" | "lanczos3" => Ok(ScaleFilter::Lanczos3),
            _ => Err(ImageError::InvalidArg(format!("unknown scale filter '{}'", s))),
        }
    }
}

/// Mitchell-Netravali family of cubics, evaluated at `x >= 0`.
fn cubic_bc(x: f64, b: f64, c: f64) -> f64 {
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x + (6.0 * b + 30.0 * c) * x * x + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Source taps for one output sample.
#[derive(Debug, Clone)]
struct Contribution {
    start: u32,
    weights: Vec<f32>,
}

/// Weights for resampling one axis from `src_len` to `dst_len` samples.
fn contributions(filter: ScaleFilter, src_len: u32, dst_len: u32) -> Vec<Contribution> {
    let scale = dst_len as f64 / src_len as f64;
    // Minifying stretches the kernel over more source pixels.
    let (support, fscale) = if scale < 1.0 {
        (filter.support() / scale, scale)
    } else {
        (filter.support(), 1.0)
    };

    (0..dst_len)
        .map(|u| {
            let center = (u as f64 + 0.5) / scale;
            let left = ((center - support).floor() as i64).max(0);
            let right = ((center + support).ceil() as i64).min(src_len as i64 - 1);
            let mut weights: Vec<f64> = (left..=right)
                .map(|i| filter.weight((i as f64 + 0.5 - center) * fscale))
                .collect();
            let total: f64 = weights.iter().sum();
            if total.abs() > f64::EPSILON {
                for w in &mut weights {
                    *w /= total;
                }
                Contribution {
                    start: left as u32,
                    weights: weights.into_iter().map(|w| w as f32).collect(),
                }
            } else {
                // No tap landed under the kernel; fall back to the nearest pixel.
                let nearest = (center.floor() as i64).clamp(0, src_len as i64 - 1);
                trace!("scale: empty kernel at {}, using pixel {}", u, nearest);
                Contribution {
                    start: nearest as u32,
                    weights: vec![1.0],
                }
            }
        })
        .collect()
}

fn accumulate(acc: &mut Colour, px: &[f32], w: f32) {
    for (a, v) in acc.as_mut_slice().iter_mut().zip(px) {
        *a += w * v;
    }
}

impl Image {
    /// Resamples to `width × height` with the given filter.
    ///
    /// All channels, alpha included, are filtered independently.
    pub fn scale(&self, width: u32, height: u32, filter: ScaleFilter) -> Image {
        debug!("scale {} to {}x{} with {:?}", self, width, height, filter);
        if self.num_pixels() == 0 || width == 0 || height == 0 {
            return Image::new(width, height, self.layout());
        }

        let across = contributions(filter, self.width(), width);
        let horizontal = Image::from_fn(width, self.height(), self.layout(), |x, y| {
            let tap = &across[x as usize];
            let mut acc = Colour::new(self.layout());
            for (k, &w) in tap.weights.iter().enumerate() {
                accumulate(&mut acc, self.pixel_slice(tap.start + k as u32, y), w);
            }
            acc
        });

        let down = contributions(filter, self.height(), height);
        Image::from_fn(width, height, self.layout(), |x, y| {
            let tap = &down[y as usize];
            let mut acc = Colour::new(self.layout());
            for (k, &w) in tap.weights.iter().enumerate() {
                accumulate(&mut acc, horizontal.pixel_slice(x, tap.start + k as u32), w);
            }
            acc
        })
    }
}
