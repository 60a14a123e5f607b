// src/image/convolve.rs

//! Kernel convolution.

use crate::colour::Colour;
use crate::image::buffer::Image;
use crate::image::wrap_coord;
use log::debug;

/// Resolves a sample coordinate that may fall off one edge of an axis.
#[inline]
fn edge_coord(v: i64, size: u32, wrap: bool) -> u32 {
    if wrap {
        wrap_coord(v, size)
    } else {
        v.clamp(0, size as i64 - 1) as u32
    }
}

impl Image {
    /// Convolves every channel, alpha included, with a single-channel kernel.
    ///
    /// The kernel is centred on `(kw/2, kh/2)`. Samples beyond an edge wrap
    /// around when the matching flag is set and otherwise repeat the edge
    /// pixel.
    pub fn convolve(&self, kernel: &Image, wrap_x: bool, wrap_y: bool) -> Image {
        assert!(
            kernel.layout().is_mask(),
            "convolve: kernel must be a single-channel image without alpha, got {}",
            kernel
        );
        debug!("convolve {} with {} wrap=({}, {})", self, kernel, wrap_x, wrap_y);
        if self.num_pixels() == 0 {
            return self.clone();
        }

        let kcx = (kernel.width() / 2) as i64;
        let kcy = (kernel.height() / 2) as i64;
        Image::from_fn(self.width(), self.height(), self.layout(), |x, y| {
            let mut acc = Colour::new(self.layout());
            for ky in 0..kernel.height() {
                let sy = edge_coord(y as i64 + ky as i64 - kcy, self.height(), wrap_y);
                for kx in 0..kernel.width() {
                    let kv = kernel.pixel_slice(kx, ky)[0];
                    let sx = edge_coord(x as i64 + kx as i64 - kcx, self.width(), wrap_x);
                    for (a, v) in acc.as_mut_slice().iter_mut().zip(self.pixel_slice(sx, sy)) {
                        *a += v * kv;
                    }
                }
            }
            acc
        })
    }
}
