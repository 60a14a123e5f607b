// src/image/draw.rs

//! In-place drawing onto an existing image.
//!
//! These are the only operations that mutate their receiver. Every touched
//! pixel is composited with [`colour::blend`], so drawn colours must carry
//! alpha.

use crate::colour::{self, Colour};
use crate::image::buffer::Image;
use crate::image::wrap_coord;
use log::trace;

impl Image {
    /// Blends `colour` over the pixel at `(x, y)`.
    ///
    /// `alpha` scales the colour's own alpha before blending. Panics when the
    /// coordinate is outside the image or `colour` has no alpha channel.
    pub fn draw_pixel(&mut self, x: u32, y: u32, colour: &Colour, alpha: f32) {
        assert!(colour.has_alpha(), "draw_pixel: colour {} has no alpha channel", colour.layout());
        let mut c = *colour;
        let ai = c.colour_channels();
        c[ai] *= alpha;
        let blended = colour::blend(&c, &self.get_pixel(x, y));
        self.put_pixel(x, y, &blended);
    }

    /// Like [`Image::draw_pixel`], but silently ignores coordinates outside the image.
    pub fn draw_pixel_clipped(&mut self, x: i32, y: i32, colour: &Colour, alpha: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        self.draw_pixel(x as u32, y as u32, colour, alpha);
    }

    /// Draws a line `w` pixels thick from `(x0, y0)` to `(x1, y1)`.
    ///
    /// Bresenham stepping, widened perpendicular to the major axis by the band
    /// `(1-w)/2 ..= w/2`. Each pixel of the line is blended exactly once, so
    /// translucent colours do not darken where the band overlaps itself at the
    /// caps or at diagonal steps. Pixels outside the image are skipped.
    pub fn draw_line(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, w: u32, colour: &Colour) {
        let (x0, y0, x1, y1) = (x0 as i32, y0 as i32, x1 as i32, y1 as i32);
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        let steep = dy > dx;

        let dm = (1 - w as i32) / 2;
        let dmax = w as i32 / 2;
        assert!(dmax - dm + 1 == w as i32, "draw_line: invalid line width {}", w);
        trace!("draw_line ({},{})-({},{}) width {} steep {}", x0, y0, x1, y1, w, steep);

        // Start cap: the half of the square brush behind the start point.
        if steep {
            for i in dm..=dmax {
                for j in dm..=0 {
                    self.draw_pixel_clipped(x0 + i, y0 + sy * j, colour, 1.0);
                }
            }
        } else {
            for i in dm..=0 {
                for j in dm..=dmax {
                    self.draw_pixel_clipped(x0 + sx * i, y0 + j, colour, 1.0);
                }
            }
        }

        let (mut x, mut y) = (x0, y0);
        while x != x1 || y != y1 {
            let err2 = 2 * err;
            let mut moved = 0;
            if err2 > -dy {
                err -= dy;
                x += sx;
                moved += 1;
            }
            if !(x == x1 && y == y1) && err2 < dx {
                err += dx;
                y += sy;
                moved += 1;
            }
            // Only the pixels new to this step; a diagonal step also needs
            // the corner the band would otherwise leave open.
            if steep {
                for i in dm..=dmax {
                    self.draw_pixel_clipped(x + i, y, colour, 1.0);
                }
                if moved == 2 {
                    self.draw_pixel_clipped(x + if sx == 1 { dmax } else { dm }, y - sy, colour, 1.0);
                }
            } else {
                for i in dm..=dmax {
                    self.draw_pixel_clipped(x, y + i, colour, 1.0);
                }
                if moved == 2 {
                    self.draw_pixel_clipped(x - sx, y + if sy == 1 { dmax } else { dm }, colour, 1.0);
                }
            }
        }

        // End cap: the mirror image of the start cap.
        if steep {
            for i in dm..=dmax {
                for j in 1..=dmax {
                    self.draw_pixel_clipped(x1 + i, y1 + sy * j, colour, 1.0);
                }
            }
        } else {
            for i in 1..=dmax {
                for j in dm..=dmax {
                    self.draw_pixel_clipped(x1 + sx * i, y1 + j, colour, 1.0);
                }
            }
        }
    }

    /// Blends `src` over this image with its bottom-left corner at `(left, bottom)`.
    ///
    /// Per axis, destination coordinates either wrap around this image or are
    /// clipped. `src` must carry alpha and match this image's colour channels.
    pub fn draw_image(&mut self, src: &Image, left: i32, bottom: i32, wrap_x: bool, wrap_y: bool) {
        assert!(
            src.has_alpha() && src.colour_channels() == self.colour_channels(),
            "draw_image: cannot draw {} onto {}",
            src,
            self
        );
        if self.num_pixels() == 0 {
            return;
        }
        for y in 0..src.height() {
            for x in 0..src.width() {
                let dst_x = x as i64 + left as i64;
                let dst_y = y as i64 + bottom as i64;
                let dst_x = if wrap_x {
                    wrap_coord(dst_x, self.width())
                } else if (0..self.width() as i64).contains(&dst_x) {
                    dst_x as u32
                } else {
                    continue;
                };
                let dst_y = if wrap_y {
                    wrap_coord(dst_y, self.height())
                } else if (0..self.height() as i64).contains(&dst_y) {
                    dst_y as u32
                } else {
                    continue;
                };
                let blended = colour::blend(&src.get_pixel(x, y), &self.get_pixel(dst_x, dst_y));
                self.put_pixel(dst_x, dst_y, &blended);
            }
        }
    }
}
