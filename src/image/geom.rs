// src/image/geom.rs

//! Crop, rotate and mirror.

use crate::colour::{self, Colour};
use crate::image::buffer::Image;
use crate::image::wrap_coord;
use log::debug;

fn check_background(img: &Image, bg: &Colour, op: &str) {
    assert!(
        bg.layout() == img.layout(),
        "{}: background layout {} does not match image layout {}",
        op,
        bg.layout(),
        img.layout()
    );
}

impl Image {
    /// Cuts a `w × h` window whose bottom-left corner sits at `(left, bottom)`.
    ///
    /// Without a background, source coordinates wrap around the image edges.
    /// With one, pixels outside the source take the background colour.
    pub fn crop(&self, left: i32, bottom: i32, w: u32, h: u32, bg: Option<&Colour>) -> Image {
        match bg {
            // Nothing to wrap around; the window stays zero.
            None if self.num_pixels() == 0 => Image::new(w, h, self.layout()),
            None => Image::from_fn(w, h, self.layout(), |x, y| {
                let old_x = wrap_coord(x as i64 + left as i64, self.width());
                let old_y = wrap_coord(y as i64 + bottom as i64, self.height());
                self.get_pixel(old_x, old_y)
            }),
            Some(bg) => {
                check_background(self, bg, "crop");
                Image::from_fn(w, h, self.layout(), |x, y| {
                    let old_x = x as i64 + left as i64;
                    let old_y = y as i64 + bottom as i64;
                    if (0..self.width() as i64).contains(&old_x) && (0..self.height() as i64).contains(&old_y) {
                        self.get_pixel(old_x as u32, old_y as u32)
                    } else {
                        *bg
                    }
                })
            }
        }
    }

    /// Rotates by `angle` degrees about the image centre.
    ///
    /// The result is the smallest axis-aligned box holding the rotated
    /// source. Each output pixel is mapped back into the source and sampled
    /// bilinearly; anything landing outside takes `bg`, which defaults to all
    /// channels zero.
    pub fn rotate(&self, angle: f32, bg: Option<&Colour>) -> Image {
        let bg = match bg {
            Some(bg) => {
                check_background(self, bg, "rotate");
                *bg
            }
            None => Colour::new(self.layout()),
        };
        let rad = (angle as f64).to_radians();
        let s = rad.sin() as f32;
        let c = rad.cos() as f32;
        let (width, height) = (self.width() as f32, self.height() as f32);
        let w = (c.abs() * width + s.abs() * height + 0.5) as u32;
        let h = (s.abs() * width + c.abs() * height + 0.5) as u32;
        debug!("rotate {} by {} degrees -> {}x{}", self, angle, w, h);

        Image::from_fn(w, h, self.layout(), |x, y| {
            let rel_x = x as f32 - w as f32 / 2.0 + 0.5;
            let rel_y = y as f32 - h as f32 / 2.0 + 0.5;
            let src_x = c * rel_x - s * rel_y + width / 2.0;
            let src_y = s * rel_x + c * rel_y + height / 2.0;
            if !(src_x >= 0.0 && src_x < width && src_y >= 0.0 && src_y < height) {
                return bg;
            }
            // Shift from pixel-centre to pixel-corner coordinates.
            let src_x = src_x - 0.5;
            let src_y = src_y - 0.5;
            let (fx, fy) = (src_x.floor(), src_y.floor());
            let c00 = self.pixel_or(fx, fy, &bg);
            let c01 = self.pixel_or(fx + 1.0, fy, &bg);
            let c10 = self.pixel_or(fx, fy + 1.0, &bg);
            let c11 = self.pixel_or(fx + 1.0, fy + 1.0, &bg);
            let c0x = colour::lerp(&c00, &c01, src_x - fx);
            let c1x = colour::lerp(&c10, &c11, src_x - fx);
            colour::lerp(&c0x, &c1x, src_y - fy)
        })
    }

    /// Full copy, optionally mirrored horizontally and/or vertically.
    pub fn clone_flipped(&self, flip_x: bool, flip_y: bool) -> Image {
        let (w, h) = self.dimensions();
        Image::from_fn(w, h, self.layout(), |x, y| {
            let sx = if flip_x { w - x - 1 } else { x };
            let sy = if flip_y { h - y - 1 } else { y };
            self.get_pixel(sx, sy)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::ChannelLayout;

    fn ramp(w: u32, h: u32) -> Image {
        Image::from_fn(w, h, ChannelLayout::MASK, |x, y| Colour::grey((y * w + x) as f32))
    }

    fn values(img: &Image) -> Vec<f32> {
        img.as_raw().to_vec()
    }

    #[test]
    fn test_crop_identity() {
        let img = ramp(4, 3);
        assert_eq!(img.crop(0, 0, 4, 3, None), img);
    }

    #[test]
    fn test_crop_wraps_without_background() {
        let img = ramp(3, 2);
        let out = img.crop(-1, 1, 3, 2, None);
        // x=-1 wraps to 2, y=1 then y=2 wraps to 0
        assert_eq!(values(&out), vec![5.0, 3.0, 4.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_crop_of_empty_image() {
        let img = Image::new(3, 0, ChannelLayout::RGB);
        let out = img.crop(1, 1, 2, 2, None);
        assert_eq!(out, Image::new(2, 2, ChannelLayout::RGB));
        let bg = Colour::rgb(1.0, 0.0, 0.0);
        assert_eq!(img.crop(0, 0, 1, 1, Some(&bg)), Image::filled(1, 1, &bg));
    }

    #[test]
    fn test_crop_fills_with_background() {
        let img = ramp(3, 2);
        let bg = Colour::grey(-1.0);
        let out = img.crop(1, -1, 3, 2, Some(&bg));
        assert_eq!(values(&out), vec![-1.0, -1.0, -1.0, 1.0, 2.0, -1.0]);
    }

    #[test]
    fn test_clone_flip_axes() {
        let img = ramp(3, 2);
        assert_eq!(values(&img.clone_flipped(true, false)), vec![2.0, 1.0, 0.0, 5.0, 4.0, 3.0]);
        assert_eq!(values(&img.clone_flipped(false, true)), vec![3.0, 4.0, 5.0, 0.0, 1.0, 2.0]);
        assert_eq!(img.clone_flipped(false, false), img);
    }

    #[test]
    fn test_clone_double_flip_is_identity() {
        let img = ramp(5, 4);
        assert_eq!(img.clone_flipped(true, true).clone_flipped(true, true), img);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = ramp(4, 3);
        assert_eq!(img.rotate(0.0, None), img);
    }

    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let img = ramp(4, 2);
        let out = img.rotate(90.0, None);
        assert_eq!(out.dimensions(), (2, 4));
    }

    #[test]
    fn test_rotate_180_reverses_pixels() {
        let img = ramp(3, 3);
        let out = img.rotate(180.0, None);
        let mut expected = values(&img);
        expected.reverse();
        for (a, b) in values(&out).iter().zip(expected) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_rotate_45_corners_take_background() {
        let img = Image::filled(4, 4, &Colour::grey(1.0));
        let bg = Colour::grey(-1.0);
        let out = img.rotate(45.0, Some(&bg));
        assert_eq!(out.dimensions(), (6, 6));
        assert_eq!(out.get_pixel(0, 0), bg);
        assert_eq!(out.get_pixel(5, 5), bg);
        assert!((out.get_pixel(3, 3)[0] - 1.0).abs() < 1e-5);
    }
}
