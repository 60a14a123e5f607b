// src/image/pointwise.rs

//! Per-pixel maps driven by per-channel parameters.

use crate::colour::{Colour, signed_pow};
use crate::image::buffer::Image;

fn check_param(img: &Image, param: &Colour, op: &str) {
    assert!(
        param.layout() == img.layout(),
        "{}: parameter layout {} does not match image layout {}",
        op,
        param.layout(),
        img.layout()
    );
}

impl Image {
    /// Scales every channel so its positive values sum to 1 and its negative
    /// values sum to -1.
    ///
    /// A channel with no positive (or no negative) mass divides by zero for
    /// those values; the result is then whatever the float division gives.
    pub fn normalise(&self) -> Image {
        let mut pos_total = Colour::new(self.layout());
        let mut neg_total = Colour::new(self.layout());
        for px in self.pixels() {
            for (c, &v) in px.as_slice().iter().enumerate() {
                if v >= 0.0 {
                    pos_total[c] += v;
                } else {
                    neg_total[c] -= v;
                }
            }
        }
        self.map_pixels(self.layout(), |px| {
            px.map_channels(|c, v| if v >= 0.0 { v / pos_total[c] } else { v / neg_total[c] })
        })
    }

    /// Clamps every channel into `[min[c], max[c]]`.
    pub fn clamp(&self, min: &Colour, max: &Colour) -> Image {
        check_param(self, min, "clamp");
        check_param(self, max, "clamp");
        self.map_pixels(self.layout(), |px| {
            px.map_channels(|c, v| {
                let mut v = v;
                if v < min[c] {
                    v = min[c];
                }
                if v > max[c] {
                    v = max[c];
                }
                v
            })
        })
    }

    /// Raises every channel to `exponent[c]`, preserving sign.
    pub fn gamma(&self, exponent: &Colour) -> Image {
        check_param(self, exponent, "gamma");
        self.map_pixels(self.layout(), |px| px.map_channels(|c, v| signed_pow(v, exponent[c])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::ChannelLayout;

    #[test]
    fn test_normalise_positive() {
        let img = Image::from_vec(2, 2, ChannelLayout::MASK, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let out = img.normalise();
        let expected = [0.1, 0.2, 0.3, 0.4];
        for (a, b) in out.as_raw().iter().zip(expected) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalise_signed_masses() {
        let img = Image::from_vec(4, 1, ChannelLayout::MASK, vec![-1.0, -3.0, 2.0, 2.0]).unwrap();
        let out = img.normalise();
        assert_eq!(out.as_raw(), &[-0.25, -0.75, 0.5, 0.5]);
    }

    #[test]
    fn test_normalise_per_channel() {
        let img = Image::from_fn(2, 1, ChannelLayout::GREY_ALPHA, |x, _| {
            Colour::grey_alpha(x as f32 + 1.0, 0.5)
        });
        let out = img.normalise();
        assert_eq!(out.get_pixel(0, 0), Colour::grey_alpha(1.0 / 3.0, 0.5));
        assert_eq!(out.get_pixel(1, 0), Colour::grey_alpha(2.0 / 3.0, 0.5));
    }

    #[test]
    fn test_clamp() {
        let img = Image::from_vec(3, 1, ChannelLayout::GREY_ALPHA, vec![-1.0, 2.0, 0.5, 0.5, 3.0, -2.0])
            .unwrap();
        let out = img.clamp(&Colour::grey_alpha(0.0, 0.0), &Colour::grey_alpha(1.0, 1.0));
        assert_eq!(out.as_raw(), &[0.0, 1.0, 0.5, 0.5, 1.0, 0.0]);
    }

    #[test]
    fn test_gamma_keeps_sign() {
        let img = Image::from_vec(3, 1, ChannelLayout::MASK, vec![-4.0, 0.0, 9.0]).unwrap();
        let out = img.gamma(&Colour::grey(0.5));
        assert_eq!(out.as_raw(), &[-2.0, 0.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "parameter layout")]
    fn test_clamp_rejects_layout_mismatch() {
        let img = Image::new(1, 1, ChannelLayout::RGB);
        img.clamp(&Colour::grey(0.0), &Colour::grey(1.0));
    }
}
