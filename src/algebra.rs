// src/algebra.rs

//! Image-level compositing: zip, blend, lerp and zip-reduce.
//!
//! Every operation takes two [`Raster`] operands, each either an [`Image`] or
//! a constant [`Colour`] broadcast over the other operand's extent. A
//! [`Shape`] says how channel layouts line up:
//!
//! - [`Shape::Regular`]: both operands have the same colour channel count.
//! - [`Shape::LeftMask`]: the left operand is a single-channel mask whose value
//!   is repeated across the right operand's channels.
//! - [`Shape::RightMask`]: the mirror image.
//!
//! Operands that fit none of these, or images of different sizes, are a
//! programming error and panic.

use crate::colour::{self, ChannelLayout, Colour};
use crate::image::buffer::{Image, Raster};
use log::trace;

/// How the channel layouts of two operands are matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Regular,
    LeftMask,
    RightMask,
}

impl Shape {
    /// Picks the shape that fits two layouts, if any.
    ///
    /// Matching colour channel counts are `Regular`, even for two masks.
    pub fn infer(left: ChannelLayout, right: ChannelLayout) -> Option<Shape> {
        if left.colour_channels() == right.colour_channels() {
            Some(Shape::Regular)
        } else if left.is_mask() {
            Some(Shape::LeftMask)
        } else if right.is_mask() {
            Some(Shape::RightMask)
        } else {
            None
        }
    }
}

/// Named binary operators for [`zip`] and [`zip_reduce`].
pub mod ops {
    pub fn add(a: f32, b: f32) -> f32 {
        a + b
    }

    pub fn sub(a: f32, b: f32) -> f32 {
        a - b
    }

    pub fn mul(a: f32, b: f32) -> f32 {
        a * b
    }

    pub fn div(a: f32, b: f32) -> f32 {
        a / b
    }

    pub fn pow(a: f32, b: f32) -> f32 {
        a.powf(b)
    }

    pub fn min(a: f32, b: f32) -> f32 {
        a.min(b)
    }

    pub fn max(a: f32, b: f32) -> f32 {
        a.max(b)
    }
}

fn assert_mask(layout: ChannelLayout, side: &str) {
    assert!(layout.is_mask(), "{} operand must be a single-channel mask, got {}", side, layout);
}

/// Size of the result: the image operand's, or 1×1 when both are colours.
fn extent_of<A, B>(a: &A, b: &B) -> (u32, u32)
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    match (a.extent(), b.extent()) {
        (Some(ea), Some(eb)) => {
            assert!(
                ea == eb,
                "operand sizes differ: {}x{} vs {}x{}",
                ea.0,
                ea.1,
                eb.0,
                eb.1
            );
            eb
        }
        (Some(e), None) | (None, Some(e)) => e,
        (None, None) => (1, 1),
    }
}

/// Layout produced by zip and blend for the given operand shape.
fn composite_layout(a: ChannelLayout, b: ChannelLayout, shape: Shape) -> ChannelLayout {
    match shape {
        Shape::Regular => {
            assert!(
                a.colour_channels() == b.colour_channels(),
                "colour channel mismatch ({} vs {})",
                a,
                b
            );
            b
        }
        Shape::LeftMask => {
            assert_mask(a, "left");
            b
        }
        Shape::RightMask => {
            assert_mask(b, "right");
            a.without_alpha()
        }
    }
}

/// Layout shared by both sides of lerp and zip-reduce.
fn matched_layout(a: ChannelLayout, b: ChannelLayout, shape: Shape) -> ChannelLayout {
    match shape {
        Shape::Regular => {
            assert!(a == b, "layout mismatch ({} vs {})", a, b);
            b
        }
        Shape::LeftMask => {
            assert_mask(a, "left");
            b
        }
        Shape::RightMask => {
            assert_mask(b, "right");
            a
        }
    }
}

/// Per-pixel zip for a given shape. A mask stands in for every colour channel.
pub fn zip_colours<F>(a: &Colour, b: &Colour, shape: Shape, op: F) -> Colour
where
    F: Fn(f32, f32) -> f32,
{
    composite_layout(a.layout(), b.layout(), shape);
    match shape {
        Shape::Regular => colour::zip(a, b, op),
        Shape::LeftMask => colour::zip(&Colour::splat(b.layout().without_alpha(), a[0]), b, op),
        Shape::RightMask => colour::zip(a, &Colour::splat(a.layout().without_alpha(), b[0]), op),
    }
}

/// Per-pixel blend (`a` over `b`) for a given shape.
pub fn blend_colours(a: &Colour, b: &Colour, shape: Shape) -> Colour {
    composite_layout(a.layout(), b.layout(), shape);
    match shape {
        Shape::Regular => colour::blend(a, b),
        Shape::LeftMask => colour::blend(&Colour::splat(b.layout().without_alpha(), a[0]), b),
        Shape::RightMask => colour::blend(a, &Colour::splat(a.layout().without_alpha(), b[0])),
    }
}

/// Per-pixel lerp for a given shape. A mask is repeated across every channel
/// of the other operand, alpha included.
pub fn lerp_colours(a: &Colour, b: &Colour, shape: Shape, t: f32) -> Colour {
    let (ca, cb) = broadcast_pair(a, b, shape);
    colour::lerp(&ca, &cb, t)
}

fn broadcast_pair(a: &Colour, b: &Colour, shape: Shape) -> (Colour, Colour) {
    let layout = matched_layout(a.layout(), b.layout(), shape);
    match shape {
        Shape::Regular => (*a, *b),
        Shape::LeftMask => (Colour::splat(layout, a[0]), *b),
        Shape::RightMask => (*a, Colour::splat(layout, b[0])),
    }
}

fn combine<A, B, F>(a: &A, b: &B, layout: ChannelLayout, f: F) -> Image
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
    F: Fn(&Colour, &Colour) -> Colour,
{
    let (w, h) = extent_of(a, b);
    trace!("combine {}x{} -> {}", w, h, layout);
    Image::from_fn(w, h, layout, |x, y| f(&a.sample(x, y), &b.sample(x, y)))
}

/// Applies `op` channel by channel across two operands.
///
/// An alpha channel on `a` weights the effect of `op` on `b`; the result
/// keeps `b`'s alpha (or has none for [`Shape::RightMask`]).
pub fn zip<A, B, F>(a: &A, b: &B, shape: Shape, op: F) -> Image
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
    F: Fn(f32, f32) -> f32,
{
    let layout = composite_layout(a.layout(), b.layout(), shape);
    combine(a, b, layout, |ca, cb| zip_colours(ca, cb, shape, &op))
}

/// Composites `a` over `b` pixel by pixel.
pub fn blend<A, B>(a: &A, b: &B, shape: Shape) -> Image
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let layout = composite_layout(a.layout(), b.layout(), shape);
    combine(a, b, layout, |ca, cb| blend_colours(ca, cb, shape))
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1) over every channel.
pub fn lerp<A, B>(a: &A, b: &B, shape: Shape, t: f32) -> Image
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    let layout = matched_layout(a.layout(), b.layout(), shape);
    combine(a, b, layout, |ca, cb| lerp_colours(ca, cb, shape, t))
}

/// Zips two operands with `zop`, then folds every resulting channel value
/// into a single colour with `rop`, starting from zero.
///
/// Unlike [`zip`], alpha here is an ordinary channel: it is zipped and
/// reduced like the others.
pub fn zip_reduce<A, B, Z, R>(a: &A, b: &B, shape: Shape, zop: Z, rop: R) -> Colour
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
    Z: Fn(f32, f32) -> f32,
    R: Fn(f32, f32) -> f32,
{
    let layout = matched_layout(a.layout(), b.layout(), shape);
    let (w, h) = extent_of(a, b);
    let mut r = Colour::new(layout);
    for y in 0..h {
        for x in 0..w {
            let (ca, cb) = broadcast_pair(&a.sample(x, y), &b.sample(x, y), shape);
            for c in 0..layout.channels() {
                r[c] = rop(r[c], zop(ca[c], cb[c]));
            }
        }
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_ramp() -> Image {
        Image::from_fn(3, 2, ChannelLayout::RGBA, |x, y| {
            Colour::rgba(x as f32, y as f32, 1.0, 0.5)
        })
    }

    #[test]
    fn test_infer_shape() {
        assert_eq!(Shape::infer(ChannelLayout::RGB, ChannelLayout::RGBA), Some(Shape::Regular));
        assert_eq!(Shape::infer(ChannelLayout::MASK, ChannelLayout::RGBA), Some(Shape::LeftMask));
        assert_eq!(Shape::infer(ChannelLayout::RGB, ChannelLayout::MASK), Some(Shape::RightMask));
        assert_eq!(Shape::infer(ChannelLayout::GREY_ALPHA, ChannelLayout::RGB), None);
        assert_eq!(Shape::infer(ChannelLayout::new(2, false), ChannelLayout::RGB), None);
    }

    #[test]
    fn test_zip_image_with_colour() {
        let img = rgba_ramp();
        let out = zip(&Colour::rgb(10.0, 20.0, 30.0), &img, Shape::Regular, ops::add);
        assert_eq!(out.layout(), ChannelLayout::RGBA);
        assert_eq!(out.get_pixel(2, 1), Colour::rgba(12.0, 21.0, 31.0, 0.5));
    }

    #[test]
    fn test_zip_left_mask_broadcasts() {
        let mask = Image::from_fn(3, 2, ChannelLayout::MASK, |x, _| Colour::grey(x as f32));
        let out = zip(&mask, &rgba_ramp(), Shape::LeftMask, ops::mul);
        assert_eq!(out.get_pixel(2, 1), Colour::rgba(4.0, 2.0, 2.0, 0.5));
    }

    #[test]
    fn test_zip_right_mask_drops_alpha() {
        let out = zip(&rgba_ramp(), &Colour::grey(2.0), Shape::RightMask, ops::sub);
        assert_eq!(out.layout(), ChannelLayout::RGB);
        // alpha 0.5 weights the op: 0.5*2 + 0.5*(x - 2)
        assert_eq!(out.get_pixel(2, 0), Colour::rgb(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_blend_images() {
        let top = Image::filled(2, 2, &Colour::rgba(1.0, 0.0, 0.0, 1.0));
        let bottom = Image::filled(2, 2, &Colour::rgba(0.0, 0.0, 1.0, 0.5));
        let out = blend(&top, &bottom, Shape::Regular);
        assert!(out.pixels().all(|p| p == Colour::rgba(1.0, 0.0, 0.0, 1.0)));
        let out = blend(&bottom, &top, Shape::Regular);
        assert!(out.pixels().all(|p| p == Colour::rgba(0.5, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn test_blend_left_mask_is_opaque_overwrite() {
        let out = blend(&Colour::grey(0.25), &rgba_ramp(), Shape::LeftMask);
        assert!(out.pixels().all(|p| p == Colour::rgba(0.25, 0.25, 0.25, 0.5)));
    }

    #[test]
    fn test_lerp_endpoints_and_masks() {
        let a = rgba_ramp();
        let b = Image::filled(3, 2, &Colour::rgba(9.0, 9.0, 9.0, 1.0));
        assert_eq!(lerp(&a, &b, Shape::Regular, 0.0), a);
        assert_eq!(lerp(&a, &b, Shape::Regular, 1.0), b);
        let out = lerp(&a, &Colour::grey(1.0), Shape::RightMask, 0.5);
        assert_eq!(out.get_pixel(0, 0), Colour::rgba(0.5, 0.5, 1.0, 0.75));
        let c = lerp_colours(&Colour::grey(0.0), &Colour::rgba(1.0, 1.0, 1.0, 1.0), Shape::LeftMask, 0.5);
        assert_eq!(c, Colour::rgba(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_zip_reduce_sum_and_max() {
        let a = Image::from_vec(2, 2, ChannelLayout::MASK, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Image::filled(2, 2, &Colour::grey(1.0));
        let sum = zip_reduce(&a, &b, Shape::Regular, ops::mul, ops::add);
        assert_eq!(sum, Colour::grey(10.0));
        let max = zip_reduce(&a, &Colour::grey(0.0), Shape::Regular, ops::sub, ops::max);
        assert_eq!(max, Colour::grey(4.0));
    }

    #[test]
    fn test_zip_reduce_mask_covers_alpha() {
        let img = Image::filled(2, 1, &Colour::grey_alpha(3.0, 1.0));
        let r = zip_reduce(&Colour::grey(2.0), &img, Shape::LeftMask, ops::mul, ops::add);
        assert_eq!(r, Colour::grey_alpha(12.0, 4.0));
    }

    #[test]
    fn test_two_colours_give_single_pixel() {
        let out = zip(&Colour::grey(1.0), &Colour::grey(2.0), Shape::Regular, ops::add);
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.get_pixel(0, 0), Colour::grey(3.0));
    }

    #[test]
    #[should_panic(expected = "operand sizes differ")]
    fn test_size_mismatch_panics() {
        let a = Image::new(2, 2, ChannelLayout::MASK);
        let b = Image::new(3, 2, ChannelLayout::MASK);
        zip(&a, &b, Shape::Regular, ops::add);
    }

    #[test]
    #[should_panic(expected = "single-channel mask")]
    fn test_left_mask_requires_mask() {
        zip(&Colour::rgb(1.0, 1.0, 1.0), &rgba_ramp(), Shape::LeftMask, ops::add);
    }
}
