//! Image buffers and the operations that produce or modify them.
//!
//! Everything except the `draw_*` methods returns a newly allocated
//! [`Image`]; the source is only read.

pub mod buffer;
pub mod convolve;
pub mod draw;
pub mod geom;
pub mod pointwise;
pub mod quantise;
pub mod scale;

pub use buffer::{Image, Raster};
pub use quantise::DitherMode;
pub use scale::ScaleFilter;

/// Euclidean modulo for wrapped (toroidal) addressing.
#[inline]
pub(crate) fn wrap_coord(v: i64, size: u32) -> u32 {
    v.rem_euclid(size as i64) as u32
}
