//! An in-memory image algebra library.
//!
//! Images are float buffers with one to four colour channels and an optional
//! alpha channel. On top of them sit a compositing algebra (zip, blend, lerp,
//! zip-reduce) that broadcasts constant colours and single-channel masks,
//! resampling (scale, rotate, crop, flip), gamma-aware dithering and kernel
//! convolution.
//!
//! # Quick Start
//!
//! ```ignore
//! use image_algebra::{algebra, Colour, Image, ScaleFilter, Shape};
//!
//! let photo = image_algebra::io::load("photo.png")?;
//! let veil = Colour::rgba(1.0, 1.0, 1.0, 0.25);
//!
//! // Lay a translucent white over the photo, then halve it.
//! let washed = algebra::blend(&veil, &photo, Shape::Regular);
//! let small = washed.scale(photo.width() / 2, photo.height() / 2, ScaleFilter::CatmullRom);
//! image_algebra::io::save(&small, "small.png", None)?;
//! ```
//!
//! # Coordinates
//!
//! The origin is the bottom-left corner: row 0 is the bottom row of the
//! picture. Coordinates that fall outside an image never fail; depending on
//! the operation they are clipped, wrapped or replaced by a background colour.
//!
//! # Errors
//!
//! Only I/O and checked constructors return [`Result`]. Combining operands
//! whose sizes or channel layouts do not fit together is a programming error
//! and panics with a message naming the mismatch.

pub mod algebra;
pub mod colour;
pub mod colour_space;
pub mod image;
pub mod io;
pub mod utils;

pub use algebra::Shape;
pub use colour::{ChannelLayout, Colour};
pub use crate::image::{DitherMode, Image, Raster, ScaleFilter};
pub use utils::error::{ImageError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_roundtrip() {
        let red = Colour::rgba(1.0, 0.0, 0.0, 1.0);
        let canvas = Image::filled(4, 4, &Colour::rgba(0.0, 0.0, 1.0, 1.0));
        let out = algebra::blend(&red, &canvas, Shape::Regular);
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| p == red));
    }

    #[test]
    fn test_display_summary() {
        let img = Image::new(7, 3, ChannelLayout::RGBA);
        assert_eq!(img.to_string(), "Image (7,3)x3A");
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(ScaleFilter::default(), ScaleFilter::Bilinear);
        assert_eq!(DitherMode::default(), DitherMode::None);
        assert_eq!("catmull-rom".parse::<ScaleFilter>().unwrap(), ScaleFilter::CatmullRom);
    }
}
