// src/io/codec.rs

//! 8-bit raster formats through the `image` crate.
//!
//! Decoded files arrive top row first; the rows are flipped so row 0 is the
//! bottom of the picture, and flipped back on the way out.

use crate::colour::ChannelLayout;
use crate::image::buffer::Image;
use crate::utils::error::{ImageError, Result};
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Luma, LumaA, Rgb, Rgba};
use log::trace;
use std::path::Path;

/// Converts a decoded picture to floats in `[0, 1]`.
pub fn from_dynamic(picture: DynamicImage) -> Result<Image> {
    let (width, height) = (picture.width(), picture.height());
    let colour = picture.color();
    trace!("decoding {:?} {}x{}", colour, width, height);
    let (layout, data) = match (colour.channel_count(), colour.has_alpha()) {
        (1, _) => (ChannelLayout::MASK, picture.to_luma32f().into_raw()),
        (2, _) => (ChannelLayout::GREY_ALPHA, picture.to_luma_alpha32f().into_raw()),
        (_, false) => (ChannelLayout::RGB, picture.to_rgb32f().into_raw()),
        (_, true) => (ChannelLayout::RGBA, picture.to_rgba32f().into_raw()),
    };
    Ok(Image::from_vec(width, height, layout, data)?.clone_flipped(false, true))
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Quantises to 8 bits per channel. Values outside `[0, 1]` are clamped.
pub fn to_dynamic(img: &Image) -> Result<DynamicImage> {
    let (width, height) = img.dimensions();
    let bytes: Vec<u8> = img
        .clone_flipped(false, true)
        .as_raw()
        .iter()
        .map(|&v| to_u8(v))
        .collect();
    let picture = match img.layout() {
        ChannelLayout::MASK => {
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, bytes).map(DynamicImage::ImageLuma8)
        }
        ChannelLayout::GREY_ALPHA => ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, bytes)
            .map(DynamicImage::ImageLumaA8),
        ChannelLayout::RGB => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, bytes).map(DynamicImage::ImageRgb8)
        }
        ChannelLayout::RGBA => {
            ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, bytes).map(DynamicImage::ImageRgba8)
        }
        layout => {
            return Err(ImageError::UnsupportedLayout {
                layout,
                format: "8-bit raster",
            });
        }
    };
    picture.ok_or_else(|| ImageError::Encode("pixel buffer does not match dimensions".to_string()))
}

/// Loads any format the `image` crate can sniff from the file contents.
pub fn load(path: &Path) -> Result<Image> {
    let picture = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    from_dynamic(picture)
}

pub fn save(img: &Image, path: &Path, format: ImageFormat) -> Result<()> {
    to_dynamic(img)?
        .save_with_format(path, format)
        .map_err(|e| ImageError::Encode(format!("{}: {}", path.display(), e)))
}

pub fn format_from_name(name: &str) -> Option<ImageFormat> {
    ImageFormat::from_extension(name)
}
