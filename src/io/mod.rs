// src/io/mod.rs

//! Loading and saving images.
//!
//! `.pfm` is handled here with full float precision. Everything else goes
//! through the `image` crate when the `codecs` feature is enabled and is
//! quantised to 8 bits per channel on save.

#[cfg(feature = "codecs")]
pub mod codec;
pub mod pfm;

use crate::image::buffer::Image;
use crate::utils::error::{ImageError, Result};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub use pfm::{read_pfm, write_pfm};

enum Format {
    Pfm,
    #[cfg(feature = "codecs")]
    Codec(::image::ImageFormat),
}

#[cfg(feature = "codecs")]
fn codec_format(name: &str) -> Option<Format> {
    codec::format_from_name(name).map(Format::Codec)
}

#[cfg(not(feature = "codecs"))]
fn codec_format(_name: &str) -> Option<Format> {
    None
}

/// Resolves the target format from an explicit name (`"png"`, `"PFM"`) or,
/// failing that, from the path's extension.
fn resolve_format(path: &Path, hint: Option<&str>) -> Result<Format> {
    let name = hint
        .or_else(|| path.extension().and_then(|e| e.to_str()))
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ImageError::UnknownFormat(path.display().to_string()))?;
    if name == "pfm" {
        return Ok(Format::Pfm);
    }
    codec_format(&name).ok_or(ImageError::UnknownFormat(name))
}

fn is_pfm(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pfm"))
}

/// Loads an image from disk.
///
/// PFM files are picked by extension. With `codecs` enabled, anything else is
/// decoded by sniffing the file contents.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    let img = if is_pfm(path) {
        pfm::read_pfm(&mut BufReader::new(File::open(path)?))?
    } else {
        load_codec(path)?
    };
    debug!("loaded {} from {}", img, path.display());
    Ok(img)
}

#[cfg(feature = "codecs")]
fn load_codec(path: &Path) -> Result<Image> {
    codec::load(path)
}

#[cfg(not(feature = "codecs"))]
fn load_codec(path: &Path) -> Result<Image> {
    Err(ImageError::UnknownFormat(path.display().to_string()))
}

/// Saves an image to disk.
///
/// `format_hint` overrides the path's extension when given. Fails with
/// [`ImageError::UnsupportedLayout`] if the format cannot hold the image's
/// channels.
pub fn save<P: AsRef<Path>>(img: &Image, path: P, format_hint: Option<&str>) -> Result<()> {
    let path = path.as_ref();
    debug!("saving {} to {}", img, path.display());
    match resolve_format(path, format_hint)? {
        Format::Pfm => {
            let mut writer = BufWriter::new(File::create(path)?);
            pfm::write_pfm(img, &mut writer)?;
            writer.flush()?;
            Ok(())
        }
        #[cfg(feature = "codecs")]
        Format::Codec(format) => codec::save(img, path, format),
    }
}
