// src/io/pfm.rs

//! Portable Float Map reader and writer.
//!
//! PFM stores raw 32-bit floats, rows bottom to top, which is exactly the
//! in-memory order of [`Image`]. `Pf` holds one channel, `PF` three. The sign
//! of the scale field gives the byte order: negative means little-endian.

use crate::colour::ChannelLayout;
use crate::image::buffer::{Image, buffer_len};
use crate::utils::error::{ImageError, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Largest number of floats accepted from a PFM header (4 GiB of samples).
const MAX_PFM_VALUES: usize = 1 << 30;

/// Reads one whitespace-delimited header token, consuming the single
/// whitespace byte that ends it.
fn read_token<R: Read>(reader: &mut R) -> Result<String> {
    let mut token = Vec::new();
    loop {
        let b = reader.read_u8()?;
        if b.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(b);
        if token.len() > 32 {
            return Err(ImageError::Decode("PFM header token too long".to_string()));
        }
    }
    String::from_utf8(token).map_err(|_| ImageError::Decode("PFM header is not ASCII".to_string()))
}

fn parse_field<T: std::str::FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| ImageError::Decode(format!("bad PFM {}: '{}'", what, token)))
}

/// Decodes a PFM stream.
pub fn read_pfm<R: Read>(reader: &mut R) -> Result<Image> {
    let layout = match read_token(reader)?.as_str() {
        "Pf" => ChannelLayout::MASK,
        "PF" => ChannelLayout::RGB,
        magic => return Err(ImageError::Decode(format!("not a PFM file (magic '{}')", magic))),
    };
    let width: u32 = parse_field(&read_token(reader)?, "width")?;
    let height: u32 = parse_field(&read_token(reader)?, "height")?;
    let scale: f32 = parse_field(&read_token(reader)?, "scale")?;
    if scale == 0.0 || !scale.is_finite() {
        return Err(ImageError::Decode(format!("bad PFM scale {}", scale)));
    }

    let len = buffer_len(width, height, layout)
        .filter(|&n| n <= MAX_PFM_VALUES)
        .ok_or_else(|| ImageError::Decode(format!("PFM size {}x{} is too large", width, height)))?;

    // Filled one row at a time; capacity tracks the data actually read.
    let row_len = if height == 0 { 0 } else { len / height as usize };
    let mut data = Vec::with_capacity(len.min(row_len.max(1) * 64));
    for _ in 0..height {
        let start = data.len();
        data.resize(start + row_len, 0.0);
        if scale < 0.0 {
            reader.read_f32_into::<LittleEndian>(&mut data[start..])?;
        } else {
            reader.read_f32_into::<BigEndian>(&mut data[start..])?;
        }
    }
    Image::from_vec(width, height, layout, data)
}

/// Encodes a one- or three-channel image without alpha as little-endian PFM.
pub fn write_pfm<W: Write>(image: &Image, writer: &mut W) -> Result<()> {
    let magic = match image.layout() {
        ChannelLayout::MASK => "Pf",
        ChannelLayout::RGB => "PF",
        layout => {
            return Err(ImageError::UnsupportedLayout {
                layout,
                format: "PFM",
            });
        }
    };
    write!(writer, "{}\n{} {}\n-1.0\n", magic, image.width(), image.height())?;
    for &v in image.as_raw() {
        writer.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}
