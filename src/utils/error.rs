// src/utils/error.rs

use crate::colour::ChannelLayout;
use thiserror::Error;

/// The error type for the recoverable operations in this library.
///
/// Structural misuse of the pixel algebra (combining buffers whose channel
/// layouts cannot be broadcast, zero-thickness lines) is a programming error
/// and panics instead; see the individual operations.
#[derive(Error, Debug)]
pub enum ImageError {
    /// An error occurred during I/O operations (e.g., file not found, permission denied).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input could not be decoded as an image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The image could not be written in the requested format.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The target format cannot represent this channel layout.
    #[error("Channel layout {layout} is not supported by {format}")]
    UnsupportedLayout {
        layout: ChannelLayout,
        format: &'static str,
    },

    /// Neither the format hint nor the path named a known format.
    #[error("Unknown image format: {0}")]
    UnknownFormat(String),

    /// An invalid argument was provided to a function.
    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    /// A raw buffer's length does not match the declared dimensions.
    #[error("Buffer length mismatch: expected {expected} values, but got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Error reported by the `image` crate codecs.
    #[cfg(feature = "codecs")]
    #[error("Codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// A specialized `Result` type for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;
