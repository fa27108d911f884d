//! Error type definitions for the banner cache

use thiserror::Error;

/// Top-level cache error type
///
/// Wraps the failures the cache controller can hit while (re)building or
/// loading an entry. Every variant is scoped to a single banner path.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The source image could not be decoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The metadata index file could not be written
    #[error("index write failed: {0}")]
    Index(#[from] std::io::Error),

    /// Texture adapter creation failed
    #[error("texture error: {0}")]
    Texture(#[from] TextureError),
}

/// Image codec boundary errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Filesystem access failures
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoder could not parse the file
    #[error("decode failed: {message}")]
    Decode { message: String },

    /// A cache container file with an unknown layout
    #[error("unsupported cache surface: {message}")]
    UnsupportedSurface { message: String },
}

/// Texture adapter errors
#[derive(Error, Debug)]
pub enum TextureError {
    /// The bound table slot holds no surface
    #[error("surface for '{id}' is not resident")]
    SurfaceMissing { id: String },

    /// The renderer supports none of the candidate pixel formats
    #[error("no supported texture format for '{id}'")]
    NoSupportedFormat { id: String },
}
