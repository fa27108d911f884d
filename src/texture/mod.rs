//! Renderer boundary and texture identifiers
//!
//! The cache never talks to a GPU directly. It consumes the [`Renderer`]
//! trait for resource creation and capability queries, and hands adapters
//! to the in-process [`registry::TextureRegistry`].

pub mod banner_texture;
pub mod registry;

use crate::surface::Surface;

/// Opaque renderer texture resource handle. Zero is never a valid handle.
pub type TextureHandle = u32;

/// Candidate texture pixel formats, in the order the adapter tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit paletted.
    Paletted8,
    /// 16-bit RGB with 1-bit alpha.
    Rgb5a1,
    /// 16-bit RGBA, 4 bits per channel; the fallback everything supports.
    Rgba4,
}

/// Lifetime policy a texture is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexturePolicy {
    /// Normal refcounted lifetime; dropped when the last hold is released.
    Default,
    /// Cheap to recreate: stays registered with no outstanding holds and
    /// may be evicted and reloaded opportunistically.
    Volatile,
}

/// Identifier for a registered banner texture.
///
/// Derived from the cache file path. Rotated banners carry a distinct tag
/// so the sprite layer can apply un-rotated display geometry; the tag is
/// part of identity, keeping rotated and plain registrations separate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureId {
    pub key: String,
    pub rotated: bool,
}

impl TextureId {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rotated: false,
        }
    }
}

/// Rendering backend capability and resource interface.
pub trait Renderer {
    /// Largest texture dimension the backend accepts.
    fn max_texture_size(&self) -> u32;

    /// Whether the backend can upload the given pixel format directly.
    fn supports_texture_format(&self, format: TextureFormat) -> bool;

    /// Create a texture resource from a surface. Never returns zero.
    fn create_texture(&self, format: TextureFormat, surface: &Surface, mipmaps: bool)
        -> TextureHandle;

    /// Release a texture resource.
    fn delete_texture(&self, handle: TextureHandle);
}
