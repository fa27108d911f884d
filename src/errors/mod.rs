//! Centralized error handling for the banner cache
//!
//! All failures inside the cache are path-scoped and non-fatal: the public
//! controller operations log them and carry on. The typed errors here exist
//! for the internal fallible layers (codec, index, texture creation) so
//! that the controller can distinguish a decode failure from a missing
//! cache file.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using CacheError
pub type CacheResult<T> = Result<T, CacheError>;

/// Convenience type alias for codec Results
pub type CodecResult<T> = Result<T, CodecError>;

/// Convenience type alias for texture Results
pub type TextureResult<T> = Result<T, TextureError>;
