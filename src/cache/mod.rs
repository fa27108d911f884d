//! Cache state and orchestration
//!
//! Persistent side: the metadata index and the deterministic cache file
//! layout. In-memory side: the resident banner table. The service module
//! drives both and owns the public operations.

pub mod index;
pub mod service;
pub mod sizing;
pub mod table;

pub use index::{cache_file_path, CacheIndex, CacheRecord};
pub use service::{is_diagonal_banner, BannerCache, CacheStats};
pub use table::{BannerSlot, BannerTable};
