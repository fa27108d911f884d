//! Banner cache configuration
//!
//! Read-only, externally supplied settings: the enumerated cache mode plus
//! the fast-load and paletted-cache flags, and the cache directory the
//! reduced files and index live under.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

/// How (and whether) banners are cached and loaded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CacheMode {
    /// Caching disabled entirely.
    Off,
    /// Low-res banners loaded into memory at startup.
    #[default]
    Preload,
    /// Low-res banners loaded in bulk inside demand scopes.
    OnDemand,
}

impl CacheMode {
    /// True for the modes in which the cache does any work at all.
    pub fn is_enabled(self) -> bool {
        matches!(self, CacheMode::Preload | CacheMode::OnDemand)
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("Cache")
}

/// Banner cache settings, usually deserialized from the application's TOML
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerCacheConfig {
    /// Directory holding the reduced cache files and the metadata index.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Cache mode.
    #[serde(default)]
    pub mode: CacheMode,

    /// Skip the full-content hash check and trust existing cache files.
    #[serde(default)]
    pub fast_load: bool,

    /// Palettize cached banners instead of dithering to 16-bit RGBA.
    /// Off by default: palettization slows the initial cache run, and some
    /// hardware depalettizes on use anyway.
    #[serde(default)]
    pub paletted: bool,
}

impl Default for BannerCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            mode: CacheMode::default(),
            fast_load: false,
            paletted: false,
        }
    }
}

impl BannerCacheConfig {
    /// Load configuration from a TOML file, creating a default file when
    /// none exists.
    pub fn load_from_file(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            Ok(default_config)
        }
    }

    /// Path of the metadata index file.
    pub fn index_path(&self) -> PathBuf {
        self.cache_dir.join("banners.index")
    }
}
