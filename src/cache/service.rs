//! Banner cache controller
//!
//! The orchestrator behind the whole subsystem: decides when a cache entry
//! must be (re)built, runs the transform pipeline, keeps the metadata
//! index and the in-memory table in sync, and resolves render-ready
//! texture identifiers.
//!
//! Call [`BannerCache::cache_banner`] to create or refresh a cache entry
//! for a path; this is cheap when nothing changed. Call
//! [`BannerCache::load_banner`] to bring a cached banner into memory
//! without a staleness check. Call [`BannerCache::load_cached_banner`] to
//! get an identifier for the rendering layer; whether it actually resolved
//! can be checked with [`BannerCache::is_texture_registered`].
//!
//! Everything here is single-threaded and synchronous; callers drive the
//! controller from one thread and every operation runs to completion
//! before returning.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use crate::config::{BannerCacheConfig, CacheMode};
use crate::errors::CacheResult;
use crate::hashing;
use crate::surface::blit::{self, QuadCoords};
use crate::surface::codec::ImageCodec;
use crate::surface::{color_key, convert, dither, palettize, zoom, Surface, SurfaceFormat};
use crate::texture::banner_texture::BannerTexture;
use crate::texture::registry::TextureRegistry;
use crate::texture::{Renderer, TextureId, TexturePolicy};

use super::index::{cache_file_path, CacheIndex, CacheRecord};
use super::sizing;
use super::table::BannerTable;

/// Destination size a diagonal banner is un-rotated into before the normal
/// downscale runs.
const ROTATED_BANNER_WIDTH: u32 = 256;
const ROTATED_BANNER_HEIGHT: u32 = 64;

/// Source-space corners of the rotated banner within its square texture,
/// in the order top-left, bottom-left, bottom-right, top-right.
const ROTATED_BANNER_QUAD: QuadCoords = [
    0.02, 0.78, // top left
    0.22, 0.98, // bottom left
    0.98, 0.22, // bottom right
    0.78, 0.02, // top right
];

/// Diagonal banners are square textures packing a wide banner rotated 45
/// degrees. Small squares are assumed to be genuinely square art.
pub fn is_diagonal_banner(width: u32, height: u32) -> bool {
    width == height && width >= 100
}

/// Resident footprint numbers for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub resident_banners: usize,
    pub resident_bytes: usize,
    pub indexed_records: usize,
}

/// The process-wide banner cache service.
///
/// Owns the metadata index, the in-memory banner table, and the texture
/// registry; consumes the image codec and renderer through their traits.
pub struct BannerCache {
    config: BannerCacheConfig,
    codec: Box<dyn ImageCodec>,
    renderer: Rc<dyn Renderer>,
    index: CacheIndex,
    table: BannerTable,
    registry: TextureRegistry,
    demand_refcount: u32,
}

impl BannerCache {
    /// Construct the service and read the metadata index from disk.
    pub fn new(
        config: BannerCacheConfig,
        codec: Box<dyn ImageCodec>,
        renderer: Rc<dyn Renderer>,
    ) -> Self {
        let index = CacheIndex::load(config.index_path());
        debug!(
            "Banner cache starting in {} mode with {} indexed records",
            config.mode,
            index.len()
        );
        Self {
            config,
            codec,
            renderer,
            index,
            table: BannerTable::new(),
            registry: TextureRegistry::new(),
            demand_refcount: 0,
        }
    }

    /// Cache file path for a source banner path.
    pub fn cache_file_path(&self, source_path: &str) -> PathBuf {
        cache_file_path(&self.config.cache_dir, source_path)
    }

    /// Ensure the cache entry for `source_path` is current, rebuilding it
    /// when missing or stale. In preload mode an up-to-date entry is also
    /// loaded into memory.
    ///
    /// The full-content hash is only a short-circuit: when it is missing
    /// or cannot be computed the entry is rebuilt, never trusted.
    pub fn cache_banner(&mut self, source_path: &str) {
        if !self.config.mode.is_enabled() {
            return;
        }
        if !Path::new(source_path).exists() {
            return;
        }

        let cache_path = self.cache_file_path(source_path);
        if cache_path.exists() {
            let mut up_to_date = self.config.fast_load;
            if !up_to_date {
                if let Some(record) = self.index.get(source_path) {
                    if record.full_hash != 0 {
                        up_to_date = hashing::hash_file(Path::new(source_path))
                            .map(|current| current == record.full_hash)
                            .unwrap_or(false);
                    }
                }
            }
            if up_to_date {
                if self.config.mode == CacheMode::Preload {
                    self.load_banner(source_path);
                }
                return;
            }
        }

        if let Err(e) = self.rebuild_banner(source_path) {
            warn!("Failed to cache banner '{}': {}", source_path, e);
        }
    }

    /// Load the cached reduced banner into memory without examining the
    /// source file. A load failure triggers exactly one rebuild attempt;
    /// a second failure leaves the banner unavailable (non-fatal).
    pub fn load_banner(&mut self, source_path: &str) {
        if source_path.is_empty() {
            return;
        }
        if !self.config.mode.is_enabled() {
            return;
        }

        let cache_path = self.cache_file_path(source_path);
        for attempt in 0..2 {
            if self.table.is_resident(source_path) {
                return;
            }
            trace!("Loading cached banner {}", cache_path.display());
            if let Some(surface) = self.codec.load_surface(&cache_path) {
                self.table.insert(source_path, surface);
                return;
            }
            if attempt == 0 {
                debug!(
                    "Cached banner load of '{}' ('{}') failed, trying to cache ...",
                    source_path,
                    cache_path.display()
                );
                // It failed to load, so it cannot be up to date; go
                // straight to the rebuild.
                if let Err(e) = self.rebuild_banner(source_path) {
                    debug!("Rebuild of '{}' failed: {}", source_path, e);
                }
            } else {
                warn!(
                    "Cached banner load of '{}' ('{}') failed",
                    source_path,
                    cache_path.display()
                );
            }
        }
    }

    /// Resolve a texture identifier for a banner. The identifier only
    /// resolves to a registered texture when the banner is resident and
    /// its record is usable; otherwise a warning is logged and the plain
    /// identifier is returned (soft failure).
    ///
    /// Idempotent: repeated calls return the same identifier without
    /// re-registering.
    pub fn load_cached_banner(&mut self, source_path: &str) -> TextureId {
        let cache_path = self.cache_file_path(source_path);
        let mut id = TextureId::new(cache_path.to_string_lossy());
        if source_path.is_empty() {
            return id;
        }

        trace!("load_cached_banner({}): {}", source_path, id.key);
        if !self.table.is_resident(source_path) {
            warn!("Banner cache for '{}' wasn't loaded", source_path);
            return id;
        }

        let record = self.index.get(source_path).cloned().unwrap_or_default();
        if !record.is_usable() {
            warn!("Cache record for '{}' couldn't be used", source_path);
            return id;
        }

        if record.rotated {
            // The sprite layer needs to know to undo the rotation when
            // displaying; rotated identifiers are distinct.
            id.rotated = true;
        }

        if self.registry.is_registered(&id) {
            return id;
        }

        let Some(slot) = self.table.slot(source_path) else {
            return id;
        };
        trace!(
            "Loading banner texture {}; src {}x{}",
            id.key,
            record.source_width,
            record.source_height
        );
        match BannerTexture::new(
            id.clone(),
            slot,
            record.source_width,
            record.source_height,
            self.renderer.clone(),
        ) {
            Ok(texture) => {
                self.registry
                    .register(id.clone(), texture, TexturePolicy::Volatile);
                // Drop the strong hold right away; the volatile policy
                // keeps the adapter owned by the registry.
                self.registry.release(&id);
            }
            Err(e) => warn!(
                "Couldn't create banner texture for '{}': {}",
                source_path, e
            ),
        }
        id
    }

    /// Enter a bulk-preload scope. On the first nested call in on-demand
    /// mode, every known cached banner is loaded into memory. This path
    /// must be fast: cache files are never created here, and missing ones
    /// are skipped silently.
    pub fn demand(&mut self) {
        self.demand_refcount += 1;
        if self.demand_refcount > 1 {
            return;
        }
        if self.config.mode != CacheMode::OnDemand {
            return;
        }

        let paths: Vec<String> = self.index.source_paths().cloned().collect();
        for source_path in paths {
            if self.table.is_resident(&source_path) {
                continue;
            }
            let cache_path = self.cache_file_path(&source_path);
            if let Some(surface) = self.codec.load_surface(&cache_path) {
                self.table.insert(&source_path, surface);
            }
        }
    }

    /// Leave a bulk-preload scope; the last exit releases every resident
    /// banner. Calls must balance [`BannerCache::demand`].
    pub fn undemand(&mut self) {
        assert!(
            self.demand_refcount > 0,
            "undemand() without matching demand()"
        );
        self.demand_refcount -= 1;
        if self.demand_refcount != 0 {
            return;
        }
        if self.config.mode != CacheMode::OnDemand {
            return;
        }
        self.unload_all_banners();
    }

    /// Release every resident surface and registered texture. Idempotent.
    pub fn unload_all_banners(&mut self) {
        self.registry.unload_all();
        self.table.unload_all();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            resident_banners: self.table.resident_count(),
            resident_bytes: self.table.resident_bytes(),
            indexed_records: self.index.len(),
        }
    }

    /// Log the resident footprint.
    pub fn output_stats(&self) {
        let stats = self.stats();
        info!(
            "{} bytes of banners loaded ({} resident, {} indexed)",
            stats.resident_bytes, stats.resident_banners, stats.indexed_records
        );
    }

    /// The metadata record for a source path, if one exists.
    pub fn record(&self, source_path: &str) -> Option<&CacheRecord> {
        self.index.get(source_path)
    }

    pub fn is_resident(&self, source_path: &str) -> bool {
        self.table.is_resident(source_path)
    }

    pub fn is_texture_registered(&self, id: &TextureId) -> bool {
        self.registry.is_registered(id)
    }

    pub fn config(&self) -> &BannerCacheConfig {
        &self.config
    }

    /// Run the full transform pipeline for one banner and persist the
    /// result. Always rebuilds; staleness checks live in
    /// [`BannerCache::cache_banner`].
    fn rebuild_banner(&mut self, source_path: &str) -> CacheResult<()> {
        let mut surface = match self.codec.load_file(Path::new(source_path)) {
            Ok(surface) => surface,
            Err(e) => {
                // User-facing diagnostic; the message names the decoder's
                // complaint.
                warn!("Banner '{}' couldn't be loaded: {}", source_path, e);
                return Err(e.into());
            }
        };

        let mut rotated = false;
        if is_diagonal_banner(surface.width(), surface.height()) {
            // Resizing a diagonal banner directly produces checkerboard
            // aliasing; un-rotate it first with a linear filter, which
            // costs the palette but keeps the crossfade to the full-res
            // banner aligned.
            color_key::apply_color_key(&mut surface);
            let src = convert::ensure_rgba8888(surface);
            let mut dst = Surface::new(
                ROTATED_BANNER_WIDTH,
                ROTATED_BANNER_HEIGHT,
                SurfaceFormat::Rgba8888,
            );
            blit::blit_transform(&src, &mut dst, &ROTATED_BANNER_QUAD);
            surface = dst;
            rotated = true;
        }

        let (source_width, source_height) = (surface.width(), surface.height());
        let (target_width, target_height) = sizing::reduced_dimensions(source_width, source_height);

        color_key::apply_color_key(&mut surface);
        let resized = zoom::zoom(&surface, target_width, target_height);

        let reduced = if self.config.paletted {
            if resized.format().bytes_per_pixel() != 1 {
                palettize::palettize(&resized)
            } else {
                resized
            }
        } else {
            // A1RGB5 is natively supported by the usual backends, so the
            // stored file can normally be uploaded without conversion.
            dither::ordered_dither(&resized)
        };

        let cache_path = self.cache_file_path(source_path);
        self.codec.save_surface(&reduced, &cache_path)?;

        if self.config.mode == CacheMode::Preload {
            // We are about to load it anyway; hand the buffer to the table
            // instead of reading the file back.
            self.table.insert(source_path, reduced);
        } else {
            self.table.evict(source_path);
        }

        let full_hash = hashing::hash_file(Path::new(source_path)).unwrap_or(0);
        self.index.set(
            source_path,
            CacheRecord {
                cache_path: cache_path.to_string_lossy().into_owned(),
                source_width,
                source_height,
                full_hash,
                rotated,
            },
        );
        self.index.write()?;
        Ok(())
    }
}
