//! End-to-end lifecycle tests against real files in a temp directory.

use std::path::Path;
use std::rc::Rc;

use tempfile::TempDir;

use banner_cache::cache::BannerCache;
use banner_cache::config::{BannerCacheConfig, CacheMode};
use banner_cache::surface::codec::FileImageCodec;
use banner_cache::surface::Surface;
use banner_cache::texture::{Renderer, TextureFormat, TextureHandle};

struct AcceptAllRenderer;

impl Renderer for AcceptAllRenderer {
    fn max_texture_size(&self) -> u32 {
        2048
    }
    fn supports_texture_format(&self, _format: TextureFormat) -> bool {
        true
    }
    fn create_texture(
        &self,
        _format: TextureFormat,
        _surface: &Surface,
        _mipmaps: bool,
    ) -> TextureHandle {
        1
    }
    fn delete_texture(&self, _handle: TextureHandle) {}
}

fn write_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    img.save(path).unwrap();
}

fn make_cache(config: BannerCacheConfig) -> BannerCache {
    BannerCache::new(config, Box::new(FileImageCodec), Rc::new(AcceptAllRenderer))
}

fn config_in(temp: &TempDir, mode: CacheMode) -> BannerCacheConfig {
    BannerCacheConfig {
        cache_dir: temp.path().join("Cache"),
        mode,
        ..Default::default()
    }
}

#[test]
fn test_preload_cache_and_resolve() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("banner.png");
    write_png(&source, 640, 80, [40, 90, 200, 255]);
    let source = source.to_string_lossy().into_owned();

    let mut cache = make_cache(config_in(&temp, CacheMode::Preload));
    cache.cache_banner(&source);

    assert!(cache.is_resident(&source));
    assert!(cache.cache_file_path(&source).exists());

    let record = cache.record(&source).expect("record written");
    assert_eq!((record.source_width, record.source_height), (640, 80));
    assert!(!record.rotated);
    assert_ne!(record.full_hash, 0);

    let id = cache.load_cached_banner(&source);
    assert!(!id.rotated);
    assert!(cache.is_texture_registered(&id));

    // Resolving again is idempotent and yields the same identifier.
    let again = cache.load_cached_banner(&source);
    assert_eq!(id, again);
}

#[test]
fn test_stale_source_rebuilt_unless_fast_load() {
    let temp = TempDir::new().unwrap();
    let source_path = temp.path().join("banner.png");
    write_png(&source_path, 640, 80, [1, 2, 3, 255]);
    let source = source_path.to_string_lossy().into_owned();

    let config = config_in(&temp, CacheMode::Preload);
    make_cache(config.clone()).cache_banner(&source);

    // Replace the source with differently-sized art.
    write_png(&source_path, 320, 40, [9, 9, 9, 255]);

    // Default behavior notices the hash mismatch and rebuilds.
    let mut cache = make_cache(config.clone());
    cache.cache_banner(&source);
    let record = cache.record(&source).unwrap();
    assert_eq!((record.source_width, record.source_height), (320, 40));

    // With fast_load the existing entry is trusted as-is.
    write_png(&source_path, 640, 80, [7, 7, 7, 255]);
    let mut cache = make_cache(BannerCacheConfig {
        fast_load: true,
        ..config
    });
    cache.cache_banner(&source);
    let record = cache.record(&source).unwrap();
    assert_eq!((record.source_width, record.source_height), (320, 40));
    assert!(cache.is_resident(&source));
}

#[test]
fn test_diagonal_banner_recorded_as_rotated() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("square.png");
    write_png(&source, 256, 256, [120, 60, 30, 255]);
    let source = source.to_string_lossy().into_owned();

    let mut cache = make_cache(config_in(&temp, CacheMode::Preload));
    cache.cache_banner(&source);

    // Dimensions are recorded after the un-rotation pass.
    let record = cache.record(&source).unwrap();
    assert!(record.rotated);
    assert_eq!((record.source_width, record.source_height), (256, 64));

    let id = cache.load_cached_banner(&source);
    assert!(id.rotated);
    assert!(cache.is_texture_registered(&id));
}

#[test]
fn test_small_square_art_not_treated_as_rotated() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("icon.png");
    write_png(&source, 64, 64, [0, 255, 0, 255]);
    let source = source.to_string_lossy().into_owned();

    let mut cache = make_cache(config_in(&temp, CacheMode::Preload));
    cache.cache_banner(&source);
    assert!(!cache.record(&source).unwrap().rotated);
}

#[test]
fn test_on_demand_scopes() {
    let temp = TempDir::new().unwrap();
    let mut sources = Vec::new();
    for name in ["a.png", "b.png", "c.png"] {
        let path = temp.path().join(name);
        write_png(&path, 640, 80, [50, 50, 50, 255]);
        sources.push(path.to_string_lossy().into_owned());
    }

    let mut cache = make_cache(config_in(&temp, CacheMode::OnDemand));
    for source in &sources {
        cache.cache_banner(source);
        // On-demand caching writes the file but keeps memory free.
        assert!(!cache.is_resident(source));
        assert!(cache.cache_file_path(source).exists());
    }

    cache.demand();
    for source in &sources {
        assert!(cache.is_resident(source));
    }
    let id = cache.load_cached_banner(&sources[0]);
    assert!(cache.is_texture_registered(&id));

    // Nested scopes; only the last undemand unloads.
    cache.demand();
    cache.undemand();
    assert!(cache.is_resident(&sources[0]));
    cache.undemand();
    for source in &sources {
        assert!(!cache.is_resident(source));
    }
    assert!(!cache.is_texture_registered(&id));

    // After unload the identifier no longer resolves.
    let id = cache.load_cached_banner(&sources[0]);
    assert!(!cache.is_texture_registered(&id));
}

#[test]
fn test_off_mode_does_nothing() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("banner.png");
    write_png(&source, 640, 80, [1, 1, 1, 255]);
    let source = source.to_string_lossy().into_owned();

    let mut cache = make_cache(config_in(&temp, CacheMode::Off));
    cache.cache_banner(&source);
    cache.load_banner(&source);

    assert!(!cache.is_resident(&source));
    assert!(!cache.cache_file_path(&source).exists());
    assert_eq!(cache.stats().indexed_records, 0);
}

#[test]
fn test_missing_source_is_ignored() {
    let temp = TempDir::new().unwrap();
    let mut cache = make_cache(config_in(&temp, CacheMode::Preload));

    cache.cache_banner("no/such/banner.png");
    assert_eq!(cache.stats().indexed_records, 0);

    let id = cache.load_cached_banner("no/such/banner.png");
    assert!(!cache.is_texture_registered(&id));
}

#[test]
fn test_load_banner_rebuilds_missing_cache_file() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("banner.png");
    write_png(&source, 640, 80, [10, 20, 30, 255]);
    let source = source.to_string_lossy().into_owned();

    let config = config_in(&temp, CacheMode::Preload);
    let cache_file = {
        let mut cache = make_cache(config.clone());
        cache.cache_banner(&source);
        cache.cache_file_path(&source)
    };
    std::fs::remove_file(&cache_file).unwrap();

    // A fresh instance finds the index entry but not the file; load_banner
    // falls back to a rebuild.
    let mut cache = make_cache(config);
    cache.load_banner(&source);
    assert!(cache.is_resident(&source));
    assert!(cache_file.exists());
}

#[test]
fn test_unusable_record_blocks_texture_resolution() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("banner.png");
    write_png(&source, 640, 80, [10, 20, 30, 255]);
    let source = source.to_string_lossy().into_owned();

    let config = config_in(&temp, CacheMode::Preload);
    make_cache(config.clone()).cache_banner(&source);

    // Rewrite the index with a zero-dimension record for the same path.
    let index_path = config.index_path();
    std::fs::write(
        &index_path,
        format!("[{source}]\nPath=whatever\nWidth=0\nHeight=0\n"),
    )
    .unwrap();

    let mut cache = make_cache(config);
    cache.load_banner(&source);
    assert!(cache.is_resident(&source));

    // The surface is resident, but the record cannot be trusted.
    let id = cache.load_cached_banner(&source);
    assert!(!cache.is_texture_registered(&id));
}

#[test]
fn test_unload_all_banners() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("banner.png");
    write_png(&source, 640, 80, [10, 20, 30, 255]);
    let source = source.to_string_lossy().into_owned();

    let mut cache = make_cache(config_in(&temp, CacheMode::Preload));
    cache.cache_banner(&source);
    let id = cache.load_cached_banner(&source);
    assert!(cache.is_texture_registered(&id));

    cache.unload_all_banners();
    assert!(!cache.is_resident(&source));
    assert!(!cache.is_texture_registered(&id));
    assert_eq!(cache.stats().resident_bytes, 0);
    // The on-disk cache survives.
    assert!(cache.cache_file_path(&source).exists());
    cache.unload_all_banners();
}
