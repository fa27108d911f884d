use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use banner_cache::{
    cache::BannerCache,
    config::{BannerCacheConfig, CacheMode},
    surface::codec::FileImageCodec,
    surface::Surface,
    texture::{Renderer, TextureFormat, TextureHandle},
};

#[derive(Parser)]
#[command(name = "banner-cache")]
#[command(version = "0.1.0")]
#[command(about = "Builds and inspects the reduced-size banner cache")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Cache directory (overrides config file)
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Cache mode (off, preload, on-demand; overrides config file)
    #[arg(short, long, value_name = "MODE")]
    mode: Option<CacheMode>,

    /// Trust existing cache files without checking source hashes
    #[arg(long)]
    fast_load: bool,

    /// Palettize cached banners instead of dithering to 16-bit
    #[arg(long)]
    paletted: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or refresh cache entries for the given banner files or
    /// directories (searched recursively)
    Warm {
        /// Source banner image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print index and residency statistics
    Stats,
}

const BANNER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

fn is_banner_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BANNER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Expand files and directories into the list of banner image files.
fn collect_banner_paths(roots: &[PathBuf]) -> Vec<String> {
    let mut found = Vec::new();
    let mut pending: Vec<PathBuf> = roots.to_vec();
    while let Some(path) = pending.pop() {
        if path.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(entries) => pending.extend(entries.flatten().map(|e| e.path())),
                Err(e) => warn!("Skipping unreadable directory {}: {}", path.display(), e),
            }
        } else if is_banner_file(&path) {
            found.push(path.to_string_lossy().into_owned());
        }
    }
    found.sort();
    found
}

/// Offline stand-in for the game's rendering backend. Accepts every
/// format and never allocates GPU resources, so the cache can be warmed
/// without a display.
struct NullRenderer;

impl Renderer for NullRenderer {
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

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("banner_cache={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = BannerCacheConfig::load_from_file(Path::new(&cli.config))?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if cli.fast_load {
        config.fast_load = true;
    }
    if cli.paletted {
        config.paletted = true;
    }

    let mut cache = BannerCache::new(
        config,
        Box::new(FileImageCodec),
        Rc::new(NullRenderer),
    );

    match cli.command {
        Command::Warm { paths } => {
            let sources = collect_banner_paths(&paths);
            info!("Warming cache for {} banner(s)", sources.len());
            for source in &sources {
                cache.cache_banner(source);
            }
            cache.output_stats();
        }
        Command::Stats => {
            let stats = cache.stats();
            println!("indexed records:  {}", stats.indexed_records);
            println!("resident banners: {}", stats.resident_banners);
            println!("resident bytes:   {}", stats.resident_bytes);
        }
    }

    Ok(())
}
