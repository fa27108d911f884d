//! Image codec boundary
//!
//! Two kinds of files cross this boundary: original banner art in whatever
//! format artists shipped (decoded through the `image` crate), and our own
//! cache container files. Cached surfaces are A1RGB5 or paletted, which no
//! mainstream interchange format round-trips exactly, so cache files use a
//! small private container: a fixed header, the palette when present, then
//! tightly-packed rows.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use image::ImageReader;
use tracing::debug;

use crate::errors::{CodecError, CodecResult};

use super::{Rgba, Surface, SurfaceFormat};

const CACHE_MAGIC: &[u8; 4] = b"BNSF";
const CACHE_VERSION: u8 = 1;

const FORMAT_RGBA8888: u8 = 0;
const FORMAT_RGBA5551: u8 = 1;
const FORMAT_INDEXED8: u8 = 2;

/// Narrow decode/encode contract the cache controller consumes.
pub trait ImageCodec {
    /// Decode an original banner file into a surface. Failures carry a
    /// message suitable for the user-facing diagnostic log.
    fn load_file(&self, path: &Path) -> CodecResult<Surface>;

    /// Load a cached surface container. Any failure, including the file
    /// simply not existing, reads as "absent".
    fn load_surface(&self, path: &Path) -> Option<Surface>;

    /// Persist a surface to a cache container file, creating parent
    /// directories as needed.
    fn save_surface(&self, surface: &Surface, path: &Path) -> CodecResult<()>;
}

/// Default filesystem-backed codec.
#[derive(Debug, Default, Clone)]
pub struct FileImageCodec;

impl ImageCodec for FileImageCodec {
    fn load_file(&self, path: &Path) -> CodecResult<Surface> {
        let decoded = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        Surface::from_pixels(width, height, SurfaceFormat::Rgba8888, rgba.into_raw()).ok_or(
            CodecError::Decode {
                message: "decoded buffer size mismatch".to_string(),
            },
        )
    }

    fn load_surface(&self, path: &Path) -> Option<Surface> {
        let data = fs::read(path).ok()?;
        match parse_container(&data) {
            Ok(surface) => Some(surface),
            Err(e) => {
                debug!("Discarding unreadable cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save_surface(&self, surface: &Surface, path: &Path) -> CodecResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(&encode_container(surface))?;
        file.sync_all()?;
        Ok(())
    }
}

fn format_tag(format: &SurfaceFormat) -> u8 {
    match format {
        SurfaceFormat::Rgba8888 => FORMAT_RGBA8888,
        SurfaceFormat::Rgba5551 => FORMAT_RGBA5551,
        SurfaceFormat::Indexed8 { .. } => FORMAT_INDEXED8,
    }
}

fn encode_container(surface: &Surface) -> Vec<u8> {
    let palette: &[Rgba] = match surface.format() {
        SurfaceFormat::Indexed8 { palette } => palette,
        _ => &[],
    };

    let mut out = Vec::with_capacity(16 + palette.len() * 4 + surface.pixels().len());
    out.extend_from_slice(CACHE_MAGIC);
    out.push(CACHE_VERSION);
    out.push(format_tag(surface.format()));
    out.extend_from_slice(&(palette.len() as u16).to_le_bytes());
    out.extend_from_slice(&surface.width().to_le_bytes());
    out.extend_from_slice(&surface.height().to_le_bytes());
    for entry in palette {
        out.extend_from_slice(&[entry.r, entry.g, entry.b, entry.a]);
    }
    out.extend_from_slice(surface.pixels());
    out
}

fn parse_container(data: &[u8]) -> CodecResult<Surface> {
    let unsupported = |message: &str| CodecError::UnsupportedSurface {
        message: message.to_string(),
    };

    if data.len() < 16 {
        return Err(unsupported("truncated header"));
    }
    if &data[0..4] != CACHE_MAGIC {
        return Err(unsupported("bad magic"));
    }
    if data[4] != CACHE_VERSION {
        return Err(unsupported("unknown version"));
    }
    let tag = data[5];
    let palette_len = u16::from_le_bytes([data[6], data[7]]) as usize;
    let width = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
    let height = u32::from_le_bytes([data[12], data[13], data[14], data[15]]);

    let palette_bytes = palette_len * 4;
    if data.len() < 16 + palette_bytes {
        return Err(unsupported("truncated palette"));
    }
    let palette: Vec<Rgba> = data[16..16 + palette_bytes]
        .chunks_exact(4)
        .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
        .collect();

    let format = match tag {
        FORMAT_RGBA8888 => SurfaceFormat::Rgba8888,
        FORMAT_RGBA5551 => SurfaceFormat::Rgba5551,
        FORMAT_INDEXED8 => SurfaceFormat::Indexed8 { palette },
        _ => return Err(unsupported("unknown format tag")),
    };

    let pixels = data[16 + palette_bytes..].to_vec();
    Surface::from_pixels(width, height, format, pixels)
        .ok_or_else(|| unsupported("pixel data size mismatch"))
}
