//! Pixel format conversion
//!
//! Conversion is an explicit pipeline stage that returns a new buffer; the
//! transform stages that need direct channel access (blit, zoom, dither)
//! all operate on RGBA8888 and convert on entry.

use super::{Surface, SurfaceFormat};

/// Expand any surface into a fresh 32-bit RGBA surface.
pub fn to_rgba8888(src: &Surface) -> Surface {
    let mut dst = Surface::new(src.width(), src.height(), SurfaceFormat::Rgba8888);
    for y in 0..src.height() {
        for x in 0..src.width() {
            dst.put_rgba(x, y, src.get_rgba(x, y));
        }
    }
    dst
}

/// Return the surface unchanged when it is already RGBA8888, otherwise
/// convert it.
pub fn ensure_rgba8888(src: Surface) -> Surface {
    match src.format() {
        SurfaceFormat::Rgba8888 => src,
        _ => to_rgba8888(&src),
    }
}
