//! Hot-pink color keying
//!
//! Banner art marks transparent regions with pure magenta. Keying runs
//! before resizing so edge pixels blend against transparency instead of
//! smearing pink into the result.

use super::{Rgba, Surface, SurfaceFormat};

/// The reserved transparency color: full red, no green, full blue.
pub const COLOR_KEY: Rgba = Rgba::new(255, 0, 255, 255);

fn matches_key(color: Rgba) -> bool {
    color.r == COLOR_KEY.r && color.g == COLOR_KEY.g && color.b == COLOR_KEY.b
}

/// Turn every color-key pixel fully transparent, in place.
///
/// For indexed surfaces only the palette is touched, so the operation is
/// O(palette) rather than O(pixels).
pub fn apply_color_key(surface: &mut Surface) {
    if let SurfaceFormat::Indexed8 { palette } = surface.format_mut() {
        for entry in palette.iter_mut() {
            if matches_key(*entry) {
                *entry = Rgba::new(0, 0, 0, 0);
            }
        }
        return;
    }
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            if matches_key(surface.get_rgba(x, y)) {
                surface.put_rgba(x, y, Rgba::new(0, 0, 0, 0));
            }
        }
    }
}
