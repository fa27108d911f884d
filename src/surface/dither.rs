//! Ordered dithering down to A1RGB5
//!
//! A fixed 4x4 Bayer threshold matrix decides, per pixel, whether each
//! channel rounds up or down to its reduced depth. Deterministic and much
//! faster than error diffusion, which is the right trade for small images
//! that are only displayed briefly.

use super::{convert, Rgba, Surface, SurfaceFormat};

const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Reduce one 8-bit channel to `bits` using the threshold for (x, y).
fn dither_channel(value: u8, bits: u32, x: u32, y: u32) -> u16 {
    let levels = (1u16 << bits) - 1;
    let exact = value as f32 * levels as f32 / 255.0;
    let base = exact.floor();
    let threshold = (BAYER_4X4[(y % 4) as usize][(x % 4) as usize] as f32 + 0.5) / 16.0;
    let rounded = if exact - base > threshold {
        base + 1.0
    } else {
        base
    };
    (rounded as u16).min(levels)
}

/// Dither any surface into a fresh 16-bit A1RGB5 surface.
pub fn ordered_dither(src: &Surface) -> Surface {
    let src = match src.format() {
        SurfaceFormat::Rgba8888 => src.clone(),
        _ => convert::to_rgba8888(src),
    };

    let mut dst = Surface::new(src.width(), src.height(), SurfaceFormat::Rgba5551);
    for y in 0..src.height() {
        for x in 0..src.width() {
            let pixel = src.get_rgba(x, y);
            let r = dither_channel(pixel.r, 5, x, y);
            let g = dither_channel(pixel.g, 5, x, y);
            let b = dither_channel(pixel.b, 5, x, y);
            let a = dither_channel(pixel.a, 1, x, y);
            let packed = (a << 15) | (r << 10) | (g << 5) | b;
            let bytes = packed.to_le_bytes();
            let at = y as usize * dst.pitch() + x as usize * 2;
            dst.pixels_mut()[at] = bytes[0];
            dst.pixels_mut()[at + 1] = bytes[1];
        }
    }
    dst
}
