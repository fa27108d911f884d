//! Area-correct resizing
//!
//! Box-filter resize: every destination pixel averages the exact source
//! area it covers, weighting partially-covered source pixels by overlap.
//! This is what keeps sharp banner edges from shimmering after the
//! downscale to power-of-two dimensions.

use super::{convert, Rgba, Surface, SurfaceFormat};

/// Per-axis coverage of destination pixel `d` over the source axis.
fn coverage(d: u32, dst_len: u32, src_len: u32) -> (f64, f64) {
    let scale = src_len as f64 / dst_len as f64;
    let start = d as f64 * scale;
    let end = (d as f64 + 1.0) * scale;
    (start, end.min(src_len as f64))
}

/// Resize `src` to `dst_width` x `dst_height`, returning a new RGBA8888
/// surface. Paletted and packed inputs are expanded first.
pub fn zoom(src: &Surface, dst_width: u32, dst_height: u32) -> Surface {
    let src = match src.format() {
        SurfaceFormat::Rgba8888 => src.clone(),
        _ => convert::to_rgba8888(src),
    };
    if src.width() == dst_width && src.height() == dst_height {
        return src;
    }

    let mut dst = Surface::new(dst_width, dst_height, SurfaceFormat::Rgba8888);
    for dy in 0..dst_height {
        let (sy0, sy1) = coverage(dy, dst_height, src.height());
        let y_first = sy0.floor() as u32;
        let y_last = (sy1.ceil() as u32).min(src.height());
        for dx in 0..dst_width {
            let (sx0, sx1) = coverage(dx, dst_width, src.width());
            let x_first = sx0.floor() as u32;
            let x_last = (sx1.ceil() as u32).min(src.width());

            let mut sum = [0f64; 4];
            let mut area = 0f64;
            for sy in y_first..y_last {
                let wy = (sy as f64 + 1.0).min(sy1) - (sy as f64).max(sy0);
                if wy <= 0.0 {
                    continue;
                }
                for sx in x_first..x_last {
                    let wx = (sx as f64 + 1.0).min(sx1) - (sx as f64).max(sx0);
                    if wx <= 0.0 {
                        continue;
                    }
                    let weight = wx * wy;
                    let pixel = src.get_rgba(sx, sy);
                    sum[0] += pixel.r as f64 * weight;
                    sum[1] += pixel.g as f64 * weight;
                    sum[2] += pixel.b as f64 * weight;
                    sum[3] += pixel.a as f64 * weight;
                    area += weight;
                }
            }

            let color = if area > 0.0 {
                Rgba {
                    r: (sum[0] / area).round().clamp(0.0, 255.0) as u8,
                    g: (sum[1] / area).round().clamp(0.0, 255.0) as u8,
                    b: (sum[2] / area).round().clamp(0.0, 255.0) as u8,
                    a: (sum[3] / area).round().clamp(0.0, 255.0) as u8,
                }
            } else {
                Rgba::default()
            };
            dst.put_rgba(dx, dy, color);
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: Rgba) -> Surface {
        let mut surface = Surface::new(width, height, SurfaceFormat::Rgba8888);
        for y in 0..height {
            for x in 0..width {
                surface.put_rgba(x, y, color);
            }
        }
        surface
    }

    #[test]
    fn test_solid_color_survives_resize() {
        let color = Rgba::new(120, 50, 200, 255);
        let src = solid(64, 16, color);
        let dst = zoom(&src, 32, 8);
        assert_eq!(dst.width(), 32);
        assert_eq!(dst.height(), 8);
        for y in 0..8 {
            for x in 0..32 {
                assert_eq!(dst.get_rgba(x, y), color);
            }
        }
    }

    #[test]
    fn test_downscale_averages_area() {
        // 2x1 black/white collapses to a single mid-grey pixel.
        let mut src = Surface::new(2, 1, SurfaceFormat::Rgba8888);
        src.put_rgba(0, 0, Rgba::new(0, 0, 0, 255));
        src.put_rgba(1, 0, Rgba::new(255, 255, 255, 255));

        let dst = zoom(&src, 1, 1);
        let pixel = dst.get_rgba(0, 0);
        assert!((pixel.r as i32 - 128).abs() <= 1);
        assert_eq!(pixel.a, 255);
    }

    #[test]
    fn test_identity_resize_is_copy() {
        let mut src = Surface::new(3, 3, SurfaceFormat::Rgba8888);
        src.put_rgba(1, 1, Rgba::new(9, 9, 9, 9));
        assert_eq!(zoom(&src, 3, 3), src);
    }

    #[test]
    fn test_upscale_dimensions() {
        let src = solid(4, 4, Rgba::new(7, 7, 7, 255));
        let dst = zoom(&src, 8, 2);
        assert_eq!((dst.width(), dst.height()), (8, 2));
        assert_eq!(dst.get_rgba(7, 1), Rgba::new(7, 7, 7, 255));
    }
}
