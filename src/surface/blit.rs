//! Quadrilateral blit with bilinear sampling
//!
//! Maps an arbitrary quad within the source onto the full destination
//! surface. Used to un-rotate diagonal banners: the quad corners trace the
//! rotated banner inside its square source texture, and sampling with a
//! linear filter keeps the result aligned with the full-resolution art it
//! cross-fades against.

use super::{Rgba, Surface, SurfaceFormat};

/// Normalized source coordinates of the destination's four corners, in the
/// order top-left, bottom-left, bottom-right, top-right. Each corner is an
/// (x, y) pair in [0, 1].
pub type QuadCoords = [f32; 8];

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sample `src` at a fractional pixel-space position with bilinear
/// filtering, clamping at the edges.
fn sample_bilinear(src: &Surface, fx: f32, fy: f32) -> Rgba {
    let max_x = (src.width() - 1) as f32;
    let max_y = (src.height() - 1) as f32;
    let gx = (fx - 0.5).clamp(0.0, max_x);
    let gy = (fy - 0.5).clamp(0.0, max_y);

    let x0 = gx.floor() as u32;
    let y0 = gy.floor() as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let tx = gx - x0 as f32;
    let ty = gy - y0 as f32;

    let mix = |c00: u8, c10: u8, c01: u8, c11: u8| -> u8 {
        let top = lerp(c00 as f32, c10 as f32, tx);
        let bottom = lerp(c01 as f32, c11 as f32, tx);
        lerp(top, bottom, ty).round().clamp(0.0, 255.0) as u8
    };

    let p00 = src.get_rgba(x0, y0);
    let p10 = src.get_rgba(x1, y0);
    let p01 = src.get_rgba(x0, y1);
    let p11 = src.get_rgba(x1, y1);
    Rgba {
        r: mix(p00.r, p10.r, p01.r, p11.r),
        g: mix(p00.g, p10.g, p01.g, p11.g),
        b: mix(p00.b, p10.b, p01.b, p11.b),
        a: mix(p00.a, p10.a, p01.a, p11.a),
    }
}

/// Fill `dst` by sampling the source quad described by `coords`.
///
/// Both surfaces must be RGBA8888; callers convert before blitting.
pub fn blit_transform(src: &Surface, dst: &mut Surface, coords: &QuadCoords) {
    debug_assert_eq!(src.format(), &SurfaceFormat::Rgba8888);
    debug_assert_eq!(dst.format(), &SurfaceFormat::Rgba8888);
    if src.is_empty() || dst.is_empty() {
        return;
    }

    let (tl_x, tl_y) = (coords[0], coords[1]);
    let (bl_x, bl_y) = (coords[2], coords[3]);
    let (br_x, br_y) = (coords[4], coords[5]);
    let (tr_x, tr_y) = (coords[6], coords[7]);

    let width = dst.width();
    let height = dst.height();
    for y in 0..height {
        let v = (y as f32 + 0.5) / height as f32;
        let left_x = lerp(tl_x, bl_x, v);
        let left_y = lerp(tl_y, bl_y, v);
        let right_x = lerp(tr_x, br_x, v);
        let right_y = lerp(tr_y, br_y, v);
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            let sx = lerp(left_x, right_x, u) * src.width() as f32;
            let sy = lerp(left_y, right_y, u) * src.height() as f32;
            dst.put_rgba(x, y, sample_bilinear(src, sx, sy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity quad covering the full source.
    const FULL: QuadCoords = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0];

    fn gradient(size: u32) -> Surface {
        let mut surface = Surface::new(size, size, SurfaceFormat::Rgba8888);
        for y in 0..size {
            for x in 0..size {
                let r = (x * 255 / (size - 1)) as u8;
                let g = (y * 255 / (size - 1)) as u8;
                surface.put_rgba(x, y, Rgba::new(r, g, 0, 255));
            }
        }
        surface
    }

    #[test]
    fn test_full_quad_preserves_corners() {
        let src = gradient(16);
        let mut dst = Surface::new(16, 16, SurfaceFormat::Rgba8888);
        blit_transform(&src, &mut dst, &FULL);

        assert_eq!(dst.get_rgba(0, 0), src.get_rgba(0, 0));
        assert_eq!(dst.get_rgba(15, 15), src.get_rgba(15, 15));
    }

    #[test]
    fn test_subquad_samples_interior() {
        let mut src = Surface::new(8, 8, SurfaceFormat::Rgba8888);
        for y in 0..8 {
            for x in 0..8 {
                // Left half red, right half blue.
                let color = if x < 4 {
                    Rgba::new(255, 0, 0, 255)
                } else {
                    Rgba::new(0, 0, 255, 255)
                };
                src.put_rgba(x, y, color);
            }
        }

        // Quad restricted to the left half only sees red.
        let left_half: QuadCoords = [0.0, 0.0, 0.0, 1.0, 0.45, 1.0, 0.45, 0.0];
        let mut dst = Surface::new(4, 4, SurfaceFormat::Rgba8888);
        blit_transform(&src, &mut dst, &left_half);
        for y in 0..4 {
            for x in 0..4 {
                let pixel = dst.get_rgba(x, y);
                assert!(pixel.r > pixel.b, "expected red-dominant at {x},{y}");
            }
        }
    }

    #[test]
    fn test_diagonal_quad_rotates() {
        // A source split along the diagonal: a quad whose corners follow the
        // rotation should land mostly on one side's color.
        let size = 32;
        let mut src = Surface::new(size, size, SurfaceFormat::Rgba8888);
        for y in 0..size {
            for x in 0..size {
                let color = if x + y < size {
                    Rgba::new(255, 255, 255, 255)
                } else {
                    Rgba::new(0, 0, 0, 255)
                };
                src.put_rgba(x, y, color);
            }
        }

        let above_diagonal: QuadCoords = [0.0, 0.0, 0.0, 0.4, 0.4, 0.0, 0.2, 0.0];
        let mut dst = Surface::new(8, 8, SurfaceFormat::Rgba8888);
        blit_transform(&src, &mut dst, &above_diagonal);
        assert_eq!(dst.get_rgba(4, 4).r, 255);
    }
}
