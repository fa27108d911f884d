//! Power-of-two target sizing
//!
//! Cached banners are stored at half the source resolution, rounded so the
//! texture loader never has to pad: each dimension independently snaps to
//! the nearer of its enclosing power of two or half that value, and is
//! clamped so already-tiny sources are not shrunk further.

/// Smallest power of two >= `n` (1 for n == 0).
pub fn enclosing_power_of_two(n: u32) -> u32 {
    n.max(1).next_power_of_two()
}

/// Largest power of two <= `n` (1 for n == 0).
pub fn floor_power_of_two(n: u32) -> u32 {
    let n = n.max(1);
    if n.is_power_of_two() {
        n
    } else {
        n.next_power_of_two() / 2
    }
}

/// Whichever of `n1`/`n2` is nearer to `num`. Ties go to `n1`: the
/// comparison is a strict greater-than, so an equidistant value keeps the
/// first candidate.
fn closest(num: u32, n1: u32, n2: u32) -> u32 {
    let distance = |a: u32, b: u32| (a as i64 - b as i64).abs();
    if distance(num, n1) > distance(num, n2) {
        n2
    } else {
        n1
    }
}

/// Reduced cache size for one source dimension.
pub fn reduced_dimension(source: u32) -> u32 {
    let halved = source / 2;
    let pot = enclosing_power_of_two(halved);
    let rounded = closest(halved, pot, pot / 2);

    // Keep at least 32 pixels, or the source's own power of two when that
    // is smaller; the floor variant never enlarges a tiny source.
    let minimum = 32.min(floor_power_of_two(source));
    rounded.max(minimum)
}

/// Reduced cache size for a full surface.
pub fn reduced_dimensions(width: u32, height: u32) -> (u32, u32) {
    (reduced_dimension(width), reduced_dimension(height))
}
