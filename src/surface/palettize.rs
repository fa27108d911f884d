//! Median-cut palettization
//!
//! Quantizes a surface to an 8-bit indexed format with at most 256 palette
//! entries. Images that already fit in 256 unique colors keep their exact
//! colors; anything richer goes through median-cut boxes.

use std::collections::HashMap;

use super::{convert, Rgba, Surface, SurfaceFormat};

pub const MAX_PALETTE_SIZE: usize = 256;

/// A box of colors under consideration for one palette slot.
struct ColorBox {
    colors: Vec<(Rgba, u32)>,
}

impl ColorBox {
    fn channel_range(&self, channel: usize) -> u8 {
        let values = self.colors.iter().map(|(c, _)| channel_of(*c, channel));
        let min = values.clone().min().unwrap_or(0);
        let max = values.max().unwrap_or(0);
        max - min
    }

    fn widest_channel(&self) -> usize {
        (0..4)
            .max_by_key(|&channel| self.channel_range(channel))
            .unwrap_or(0)
    }

    /// Split at the median of the widest channel. Returns the upper half.
    fn split(&mut self) -> ColorBox {
        let channel = self.widest_channel();
        self.colors
            .sort_by_key(|(color, _)| channel_of(*color, channel));
        let mid = self.colors.len() / 2;
        ColorBox {
            colors: self.colors.split_off(mid),
        }
    }

    fn average(&self) -> Rgba {
        let mut sum = [0u64; 4];
        let mut weight = 0u64;
        for (color, count) in &self.colors {
            let count = *count as u64;
            sum[0] += color.r as u64 * count;
            sum[1] += color.g as u64 * count;
            sum[2] += color.b as u64 * count;
            sum[3] += color.a as u64 * count;
            weight += count;
        }
        if weight == 0 {
            return Rgba::default();
        }
        Rgba {
            r: (sum[0] / weight) as u8,
            g: (sum[1] / weight) as u8,
            b: (sum[2] / weight) as u8,
            a: (sum[3] / weight) as u8,
        }
    }
}

fn channel_of(color: Rgba, channel: usize) -> u8 {
    match channel {
        0 => color.r,
        1 => color.g,
        2 => color.b,
        _ => color.a,
    }
}

fn color_distance(a: Rgba, b: Rgba) -> u32 {
    let d = |x: u8, y: u8| {
        let diff = x as i32 - y as i32;
        (diff * diff) as u32
    };
    d(a.r, b.r) + d(a.g, b.g) + d(a.b, b.b) + d(a.a, b.a)
}

fn nearest_index(palette: &[Rgba], color: Rgba) -> u8 {
    let mut best = 0usize;
    let mut best_distance = u32::MAX;
    for (index, entry) in palette.iter().enumerate() {
        let distance = color_distance(*entry, color);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best as u8
}

/// Build a palette of at most 256 colors for the given histogram.
fn build_palette(histogram: &HashMap<Rgba, u32>) -> Vec<Rgba> {
    if histogram.len() <= MAX_PALETTE_SIZE {
        let mut palette: Vec<Rgba> = histogram.keys().copied().collect();
        // Deterministic palette order regardless of hash iteration.
        palette.sort_by_key(|c| (c.a, c.r, c.g, c.b));
        return palette;
    }

    let mut boxes = vec![ColorBox {
        colors: histogram.iter().map(|(c, n)| (*c, *n)).collect(),
    }];
    while boxes.len() < MAX_PALETTE_SIZE {
        // Split the box with the most colors left in it.
        let (widest, _) = boxes
            .iter()
            .enumerate()
            .max_by_key(|(_, b)| b.colors.len())
            .map(|(i, b)| (i, b.colors.len()))
            .unwrap_or((0, 0));
        if boxes[widest].colors.len() < 2 {
            break;
        }
        let upper = boxes[widest].split();
        boxes.push(upper);
    }
    boxes.iter().map(ColorBox::average).collect()
}

/// Quantize to an 8-bit indexed surface.
pub fn palettize(src: &Surface) -> Surface {
    let rgba = match src.format() {
        SurfaceFormat::Rgba8888 => src.clone(),
        _ => convert::to_rgba8888(src),
    };

    let mut histogram: HashMap<Rgba, u32> = HashMap::new();
    for y in 0..rgba.height() {
        for x in 0..rgba.width() {
            *histogram.entry(rgba.get_rgba(x, y)).or_insert(0) += 1;
        }
    }

    let palette = build_palette(&histogram);
    let lookup: HashMap<Rgba, u8> = histogram
        .keys()
        .map(|&color| (color, nearest_index(&palette, color)))
        .collect();

    let mut dst = Surface::new(
        rgba.width(),
        rgba.height(),
        SurfaceFormat::Indexed8 { palette },
    );
    for y in 0..rgba.height() {
        for x in 0..rgba.width() {
            let index = lookup[&rgba.get_rgba(x, y)];
            let at = y as usize * dst.pitch() + x as usize;
            dst.pixels_mut()[at] = index;
        }
    }
    dst
}
