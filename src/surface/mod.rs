//! In-memory decoded pixel surfaces
//!
//! A [`Surface`] is an owned pixel buffer plus enough format information to
//! interpret it: dimensions, row pitch, and a [`SurfaceFormat`]. Only the
//! three formats the banner pipeline actually produces are supported:
//! 32-bit RGBA, 16-bit A1RGB5, and 8-bit indexed with a 256-entry palette.

pub mod blit;
pub mod codec;
pub mod color_key;
pub mod convert;
pub mod dither;
pub mod palettize;
pub mod zoom;

/// A single RGBA color value, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A1RGB5 channel masks, chosen for native support on common GPU backends.
pub const RGBA5551_RED_MASK: u16 = 0x7C00;
pub const RGBA5551_GREEN_MASK: u16 = 0x03E0;
pub const RGBA5551_BLUE_MASK: u16 = 0x001F;
pub const RGBA5551_ALPHA_MASK: u16 = 0x8000;

/// Pixel layout of a [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// 32 bits per pixel, byte order R, G, B, A.
    Rgba8888,
    /// 16 bits per pixel, little-endian A1RGB5 (see the mask constants).
    Rgba5551,
    /// 8 bits per pixel indexing into a palette of up to 256 RGBA entries.
    Indexed8 { palette: Vec<Rgba> },
}

impl SurfaceFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            SurfaceFormat::Rgba8888 => 4,
            SurfaceFormat::Rgba5551 => 2,
            SurfaceFormat::Indexed8 { .. } => 1,
        }
    }

    pub fn bits_per_pixel(&self) -> usize {
        self.bytes_per_pixel() * 8
    }

    pub fn is_paletted(&self) -> bool {
        matches!(self, SurfaceFormat::Indexed8 { .. })
    }
}

/// Pack an [`Rgba`] color into a 16-bit A1RGB5 value.
pub fn pack_rgba5551(color: Rgba) -> u16 {
    let r = (color.r as u16 >> 3) << 10;
    let g = (color.g as u16 >> 3) << 5;
    let b = color.b as u16 >> 3;
    let a = if color.a >= 128 { RGBA5551_ALPHA_MASK } else { 0 };
    a | r | g | b
}

/// Unpack a 16-bit A1RGB5 value, replicating high bits into the low bits so
/// full-intensity channels decode back to 255.
pub fn unpack_rgba5551(value: u16) -> Rgba {
    let expand5 = |c: u16| -> u8 { ((c << 3) | (c >> 2)) as u8 };
    Rgba {
        r: expand5((value & RGBA5551_RED_MASK) >> 10),
        g: expand5((value & RGBA5551_GREEN_MASK) >> 5),
        b: expand5(value & RGBA5551_BLUE_MASK),
        a: if value & RGBA5551_ALPHA_MASK != 0 { 255 } else { 0 },
    }
}

/// An owned, decoded pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pitch: usize,
    format: SurfaceFormat,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a zero-filled surface. Pitch is tightly packed.
    pub fn new(width: u32, height: u32, format: SurfaceFormat) -> Self {
        let pitch = width as usize * format.bytes_per_pixel();
        let pixels = vec![0u8; pitch * height as usize];
        Self {
            width,
            height,
            pitch,
            format,
            pixels,
        }
    }

    /// Create a surface from an existing tightly-packed pixel buffer.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: SurfaceFormat,
        pixels: Vec<u8>,
    ) -> Option<Self> {
        let pitch = width as usize * format.bytes_per_pixel();
        if pixels.len() != pitch * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pitch,
            format,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> &SurfaceFormat {
        &self.format
    }

    pub fn format_mut(&mut self) -> &mut SurfaceFormat {
        &mut self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Total in-memory footprint of the pixel data, pitch x height.
    pub fn byte_size(&self) -> usize {
        self.pitch * self.height as usize
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.pitch + x as usize * self.format.bytes_per_pixel()
    }

    /// Read the pixel at (x, y) as RGBA, resolving palettes and packed
    /// formats. Coordinates must be in bounds.
    pub fn get_rgba(&self, x: u32, y: u32) -> Rgba {
        debug_assert!(x < self.width && y < self.height);
        let at = self.offset(x, y);
        match &self.format {
            SurfaceFormat::Rgba8888 => Rgba {
                r: self.pixels[at],
                g: self.pixels[at + 1],
                b: self.pixels[at + 2],
                a: self.pixels[at + 3],
            },
            SurfaceFormat::Rgba5551 => {
                let value = u16::from_le_bytes([self.pixels[at], self.pixels[at + 1]]);
                unpack_rgba5551(value)
            }
            SurfaceFormat::Indexed8 { palette } => {
                let index = self.pixels[at] as usize;
                palette.get(index).copied().unwrap_or_default()
            }
        }
    }

    /// Write an RGBA pixel at (x, y). Not supported for indexed surfaces,
    /// which are only ever written through the palettizer.
    pub fn put_rgba(&mut self, x: u32, y: u32, color: Rgba) {
        debug_assert!(x < self.width && y < self.height);
        let at = self.offset(x, y);
        match self.format {
            SurfaceFormat::Rgba8888 => {
                self.pixels[at] = color.r;
                self.pixels[at + 1] = color.g;
                self.pixels[at + 2] = color.b;
                self.pixels[at + 3] = color.a;
            }
            SurfaceFormat::Rgba5551 => {
                let packed = pack_rgba5551(color).to_le_bytes();
                self.pixels[at] = packed[0];
                self.pixels[at + 1] = packed[1];
            }
            SurfaceFormat::Indexed8 { .. } => {
                debug_assert!(false, "direct pixel writes to indexed surfaces");
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
