//! RGB565 pixel packing
//!
//! The panel is driven in 16 bits/pixel mode (COLMOD 0x05). Each pixel is
//! sent as two bytes, most significant first:
//!
//! ```text
//!   hi byte: R7 R6 R5 R4 R3 G7 G6 G5
//!   lo byte: G4 G3 G2 B7 B6 B5 B4 B3
//! ```

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// Pack a 24-bit color into the two RGB565 bytes the panel expects
#[inline]
pub fn pack_rgb565(color: Rgb888) -> [u8; 2] {
    let (r, g, b) = (color.r(), color.g(), color.b());
    let hi = (r & 0xF8) | (g >> 5);
    let lo = ((g << 3) & 0xE0) | (b >> 3);
    [hi, lo]
}

/// Expand RGB565 bytes back to 24-bit color
///
/// Low bits dropped by [`pack_rgb565`] come back as zero, so inputs whose
/// channels are already 5/6/5-bit aligned survive a pack/unpack unchanged.
#[inline]
pub fn unpack_rgb565(bytes: [u8; 2]) -> Rgb888 {
    let [hi, lo] = bytes;
    let r = hi & 0xF8;
    let g = ((hi & 0x07) << 5) | ((lo & 0xE0) >> 3);
    let b = (lo & 0x1F) << 3;
    Rgb888::new(r, g, b)
}
