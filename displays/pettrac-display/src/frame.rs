//! Frame buffer
//!
//! A fixed-size grid of 24-bit pixels. One buffer is allocated at startup
//! and overwritten every tick; its dimensions never change.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use crate::color::pack_rgb565;
use crate::rotation::Rotation;

/// Panel width in pixels (1.3" LCD HAT)
pub const PANEL_WIDTH: usize = 240;

/// Panel height in pixels
pub const PANEL_HEIGHT: usize = 240;

/// 24-bit frame buffer, row-major, top-left origin
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb888>,
}

impl FrameBuffer {
    /// Create a black frame buffer of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb888::BLACK; width * height],
        }
    }

    /// Create a frame buffer matching the panel
    pub fn panel() -> Self {
        Self::new(PANEL_WIDTH, PANEL_HEIGHT)
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Fill every pixel with `color`
    pub fn fill(&mut self, color: Rgb888) {
        self.pixels.fill(color);
    }

    /// Read a pixel, `None` if out of bounds
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb888> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Write a pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb888) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Raw pixels in raster order
    pub fn pixels(&self) -> &[Rgb888] {
        &self.pixels
    }

    /// Dimensions after turning the frame counter-clockwise by `rotation`
    pub fn rotated_size(&self, rotation: Rotation) -> (usize, usize) {
        match rotation {
            Rotation::Deg0 | Rotation::Deg180 => (self.width, self.height),
            Rotation::Deg90 | Rotation::Deg270 => (self.height, self.width),
        }
    }

    /// Pixel at `(x, y)` of the frame turned counter-clockwise by `rotation`
    ///
    /// The frame itself is not modified; coordinates are mapped back into
    /// the unrotated buffer.
    pub fn rotated_pixel(&self, rotation: Rotation, x: usize, y: usize) -> Rgb888 {
        let (w, h) = (self.width, self.height);
        let (sx, sy) = match rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (w - 1 - y, x),
            Rotation::Deg180 => (w - 1 - x, h - 1 - y),
            Rotation::Deg270 => (y, h - 1 - x),
        };
        self.pixels[sy * w + sx]
    }

    /// Pack the frame, turned counter-clockwise by `rotation`, into RGB565
    ///
    /// `out` is cleared first and reused, so a buffer kept across ticks
    /// stops reallocating after the first frame.
    pub fn write_rgb565(&self, rotation: Rotation, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.width * self.height * 2);

        if rotation == Rotation::Deg0 {
            for &color in &self.pixels {
                out.extend_from_slice(&pack_rgb565(color));
            }
            return;
        }

        let (rw, rh) = self.rotated_size(rotation);
        for y in 0..rh {
            for x in 0..rw {
                out.extend_from_slice(&pack_rgb565(self.rotated_pixel(rotation, x, y)));
            }
        }
    }
}

impl core::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as usize, point.y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}
