//! Toast overlay

use embedded_graphics::mono_font::{ascii::FONT_10X20, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use pettrac_display::FrameBuffer;

/// Toast box height in pixels
pub const TOAST_HEIGHT: i32 = 40;

/// Horizontal gap between the box and the frame edge
pub const TOAST_MARGIN: i32 = 10;

/// Paint `message` in a box centred vertically on the frame
pub fn draw_toast(frame: &mut FrameBuffer, message: &str) {
    let width = frame.width() as i32;
    let top = (frame.height() as i32 - TOAST_HEIGHT) / 2;

    let style = PrimitiveStyleBuilder::new()
        .fill_color(Rgb888::BLUE)
        .stroke_color(Rgb888::CYAN)
        .stroke_width(1)
        .build();
    let _ = Rectangle::with_corners(
        Point::new(TOAST_MARGIN, top),
        Point::new(width - TOAST_MARGIN, top + TOAST_HEIGHT),
    )
    .into_styled(style)
    .draw(frame);

    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    let _ = Text::with_text_style(
        message,
        Point::new(width / 2, top + TOAST_HEIGHT / 2),
        MonoTextStyle::new(&FONT_10X20, Rgb888::WHITE),
        text_style,
    )
    .draw(frame);
}
