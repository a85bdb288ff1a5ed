//! Drawing helpers shared by the built-in screens
//!
//! All layout is for the 240x240 panel: a header bar, up to six label/value
//! rows in the 10x20 font and a one-line footer in the 6x10 font.

use std::time::Duration;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use pettrac_display::FrameBuffer;

pub const HEADER_HEIGHT: i32 = 32;
pub const ROW_HEIGHT: i32 = 28;
pub const ROW_TOP: i32 = HEADER_HEIGHT + 8;
pub const MARGIN: i32 = 10;

pub const HEADER_COLOR: Rgb888 = Rgb888::new(0, 0, 128);
pub const LABEL_COLOR: Rgb888 = Rgb888::new(160, 160, 160);
pub const HIGHLIGHT_COLOR: Rgb888 = Rgb888::new(40, 40, 96);

fn width(frame: &FrameBuffer) -> i32 {
    frame.width() as i32
}

fn text(frame: &mut FrameBuffer, s: &str, at: Point, color: Rgb888, alignment: Alignment) {
    let style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Middle)
        .build();
    let _ = Text::with_text_style(s, at, MonoTextStyle::new(&FONT_10X20, color), style).draw(frame);
}

/// Title bar across the top
pub fn header(frame: &mut FrameBuffer, title: &str) {
    let w = width(frame);
    let _ = Rectangle::new(Point::zero(), Size::new(w as u32, HEADER_HEIGHT as u32))
        .into_styled(PrimitiveStyle::with_fill(HEADER_COLOR))
        .draw(frame);
    text(
        frame,
        title,
        Point::new(w / 2, HEADER_HEIGHT / 2),
        Rgb888::WHITE,
        Alignment::Center,
    );
}

/// Vertical centre of row `index`
pub fn row_center(index: usize) -> i32 {
    ROW_TOP + index as i32 * ROW_HEIGHT + ROW_HEIGHT / 2
}

/// Label on the left, value right-aligned
pub fn row(frame: &mut FrameBuffer, index: usize, label: &str, value: &str) {
    let y = row_center(index);
    let w = width(frame);
    text(frame, label, Point::new(MARGIN, y), LABEL_COLOR, Alignment::Left);
    text(frame, value, Point::new(w - MARGIN, y), Rgb888::WHITE, Alignment::Right);
}

/// Background band behind row `index`
pub fn highlight_row(frame: &mut FrameBuffer, index: usize) {
    let top = ROW_TOP + index as i32 * ROW_HEIGHT;
    let w = width(frame);
    let _ = Rectangle::new(Point::new(0, top), Size::new(w as u32, ROW_HEIGHT as u32))
        .into_styled(PrimitiveStyle::with_fill(HIGHLIGHT_COLOR))
        .draw(frame);
}

/// Horizontal gauge filled to `percent`
pub fn bar(frame: &mut FrameBuffer, top: i32, height: u32, percent: u8, color: Rgb888) {
    let w = width(frame) - 2 * MARGIN;
    let outline = PrimitiveStyleBuilder::new()
        .stroke_color(Rgb888::WHITE)
        .stroke_width(1)
        .build();
    let _ = Rectangle::new(Point::new(MARGIN, top), Size::new(w as u32, height))
        .into_styled(outline)
        .draw(frame);

    let filled = (w - 4) * i32::from(percent.min(100)) / 100;
    if filled > 0 {
        let _ = Rectangle::new(
            Point::new(MARGIN + 2, top + 2),
            Size::new(filled as u32, height.saturating_sub(4)),
        )
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(frame);
    }
}

/// Small centred hint line at the bottom
pub fn footer(frame: &mut FrameBuffer, hint: &str) {
    let w = width(frame);
    let h = frame.height() as i32;
    let style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Bottom)
        .build();
    let _ = Text::with_text_style(
        hint,
        Point::new(w / 2, h - 4),
        MonoTextStyle::new(&FONT_6X10, LABEL_COLOR),
        style,
    )
    .draw(frame);
}

/// Gauge color for a charge level
pub fn level_color(percent: u8) -> Rgb888 {
    match percent {
        0..=10 => Rgb888::RED,
        11..=20 => Rgb888::YELLOW,
        _ => Rgb888::GREEN,
    }
}

pub fn fmt_percent(value: Option<u8>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{}%", v))
}

pub fn fmt_usage(value: f32) -> String {
    format!("{:.0}%", value)
}

/// Millivolts as volts with two decimals
pub fn fmt_voltage(value: Option<u16>) -> String {
    value.map_or_else(
        || "--".to_string(),
        |mv| format!("{}.{:02} V", mv / 1000, (mv % 1000) / 10),
    )
}

pub fn fmt_flag(value: Option<bool>, yes: &str, no: &str) -> String {
    match value {
        Some(true) => yes.to_string(),
        Some(false) => no.to_string(),
        None => "--".to_string(),
    }
}

/// `HH:MM:SS`, hours keep counting past 24
pub fn fmt_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        assert_eq!(fmt_percent(Some(76)), "76%");
        assert_eq!(fmt_percent(None), "--");
        assert_eq!(fmt_voltage(Some(4012)), "4.01 V");
        assert_eq!(fmt_voltage(Some(3905)), "3.90 V");
        assert_eq!(fmt_voltage(None), "--");
        assert_eq!(fmt_usage(12.6), "13%");
        assert_eq!(fmt_flag(Some(true), "yes", "no"), "yes");
        assert_eq!(fmt_flag(None, "yes", "no"), "--");
        assert_eq!(fmt_uptime(Duration::from_secs(3723)), "01:02:03");
        assert_eq!(fmt_uptime(Duration::from_secs(90_000)), "25:00:00");
    }

    #[test]
    fn test_header_paints_top_band() {
        let mut frame = FrameBuffer::panel();
        header(&mut frame, "Test");
        assert_eq!(frame.pixel(0, 0), Some(HEADER_COLOR));
        assert_eq!(frame.pixel(239, HEADER_HEIGHT as usize - 1), Some(HEADER_COLOR));
        assert_eq!(frame.pixel(0, HEADER_HEIGHT as usize), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_bar_fill_tracks_percent() {
        let mut frame = FrameBuffer::panel();
        bar(&mut frame, 100, 20, 50, Rgb888::GREEN);

        let y = 110;
        assert_eq!(frame.pixel(MARGIN as usize, y), Some(Rgb888::WHITE));
        assert_eq!(frame.pixel(MARGIN as usize + 2, y), Some(Rgb888::GREEN));
        // Inner width 216, half is 108
        assert_eq!(frame.pixel(MARGIN as usize + 2 + 107, y), Some(Rgb888::GREEN));
        assert_eq!(frame.pixel(MARGIN as usize + 2 + 108, y), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_level_color() {
        assert_eq!(level_color(5), Rgb888::RED);
        assert_eq!(level_color(20), Rgb888::YELLOW);
        assert_eq!(level_color(21), Rgb888::GREEN);
    }
}
