//! Home screen: charge, load and uptime at a glance

use pettrac_core::screen::{Screen, ScreenContext};
use pettrac_display::FrameBuffer;

use super::widgets::{fmt_flag, fmt_percent, fmt_uptime, fmt_usage, footer, header, row};
use super::DESKTOP;

#[derive(Debug, Default)]
pub struct DesktopScreen;

impl Screen for DesktopScreen {
    fn name(&self) -> &str {
        DESKTOP
    }

    fn draw(&mut self, frame: &mut FrameBuffer, ctx: &ScreenContext<'_>) {
        let state = ctx.state;
        header(frame, "PeTTraC");
        row(frame, 0, "Battery", &fmt_percent(state.battery_percentage.get()));
        row(
            frame,
            1,
            "Power",
            &fmt_flag(state.charging.get(), "external", "battery"),
        );
        row(frame, 2, "CPU", &fmt_usage(state.cpu_usage.get()));
        row(frame, 3, "Memory", &fmt_usage(state.memory_usage.get()));
        row(frame, 4, "Uptime", &fmt_uptime(ctx.uptime()));
        footer(frame, "KEY1 home  KEY2 system  KEY3 battery");
    }
}
