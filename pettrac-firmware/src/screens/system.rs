//! Host statistics screen

use pettrac_core::screen::{Screen, ScreenContext};
use pettrac_display::FrameBuffer;

use super::widgets::{fmt_usage, footer, header, row};
use super::SYSTEM;

#[derive(Debug, Default)]
pub struct SystemScreen;

impl Screen for SystemScreen {
    fn name(&self) -> &str {
        SYSTEM
    }

    fn draw(&mut self, frame: &mut FrameBuffer, ctx: &ScreenContext<'_>) {
        let state = ctx.state;
        header(frame, "System");
        row(frame, 0, "CPU", &fmt_usage(state.cpu_usage.get()));
        row(frame, 1, "Memory", &fmt_usage(state.memory_usage.get()));
        row(frame, 2, "Disk", &fmt_usage(state.disk_usage.get()));
        row(
            frame,
            3,
            "Temp",
            &format!("{:.1} C", state.temperature.get()),
        );
        row(frame, 4, "FPS", &format!("{:.1}", ctx.fps));
        let debug = if state.debug_mode.get() { "on" } else { "off" };
        row(frame, 5, "Debug", debug);
        footer(frame, "KEY1 home");
    }
}
