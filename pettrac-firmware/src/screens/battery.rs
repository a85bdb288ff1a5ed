//! Battery detail screen

use pettrac_core::screen::{Screen, ScreenContext};
use pettrac_display::FrameBuffer;

use super::widgets::{bar, fmt_flag, fmt_percent, fmt_voltage, footer, header, level_color, row};
use super::BATTERY;

/// Gauge position below the text rows
const GAUGE_TOP: i32 = 150;
const GAUGE_HEIGHT: u32 = 30;

#[derive(Debug, Default)]
pub struct BatteryScreen;

impl Screen for BatteryScreen {
    fn name(&self) -> &str {
        BATTERY
    }

    fn draw(&mut self, frame: &mut FrameBuffer, ctx: &ScreenContext<'_>) {
        let state = ctx.state;
        let percentage = state.battery_percentage.get();

        header(frame, "Battery");
        row(frame, 0, "Charge", &fmt_percent(percentage));
        row(frame, 1, "Voltage", &fmt_voltage(state.battery_voltage.get()));
        row(
            frame,
            2,
            "Charging",
            &fmt_flag(state.charging.get(), "yes", "no"),
        );
        if let Some(p) = percentage {
            bar(frame, GAUGE_TOP, GAUGE_HEIGHT, p, level_color(p));
        }
        footer(frame, "KEY1 home");
    }
}
