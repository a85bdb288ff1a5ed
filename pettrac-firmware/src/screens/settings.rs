//! Settings screen
//!
//! Up/down picks an item, left/right changes it, press goes back home.
//! Changes go through the app state observables, so the render loop applies
//! them to the display and the persister writes them to the config file.

use std::time::Duration;

use pettrac_core::events::{Event, EventPayload};
use pettrac_core::input::Button;
use pettrac_core::screen::{Screen, ScreenContext};
use pettrac_core::AppState;
use pettrac_display::FrameBuffer;

use super::widgets::{footer, header, highlight_row, row};
use super::{DESKTOP, SETTINGS};

/// Brightness change per left/right press
pub const BRIGHTNESS_STEP: u8 = 10;

/// Lowest brightness reachable from the menu; 0 would blank the panel
pub const MIN_BRIGHTNESS: u8 = 10;

const TOAST_DURATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Brightness,
    Rotation,
    DebugMode,
}

impl Item {
    pub const ALL: [Item; 3] = [Item::Brightness, Item::Rotation, Item::DebugMode];

    fn label(self) -> &'static str {
        match self {
            Item::Brightness => "Brightness",
            Item::Rotation => "Rotation",
            Item::DebugMode => "Debug",
        }
    }

    fn value(self, state: &AppState) -> String {
        match self {
            Item::Brightness => format!("{}%", state.brightness.get()),
            Item::Rotation => state.rotation.get().degrees().to_string(),
            Item::DebugMode => {
                let on = state.debug_mode.get();
                (if on { "on" } else { "off" }).to_string()
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SettingsScreen {
    selected: usize,
}

impl SettingsScreen {
    pub fn selected(&self) -> Item {
        Item::ALL[self.selected]
    }

    fn step_selection(&mut self, forward: bool) {
        let n = Item::ALL.len();
        self.selected = if forward {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        };
    }

    fn adjust(&self, increase: bool, ctx: &ScreenContext<'_>) {
        let state = ctx.state;
        let item = self.selected();
        match item {
            Item::Brightness => {
                let current = state.brightness.get();
                let next = if increase {
                    current.saturating_add(BRIGHTNESS_STEP).min(100)
                } else {
                    current.saturating_sub(BRIGHTNESS_STEP).max(MIN_BRIGHTNESS)
                };
                state.brightness.set(next);
            }
            Item::Rotation => {
                let current = state.rotation.get();
                state
                    .rotation
                    .set(if increase { current.next() } else { current.prev() });
            }
            Item::DebugMode => {
                state.debug_mode.set(!state.debug_mode.get());
            }
        }
        ctx.show_toast(
            format!("{} {}", item.label(), item.value(state)),
            TOAST_DURATION,
        );
    }
}

impl Screen for SettingsScreen {
    fn name(&self) -> &str {
        SETTINGS
    }

    fn handle_event(&mut self, event: &mut Event, ctx: &ScreenContext<'_>) {
        let EventPayload::ButtonPress { button } = *event.payload() else {
            return;
        };
        match button {
            Button::Up => self.step_selection(false),
            Button::Down => self.step_selection(true),
            Button::Left => self.adjust(false, ctx),
            Button::Right => self.adjust(true, ctx),
            Button::Press => {
                ctx.state.current_screen.set(DESKTOP.to_string());
            }
            _ => return,
        }
        event.mark_handled();
    }

    fn draw(&mut self, frame: &mut FrameBuffer, ctx: &ScreenContext<'_>) {
        header(frame, "Settings");
        highlight_row(frame, self.selected);
        for (i, item) in Item::ALL.iter().enumerate() {
            row(frame, i, item.label(), &item.value(ctx.state));
        }
        footer(frame, "UP/DOWN select  LEFT/RIGHT change");
    }
}
