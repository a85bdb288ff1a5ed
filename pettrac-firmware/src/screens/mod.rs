//! Built-in screens and key navigation
//!
//! - `desktop`: charge, load and uptime
//! - `system`: host statistics and frame rate
//! - `battery`: gauge detail
//! - `settings`: brightness, rotation and debug toggle
//!
//! The side keys jump between screens from anywhere; the joystick press
//! opens settings from the desktop.

pub mod battery;
pub mod desktop;
pub mod settings;
pub mod system;
pub mod widgets;

use std::rc::Weak;

use log::debug;
use pettrac_core::events::{Event, EventHandler, EventPayload, ListenerError};
use pettrac_core::input::Button;
use pettrac_core::screen::Screen;
use pettrac_core::AppState;

pub use battery::BatteryScreen;
pub use desktop::DesktopScreen;
pub use settings::SettingsScreen;
pub use system::SystemScreen;

pub const DESKTOP: &str = "desktop";
pub const SYSTEM: &str = "system";
pub const BATTERY: &str = "battery";
pub const SETTINGS: &str = "settings";

/// Screen factory for the render loop's cache
pub fn create(name: &str) -> Option<Box<dyn Screen>> {
    let screen: Box<dyn Screen> = match name {
        DESKTOP => Box::new(DesktopScreen),
        SYSTEM => Box::new(SystemScreen),
        BATTERY => Box::new(BatteryScreen),
        SETTINGS => Box::new(SettingsScreen::default()),
        _ => return None,
    };
    Some(screen)
}

/// `button_press` subscriber mapping keys to screens
///
/// Holds the state weakly: the state owns the bus, and the bus owns this
/// handler.
pub struct Navigator {
    state: Weak<AppState>,
}

impl Navigator {
    pub fn new(state: Weak<AppState>) -> Self {
        Self { state }
    }

    /// Screen a press of `button` leads to from `current`
    pub fn target(button: Button, current: &str) -> Option<&'static str> {
        match button {
            Button::Key1 => Some(DESKTOP),
            Button::Key2 => Some(SYSTEM),
            Button::Key3 => Some(BATTERY),
            Button::Press if current == DESKTOP => Some(SETTINGS),
            _ => None,
        }
    }
}

impl EventHandler for Navigator {
    fn handle(&self, event: &mut Event) -> Result<(), ListenerError> {
        let EventPayload::ButtonPress { button } = *event.payload() else {
            return Ok(());
        };
        let Some(state) = self.state.upgrade() else {
            return Ok(());
        };

        let current = state.current_screen.get();
        let Some(target) = Self::target(button, &current) else {
            return Ok(());
        };
        event.mark_handled();
        debug!("{} -> {}", button, target);
        state.current_screen.set(target.to_string());
        Ok(())
    }
}
