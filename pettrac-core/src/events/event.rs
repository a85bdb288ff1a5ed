//! Event definitions
//!
//! Events are a closed set: every kind has exactly one payload shape, so
//! handlers match exhaustively instead of probing a key/value map.

use core::fmt;

use pettrac_display::Rotation;

use crate::input::Button;

/// Event kinds (wire names match the configuration and log output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ButtonPress,
    ButtonRelease,
    ButtonHold,
    ScreenChange,
    SettingChange,
    BatteryLow,
    BatteryCritical,
    SystemShutdown,
    UiRefresh,
    ThemeChange,
    ConfigSave,
}

impl EventKind {
    /// Number of event kinds
    pub const COUNT: usize = 11;

    /// Every kind, in declaration order
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::ButtonPress,
        EventKind::ButtonRelease,
        EventKind::ButtonHold,
        EventKind::ScreenChange,
        EventKind::SettingChange,
        EventKind::BatteryLow,
        EventKind::BatteryCritical,
        EventKind::SystemShutdown,
        EventKind::UiRefresh,
        EventKind::ThemeChange,
        EventKind::ConfigSave,
    ];

    /// Dense index, used for per-kind tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire name
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::ButtonPress => "button_press",
            EventKind::ButtonRelease => "button_release",
            EventKind::ButtonHold => "button_hold",
            EventKind::ScreenChange => "screen_change",
            EventKind::SettingChange => "setting_change",
            EventKind::BatteryLow => "battery_low",
            EventKind::BatteryCritical => "battery_critical",
            EventKind::SystemShutdown => "system_shutdown",
            EventKind::UiRefresh => "ui_refresh",
            EventKind::ThemeChange => "theme_change",
            EventKind::ConfigSave => "config_save",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A runtime setting that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Backlight duty in percent
    Brightness(u8),
    Rotation(Rotation),
    DebugMode(bool),
}

/// Why a shutdown was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Battery reached the auto-shutdown threshold
    LowBattery,
    /// SIGINT/SIGTERM
    Signal,
    /// Requested from the UI
    UserRequest,
}

/// Event payload, one variant per [`EventKind`]
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    ButtonPress { button: Button },
    ButtonRelease { button: Button },
    ButtonHold { button: Button, held_ms: u32 },
    ScreenChange { screen: String },
    SettingChange(Setting),
    BatteryLow { percentage: u8 },
    BatteryCritical { percentage: u8 },
    SystemShutdown { reason: ShutdownReason },
    UiRefresh,
    ThemeChange { theme: String },
    ConfigSave,
}

impl EventPayload {
    /// The kind this payload belongs to
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::ButtonPress { .. } => EventKind::ButtonPress,
            EventPayload::ButtonRelease { .. } => EventKind::ButtonRelease,
            EventPayload::ButtonHold { .. } => EventKind::ButtonHold,
            EventPayload::ScreenChange { .. } => EventKind::ScreenChange,
            EventPayload::SettingChange(_) => EventKind::SettingChange,
            EventPayload::BatteryLow { .. } => EventKind::BatteryLow,
            EventPayload::BatteryCritical { .. } => EventKind::BatteryCritical,
            EventPayload::SystemShutdown { .. } => EventKind::SystemShutdown,
            EventPayload::UiRefresh => EventKind::UiRefresh,
            EventPayload::ThemeChange { .. } => EventKind::ThemeChange,
            EventPayload::ConfigSave => EventKind::ConfigSave,
        }
    }
}

/// A published event
///
/// `handled` is a one-shot latch: once a handler sets it, the remaining
/// handlers of that publish call are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: EventPayload,
    handled: bool,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            handled: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Stop delivery to the remaining handlers
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Button carried by press/release/hold events
    pub fn button(&self) -> Option<Button> {
        match self.payload {
            EventPayload::ButtonPress { button }
            | EventPayload::ButtonRelease { button }
            | EventPayload::ButtonHold { button, .. } => Some(button),
            _ => None,
        }
    }
}

impl From<EventPayload> for Event {
    fn from(payload: EventPayload) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_payload() {
        let event = Event::new(EventPayload::ScreenChange {
            screen: "system".into(),
        });
        assert_eq!(event.kind(), EventKind::ScreenChange);
        assert_eq!(event.button(), None);

        let event = Event::new(EventPayload::ButtonPress { button: Button::Key1 });
        assert_eq!(event.kind(), EventKind::ButtonPress);
        assert_eq!(event.button(), Some(Button::Key1));
    }

    #[test]
    fn test_kind_indices_are_dense() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(EventKind::ButtonPress.to_string(), "button_press");
        assert_eq!(EventKind::SystemShutdown.to_string(), "system_shutdown");
    }

    #[test]
    fn test_handled_latch() {
        let mut event = Event::new(EventPayload::UiRefresh);
        assert!(!event.is_handled());
        event.mark_handled();
        assert!(event.is_handled());
    }
}
