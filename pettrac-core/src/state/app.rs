//! Application state
//!
//! One explicit instance, constructed at startup and shared by `Rc`.
//! Construction wires the navigation and settings observables into the
//! event bus, so setting a value is all a screen needs to do to request a
//! screen change or a display setting.

use std::rc::Rc;
use std::time::{Duration, Instant};

use pettrac_display::Rotation;

use super::observable::Observable;
use crate::battery::BatteryReading;
use crate::events::{EventBus, EventPayload, ListenerError, Setting};
use crate::traits::SystemStats;

/// Transient overlay message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub duration: Duration,
    pub start: Instant,
}

impl Toast {
    /// Visible while `now - start < duration`
    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) < self.duration
    }
}

/// Values the state starts from (normally taken from the config file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialState {
    pub screen: String,
    pub brightness: u8,
    pub rotation: Rotation,
    pub debug_mode: bool,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            screen: "desktop".into(),
            brightness: 50,
            rotation: Rotation::Deg0,
            debug_mode: false,
        }
    }
}

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    /// Name of the active screen; setting it requests a screen change
    pub current_screen: Observable<String>,

    pub battery_percentage: Observable<Option<u8>>,
    pub battery_voltage: Observable<Option<u16>>,
    pub charging: Observable<Option<bool>>,

    pub cpu_usage: Observable<f32>,
    pub memory_usage: Observable<f32>,
    pub disk_usage: Observable<f32>,
    pub temperature: Observable<f32>,

    /// Backlight duty in percent
    pub brightness: Observable<u8>,
    pub rotation: Observable<Rotation>,
    pub debug_mode: Observable<bool>,

    pub toast: Observable<Option<Toast>>,

    bus: Rc<EventBus>,
    started: Instant,
}

impl AppState {
    /// Create the state and wire it into `bus`
    pub fn new(bus: Rc<EventBus>, initial: InitialState, now: Instant) -> Rc<Self> {
        bus.set_debug(initial.debug_mode);

        let state = Rc::new(Self {
            current_screen: Observable::new("current_screen", initial.screen),
            battery_percentage: Observable::new("battery_percentage", None),
            battery_voltage: Observable::new("battery_voltage", None),
            charging: Observable::new("charging", None),
            cpu_usage: Observable::new("cpu_usage", 0.0),
            memory_usage: Observable::new("memory_usage", 0.0),
            disk_usage: Observable::new("disk_usage", 0.0),
            temperature: Observable::new("temperature", 0.0),
            brightness: Observable::new("brightness", initial.brightness.min(100)),
            rotation: Observable::new("rotation", initial.rotation),
            debug_mode: Observable::new("debug_mode", initial.debug_mode),
            toast: Observable::new("toast", None),
            bus,
            started: now,
        });
        state.wire();
        state
    }

    fn wire(&self) {
        let bus = Rc::clone(&self.bus);
        self.current_screen
            .observe(Rc::new(move |screen: &String| -> Result<(), ListenerError> {
                bus.publish_payload(EventPayload::ScreenChange {
                    screen: screen.clone(),
                });
                Ok(())
            }));

        let bus = Rc::clone(&self.bus);
        self.brightness
            .observe(Rc::new(move |value: &u8| -> Result<(), ListenerError> {
                bus.publish_payload(EventPayload::SettingChange(Setting::Brightness(*value)));
                Ok(())
            }));

        let bus = Rc::clone(&self.bus);
        self.rotation
            .observe(Rc::new(move |value: &Rotation| -> Result<(), ListenerError> {
                bus.publish_payload(EventPayload::SettingChange(Setting::Rotation(*value)));
                Ok(())
            }));

        let bus = Rc::clone(&self.bus);
        self.debug_mode
            .observe(Rc::new(move |value: &bool| -> Result<(), ListenerError> {
                bus.publish_payload(EventPayload::SettingChange(Setting::DebugMode(*value)));
                bus.set_debug(*value);
                Ok(())
            }));
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Push a battery reading; unknown fields keep their previous value
    pub fn update_battery(&self, reading: &BatteryReading) {
        if let Some(percentage) = reading.percentage {
            self.battery_percentage.set(Some(percentage));
        }
        if let Some(voltage) = reading.voltage_mv {
            self.battery_voltage.set(Some(voltage));
        }
        if let Some(charging) = reading.charging {
            self.charging.set(Some(charging));
        }
    }

    pub fn update_system_stats(&self, stats: &SystemStats) {
        self.cpu_usage.set(stats.cpu);
        self.memory_usage.set(stats.memory);
        self.disk_usage.set(stats.disk);
        self.temperature.set(stats.temperature);
    }

    /// Show `message` over the active screen for `duration`
    pub fn show_toast(&self, message: impl Into<String>, duration: Duration, now: Instant) {
        self.toast.set(Some(Toast {
            message: message.into(),
            duration,
            start: now,
        }));
    }

    pub fn is_toast_visible(&self, now: Instant) -> bool {
        self.toast
            .with(|toast| toast.as_ref().is_some_and(|t| t.is_visible(now)))
    }

    /// Time since the state was created
    pub fn uptime(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }
}
