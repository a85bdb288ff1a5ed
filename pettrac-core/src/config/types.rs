//! Configuration type definitions

use std::time::Duration;

use pettrac_display::Rotation;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::battery::BatteryThresholds;
use crate::events::Setting;
use crate::state::InitialState;

/// Backlight hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BacklightKind {
    /// Plain GPIO line, on above 0% duty
    #[default]
    Gpio,
    /// sysfs PWM channel
    Pwm,
}

/// `[display]` section
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Degrees, one of 0/90/180/270
    pub rotation: u16,
    /// Backlight duty in percent
    pub brightness: u8,
    pub backlight: BacklightKind,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: 0,
            brightness: 50,
            backlight: BacklightKind::Gpio,
        }
    }
}

impl DisplayConfig {
    /// Configured rotation, `None` if not a right angle
    pub fn rotation(&self) -> Option<Rotation> {
        Rotation::from_degrees(self.rotation)
    }
}

/// `[battery]` section, thresholds in percent
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BatteryConfig {
    pub low_warning: u8,
    pub critical_warning: u8,
    /// 0 disables the automatic OS shutdown
    pub auto_shutdown: u8,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        let thresholds = BatteryThresholds::default();
        Self {
            low_warning: thresholds.low,
            critical_warning: thresholds.critical,
            auto_shutdown: thresholds.shutdown,
        }
    }
}

impl BatteryConfig {
    pub fn thresholds(&self) -> BatteryThresholds {
        BatteryThresholds {
            low: self.low_warning,
            critical: self.critical_warning,
            shutdown: self.auto_shutdown,
        }
    }
}

/// `[system]` section
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SystemConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub log_level: String,
    pub debug_mode: bool,
    pub default_screen: String,
    /// Render loop period
    pub frame_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            debug_mode: false,
            default_screen: "desktop".into(),
            frame_interval_ms: 50,
        }
    }
}

impl SystemConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.frame_interval_ms))
    }
}

/// `[pins]` section: device nodes and BCM line offsets
///
/// Defaults match the Waveshare 1.3" LCD HAT and a PiSugar 3.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinConfig {
    pub gpio_chip: String,
    pub up: u32,
    pub down: u32,
    pub left: u32,
    pub right: u32,
    pub press: u32,
    pub key1: u32,
    pub key2: u32,
    pub key3: u32,
    pub reset: u32,
    pub dc: u32,
    pub backlight: u32,
    pub spi_device: String,
    pub spi_hz: u32,
    pub i2c_device: String,
    pub pwm_chip: String,
    pub pwm_channel: u32,
    pub pisugar_address: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            gpio_chip: "/dev/gpiochip0".into(),
            up: 6,
            down: 19,
            left: 5,
            right: 26,
            press: 13,
            key1: 21,
            key2: 20,
            key3: 16,
            reset: 27,
            dc: 25,
            backlight: 24,
            spi_device: "/dev/spidev0.0".into(),
            spi_hz: 40_000_000,
            i2c_device: "/dev/i2c-1".into(),
            pwm_chip: "/sys/class/pwm/pwmchip0".into(),
            pwm_channel: 0,
            pisugar_address: 0x57,
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub display: DisplayConfig,
    pub battery: BatteryConfig,
    pub system: SystemConfig,
    pub pins: PinConfig,
}

/// Problem found and corrected by [`Config::normalize`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("invalid rotation {0}, using 0")]
    InvalidRotation(u16),
    #[error("brightness {0} out of range, clamped to 100")]
    BrightnessClamped(u8),
    #[error("battery thresholds not ordered (auto_shutdown <= critical_warning <= low_warning)")]
    UnorderedThresholds,
    #[error("frame_interval_ms is 0, using 50")]
    ZeroFrameInterval,
}

impl Config {
    /// Correct out-of-range values in place and report what was changed
    ///
    /// Unordered battery thresholds are reported but kept as given.
    pub fn normalize(&mut self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.display.rotation().is_none() {
            issues.push(ConfigIssue::InvalidRotation(self.display.rotation));
            self.display.rotation = 0;
        }
        if self.display.brightness > 100 {
            issues.push(ConfigIssue::BrightnessClamped(self.display.brightness));
            self.display.brightness = 100;
        }
        if !self.battery.thresholds().is_ordered() {
            issues.push(ConfigIssue::UnorderedThresholds);
        }
        if self.system.frame_interval_ms == 0 {
            issues.push(ConfigIssue::ZeroFrameInterval);
            self.system.frame_interval_ms = SystemConfig::default().frame_interval_ms;
        }

        issues
    }

    /// Starting values for the application state
    pub fn initial_state(&self) -> InitialState {
        InitialState {
            screen: self.system.default_screen.clone(),
            brightness: self.display.brightness.min(100),
            rotation: self.display.rotation().unwrap_or_default(),
            debug_mode: self.system.debug_mode,
        }
    }

    /// Record a runtime setting change
    ///
    /// Returns `true` if the setting is persisted and the stored value changed.
    pub fn apply_setting(&mut self, setting: &Setting) -> bool {
        match *setting {
            Setting::Brightness(value) => {
                let value = value.min(100);
                let changed = self.display.brightness != value;
                self.display.brightness = value;
                changed
            }
            Setting::Rotation(rotation) => {
                let degrees = rotation.degrees();
                let changed = self.display.rotation != degrees;
                self.display.rotation = degrees;
                changed
            }
            Setting::DebugMode(_) => false,
        }
    }
}
