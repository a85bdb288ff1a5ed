//! Battery readings and threshold policy

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One read of the battery gauge
///
/// Every field is `None` when its register could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryReading {
    /// Charge in percent (0..=100)
    pub percentage: Option<u8>,
    /// Cell voltage in millivolts
    pub voltage_mv: Option<u16>,
    /// External power connected
    pub charging: Option<bool>,
}

/// Alarm level, ordered from healthy to empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum BatteryAlarm {
    #[default]
    None,
    Low,
    Critical,
    Shutdown,
}

/// Alarm thresholds in percent
///
/// A level applies when the percentage is at or below its threshold.
/// A `shutdown` of 0 disables the OS shutdown request; the alarm is
/// still raised at 0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatteryThresholds {
    pub low: u8,
    pub critical: u8,
    pub shutdown: u8,
}

impl Default for BatteryThresholds {
    fn default() -> Self {
        Self {
            low: 20,
            critical: 10,
            shutdown: 5,
        }
    }
}

impl BatteryThresholds {
    /// Alarm level for `percentage`
    pub fn classify(&self, percentage: u8) -> BatteryAlarm {
        if percentage <= self.shutdown {
            BatteryAlarm::Shutdown
        } else if percentage <= self.critical {
            BatteryAlarm::Critical
        } else if percentage <= self.low {
            BatteryAlarm::Low
        } else {
            BatteryAlarm::None
        }
    }

    /// Whether the OS shutdown request is enabled
    pub fn shutdown_enabled(&self) -> bool {
        self.shutdown > 0
    }

    /// Check `shutdown <= critical <= low`
    pub fn is_ordered(&self) -> bool {
        self.shutdown <= self.critical && self.critical <= self.low
    }
}
