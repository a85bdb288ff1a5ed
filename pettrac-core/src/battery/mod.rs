//! Battery monitoring
//!
//! Readings come from a register-mapped gauge through [`BatterySensor`];
//! the threshold policy turns a percentage into a [`BatteryAlarm`] and,
//! at the bottom of the range, issues a one-time OS shutdown request.
//!
//! [`BatterySensor`]: crate::traits::BatterySensor

pub mod monitor;
pub mod policy;

pub use monitor::{BatteryMonitor, BatteryStatus};
pub use policy::{BatteryAlarm, BatteryReading, BatteryThresholds};
