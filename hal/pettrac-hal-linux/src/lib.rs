//! Linux implementation of the PeTTraC HAL
//!
//! This crate provides Linux implementations of the `pettrac-hal` traits
//! and of the OS-facing traits from `pettrac-core`:
//!
//! - GPIO lines through the character device (`/dev/gpiochipN`)
//! - SPI through spidev (`/dev/spidevB.C`)
//! - I2C through i2c-dev (`/dev/i2c-N`)
//! - Backlight PWM through sysfs (`/sys/class/pwm`)
//! - Host statistics from `/proc`, `/sys` and `statvfs`
//! - The OS shutdown request
//!
//! The character device, spidev and i2c-dev wrappers only exist when
//! building for Linux. Everything else builds on any host so the parsers
//! can be tested anywhere.

#![deny(unsafe_code)]

pub mod error;
#[cfg(target_os = "linux")]
pub mod gpio;
#[cfg(target_os = "linux")]
pub mod i2c;
pub mod power;
pub mod pwm;
#[cfg(target_os = "linux")]
pub mod spi;
pub mod stats;

pub use error::LinuxHalError;
pub use power::ShutdownCommand;
pub use pwm::SysfsPwm;
pub use stats::ProcSystemStats;
