//! PeTTraC Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the display, keypad and battery
//! drivers are written against. The Linux backend implements them on top of
//! the kernel's GPIO character device, spidev and i2c-dev interfaces; the
//! driver tests implement them with recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pettrac-core / pettrac-drivers         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pettrac-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pettrac-hal-  │       │  test mocks   │
//! │    linux      │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`spi::SpiBus`] - Write-only SPI link to the panel controller
//! - [`i2c::I2cBus`] - I2C register access
//! - [`pwm::PwmOutput`] - Duty-cycle output for the backlight

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod pwm;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use i2c::I2cBus;
pub use pwm::PwmOutput;
pub use spi::SpiBus;
