//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pettrac-core and pettrac-display for the LCD HAT hardware:
//!
//! - Display (ST7789 panel controller over SPI)
//! - Input (eight-line active-low keypad sampler)
//! - Battery (PiSugar 3 gauge over I2C)
//! - Backlight (on/off GPIO line)
//!
//! Drivers are generic over the `pettrac-hal` traits, so they run against
//! the Linux backend on the device and against recording mocks in tests.

#![deny(unsafe_code)]

pub mod backlight;
pub mod battery;
pub mod display;
pub mod input;
