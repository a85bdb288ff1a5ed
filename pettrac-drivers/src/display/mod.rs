//! Display drivers
//!
//! The ST7789 is split in two layers: [`HardwareBus`] owns the SPI link and
//! the control lines and knows the command/data framing, [`St7789`] owns
//! the controller state machine and implements `DisplayBackend`.

pub mod bus;
pub mod st7789;

pub use bus::{HardwareBus, MAX_TRANSFER};
pub use st7789::{LinkState, St7789};
