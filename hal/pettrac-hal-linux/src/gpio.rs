//! GPIO lines through the character device
//!
//! Line reads and writes are infallible at the HAL level. A failed ioctl is
//! logged and the line keeps its last known state; the next tick retries.
//!
//! The GPIO v1 ABI used here cannot set pull resistors. The keypad lines
//! need pull-ups, configured in `/boot/config.txt`, e.g.
//! `gpio=5,6,13,16,19,20,21,26=ip,pu`.

use embedded_hal::digital::{InputPin as _, OutputPin as _};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::CdevPin;
use log::warn;
use pettrac_hal::gpio::{InputPin, OutputPin};

use crate::error::LinuxHalError;

/// Open a GPIO chip, e.g. `/dev/gpiochip0`
pub fn open_chip(path: &str) -> Result<Chip, LinuxHalError> {
    Chip::new(path).map_err(|e| LinuxHalError::Gpio {
        line: 0,
        message: format!("opening {}: {}", path, e),
    })
}

/// One requested GPIO line
pub struct LinePin {
    pin: CdevPin,
    line: u32,
    level: bool,
}

impl LinePin {
    /// Request `line` as an output driven to `initial`
    pub fn output(
        chip: &mut Chip,
        line: u32,
        initial: bool,
        consumer: &str,
    ) -> Result<Self, LinuxHalError> {
        let pin = request(chip, line, LineRequestFlags::OUTPUT, u8::from(initial), consumer)?;
        Ok(Self {
            pin,
            line,
            level: initial,
        })
    }

    /// Request `line` as an input
    pub fn input(chip: &mut Chip, line: u32, consumer: &str) -> Result<Self, LinuxHalError> {
        let pin = request(chip, line, LineRequestFlags::INPUT, 0, consumer)?;
        Ok(Self {
            pin,
            line,
            level: true,
        })
    }

    /// Line offset on the chip
    pub fn line(&self) -> u32 {
        self.line
    }
}

fn request(
    chip: &mut Chip,
    line: u32,
    flags: LineRequestFlags,
    default: u8,
    consumer: &str,
) -> Result<CdevPin, LinuxHalError> {
    let err = |e: &dyn core::fmt::Display| LinuxHalError::Gpio {
        line,
        message: e.to_string(),
    };
    let handle = chip
        .get_line(line)
        .map_err(|e| err(&e))?
        .request(flags, default, consumer)
        .map_err(|e| err(&e))?;
    CdevPin::new(handle).map_err(|e| err(&e))
}

impl OutputPin for LinePin {
    fn set_high(&mut self) {
        if let Err(e) = self.pin.set_high() {
            warn!("Failed to set gpio {} high: {:?}", self.line, e);
            return;
        }
        self.level = true;
    }

    fn set_low(&mut self) {
        if let Err(e) = self.pin.set_low() {
            warn!("Failed to set gpio {} low: {:?}", self.line, e);
            return;
        }
        self.level = false;
    }

    fn is_set_high(&self) -> bool {
        self.level
    }
}

impl InputPin for LinePin {
    fn is_high(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => {
                self.level = level;
                level
            }
            Err(e) => {
                warn!("Failed to read gpio {}: {:?}", self.line, e);
                self.level
            }
        }
    }
}
