//! PiSugar 3 battery gauge
//!
//! The PiSugar 3 exposes its state as single-byte registers at I2C address
//! 0x57. Each register is read on its own, so a failed read only blanks
//! the field it feeds.

use log::debug;
use pettrac_core::battery::BatteryReading;
use pettrac_core::traits::BatterySensor;
use pettrac_hal::I2cBus;

/// Default 7-bit bus address
pub const DEFAULT_ADDRESS: u8 = 0x57;

/// Register addresses
pub mod reg {
    /// Power status
    pub const STATUS: u8 = 0x02;
    /// Cell voltage in mV, high byte
    pub const VOLTAGE_HIGH: u8 = 0x22;
    /// Cell voltage in mV, low byte
    pub const VOLTAGE_LOW: u8 = 0x23;
    /// Charge level in percent
    pub const PERCENTAGE: u8 = 0x2A;

    /// STATUS bit: external power connected
    pub const STATUS_POWER_CONNECTED: u8 = 1 << 7;
}

/// PiSugar 3 register reader
pub struct PiSugar3<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2cBus> PiSugar3<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Cell voltage in millivolts (big-endian register pair)
    pub fn voltage_mv(&mut self) -> Option<u16> {
        let high = self.register(reg::VOLTAGE_HIGH)?;
        let low = self.register(reg::VOLTAGE_LOW)?;
        Some(u16::from_be_bytes([high, low]))
    }

    /// Charge level, capped at 100
    pub fn percentage(&mut self) -> Option<u8> {
        self.register(reg::PERCENTAGE).map(|p| p.min(100))
    }

    /// External power connected
    pub fn charging(&mut self) -> Option<bool> {
        self.register(reg::STATUS)
            .map(|status| status & reg::STATUS_POWER_CONNECTED != 0)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn register(&mut self, register: u8) -> Option<u8> {
        match self.i2c.read_register(self.address, register) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("PiSugar register 0x{:02X} read failed: {:?}", register, e);
                None
            }
        }
    }
}

impl<I2C: I2cBus> BatterySensor for PiSugar3<I2C> {
    fn read(&mut self) -> BatteryReading {
        BatteryReading {
            voltage_mv: self.voltage_mv(),
            percentage: self.percentage(),
            charging: self.charging(),
        }
    }
}
