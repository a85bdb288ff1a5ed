//! I2C through i2c-dev

use embedded_hal::i2c::I2c as _;
use linux_embedded_hal::I2cdev;
use pettrac_hal::i2c::I2cBus;

use crate::error::LinuxHalError;

/// I2C bus master on `/dev/i2c-N`
pub struct I2cdevBus {
    bus: I2cdev,
}

impl I2cdevBus {
    pub fn open(path: &str) -> Result<Self, LinuxHalError> {
        let bus = I2cdev::new(path).map_err(|e| LinuxHalError::I2c(format!("opening {}: {:?}", path, e)))?;
        Ok(Self { bus })
    }
}

impl I2cBus for I2cdevBus {
    type Error = LinuxHalError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus
            .write(address, data)
            .map_err(|e| LinuxHalError::I2c(format!("{:?}", e)))
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .write_read(address, write_data, read_buf)
            .map_err(|e| LinuxHalError::I2c(format!("{:?}", e)))
    }
}
