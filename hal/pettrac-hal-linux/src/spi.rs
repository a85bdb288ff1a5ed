//! SPI through spidev

use embedded_hal::spi::SpiDevice as _;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;
use log::info;
use pettrac_hal::spi::{Mode, SpiBus, SpiConfig};

use crate::error::LinuxHalError;

/// Write-only SPI device
///
/// The kernel limits one spidev transfer to `bufsiz` bytes (4096 by
/// default); callers chunk larger buffers.
pub struct SpidevBus {
    device: SpidevDevice,
}

impl SpidevBus {
    /// Open and configure `path`, e.g. `/dev/spidev0.0`
    pub fn open(path: &str, config: &SpiConfig) -> Result<Self, LinuxHalError> {
        let mut device = SpidevDevice::open(path)
            .map_err(|e| LinuxHalError::Spi(format!("opening {}: {:?}", path, e)))?;

        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.frequency)
            .mode(mode_flags(config.mode))
            .build();
        device
            .configure(&options)
            .map_err(|e| LinuxHalError::Spi(format!("configuring {}: {:?}", path, e)))?;

        info!("Opened {} at {} Hz", path, config.frequency);
        Ok(Self { device })
    }
}

fn mode_flags(mode: Mode) -> SpiModeFlags {
    match mode {
        Mode::Mode0 => SpiModeFlags::SPI_MODE_0,
        Mode::Mode1 => SpiModeFlags::SPI_MODE_1,
        Mode::Mode2 => SpiModeFlags::SPI_MODE_2,
        Mode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}

impl SpiBus for SpidevBus {
    type Error = LinuxHalError;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.device
            .write(data)
            .map_err(|e| LinuxHalError::Spi(format!("{:?}", e)))
    }
}
