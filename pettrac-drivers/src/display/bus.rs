//! ST7789 hardware link
//!
//! 4-wire SPI framing: every command byte goes out with the DC line low,
//! every parameter or pixel byte with DC high. The reset and backlight
//! lines are owned here as well, so the whole physical interface can be
//! parked from one place.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use pettrac_display::DisplayError;
use pettrac_hal::{OutputPin, PwmOutput, SpiBus};

/// Largest single SPI transfer (spidev's default buffer size)
pub const MAX_TRANSFER: usize = 4096;

/// Reset pulse phase length in milliseconds
const RESET_PHASE_MS: u32 = 10;

/// Physical link to the panel controller
pub struct HardwareBus<SPI, DC, RST, BL> {
    spi: SPI,
    dc: DC,
    rst: RST,
    backlight: BL,
}

impl<SPI, DC, RST, BL> HardwareBus<SPI, DC, RST, BL>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
    BL: PwmOutput,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, backlight: BL) -> Self {
        Self {
            spi,
            dc,
            rst,
            backlight,
        }
    }

    /// Hardware reset: high, low, high, 10 ms each
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        self.rst.set_high();
        delay.delay_ms(RESET_PHASE_MS);
        self.rst.set_low();
        delay.delay_ms(RESET_PHASE_MS);
        self.rst.set_high();
        delay.delay_ms(RESET_PHASE_MS);
    }

    /// Send a single command byte
    pub fn command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low();
        self.transfer(&[command])
    }

    /// Stream data bytes, split into transfers of at most [`MAX_TRANSFER`]
    ///
    /// DC stays high for the whole stream.
    pub fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high();
        for chunk in bytes.chunks(MAX_TRANSFER) {
            self.transfer(chunk)?;
        }
        Ok(())
    }

    /// Send a command followed by its parameters
    pub fn send(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.command(command)?;
        if params.is_empty() {
            return Ok(());
        }
        self.data(params)
    }

    /// Drive the backlight, clamped to 0..=100
    pub fn set_backlight(&mut self, duty: u8) -> Result<(), DisplayError> {
        self.backlight.set_duty_percent(duty.min(100)).map_err(|e| {
            warn!("Failed to set backlight: {:?}", e);
            DisplayError::Backlight
        })
    }

    /// Current backlight duty in percent
    pub fn backlight(&self) -> u8 {
        self.backlight.duty_percent()
    }

    /// Park the control lines: reset high, DC low, backlight off
    pub fn release(&mut self) {
        self.rst.set_high();
        self.dc.set_low();
        if let Err(e) = self.backlight.disable() {
            warn!("Failed to switch backlight off: {:?}", e);
        }
    }

    /// Give the peripherals back
    pub fn into_parts(self) -> (SPI, DC, RST, BL) {
        (self.spi, self.dc, self.rst, self.backlight)
    }

    fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi.write(bytes).map_err(|e| {
            debug!("SPI write of {} bytes failed: {:?}", bytes.len(), e);
            DisplayError::Communication
        })
    }
}
