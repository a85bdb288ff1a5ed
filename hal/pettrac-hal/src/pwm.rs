//! PWM output abstractions

use core::fmt::Debug;

/// Duty-cycle output
///
/// Used for the LCD backlight. Duty is expressed in percent so that the
/// same value can come straight from the brightness setting.
pub trait PwmOutput {
    /// Error type for PWM operations
    type Error: Debug;

    /// Drive the output at `percent` duty (values above 100 are clamped)
    fn set_duty_percent(&mut self, percent: u8) -> Result<(), Self::Error>;

    /// Current duty in percent
    fn duty_percent(&self) -> u8;

    /// Turn the output fully off
    fn disable(&mut self) -> Result<(), Self::Error> {
        self.set_duty_percent(0)
    }
}
