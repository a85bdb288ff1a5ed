//! GPIO backlight
//!
//! The LCD HAT wires the backlight enable to a plain GPIO line. Without a
//! PWM channel the duty collapses to on/off: any non-zero duty switches it
//! on. Boards with the line routed to a PWM channel use the sysfs PWM
//! backend instead.

use core::convert::Infallible;

use pettrac_hal::{OutputPin, PwmOutput};

/// On/off backlight on a GPIO line
pub struct GpioBacklight<P> {
    pin: P,
    /// If true, backlight ON = pin LOW
    inverted: bool,
    /// Last requested duty, clamped
    duty: u8,
}

impl<P: OutputPin> GpioBacklight<P> {
    /// Create a backlight, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut backlight = Self {
            pin,
            inverted,
            duty: 0,
        };
        backlight.drive(false);
        backlight
    }

    /// Create an active-high backlight (the LCD HAT wiring)
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn is_on(&self) -> bool {
        self.duty > 0
    }

    fn drive(&mut self, on: bool) {
        self.pin.set_state(on != self.inverted);
    }
}

impl<P: OutputPin> PwmOutput for GpioBacklight<P> {
    type Error = Infallible;

    fn set_duty_percent(&mut self, percent: u8) -> Result<(), Infallible> {
        self.duty = percent.min(100);
        self.drive(self.duty > 0);
        Ok(())
    }

    fn duty_percent(&self) -> u8 {
        self.duty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_starts_off() {
        let backlight = GpioBacklight::new_active_high(MockPin { high: true });
        assert!(!backlight.is_on());
        assert!(!backlight.pin.is_set_high());
    }

    #[test]
    fn test_any_duty_switches_on() {
        let mut backlight = GpioBacklight::new_active_high(MockPin { high: false });

        backlight.set_duty_percent(1).unwrap();
        assert!(backlight.pin.is_set_high());

        backlight.set_duty_percent(0).unwrap();
        assert!(!backlight.pin.is_set_high());
    }

    #[test]
    fn test_duty_clamped() {
        let mut backlight = GpioBacklight::new_active_high(MockPin { high: false });
        backlight.set_duty_percent(250).unwrap();
        assert_eq!(backlight.duty_percent(), 100);
    }

    #[test]
    fn test_inverted_line() {
        let mut backlight = GpioBacklight::new(MockPin { high: false }, true);
        // Off is high on an active-low line
        assert!(backlight.pin.is_set_high());

        backlight.set_duty_percent(50).unwrap();
        assert!(backlight.is_on());
        assert!(!backlight.pin.is_set_high());

        backlight.disable().unwrap();
        assert!(backlight.pin.is_set_high());
    }
}
