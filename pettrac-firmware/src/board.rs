//! Board wiring for the Raspberry Pi LCD HAT
//!
//! Opens every device named in the `[pins]` section and assembles the
//! drivers. Display and keypad failures are fatal; a missing battery gauge
//! is not (the gauge reads as unknown and no alarm is ever raised).

use linux_embedded_hal::Delay;
use log::{info, warn};
use pettrac_core::battery::BatteryReading;
use pettrac_core::config::{BacklightKind, Config};
use pettrac_core::input::Button;
use pettrac_core::traits::BatterySensor;
use pettrac_drivers::backlight::GpioBacklight;
use pettrac_drivers::battery::PiSugar3;
use pettrac_drivers::display::{HardwareBus, St7789};
use pettrac_drivers::input::ButtonSampler;
use pettrac_hal::spi::{Mode, SpiConfig};
use pettrac_hal::PwmOutput;
use pettrac_hal_linux::gpio::{open_chip, LinePin};
use pettrac_hal_linux::i2c::I2cdevBus;
use pettrac_hal_linux::pwm::BACKLIGHT_FREQUENCY_HZ;
use pettrac_hal_linux::spi::SpidevBus;
use pettrac_hal_linux::{LinuxHalError, SysfsPwm};

/// Consumer label shown by `gpioinfo`
const CONSUMER: &str = "pettrac";

/// Backlight output selected by `display.backlight`
pub enum Backlight {
    Gpio(GpioBacklight<LinePin>),
    Pwm(SysfsPwm),
}

impl PwmOutput for Backlight {
    type Error = LinuxHalError;

    fn set_duty_percent(&mut self, percent: u8) -> Result<(), LinuxHalError> {
        match self {
            Backlight::Gpio(b) => b.set_duty_percent(percent).map_err(|never| match never {}),
            Backlight::Pwm(b) => b.set_duty_percent(percent),
        }
    }

    fn duty_percent(&self) -> u8 {
        match self {
            Backlight::Gpio(b) => b.duty_percent(),
            Backlight::Pwm(b) => b.duty_percent(),
        }
    }
}

/// The ST7789 as wired on the HAT
pub type Panel = St7789<SpidevBus, LinePin, LinePin, Backlight, Delay>;

/// Stand-in when the I2C bus cannot be opened
struct MissingGauge;

impl BatterySensor for MissingGauge {
    fn read(&mut self) -> BatteryReading {
        BatteryReading::default()
    }
}

/// Every driver the runtime needs
pub struct Board {
    pub display: Panel,
    pub keypad: ButtonSampler<LinePin>,
    pub gauge: Box<dyn BatterySensor>,
}

impl Board {
    pub fn open(config: &Config) -> Result<Self, LinuxHalError> {
        let pins = &config.pins;
        let mut chip = open_chip(&pins.gpio_chip)?;

        let dc = LinePin::output(&mut chip, pins.dc, false, CONSUMER)?;
        let rst = LinePin::output(&mut chip, pins.reset, true, CONSUMER)?;
        let backlight = match config.display.backlight {
            BacklightKind::Gpio => {
                let line = LinePin::output(&mut chip, pins.backlight, false, CONSUMER)?;
                Backlight::Gpio(GpioBacklight::new_active_high(line))
            }
            BacklightKind::Pwm => Backlight::Pwm(SysfsPwm::open(
                &pins.pwm_chip,
                pins.pwm_channel,
                BACKLIGHT_FREQUENCY_HZ,
            )?),
        };
        let spi = SpidevBus::open(
            &pins.spi_device,
            &SpiConfig {
                frequency: pins.spi_hz,
                mode: Mode::Mode0,
            },
        )?;
        let rotation = config.display.rotation().unwrap_or_default();
        let display = St7789::new(HardwareBus::new(spi, dc, rst, backlight), Delay, rotation);

        let mut keypad = ButtonSampler::new();
        let lines = [
            (Button::Up, pins.up),
            (Button::Down, pins.down),
            (Button::Left, pins.left),
            (Button::Right, pins.right),
            (Button::Press, pins.press),
            (Button::Key1, pins.key1),
            (Button::Key2, pins.key2),
            (Button::Key3, pins.key3),
        ];
        for (button, line) in lines {
            keypad.add_channel(button, LinePin::input(&mut chip, line, CONSUMER)?);
        }

        let gauge: Box<dyn BatterySensor> = match I2cdevBus::open(&pins.i2c_device) {
            Ok(bus) => {
                info!(
                    "Battery gauge at 0x{:02X} on {}",
                    pins.pisugar_address, pins.i2c_device
                );
                Box::new(PiSugar3::new(bus, pins.pisugar_address))
            }
            Err(e) => {
                warn!("Battery gauge unavailable: {}", e);
                Box::new(MissingGauge)
            }
        };

        info!("Board ready ({} keypad lines)", keypad.channel_count());
        Ok(Self {
            display,
            keypad,
            gauge,
        })
    }
}
