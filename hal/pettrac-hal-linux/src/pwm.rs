//! Backlight PWM through sysfs
//!
//! Uses the `/sys/class/pwm/pwmchipN` interface. The channel is exported on
//! open if needed. On a Raspberry Pi this needs a PWM overlay routing the
//! channel to the backlight pin (`dtoverlay=pwm,pin=...`).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use pettrac_hal::pwm::PwmOutput;

use crate::error::LinuxHalError;

/// Default backlight PWM frequency
pub const BACKLIGHT_FREQUENCY_HZ: u32 = 1000;

/// One sysfs PWM channel
#[derive(Debug)]
pub struct SysfsPwm {
    channel: PathBuf,
    period_ns: u32,
    duty: u8,
}

impl SysfsPwm {
    /// Export (if needed) and enable `channel` of `chip` at `frequency_hz`
    ///
    /// The output starts at 0% duty.
    pub fn open(
        chip: impl AsRef<Path>,
        channel: u32,
        frequency_hz: u32,
    ) -> Result<Self, LinuxHalError> {
        let chip = chip.as_ref();
        let channel_dir = chip.join(format!("pwm{}", channel));
        if !channel_dir.exists() {
            write_attr(&chip.join("export"), channel)?;
        }

        let period_ns = 1_000_000_000 / frequency_hz.max(1);
        // Duty must never exceed the period, so clear it first
        write_attr(&channel_dir.join("duty_cycle"), 0)?;
        write_attr(&channel_dir.join("period"), period_ns)?;
        write_attr(&channel_dir.join("enable"), 1)?;

        info!("PWM {} enabled at {} Hz", channel_dir.display(), frequency_hz);
        Ok(Self {
            channel: channel_dir,
            period_ns,
            duty: 0,
        })
    }

    pub fn period_ns(&self) -> u32 {
        self.period_ns
    }
}

fn write_attr(path: &Path, value: u32) -> Result<(), LinuxHalError> {
    fs::write(path, value.to_string()).map_err(|e| LinuxHalError::io(path, e))
}

impl PwmOutput for SysfsPwm {
    type Error = LinuxHalError;

    fn set_duty_percent(&mut self, percent: u8) -> Result<(), Self::Error> {
        let percent = percent.min(100);
        let duty_ns = (u64::from(self.period_ns) * u64::from(percent) / 100) as u32;
        write_attr(&self.channel.join("duty_cycle"), duty_ns)?;
        self.duty = percent;
        Ok(())
    }

    fn duty_percent(&self) -> u8 {
        self.duty
    }
}
