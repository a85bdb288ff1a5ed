//! Linux HAL errors

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from Linux device access
#[derive(Debug, Error)]
pub enum LinuxHalError {
    /// GPIO character device request failed
    #[error("gpio line {line}: {message}")]
    Gpio { line: u32, message: String },

    /// SPI transfer or configuration failed
    #[error("spi: {0}")]
    Spi(String),

    /// I2C transfer failed
    #[error("i2c: {0}")]
    I2c(String),

    /// sysfs or device node access failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LinuxHalError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
