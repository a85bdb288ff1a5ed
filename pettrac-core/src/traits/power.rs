//! Battery and power traits

use thiserror::Error;

use crate::battery::BatteryReading;

/// Battery gauge
pub trait BatterySensor {
    /// Read percentage, voltage and charging state
    ///
    /// Each field degrades to `None` on its own; one failed register
    /// does not invalidate the others.
    fn read(&mut self) -> BatteryReading;
}

/// Shutdown request failure
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to spawn shutdown command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Requests an orderly OS power-off
///
/// Fire and forget: success means the request was issued, not that the
/// system is going down.
pub trait ShutdownTrigger {
    fn request_shutdown(&mut self) -> Result<(), ShutdownError>;
}
