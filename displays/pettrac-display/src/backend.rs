//! Display backend trait
//!
//! Defines the interface the render loop uses to drive a panel.

use thiserror::Error;

use crate::frame::FrameBuffer;
use crate::rotation::Rotation;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// Communication error with display
    #[error("display bus transfer failed")]
    Communication,
    /// Frame does not match the panel size
    #[error("frame is {actual:?}, panel is {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Display not initialized
    #[error("display not initialized")]
    NotInitialized,
    /// Rotation outside 0/90/180/270
    #[error("invalid rotation: {0} degrees")]
    InvalidRotation(u16),
    /// Backlight output failed
    #[error("backlight control failed")]
    Backlight,
}

/// Addressable rectangle on the panel, end-exclusive
///
/// Always clipped to the panel. The controller takes inclusive end
/// coordinates, see [`DisplayWindow::end_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl DisplayWindow {
    /// Create a window clipped to a `width` x `height` panel
    pub fn clipped(x0: u16, y0: u16, x1: u16, y1: u16, width: u16, height: u16) -> Self {
        let x1 = x1.min(width);
        let y1 = y1.min(height);
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1,
            y1,
        }
    }

    /// Window covering the whole panel
    pub fn full(width: u16, height: u16) -> Self {
        Self::clipped(0, 0, width, height, width, height)
    }

    pub fn width(&self) -> usize {
        usize::from(self.x1 - self.x0)
    }

    pub fn height(&self) -> usize {
        usize::from(self.y1 - self.y0)
    }

    /// Number of pixels in the window
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Inclusive end coordinates `(x1 - 1, y1 - 1)` truncated to a byte
    pub fn end_bytes(&self) -> (u8, u8) {
        (
            (self.x1.saturating_sub(1) & 0xFF) as u8,
            (self.y1.saturating_sub(1) & 0xFF) as u8,
        )
    }
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface for pushing frames to a panel.
/// Implementations own the bus and control lines exclusively.
pub trait DisplayBackend {
    /// Reset and configure the controller for the current rotation
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Transmit a full frame
    ///
    /// The frame must match [`DisplayBackend::dimensions`].
    fn show(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;

    /// Fill the panel with white
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Set backlight duty, clamped to 0..=100
    fn set_backlight(&mut self, duty: u8) -> Result<(), DisplayError>;

    /// Change orientation; re-runs `init()`
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError>;

    /// Change orientation from a raw angle, rejecting non-quarter turns
    fn set_rotation_degrees(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation =
            Rotation::from_degrees(degrees).ok_or(DisplayError::InvalidRotation(degrees))?;
        self.set_rotation(rotation)
    }

    /// Current orientation
    fn rotation(&self) -> Rotation;

    /// Panel size in pixels (width, height)
    fn dimensions(&self) -> (usize, usize);

    /// Park every output in a safe idle state
    ///
    /// Safe to call more than once and before `init()` completed.
    fn shutdown(&mut self);

    /// Check if the display is configured
    fn is_ready(&self) -> bool;
}
