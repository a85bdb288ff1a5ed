//! Display abstraction and pixel handling for PeTTraC
//!
//! This crate provides:
//! - [`FrameBuffer`], the 24-bit canvas screens paint into. It implements
//!   `embedded-graphics`' `DrawTarget`, so any primitive, font or image from
//!   that ecosystem can be drawn on it.
//! - [`Rotation`], the panel orientation with its controller register value
//!   and the counter-rotation applied to frames before transmission.
//! - RGB565 packing (`color` module) for 16 bits/pixel panel controllers.
//! - [`DisplayBackend`], the trait the render loop drives; the ST7789 driver
//!   in `pettrac-drivers` implements it.
//!
//! Logical coordinates are always top-left origin in the frame buffer's own
//! orientation. Physical rotation is the backend's concern.

#![deny(unsafe_code)]

pub mod backend;
pub mod color;
pub mod frame;
pub mod rotation;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError, DisplayWindow};
pub use color::{pack_rgb565, unpack_rgb565};
pub use frame::{FrameBuffer, PANEL_HEIGHT, PANEL_WIDTH};
pub use rotation::Rotation;
