//! Button input types
//!
//! The keypad has a fixed set of eight logical buttons. Samplers report
//! a [`ButtonSnapshot`] per poll; the render loop diffs consecutive
//! snapshots into press/release transitions.

pub mod button;
pub mod snapshot;

pub use button::{Button, BUTTON_COUNT};
pub use snapshot::{ButtonSnapshot, ButtonTransition, PollResult};
