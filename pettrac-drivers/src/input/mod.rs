//! Input drivers

pub mod keypad;

pub use keypad::{ButtonSampler, DEBOUNCE};
