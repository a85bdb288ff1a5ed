//! Application state
//!
//! Every piece of shared state is an [`Observable`]. [`AppState`] groups
//! them and wires the ones that other components react to into the event
//! bus.

pub mod app;
pub mod observable;

pub use app::{AppState, InitialState, Toast};
pub use observable::{Observable, Observer};
