//! Board-agnostic runtime for the PeTTraC pocket terminal
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Event bus with typed, closed-set payloads
//! - Observable values and the application state built from them
//! - Input snapshot types and the sampler trait
//! - Battery reading types, threshold policy and monitor
//! - Screen trait and the name-keyed screen cache
//! - The fixed-rate render loop that ties it all together
//! - Configuration type definitions
//!
//! Everything here is single-threaded. Shared handles are `Rc`, interior
//! state is `RefCell`/`Cell`, and every dispatch iterates a snapshot so
//! listeners may subscribe or unsubscribe while being called.

#![deny(unsafe_code)]

pub mod battery;
pub mod config;
pub mod events;
pub mod input;
pub mod render;
pub mod screen;
pub mod state;
pub mod traits;

pub use events::{Event, EventBus, EventHandler, EventKind, EventPayload, ListenerError};
pub use state::{AppState, Observable, Observer};
