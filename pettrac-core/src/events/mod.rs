//! Event notification
//!
//! A typed publish/subscribe dispatcher. Producers (the render loop, app
//! state observers, the battery monitor) publish [`Event`]s; consumers
//! register an [`EventHandler`] per [`EventKind`].

pub mod bus;
pub mod event;

pub use bus::{BusStats, EventBus, EventHandler, ListenerError};
pub use event::{Event, EventKind, EventPayload, Setting, ShutdownReason};
