//! Event bus
//!
//! Handlers are shared (`Rc<dyn EventHandler>`) and identified by pointer,
//! so registering the same handler twice is a no-op. Every publish works on
//! a snapshot of the subscriber list: handlers added or removed during
//! dispatch only affect later publishes.

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, error};
use pettrac_display::DisplayError;
use thiserror::Error;

use super::event::{Event, EventKind, EventPayload};

/// Failure reported by an event handler or observer
///
/// Dispatchers log it and carry on with the next listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("display: {0}")]
    Display(#[from] DisplayError),
    #[error("{0}")]
    Failed(String),
}

impl ListenerError {
    /// Wrap any displayable error
    pub fn failed(err: impl core::fmt::Display) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Event handler
pub trait EventHandler {
    /// Handle one event
    ///
    /// Call `event.mark_handled()` to stop delivery to later handlers.
    fn handle(&self, event: &mut Event) -> Result<(), ListenerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&mut Event) -> Result<(), ListenerError>,
{
    fn handle(&self, event: &mut Event) -> Result<(), ListenerError> {
        self(event)
    }
}

/// Compare two shared listeners by address, ignoring vtables
pub(crate) fn same_listener<T: ?Sized, U: ?Sized>(a: &Rc<T>, b: &Rc<U>) -> bool {
    core::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// Diagnostic snapshot of the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusStats {
    /// Subscriber count per kind, in [`EventKind::ALL`] order
    pub subscribers: [(EventKind, usize); EventKind::COUNT],
    /// Handler invocations that returned `Ok` since startup
    pub processed: u64,
}

impl BusStats {
    pub fn total_subscribers(&self) -> usize {
        self.subscribers.iter().map(|(_, n)| n).sum()
    }
}

/// Typed publish/subscribe dispatcher
pub struct EventBus {
    subscribers: RefCell<[Vec<Rc<dyn EventHandler>>; EventKind::COUNT]>,
    processed: Cell<u64>,
    debug: Cell<bool>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(core::array::from_fn(|_| Vec::new())),
            processed: Cell::new(0),
            debug: Cell::new(false),
        }
    }

    /// Register `handler` for `kind`
    ///
    /// Returns `false` if this exact handler was already registered.
    pub fn subscribe(&self, kind: EventKind, handler: Rc<dyn EventHandler>) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let list = &mut subscribers[kind.index()];
        if list.iter().any(|h| same_listener(h, &handler)) {
            return false;
        }
        list.push(handler);
        if self.debug.get() {
            debug!("Subscribed to {} ({} handlers)", kind, list.len());
        }
        true
    }

    /// Remove `handler` from `kind`
    ///
    /// Returns `false` if it was not registered.
    pub fn unsubscribe(&self, kind: EventKind, handler: &Rc<dyn EventHandler>) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let list = &mut subscribers[kind.index()];
        let Some(pos) = list.iter().position(|h| same_listener(h, handler)) else {
            return false;
        };
        list.remove(pos);
        if self.debug.get() {
            debug!("Unsubscribed from {} ({} handlers)", kind, list.len());
        }
        true
    }

    /// Deliver `event` to every handler registered for its kind
    ///
    /// Handler errors are logged and do not stop dispatch. Delivery stops
    /// early once a handler marks the event handled. Returns the number of
    /// handlers that completed successfully.
    pub fn publish(&self, event: &mut Event) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Rc<dyn EventHandler>> = self.subscribers.borrow()[kind.index()].clone();

        if self.debug.get() {
            debug!("Publishing {:?} to {} handlers", event.payload(), snapshot.len());
        }

        let mut delivered = 0;
        for handler in snapshot {
            if event.is_handled() {
                break;
            }
            match handler.handle(event) {
                Ok(()) => {
                    delivered += 1;
                    self.processed.set(self.processed.get() + 1);
                }
                Err(e) => error!("Error in {} handler: {}", kind, e),
            }
        }
        delivered
    }

    /// Build an event from `payload`, publish it, and return it
    pub fn publish_payload(&self, payload: EventPayload) -> Event {
        let mut event = Event::new(payload);
        self.publish(&mut event);
        event
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.borrow()[kind.index()].len()
    }

    /// Handler invocations that returned `Ok` since startup
    pub fn processed_count(&self) -> u64 {
        self.processed.get()
    }

    pub fn stats(&self) -> BusStats {
        let subscribers = self.subscribers.borrow();
        BusStats {
            subscribers: EventKind::ALL.map(|kind| (kind, subscribers[kind.index()].len())),
            processed: self.processed.get(),
        }
    }

    /// Enable tracing of subscribe/unsubscribe/publish at debug level
    pub fn set_debug(&self, enabled: bool) {
        self.debug.set(enabled);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.get()
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let stats = self.stats();
        f.debug_struct("EventBus")
            .field("subscribers", &stats.total_subscribers())
            .field("processed", &stats.processed)
            .field("debug", &self.debug.get())
            .finish()
    }
}
