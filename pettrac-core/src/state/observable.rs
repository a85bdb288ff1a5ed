//! Observable values
//!
//! A single value with change notification. Setting an equal value is a
//! no-op. The value is stored before any observer runs, so an observer
//! that reads the observable back sees the new value.

use core::cell::RefCell;
use std::rc::Rc;

use log::error;

use crate::events::bus::same_listener;
use crate::events::ListenerError;

/// Listener for value changes
pub trait Observer<T> {
    fn notify(&self, value: &T) -> Result<(), ListenerError>;
}

impl<T, F> Observer<T> for F
where
    F: Fn(&T) -> Result<(), ListenerError>,
{
    fn notify(&self, value: &T) -> Result<(), ListenerError> {
        self(value)
    }
}

/// Value container that notifies observers on change
pub struct Observable<T> {
    name: &'static str,
    value: RefCell<T>,
    observers: RefCell<Vec<Rc<dyn Observer<T>>>>,
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Create an observable; `name` only appears in log output
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            name,
            value: RefCell::new(initial),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Borrow the current value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` and notify observers if it differs from the current one
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value.clone();
        }

        let snapshot: Vec<Rc<dyn Observer<T>>> = self.observers.borrow().clone();
        for observer in snapshot {
            if let Err(e) = observer.notify(&value) {
                error!("Error in {} observer: {}", self.name, e);
            }
        }
        true
    }

    /// Register an observer; returns `false` if already registered
    pub fn observe(&self, observer: Rc<dyn Observer<T>>) -> bool {
        let mut observers = self.observers.borrow_mut();
        if observers.iter().any(|o| same_listener(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Remove an observer; returns `false` if it was not registered
    pub fn unobserve(&self, observer: &Rc<dyn Observer<T>>) -> bool {
        let mut observers = self.observers.borrow_mut();
        match observers.iter().position(|o| same_listener(o, observer)) {
            Some(pos) => {
                observers.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observable")
            .field("name", &self.name)
            .field("value", &*self.value.borrow())
            .finish_non_exhaustive()
    }
}
