//! Button sampling traits

use std::time::Instant;

use crate::input::{Button, PollResult};

/// Polled button source
pub trait InputSampler {
    /// Read every channel once
    ///
    /// `now` is the poll timestamp used for debouncing.
    fn poll(&mut self, now: Instant) -> PollResult;
}

/// Direct callback for debounce-qualified presses
///
/// Invoked synchronously from inside [`InputSampler::poll`].
pub trait EdgeListener {
    fn on_edge(&mut self, button: Button, at: Instant);
}

impl<F> EdgeListener for F
where
    F: FnMut(Button, Instant),
{
    fn on_edge(&mut self, button: Button, at: Instant) {
        self(button, at)
    }
}
