//! Keypad sampler
//!
//! Polls one GPIO line per button. Lines are active-low (pressed pulls the
//! line to ground against the pull-up). Presses are debounced: a press that
//! follows the channel's previous qualifying press by less than
//! [`DEBOUNCE`] is treated as contact bounce and ignored entirely. Releases
//! are taken as they come.

use std::time::{Duration, Instant};

use heapless::Vec;
use log::{debug, trace};
use pettrac_core::input::{Button, ButtonSnapshot, PollResult, BUTTON_COUNT};
use pettrac_core::traits::{EdgeListener, InputSampler};
use pettrac_hal::InputPin;

/// Minimum time between two qualifying presses on one channel
pub const DEBOUNCE: Duration = Duration::from_millis(100);

struct Channel<P> {
    button: Button,
    pin: P,
    pressed: bool,
    last_edge: Option<Instant>,
    listener: Option<Box<dyn EdgeListener>>,
}

/// Debounced keypad sampler
pub struct ButtonSampler<P> {
    channels: Vec<Channel<P>, BUTTON_COUNT>,
    debounce: Duration,
}

impl<P: InputPin> ButtonSampler<P> {
    pub fn new() -> Self {
        Self::with_debounce(DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            channels: Vec::new(),
            debounce,
        }
    }

    /// Bind `pin` to `button`
    ///
    /// Returns false if the button is already bound.
    pub fn add_channel(&mut self, button: Button, pin: P) -> bool {
        if self.channel_mut(button).is_some() {
            return false;
        }
        let channel = Channel {
            button,
            pin,
            pressed: false,
            last_edge: None,
            listener: None,
        };
        // One channel per button, so the table cannot overflow
        self.channels.push(channel).is_ok()
    }

    /// Call `listener` synchronously from `poll()` on every qualifying press
    ///
    /// Replaces any listener already registered for the button. Returns
    /// false if the button has no channel.
    pub fn register_edge_callback(
        &mut self,
        button: Button,
        listener: Box<dyn EdgeListener>,
    ) -> bool {
        match self.channel_mut(button) {
            Some(channel) => {
                channel.listener = Some(listener);
                true
            }
            None => {
                debug!("No keypad channel for {}", button);
                false
            }
        }
    }

    /// Debounced state as of the last poll
    pub fn snapshot(&self) -> ButtonSnapshot {
        let mut snapshot = ButtonSnapshot::released();
        for channel in &self.channels {
            snapshot.set(channel.button, channel.pressed);
        }
        snapshot
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel_mut(&mut self, button: Button) -> Option<&mut Channel<P>> {
        self.channels.iter_mut().find(|c| c.button == button)
    }
}

impl<P: InputPin> Default for ButtonSampler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: InputPin> InputSampler for ButtonSampler<P> {
    fn poll(&mut self, now: Instant) -> PollResult {
        let debounce = self.debounce;
        let mut result = PollResult::default();

        for channel in self.channels.iter_mut() {
            let active = channel.pin.is_low();

            if active && !channel.pressed {
                let qualifies = channel
                    .last_edge
                    .map_or(true, |t| now.saturating_duration_since(t) >= debounce);
                if qualifies {
                    channel.pressed = true;
                    channel.last_edge = Some(now);
                    let _ = result.edges.push(channel.button);
                    if let Some(listener) = channel.listener.as_mut() {
                        listener.on_edge(channel.button, now);
                    }
                } else {
                    trace!("Bounce on {} ignored", channel.button);
                }
            } else if !active && channel.pressed {
                channel.pressed = false;
            }

            result.snapshot.set(channel.button, channel.pressed);
        }

        result
    }
}
