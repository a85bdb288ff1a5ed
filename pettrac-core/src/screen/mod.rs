//! Screens
//!
//! Screen content lives outside the core. The render loop only knows the
//! [`Screen`] lifecycle hooks and asks a [`ScreenFactory`] for screens by
//! name the first time they are needed. Constructed screens are cached
//! for the life of the process, so their state survives navigation.

pub mod cache;

pub use cache::ScreenCache;

use std::time::{Duration, Instant};

use pettrac_display::FrameBuffer;

use crate::events::{Event, EventBus};
use crate::state::AppState;

/// What a screen may look at while it runs
pub struct ScreenContext<'a> {
    pub state: &'a AppState,
    /// Tick timestamp
    pub now: Instant,
    /// Frames per second over the last full second
    pub fps: f32,
}

impl ScreenContext<'_> {
    pub fn bus(&self) -> &EventBus {
        self.state.bus()
    }

    pub fn uptime(&self) -> Duration {
        self.state.uptime(self.now)
    }

    /// Show a toast starting at this tick
    pub fn show_toast(&self, message: impl Into<String>, duration: Duration) {
        self.state.show_toast(message, duration, self.now);
    }
}

/// A full-screen view
///
/// Navigation is requested by setting `AppState::current_screen`; the
/// render loop performs the switch before the next render phase.
pub trait Screen {
    /// Cache key
    fn name(&self) -> &str;

    /// Called when the screen becomes active
    fn activate(&mut self, _ctx: &ScreenContext<'_>) {}

    /// Called when another screen replaces this one
    fn deactivate(&mut self, _ctx: &ScreenContext<'_>) {}

    /// Per-tick update, before drawing
    fn update(&mut self, _ctx: &ScreenContext<'_>) {}

    /// Button events the bus subscribers left unhandled
    fn handle_event(&mut self, _event: &mut Event, _ctx: &ScreenContext<'_>) {}

    /// Paint into the frame (already cleared to the background color)
    fn draw(&mut self, frame: &mut FrameBuffer, ctx: &ScreenContext<'_>);
}

/// Constructs screens by name
pub trait ScreenFactory {
    /// `None` for a name this factory does not know
    fn create(&self, name: &str) -> Option<Box<dyn Screen>>;
}

impl<F> ScreenFactory for F
where
    F: Fn(&str) -> Option<Box<dyn Screen>>,
{
    fn create(&self, name: &str) -> Option<Box<dyn Screen>> {
        self(name)
    }
}
