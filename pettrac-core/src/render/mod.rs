//! Fixed-rate render loop
//!
//! Each tick runs, in order:
//!
//! ```text
//! update   poll buttons -> diff -> publish press/release/hold
//!          read battery + host stats -> app state
//!          active screen update()
//! apply    pending screen change / setting requests
//! render   clear -> active screen draw() -> toast overlay -> display.show()
//! pace     sleep max(0, period - elapsed)
//! account  frame counter, fps once per second
//! ```

pub mod pacing;
pub mod runner;
pub mod toast;

pub use pacing::{pacing_delay, FpsCounter};
pub use runner::{LoopState, RenderLoop, RenderLoopConfig, TickReport};
pub use toast::draw_toast;
