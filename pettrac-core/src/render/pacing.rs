//! Tick pacing and frame rate accounting

use std::time::{Duration, Instant};

/// Sleep needed to fill the rest of `period` after `elapsed` of work
///
/// Never negative: a tick that overran gets no sleep, and no debt is
/// carried into the next tick.
pub fn pacing_delay(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Frames per second, recomputed once per second of wall time
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Count one frame finished at `now`
    pub fn frame(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= FPS_WINDOW {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
    }

    /// Rate over the last completed window
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
