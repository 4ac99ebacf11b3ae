//! Variable-rate frame clock.
//!
//! The simulation advances by the measured wall-clock delta of each frame.
//! Long stalls (window drags, breakpoints) are clamped so the scene does not
//! jump forward.

use std::time::Instant;

use tracing::warn;

/// Default upper bound on one frame's delta: 250 ms, i.e. 4 FPS.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Clamp `frame_time` to `[0, max_frame_time]`, warning when it is cut.
pub fn clamp_frame_time(frame_time: f64, max_frame_time: f64) -> f64 {
    if frame_time > max_frame_time {
        warn!(
            "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
            frame_time * 1000.0,
            max_frame_time * 1000.0
        );
        return max_frame_time;
    }
    frame_time.max(0.0)
}

pub struct FrameClock {
    previous_time: Instant,
    max_frame_time: f64,
    frame_count: u64,
}

impl FrameClock {
    /// A non-positive or non-finite bound falls back to [`MAX_FRAME_TIME`].
    pub fn new(max_frame_time: f64) -> Self {
        let max_frame_time = if max_frame_time.is_finite() && max_frame_time > 0.0 {
            max_frame_time
        } else {
            MAX_FRAME_TIME
        };
        Self {
            previous_time: Instant::now(),
            max_frame_time,
            frame_count: 0,
        }
    }

    /// Seconds since the previous tick, clamped.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.frame_count += 1;
        clamp_frame_time(frame_time, self.max_frame_time)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn max_frame_time(&self) -> f64 {
        self.max_frame_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_TIME)
    }
}
