//! Simulation clock with a signed, steppable time scale.

/// Positive scales at or above this flip to [`REVERSE_SEED`] on the next acceleration.
pub const ACCELERATION_CEILING: f64 = 4.0;

/// Scale set when acceleration passes the forward ceiling.
pub const REVERSE_SEED: f64 = -1.0;

/// Smallest allowed magnitude of the time scale.
pub const MIN_SCALE_MAGNITUDE: f64 = 0.01;

/// Largest allowed magnitude of the time scale, forward or reverse.
pub const MAX_SCALE_MAGNITUDE: f64 = 1024.0;

/// Maps wall-clock frame deltas to simulation time.
///
/// The scale is never zero and its magnitude stays within
/// [`MIN_SCALE_MAGNITUDE`]..=[`MAX_SCALE_MAGNITUDE`], so the clock always
/// moves and stays finite.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeController {
    simulation_time: f64,
    time_scale: f64,
}

impl Default for TimeController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl TimeController {
    /// Start at simulation time zero. An out-of-range scale has its magnitude
    /// clamped; a non-finite one falls back to 1.0.
    pub fn new(initial_scale: f64) -> Self {
        let time_scale = if initial_scale.is_finite() {
            bound_magnitude(initial_scale)
        } else {
            1.0
        };
        Self {
            simulation_time: 0.0,
            time_scale,
        }
    }

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Double the forward speed, wrap to reverse past the ceiling, or
    /// double the reverse speed up to [`MAX_SCALE_MAGNITUDE`]. Returns the
    /// new scale.
    pub fn accelerate(&mut self) -> f64 {
        self.time_scale = if self.time_scale >= ACCELERATION_CEILING {
            REVERSE_SEED
        } else {
            bound_magnitude(self.time_scale * 2.0)
        };
        self.time_scale
    }

    /// Halve the magnitude, keeping the sign. Returns the new scale.
    pub fn decelerate(&mut self) -> f64 {
        self.time_scale = bound_magnitude(self.time_scale * 0.5);
        self.time_scale
    }

    /// Advance by a wall-clock delta and return the new simulation time.
    pub fn advance(&mut self, delta_seconds: f64) -> f64 {
        self.simulation_time += delta_seconds * self.time_scale;
        self.simulation_time
    }
}

fn bound_magnitude(scale: f64) -> f64 {
    // Zero has no sign worth keeping; treat it as forward.
    let sign = if scale < 0.0 { -1.0 } else { 1.0 };
    sign * scale.abs().clamp(MIN_SCALE_MAGNITUDE, MAX_SCALE_MAGNITUDE)
}
