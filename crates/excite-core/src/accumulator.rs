//! The bounded excitement accumulator
//!
//! Excitement rises linearly from 0 to [`MAX_EXCITEMENT`] over the current
//! effective fill time. The fill time is redrawn at every cycle boundary so
//! two runs with the same base settings still feel different.

use crate::config::FillConfig;
use crate::rng::RandomSource;

/// Upper bound of the excitement scale
pub const MAX_EXCITEMENT: f64 = 1000.0;

/// Smallest effective fill time, in seconds
pub const MIN_FILL_TIME: f64 = 1e-3;

/// Owns the excitement value and its fill rate
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    value: f64,
    effective_fill_time: f64,
}

impl Accumulator {
    /// Create an empty accumulator filling over `FillConfig::base_fill_time`
    pub fn new(fill: &FillConfig) -> Self {
        Self {
            value: 0.0,
            effective_fill_time: fill.base_fill_time.max(MIN_FILL_TIME),
        }
    }

    /// Current excitement
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Seconds the current cycle takes to go from 0 to MAX
    pub fn effective_fill_time(&self) -> f64 {
        self.effective_fill_time
    }

    /// Whether the value has reached MAX
    pub fn is_saturated(&self) -> bool {
        self.value >= MAX_EXCITEMENT
    }

    /// Drop the value back to 0
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Overwrite the value, clamped to `[0, MAX]`; non-finite input is ignored
    pub fn set_value(&mut self, value: f64) {
        if value.is_finite() {
            self.value = value.clamp(0.0, MAX_EXCITEMENT);
        }
    }

    /// Advance by `dt` seconds and return the new value
    ///
    /// A saturated accumulator does not move. Non-finite or negative `dt`
    /// counts as zero.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if self.is_saturated() || !(dt > 0.0) || !dt.is_finite() {
            return self.value;
        }
        let rate = dt * MAX_EXCITEMENT / self.effective_fill_time;
        self.value = (self.value + rate).clamp(0.0, MAX_EXCITEMENT);
        self.value
    }

    /// Draw a new effective fill time for the coming cycle
    ///
    /// `base_fill_time * (1 + U(0, randomness))`, never below
    /// [`MIN_FILL_TIME`].
    pub fn recompute_fill_time(&mut self, fill: &FillConfig, rng: &mut impl RandomSource) -> f64 {
        let variance = rng.range_f64(0.0, fill.randomness.max(0.0));
        let fill_time = fill.base_fill_time * (1.0 + variance);
        self.effective_fill_time = if fill_time.is_finite() {
            fill_time.max(MIN_FILL_TIME)
        } else {
            MIN_FILL_TIME
        };
        self.effective_fill_time
    }
}
