//! Attempt scheduling
//!
//! The scheduler decides *when* a selection attempt happens. It keeps its
//! own timer, independent of how fast the accumulator fills:
//! - `elapsed` - seconds since the last reset
//! - `next_fire_at` - the attempt fires once `elapsed` passes this
//! - `pending` - an attempt was requested out of band and fires next tick

use crate::config::IntervalConfig;
use crate::rng::RandomSource;

/// Timer state for selection attempts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scheduler {
    elapsed: f64,
    next_fire_at: f64,
    pending: bool,
}

impl Scheduler {
    /// Create an idle scheduler; its first attempt comes on the first tick
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the last reset
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Timer value at which the next attempt fires
    pub fn next_fire_at(&self) -> f64 {
        self.next_fire_at
    }

    /// Whether an out-of-band attempt is waiting
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Seconds left before the next attempt; zero when one is pending
    pub fn time_until_next(&self) -> f64 {
        if self.pending {
            0.0
        } else {
            (self.next_fire_at - self.elapsed).max(0.0)
        }
    }

    /// Back to idle: timer at zero, first attempt on the next tick
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zero the timer and wait a freshly drawn interval
    pub fn restart(&mut self, interval: &IntervalConfig, rng: &mut impl RandomSource) {
        self.reset();
        self.next_fire_at = draw_interval(interval, rng);
    }

    /// Ask for an attempt on the next tick regardless of the timer
    pub fn request_attempt(&mut self) {
        self.pending = true;
    }

    /// Advance the timer by `dt` and report whether an attempt is due
    ///
    /// Non-finite or negative `dt` counts as zero.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt > 0.0 && dt.is_finite() {
            self.elapsed += dt;
        }
        self.pending || self.elapsed > self.next_fire_at
    }

    /// Record that an attempt happened and schedule the next one
    ///
    /// Returns the new `next_fire_at`.
    pub fn complete_attempt(&mut self, interval: &IntervalConfig, rng: &mut impl RandomSource) -> f64 {
        self.pending = false;
        self.next_fire_at = self.elapsed + draw_interval(interval, rng);
        self.next_fire_at
    }
}

/// Uniform wait between the interval bounds; inverted bounds are swapped
pub fn draw_interval(interval: &IntervalConfig, rng: &mut impl RandomSource) -> f64 {
    let (min, max) = interval.ordered();
    rng.range_f64(min, max).max(0.0)
}
