//! Random sources for the meter
//!
//! Every draw the engine makes (fill-time variance, attempt interval,
//! selection roll) goes through [`RandomSource`], so a host can substitute
//! its own generator and tests can pin the sequence with a seed.

use serde::{Deserialize, Serialize};

/// A source of uniform draws
pub trait RandomSource {
    /// Uniform f64 in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform f64 in `[min, max)`
    ///
    /// Callers are expected to pass `min <= max`; an inverted range yields a
    /// value in `(max, min]`.
    fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// A deterministic random number generator
///
/// xorshift64: the same seed produces the same sequence on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterRng {
    state: u64,
}

impl MeterRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG from a saved state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for MeterRng {
    fn next_f64(&mut self) -> f64 {
        // top 53 bits, so the result is strictly below 1.0
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Default for MeterRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// A source that replays a fixed list of draws, cycling when exhausted
///
/// Useful for hosts that want to script a run, and for pinning exact
/// roulette-wheel outcomes in tests.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    /// Create from a list of draws in `[0, 1)`; an empty list always yields 0
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
