//! Selection weights for eligible events
//!
//! Both strategies are pure functions of the current excitement and the
//! event's own parameters. Degenerate inputs yield 0, never a negative or
//! non-finite weight.

use crate::config::WeightingStrategy;

/// Weight used by [`WeightingStrategy::Blended`] when an event carries no
/// explicit weight
pub const DEFAULT_WEIGHT_PARAM: f64 = 1.0;

/// Distance over which proximity matters
const SCALE: f64 = 1000.0;

impl WeightingStrategy {
    /// Weight of an event with `threshold` (and optional `weight_param`) at
    /// the given `excitement`
    pub fn weight(&self, excitement: f64, threshold: f64, weight_param: Option<f64>) -> f64 {
        let weight = match *self {
            WeightingStrategy::Decay { decay } => decay_weight(excitement, threshold, decay),
            WeightingStrategy::Blended => blended_weight(
                excitement,
                threshold,
                weight_param.unwrap_or(DEFAULT_WEIGHT_PARAM),
            ),
        };
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    }
}

/// `clamp01(2 ^ (-(excitement - threshold) / (1000 * decay)))`
///
/// Saturates at 1 for thresholds at or above the excitement and halves every
/// `1000 * decay` units behind it. Zero decay disables every event.
pub fn decay_weight(excitement: f64, threshold: f64, decay: f64) -> f64 {
    let scaled_decay = SCALE * decay;
    if scaled_decay == 0.0 {
        return 0.0;
    }
    let weight = 2f64.powf(-(excitement - threshold) / scaled_decay);
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

/// Blend of the event's own weight with proximity to its threshold
///
/// `diff = (1 - (excitement - threshold) / 1000) ^ 5`, then
/// `(1 - diff) * (0.8 * weight_param) ^ 3 + diff`. Events far behind the
/// excitement fall back to `weight_param` alone; events right at it
/// approach 1. `diff` is not clamped.
pub fn blended_weight(excitement: f64, threshold: f64, weight_param: f64) -> f64 {
    if excitement == 0.0 || weight_param == 0.0 {
        return 0.0;
    }
    let diff = (1.0 - (excitement - threshold) / SCALE).powi(5);
    (1.0 - diff) * (0.8 * weight_param).powi(3) + diff
}
