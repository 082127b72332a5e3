//! Roulette-wheel selection over eligible events
//!
//! Selection is pure: it reads the registry and draws from the RNG, but
//! never fires anything. The caller decides what to do with the outcome.

use crate::config::EligibilityConfig;
use crate::registry::{BreakpointEvent, Registry};
use crate::rng::RandomSource;
use crate::EventId;

/// Result of one selection attempt
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionOutcome {
    /// The chosen event, if any
    pub chosen: Option<EventId>,
    /// How many events passed the eligibility filter
    pub eligible: usize,
    /// Sum of the eligible events' weights
    pub total_weight: f64,
}

/// Whether an event may be selected at `excitement`
///
/// Its threshold must have been reached, and excitement must not have run
/// more than `max_age` past it.
pub fn is_eligible(event: &BreakpointEvent, excitement: f64, max_age: f64) -> bool {
    let threshold = event.threshold();
    threshold <= excitement && excitement - threshold <= max_age
}

/// Eligible events ordered by threshold, lowest first (ties keep registry
/// order)
pub fn eligible_events<'a>(
    registry: &'a Registry,
    excitement: f64,
    max_age: f64,
) -> Vec<&'a BreakpointEvent> {
    let mut eligible: Vec<_> = registry
        .iter()
        .filter(|event| is_eligible(event, excitement, max_age))
        .collect();
    eligible.sort_by(|a, b| a.threshold().total_cmp(&b.threshold()));
    eligible
}

/// Pick one eligible event, weighted by the configured strategy
///
/// Weights are summed in threshold order so the same seed reproduces the
/// same pick bit-for-bit. One uniform draw `r` in `[0, total)` is taken
/// only when the total is positive; the first event whose running sum
/// reaches `r` (plain `>=`, no epsilon) wins.
pub fn select(
    registry: &Registry,
    excitement: f64,
    params: &EligibilityConfig,
    rng: &mut impl RandomSource,
) -> SelectionOutcome {
    let eligible = eligible_events(registry, excitement, params.max_age);
    let weights: Vec<f64> = eligible
        .iter()
        .map(|event| {
            params
                .weighting
                .weight(excitement, event.threshold(), event.weight_param())
        })
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut outcome = SelectionOutcome {
        chosen: None,
        eligible: eligible.len(),
        total_weight,
    };
    if !(total_weight > 0.0) {
        return outcome;
    }

    let r = rng.range_f64(0.0, total_weight);
    let mut running = 0.0;
    for (event, weight) in eligible.iter().zip(&weights) {
        running += weight;
        if running >= r {
            outcome.chosen = Some(event.id);
            break;
        }
    }
    outcome
}
