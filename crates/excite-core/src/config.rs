//! Meter configuration
//!
//! Settings arrive from a host UI or a preset file and are not trusted:
//! [`MeterConfig::validate`] lists what is wrong and
//! [`MeterConfig::sanitized`] resolves each issue with a fixed policy. The
//! engine only ever runs on the sanitized copy.

use crate::accumulator::{MAX_EXCITEMENT, MIN_FILL_TIME};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fill-rate settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Seconds for the meter to go from 0 to MAX before variance
    pub base_fill_time: f64,
    /// Extra variance in `[0, 1]`; the effective fill time is
    /// `base_fill_time * (1 + U(0, randomness))`
    pub randomness: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            base_fill_time: 600.0,
            randomness: 0.5,
        }
    }
}

/// Bounds, in seconds, for the wait between selection attempts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub min: f64,
    pub max: f64,
}

impl IntervalConfig {
    /// Bounds ordered low-to-high
    pub fn ordered(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 20.0,
        }
    }
}

/// How eligible events are weighted against each other
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightingStrategy {
    /// Exponential decay behind the current excitement, halving every
    /// `1000 * decay` units; ignores per-event weights
    Decay { decay: f64 },
    /// Per-event weight blended with proximity; no falloff parameter
    Blended,
}

impl Default for WeightingStrategy {
    fn default() -> Self {
        WeightingStrategy::Decay { decay: 0.5 }
    }
}

/// Which events may be selected, and with what weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub weighting: WeightingStrategy,
    /// How far excitement may run past a threshold before the event stops
    /// being eligible
    pub max_age: f64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            weighting: WeightingStrategy::default(),
            max_age: 500.0,
        }
    }
}

/// What a reset does to the attempt scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResetPolicy {
    /// Zero the timer and wait a full freshly drawn interval before the next
    /// attempt
    #[default]
    Restart,
    /// Zero the timer and attempt a selection on the next playing tick
    ImmediateAttempt,
}

/// Complete meter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub fill: FillConfig,
    pub interval: IntervalConfig,
    pub eligibility: EligibilityConfig,
    pub reset_policy: ResetPolicy,
    /// Seconds between refreshes of the status board
    pub status_refresh: f64,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            fill: FillConfig::default(),
            interval: IntervalConfig::default(),
            eligibility: EligibilityConfig::default(),
            reset_policy: ResetPolicy::default(),
            status_refresh: 3.0 / 60.0,
        }
    }
}

/// A configuration problem and the policy used to resolve it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    #[error("fill time {0} is not positive; clamped to {min}", min = MIN_FILL_TIME)]
    FillTimeTooSmall(f64),

    #[error("fill randomness {0} outside [0, 1]; clamped")]
    RandomnessOutOfRange(f64),

    #[error("attempt interval min {min} exceeds max {max}; bounds swapped")]
    InvertedInterval { min: f64, max: f64 },

    #[error("attempt interval bound {0} is negative; clamped to 0")]
    NegativeInterval(f64),

    #[error("decay {0} outside [0, 1]; clamped")]
    DecayOutOfRange(f64),

    #[error("max age {0} outside [0, {max}]; clamped", max = MAX_EXCITEMENT)]
    MaxAgeOutOfRange(f64),

    #[error("status refresh {0} is negative; clamped to 0")]
    NegativeRefresh(f64),
}

impl MeterConfig {
    /// List every problem with this configuration
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let fill = self.fill.base_fill_time;
        if !(fill >= MIN_FILL_TIME) {
            warnings.push(ConfigWarning::FillTimeTooSmall(fill));
        }
        let randomness = self.fill.randomness;
        if !(0.0..=1.0).contains(&randomness) {
            warnings.push(ConfigWarning::RandomnessOutOfRange(randomness));
        }

        let IntervalConfig { min, max } = self.interval;
        if min > max {
            warnings.push(ConfigWarning::InvertedInterval { min, max });
        }
        for bound in [min, max] {
            if !(bound >= 0.0) {
                warnings.push(ConfigWarning::NegativeInterval(bound));
            }
        }

        if let WeightingStrategy::Decay { decay } = self.eligibility.weighting {
            if !(0.0..=1.0).contains(&decay) {
                warnings.push(ConfigWarning::DecayOutOfRange(decay));
            }
        }
        let max_age = self.eligibility.max_age;
        if !(0.0..=MAX_EXCITEMENT).contains(&max_age) {
            warnings.push(ConfigWarning::MaxAgeOutOfRange(max_age));
        }

        if !(self.status_refresh >= 0.0) {
            warnings.push(ConfigWarning::NegativeRefresh(self.status_refresh));
        }

        warnings
    }

    /// Return a copy with every issue from [`validate`](Self::validate)
    /// resolved
    pub fn sanitized(&self) -> Self {
        let mut config = *self;

        config.fill.base_fill_time = clamp_or(config.fill.base_fill_time, MIN_FILL_TIME, f64::MAX, MIN_FILL_TIME);
        config.fill.randomness = clamp_or(config.fill.randomness, 0.0, 1.0, 0.0);

        let min = clamp_or(config.interval.min, 0.0, f64::MAX, 0.0);
        let max = clamp_or(config.interval.max, 0.0, f64::MAX, 0.0);
        let (min, max) = IntervalConfig { min, max }.ordered();
        config.interval = IntervalConfig { min, max };

        if let WeightingStrategy::Decay { decay } = config.eligibility.weighting {
            config.eligibility.weighting = WeightingStrategy::Decay {
                decay: clamp_or(decay, 0.0, 1.0, 0.0),
            };
        }
        config.eligibility.max_age = clamp_or(config.eligibility.max_age, 0.0, MAX_EXCITEMENT, 0.0);
        config.status_refresh = clamp_or(config.status_refresh, 0.0, f64::MAX, 0.0);

        config
    }

    /// Strict check for hosts that would rather reject than repair
    pub fn check(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            None => Ok(()),
            Some(warning) => Err(Error::InvalidConfig(warning.to_string())),
        }
    }
}

/// Clamp into `[lo, hi]`, mapping NaN to `fallback`
fn clamp_or(value: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_clean() {
        let config = MeterConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.sanitized(), config);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_zero_fill_time_is_clamped() {
        let mut config = MeterConfig::default();
        config.fill.base_fill_time = 0.0;

        assert_eq!(config.validate(), vec![ConfigWarning::FillTimeTooSmall(0.0)]);
        assert_eq!(config.sanitized().fill.base_fill_time, MIN_FILL_TIME);
    }

    #[test]
    fn test_inverted_interval_is_swapped() {
        let mut config = MeterConfig::default();
        config.interval = IntervalConfig { min: 30.0, max: 5.0 };

        assert_eq!(
            config.validate(),
            vec![ConfigWarning::InvertedInterval { min: 30.0, max: 5.0 }]
        );
        assert_eq!(config.sanitized().interval, IntervalConfig { min: 5.0, max: 30.0 });
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut config = MeterConfig::default();
        config.fill.randomness = 3.0;
        config.eligibility.weighting = WeightingStrategy::Decay { decay: -1.0 };
        config.eligibility.max_age = 5000.0;
        config.interval.min = -2.0;

        assert_eq!(config.validate().len(), 4);

        let clean = config.sanitized();
        assert_eq!(clean.fill.randomness, 1.0);
        assert_eq!(clean.eligibility.weighting, WeightingStrategy::Decay { decay: 0.0 });
        assert_eq!(clean.eligibility.max_age, MAX_EXCITEMENT);
        assert_eq!(clean.interval.min, 0.0);
        assert!(clean.validate().is_empty());
    }

    #[test]
    fn test_nan_is_flagged_and_replaced() {
        let mut config = MeterConfig::default();
        config.fill.base_fill_time = f64::NAN;

        assert!(matches!(config.validate()[0], ConfigWarning::FillTimeTooSmall(_)));
        assert_eq!(config.sanitized().fill.base_fill_time, MIN_FILL_TIME);
    }

    #[test]
    fn test_warning_messages_name_the_limit() {
        assert_eq!(
            ConfigWarning::FillTimeTooSmall(0.0).to_string(),
            format!("fill time 0 is not positive; clamped to {}", MIN_FILL_TIME)
        );
        assert_eq!(
            ConfigWarning::MaxAgeOutOfRange(1200.0).to_string(),
            "max age 1200 outside [0, 1000]; clamped"
        );
    }

    #[test]
    fn test_check_reports_first_problem() {
        let mut config = MeterConfig::default();
        config.interval = IntervalConfig { min: 2.0, max: 1.0 };
        assert!(matches!(config.check(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_ron_partial_config_uses_defaults() {
        let config: MeterConfig = ron::from_str(
            "(fill: (base_fill_time: 120.0), eligibility: (weighting: Blended))",
        )
        .unwrap();

        assert_eq!(config.fill.base_fill_time, 120.0);
        assert_eq!(config.fill.randomness, 0.5);
        assert_eq!(config.eligibility.weighting, WeightingStrategy::Blended);
        assert_eq!(config.eligibility.max_age, 500.0);
        assert_eq!(config.interval, IntervalConfig::default());
    }
}
