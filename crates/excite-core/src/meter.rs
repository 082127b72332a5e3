//! The top-level meter engine
//!
//! One [`Meter`] owns the accumulator, the registry, the attempt scheduler
//! and the climax gate. The host calls [`Meter::tick`] once per frame with
//! the elapsed wall time; everything else happens synchronously inside.
//!
//! Per playing tick:
//! 1. if already saturated, only the climax gate runs
//! 2. the scheduler timer advances; when due, an attempt draws the next
//!    interval, selects an event, fires its action and redraws the fill time
//! 3. the accumulator advances
//! 4. the climax gate fires on the tick that reaches MAX

use crate::accumulator::Accumulator;
use crate::action::{Action, ActionBlob, Unassigned};
use crate::climax::ClimaxGate;
use crate::config::{ConfigWarning, EligibilityConfig, FillConfig, IntervalConfig, MeterConfig, ResetPolicy};
use crate::registry::Registry;
use crate::rng::{MeterRng, RandomSource};
use crate::scheduler::Scheduler;
use crate::selector::{self, SelectionOutcome};
use crate::snapshot::{EventRecord, MeterSnapshot};
use crate::status::StatusBoard;
use crate::{Error, EventId, Result};
use tracing::{debug, info, warn};

/// Coarse engine state for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterState {
    /// Meter and timer both at zero
    Idle,
    /// Meter rising
    Charging,
    /// Meter at MAX
    Saturated,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// A selection attempt ran
    pub attempted: bool,
    /// The event whose action fired, if any
    pub fired: Option<EventId>,
    /// The climax action fired
    pub climax: bool,
    /// Excitement after the tick
    pub excitement: f64,
}

/// The excitement meter
#[derive(Debug)]
pub struct Meter<R = MeterRng> {
    config: MeterConfig,
    accumulator: Accumulator,
    registry: Registry,
    scheduler: Scheduler,
    climax_gate: ClimaxGate,
    climax: Box<dyn Action>,
    rng: R,
    playing: bool,
    status: StatusBoard,
}

impl Meter<MeterRng> {
    /// Create a paused meter with the default RNG seed
    pub fn new(config: MeterConfig) -> Self {
        Self::with_rng(config, MeterRng::default())
    }

    /// Create a paused meter with a specific RNG seed
    pub fn with_seed(config: MeterConfig, seed: u64) -> Self {
        Self::with_rng(config, MeterRng::new(seed))
    }
}

impl Default for Meter<MeterRng> {
    fn default() -> Self {
        Self::new(MeterConfig::default())
    }
}

impl<R: RandomSource> Meter<R> {
    /// Create a paused meter drawing from `rng`
    pub fn with_rng(config: MeterConfig, rng: R) -> Self {
        report_warnings(&config.validate());
        let config = config.sanitized();

        let mut meter = Self {
            config,
            accumulator: Accumulator::new(&config.fill),
            registry: Registry::new(),
            scheduler: Scheduler::new(),
            climax_gate: ClimaxGate::new(),
            climax: Box::new(Unassigned),
            rng,
            playing: false,
            status: StatusBoard::new(config.status_refresh),
        };
        meter.recompute_fill_time();
        meter
    }

    // === Configuration ===

    /// Replace the configuration
    ///
    /// Problems are logged and repaired rather than rejected; the list is
    /// returned for a host that wants to surface it. A change to the fill
    /// settings takes effect immediately with a fresh fill-time draw.
    pub fn configure(&mut self, config: MeterConfig) -> Vec<ConfigWarning> {
        let warnings = config.validate();
        report_warnings(&warnings);

        let config = config.sanitized();
        let fill_changed = config.fill != self.config.fill;
        self.config = config;
        self.status.set_refresh_every(config.status_refresh);
        if fill_changed {
            self.recompute_fill_time();
        }
        warnings
    }

    /// Replace only the fill settings
    pub fn set_fill(&mut self, fill: FillConfig) -> Vec<ConfigWarning> {
        self.configure(MeterConfig { fill, ..self.config })
    }

    /// Replace only the attempt interval
    pub fn set_interval(&mut self, interval: IntervalConfig) -> Vec<ConfigWarning> {
        self.configure(MeterConfig { interval, ..self.config })
    }

    /// Replace only the eligibility settings
    pub fn set_eligibility(&mut self, eligibility: EligibilityConfig) -> Vec<ConfigWarning> {
        self.configure(MeterConfig { eligibility, ..self.config })
    }

    /// The active (sanitized) configuration
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    // === Control ===

    /// Drop excitement to zero and start a new cycle
    ///
    /// What happens to the attempt timer depends on [`ResetPolicy`]. Works
    /// whether or not the meter is playing.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.climax_gate.clear();
        match self.config.reset_policy {
            ResetPolicy::Restart => self.scheduler.restart(&self.config.interval, &mut self.rng),
            ResetPolicy::ImmediateAttempt => {
                self.scheduler.reset();
                self.scheduler.request_attempt();
            }
        }
        self.recompute_fill_time();
        info!(policy = ?self.config.reset_policy, "meter reset");
    }

    /// Start or pause the meter
    ///
    /// Pausing freezes everything in place. Starting draws a fresh fill time.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        self.playing = playing;
        if playing {
            self.recompute_fill_time();
        }
        info!(playing, excitement = self.accumulator.value(), "playback toggled");
    }

    /// Whether the meter is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Overwrite the excitement value, clamped to `[0, MAX]`
    pub fn set_excitement(&mut self, value: f64) {
        self.accumulator.set_value(value);
    }

    /// Advance the meter by `dt` seconds of wall time
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let dt = if dt > 0.0 && dt.is_finite() { dt } else { 0.0 };
        let mut report = TickReport::default();

        if self.playing {
            if self.accumulator.is_saturated() {
                report.climax = self.observe_saturation(true);
            } else {
                self.climax_gate.observe(false);
                if self.scheduler.advance(dt) {
                    report.attempted = true;
                    report.fired = self.attempt();
                }
                self.accumulator.tick(dt);
                report.climax = self.observe_saturation(self.accumulator.is_saturated());
            }
        }

        report.excitement = self.accumulator.value();
        self.status.poll(dt, &self.registry, &self.scheduler);
        report
    }

    /// Run one selection attempt and fire the chosen event
    fn attempt(&mut self) -> Option<EventId> {
        let next_fire_at = self.scheduler.complete_attempt(&self.config.interval, &mut self.rng);

        let excitement = self.accumulator.value();
        let outcome = selector::select(&self.registry, excitement, &self.config.eligibility, &mut self.rng);
        debug!(
            excitement,
            eligible = outcome.eligible,
            total_weight = outcome.total_weight,
            chosen = ?outcome.chosen,
            next_fire_at,
            "selection attempt"
        );

        if let Some(event) = outcome.chosen.and_then(|id| self.registry.get_mut(id)) {
            if !event.action().is_assigned() {
                debug!(id = %event.id, "selected event has no action assigned");
            }
            event.fire();
        }

        self.recompute_fill_time();
        self.status.record(outcome);
        outcome.chosen
    }

    fn observe_saturation(&mut self, saturated: bool) -> bool {
        let rising = self.climax_gate.observe(saturated);
        if rising {
            info!("climax reached");
            self.climax.fire();
        }
        rising
    }

    fn recompute_fill_time(&mut self) {
        let fill_time = self.accumulator.recompute_fill_time(&self.config.fill, &mut self.rng);
        debug!(fill_time, "fill time drawn");
    }

    // === Events ===

    /// The event registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access for add/remove/duplicate/clear/sort
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Bind the action fired on saturation, releasing the previous one
    pub fn set_climax_action(&mut self, action: Box<dyn Action>) {
        self.climax.release();
        self.climax = action;
    }

    /// The action fired on saturation
    pub fn climax_action(&self) -> &dyn Action {
        self.climax.as_ref()
    }

    // === Queries ===

    /// Current excitement
    pub fn excitement(&self) -> f64 {
        self.accumulator.value()
    }

    /// The event picked by the most recent attempt, if it picked one
    pub fn last_fired(&self) -> Option<EventId> {
        self.status.last_fired()
    }

    /// The most recent attempt's outcome
    pub fn last_outcome(&self) -> Option<&SelectionOutcome> {
        self.status.last_outcome()
    }

    /// Seconds of playing time before the next attempt
    pub fn time_until_next_attempt(&self) -> f64 {
        self.scheduler.time_until_next()
    }

    /// Coarse state for presentation
    pub fn state(&self) -> MeterState {
        if self.accumulator.is_saturated() {
            MeterState::Saturated
        } else if self.accumulator.value() == 0.0 && self.scheduler.elapsed() == 0.0 {
            MeterState::Idle
        } else {
            MeterState::Charging
        }
    }

    /// The accumulator
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// The attempt scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The diagnostic board
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// The random source
    pub fn rng(&self) -> &R {
        &self.rng
    }

    // === Persistence ===

    /// Flat record of configuration and events, in registry order
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            config: self.config,
            playing: self.playing,
            events: self
                .registry
                .iter()
                .map(|event| EventRecord {
                    threshold: event.threshold(),
                    weight_param: event.weight_param(),
                    action: event.action().to_blob(),
                })
                .collect(),
            climax: self.climax.to_blob(),
        }
    }

    /// Replace configuration and events from a snapshot
    ///
    /// `rebuild` turns each stored blob back into a live action. Existing
    /// events are released first; event order is preserved. The snapshot is
    /// checked before anything is touched, so a rejected snapshot leaves the
    /// meter as it was.
    pub fn restore<F>(&mut self, snapshot: &MeterSnapshot, mut rebuild: F) -> Result<()>
    where
        F: FnMut(&ActionBlob) -> Box<dyn Action>,
    {
        if let Some(bad) = snapshot.events.iter().position(|e| !e.threshold.is_finite()) {
            warn!(index = bad, "restore: event threshold is not a number");
            return Err(Error::InvalidConfig(format!(
                "event {} has a non-finite threshold",
                bad + 1
            )));
        }

        self.registry.clear();
        self.configure(snapshot.config);
        for record in &snapshot.events {
            self.registry
                .add(record.threshold, rebuild(&record.action))
                .set_weight_param(record.weight_param);
        }
        self.set_climax_action(rebuild(&snapshot.climax));
        self.set_playing(snapshot.playing);

        info!(events = self.registry.len(), "meter restored");
        Ok(())
    }
}

fn report_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        warn!(%warning, "configuration adjusted");
    }
}
