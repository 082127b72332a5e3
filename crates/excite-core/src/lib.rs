//! Excite Core - frame-driven excitement meter
//!
//! This crate provides the engine behind an excitement meter:
//! - A bounded accumulator that fills toward `MAX_EXCITEMENT` over a
//!   randomized fill time
//! - A registry of breakpoint events, each with a threshold and an action
//! - Pluggable weighting (`Decay` or `Blended`) and a roulette-wheel selector
//! - A scheduler that spaces selection attempts by random intervals
//! - An edge-triggered climax gate
//! - Flat snapshots for saving and restoring
//!
//! ## Driving the meter
//!
//! ```
//! use excite_core::{LogAction, Meter, MeterConfig};
//!
//! let mut meter = Meter::with_seed(MeterConfig::default(), 7);
//! meter.registry_mut().add(0.0, Box::new(LogAction::new("warmup")));
//! meter.set_playing(true);
//!
//! for _ in 0..60 {
//!     meter.tick(1.0 / 60.0);
//! }
//! assert!(meter.excitement() > 0.0);
//! ```
//!
//! Everything runs synchronously inside `tick`; the meter is single-threaded
//! and owns all of its state.

mod accumulator;
mod action;
mod climax;
pub mod config;
mod error;
mod identity;
mod meter;
mod registry;
mod rng;
pub mod scheduler;
pub mod selector;
mod snapshot;
mod status;
pub mod weight;

pub use accumulator::{Accumulator, MAX_EXCITEMENT, MIN_FILL_TIME};
pub use action::{Action, ActionBlob, LogAction, Unassigned};
pub use climax::ClimaxGate;
pub use config::{
    ConfigWarning, EligibilityConfig, FillConfig, IntervalConfig, MeterConfig, ResetPolicy,
    WeightingStrategy,
};
pub use error::{Error, Result};
pub use identity::EventId;
pub use meter::{Meter, MeterState, TickReport};
pub use registry::{BreakpointEvent, Registry};
pub use rng::{MeterRng, RandomSource, ScriptedRng};
pub use scheduler::Scheduler;
pub use selector::SelectionOutcome;
pub use snapshot::{EventRecord, MeterSnapshot};
pub use status::StatusBoard;
pub use weight::DEFAULT_WEIGHT_PARAM;
