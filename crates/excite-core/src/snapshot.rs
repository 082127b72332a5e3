//! Flat records for saving and restoring a meter
//!
//! The records hold configuration scalars and one entry per event, in
//! registry order. Action payloads are opaque [`ActionBlob`]s; turning them
//! back into live actions is up to the host.

use crate::action::ActionBlob;
use crate::config::MeterConfig;
use serde::{Deserialize, Serialize};

/// Persisted form of one breakpoint event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub threshold: f64,
    #[serde(default)]
    pub weight_param: Option<f64>,
    #[serde(default)]
    pub action: ActionBlob,
}

/// Persisted form of a whole meter
///
/// The excitement value itself is not saved; a restored meter keeps its
/// current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeterSnapshot {
    #[serde(default)]
    pub config: MeterConfig,
    #[serde(default)]
    pub playing: bool,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub climax: ActionBlob,
}
