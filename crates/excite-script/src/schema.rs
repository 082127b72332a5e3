//! Preset schema

use excite_core::{ActionBlob, EventRecord, MeterConfig, MeterSnapshot};
use serde::{Deserialize, Serialize};

/// A named meter setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDef {
    /// Unique name for this preset
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Meter configuration; missing fields take their defaults
    #[serde(default)]
    pub config: MeterConfig,
    /// Whether the meter starts playing
    #[serde(default)]
    pub playing: bool,
    /// Breakpoint events, in registry order
    #[serde(default)]
    pub events: Vec<EventDef>,
    /// Payload for the climax action
    #[serde(default)]
    pub climax: String,
}

/// One breakpoint event in a preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    /// Excitement level at which the event becomes eligible
    pub threshold: f64,
    /// Per-event weight parameter for blended weighting
    #[serde(default)]
    pub weight: Option<f64>,
    /// Action payload; empty means unassigned
    #[serde(default)]
    pub action: String,
}

impl PresetDef {
    /// Build the snapshot a meter restores from
    pub fn to_snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            config: self.config,
            playing: self.playing,
            events: self
                .events
                .iter()
                .map(|event| EventRecord {
                    threshold: event.threshold,
                    weight_param: event.weight,
                    action: ActionBlob::new(event.action.clone()),
                })
                .collect(),
            climax: ActionBlob::new(self.climax.clone()),
        }
    }

    /// Capture a snapshot under a preset name
    pub fn from_snapshot(name: impl Into<String>, snapshot: &MeterSnapshot) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            config: snapshot.config,
            playing: snapshot.playing,
            events: snapshot
                .events
                .iter()
                .map(|record| EventDef {
                    threshold: record.threshold,
                    weight: record.weight_param,
                    action: record.action.as_str().to_string(),
                })
                .collect(),
            climax: snapshot.climax.as_str().to_string(),
        }
    }
}
