//! Identity type for breakpoint events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a breakpoint event
///
/// Identities are handed out by the registry and never reused for its
/// lifetime, so they stay stable across sorting and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl EventId {
    /// Create a new event ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event:{}", self.0)
    }
}
