//! The action capability fired by events and by the climax gate
//!
//! What an action *does* belongs to the host. The core only needs to fire
//! it, ask whether anything is bound to it, clone it without aliasing, and
//! carry its persisted form around as an opaque blob.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque persisted form of an action
///
/// The core never looks inside; it only keeps one blob per event (plus one
/// for the climax action) in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionBlob(pub String);

impl ActionBlob {
    /// Create a new blob
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// Get the payload as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the blob carries anything
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ActionBlob {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionBlob {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A host-provided effect
pub trait Action: fmt::Debug {
    /// Run the action
    fn fire(&mut self);

    /// Whether anything is bound to this action
    fn is_assigned(&self) -> bool;

    /// Produce an independent copy
    ///
    /// Firing the copy must never fire the original, and vice versa.
    fn clone_action(&self) -> Box<dyn Action>;

    /// Persisted form of this action
    fn to_blob(&self) -> ActionBlob;

    /// Called when the owning event is removed or the registry is cleared
    fn release(&mut self) {}
}

impl Clone for Box<dyn Action> {
    fn clone(&self) -> Self {
        self.clone_action()
    }
}

/// An action with nothing bound to it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unassigned;

impl Action for Unassigned {
    fn fire(&mut self) {}

    fn is_assigned(&self) -> bool {
        false
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(Unassigned)
    }

    fn to_blob(&self) -> ActionBlob {
        ActionBlob::default()
    }
}

/// An action that records a `tracing` event each time it fires
///
/// The label doubles as its persisted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAction {
    label: String,
    fired: u64,
}

impl LogAction {
    /// Create a new logging action
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fired: 0,
        }
    }

    /// Rebuild from a persisted blob; an empty blob yields [`Unassigned`]
    pub fn from_blob(blob: &ActionBlob) -> Box<dyn Action> {
        if blob.is_empty() {
            Box::new(Unassigned)
        } else {
            Box::new(Self::new(blob.as_str()))
        }
    }

    /// The label this action logs with
    pub fn label(&self) -> &str {
        &self.label
    }

    /// How many times this instance has fired
    pub fn fired(&self) -> u64 {
        self.fired
    }
}

impl Action for LogAction {
    fn fire(&mut self) {
        self.fired += 1;
        tracing::info!(action = %self.label, count = self.fired, "action fired");
    }

    fn is_assigned(&self) -> bool {
        true
    }

    fn clone_action(&self) -> Box<dyn Action> {
        // a copy starts with its own count
        Box::new(Self::new(self.label.clone()))
    }

    fn to_blob(&self) -> ActionBlob {
        ActionBlob::new(self.label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassigned() {
        let mut action = Unassigned;
        action.fire();
        assert!(!action.is_assigned());
        assert!(action.to_blob().is_empty());
    }

    #[test]
    fn test_log_action_blob() {
        let action = LogAction::new("wave");
        assert_eq!(action.to_blob(), ActionBlob::from("wave"));

        let rebuilt = LogAction::from_blob(&action.to_blob());
        assert!(rebuilt.is_assigned());
        assert_eq!(rebuilt.to_blob().as_str(), "wave");

        let empty = LogAction::from_blob(&ActionBlob::default());
        assert!(!empty.is_assigned());
    }

    #[test]
    fn test_log_action_counts() {
        let mut action = LogAction::new("a");
        action.fire();
        action.fire();
        assert_eq!(action.fired(), 2);
    }

    #[test]
    fn test_blob_is_transparent_in_ron() {
        let blob = ActionBlob::from("wave");
        let text = ron::to_string(&blob).unwrap();
        assert_eq!(text, "\"wave\"");
    }
}
