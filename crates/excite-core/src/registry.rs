//! The ordered collection of breakpoint events

use crate::accumulator::MAX_EXCITEMENT;
use crate::action::{Action, Unassigned};
use crate::{Error, EventId, Result};
use indexmap::IndexMap;
use tracing::{info, warn};

/// A threshold, its weighting parameters and the action it fires
#[derive(Debug, Clone)]
pub struct BreakpointEvent {
    /// Unique identifier for this event
    pub id: EventId,
    threshold: f64,
    weight_param: Option<f64>,
    action: Box<dyn Action>,
}

impl BreakpointEvent {
    fn new(id: EventId, threshold: f64, action: Box<dyn Action>) -> Self {
        Self {
            id,
            threshold: clamp_threshold(threshold),
            weight_param: None,
            action,
        }
    }

    /// Excitement at which this event becomes eligible
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Set the threshold, clamped to `[0, MAX]`
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = clamp_threshold(threshold);
    }

    /// Per-event weight in `[0, 1]`, if one was assigned
    pub fn weight_param(&self) -> Option<f64> {
        self.weight_param
    }

    /// Assign or clear the per-event weight, clamped to `[0, 1]`
    pub fn set_weight_param(&mut self, weight: Option<f64>) {
        self.weight_param = weight.filter(|w| !w.is_nan()).map(|w| w.clamp(0.0, 1.0));
    }

    /// Builder form of [`set_weight_param`](Self::set_weight_param)
    pub fn with_weight(&mut self, weight: f64) -> &mut Self {
        self.set_weight_param(Some(weight));
        self
    }

    /// The action fired when this event is selected
    pub fn action(&self) -> &dyn Action {
        self.action.as_ref()
    }

    /// Replace the action, releasing the old one
    pub fn set_action(&mut self, action: Box<dyn Action>) {
        self.action.release();
        self.action = action;
    }

    /// Fire this event's action
    pub fn fire(&mut self) {
        self.action.fire();
    }
}

fn clamp_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        0.0
    } else {
        threshold.clamp(0.0, MAX_EXCITEMENT)
    }
}

/// Storage for all breakpoint events, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    events: IndexMap<EventId, BreakpointEvent>,
    next_id: u64,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event and return it for further setup
    pub fn add(&mut self, threshold: f64, action: Box<dyn Action>) -> &mut BreakpointEvent {
        let id = self.next_id();
        let event = BreakpointEvent::new(id, threshold, action);
        info!(%id, threshold = event.threshold, "event added");
        self.events.entry(id).or_insert(event)
    }

    /// Add an event with nothing bound to it yet
    pub fn add_unassigned(&mut self, threshold: f64) -> &mut BreakpointEvent {
        self.add(threshold, Box::new(Unassigned))
    }

    /// Remove an event, releasing its action
    pub fn remove(&mut self, id: EventId) -> Result<()> {
        match self.events.shift_remove(&id) {
            Some(mut event) => {
                event.action.release();
                info!(%id, "event removed");
                Ok(())
            }
            None => {
                warn!(%id, "remove: event not found");
                Err(Error::EventNotFound(id))
            }
        }
    }

    /// Copy an event's threshold and weight under a new identity, with an
    /// independent clone of its action; the copy is appended
    pub fn duplicate(&mut self, id: EventId) -> Result<EventId> {
        let Some(source) = self.events.get(&id) else {
            warn!(%id, "duplicate: event not found");
            return Err(Error::EventNotFound(id));
        };
        let threshold = source.threshold;
        let weight_param = source.weight_param;
        let action = source.action.clone_action();

        let copy = self.add(threshold, action);
        copy.weight_param = weight_param;
        Ok(copy.id)
    }

    /// Remove every event, releasing each action
    pub fn clear(&mut self) {
        for event in self.events.values_mut() {
            event.action.release();
        }
        let removed = self.events.len();
        self.events.clear();
        info!(removed, "registry cleared");
    }

    /// Stable sort by threshold, lowest first
    pub fn sort_by_threshold(&mut self) {
        self.events
            .sort_by(|_, a, _, b| a.threshold.total_cmp(&b.threshold));
        info!(events = self.events.len(), "registry sorted by threshold");
    }

    /// Fire an event's action directly, outside of selection
    pub fn fire(&mut self, id: EventId) -> Result<()> {
        match self.events.get_mut(&id) {
            Some(event) => {
                event.fire();
                Ok(())
            }
            None => {
                warn!(%id, "fire: event not found");
                Err(Error::EventNotFound(id))
            }
        }
    }

    /// Get an event by ID
    pub fn get(&self, id: EventId) -> Option<&BreakpointEvent> {
        self.events.get(&id)
    }

    /// Get a mutable reference to an event
    pub fn get_mut(&mut self, id: EventId) -> Option<&mut BreakpointEvent> {
        self.events.get_mut(&id)
    }

    /// Zero-based position of an event in display order
    pub fn position(&self, id: EventId) -> Option<usize> {
        self.events.get_index_of(&id)
    }

    /// Display label, e.g. `"Event 3"`, by one-based position
    pub fn label(&self, id: EventId) -> Option<String> {
        self.position(id).map(|i| format!("Event {}", i + 1))
    }

    /// Get all event IDs in order
    pub fn ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.events.keys().copied()
    }

    /// Get all events in order
    pub fn iter(&self) -> impl Iterator<Item = &BreakpointEvent> {
        self.events.values()
    }

    /// Get the number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn next_id(&mut self) -> EventId {
        let id = EventId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionBlob, LogAction};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    /// Counts its own fires and its releases
    #[derive(Debug)]
    struct Tally {
        fires: Rc<Cell<u32>>,
        releases: Rc<Cell<u32>>,
    }

    impl Tally {
        fn boxed(fires: &Rc<Cell<u32>>, releases: &Rc<Cell<u32>>) -> Box<dyn Action> {
            Box::new(Tally {
                fires: fires.clone(),
                releases: releases.clone(),
            })
        }
    }

    impl Action for Tally {
        fn fire(&mut self) {
            self.fires.set(self.fires.get() + 1);
        }
        fn is_assigned(&self) -> bool {
            true
        }
        fn clone_action(&self) -> Box<dyn Action> {
            Box::new(Tally {
                fires: Rc::new(Cell::new(0)),
                releases: self.releases.clone(),
            })
        }
        fn to_blob(&self) -> ActionBlob {
            ActionBlob::from("tally")
        }
        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut registry = Registry::new();
        let a = registry.add_unassigned(100.0).id;
        let b = registry.add_unassigned(200.0).id;
        registry.remove(a).unwrap();
        let c = registry.add_unassigned(300.0).id;

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_threshold_and_weight_are_clamped() {
        let mut registry = Registry::new();
        let event = registry.add_unassigned(1200.0);
        event.with_weight(4.0);
        assert_eq!(event.threshold(), MAX_EXCITEMENT);
        assert_eq!(event.weight_param(), Some(1.0));

        event.set_threshold(-10.0);
        event.set_weight_param(Some(f64::NAN));
        assert_eq!(event.threshold(), 0.0);
        assert_eq!(event.weight_param(), None);
    }

    #[test]
    fn test_missing_ids_are_reported() {
        let mut registry = Registry::new();
        let ghost = EventId::new(99);

        assert_eq!(registry.remove(ghost), Err(Error::EventNotFound(ghost)));
        assert_eq!(registry.duplicate(ghost), Err(Error::EventNotFound(ghost)));
        assert_eq!(registry.fire(ghost), Err(Error::EventNotFound(ghost)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_copies_parameters() {
        let mut registry = Registry::new();
        let original = registry.add(350.0, Box::new(LogAction::new("wave")));
        original.with_weight(0.25);
        let original = original.id;

        let copy = registry.duplicate(original).unwrap();
        let copied = registry.get(copy).unwrap();

        assert_ne!(copy, original);
        assert_eq!(copied.threshold(), 350.0);
        assert_eq!(copied.weight_param(), Some(0.25));
        assert_eq!(copied.action().to_blob(), ActionBlob::from("wave"));
        assert_eq!(registry.position(copy), Some(1));
    }

    #[test]
    fn test_duplicate_does_not_alias_action() {
        let fires = Rc::new(Cell::new(0));
        let releases = Rc::new(Cell::new(0));
        let mut registry = Registry::new();
        let original = registry.add(0.0, Tally::boxed(&fires, &releases)).id;
        let copy = registry.duplicate(original).unwrap();

        registry.fire(copy).unwrap();
        registry.fire(copy).unwrap();
        assert_eq!(fires.get(), 0);

        registry.fire(original).unwrap();
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn test_remove_and_clear_release_actions() {
        let fires = Rc::new(Cell::new(0));
        let releases = Rc::new(Cell::new(0));
        let mut registry = Registry::new();
        let a = registry.add(0.0, Tally::boxed(&fires, &releases)).id;
        registry.add(10.0, Tally::boxed(&fires, &releases));
        registry.add(20.0, Tally::boxed(&fires, &releases));

        registry.remove(a).unwrap();
        assert_eq!(releases.get(), 1);

        registry.clear();
        assert_eq!(releases.get(), 3);
        assert!(registry.is_empty());
    }

    /// Collects formatted log lines from the subscriber
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_mutations_and_misses_are_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut registry = Registry::new();
            registry.add_unassigned(500.0);
            registry.add_unassigned(100.0);
            registry.sort_by_threshold();
            assert!(registry.fire(EventId::new(42)).is_err());
            registry.clear();
        });

        let text = logs.text();
        assert!(text.contains("registry sorted by threshold"));
        assert!(text.contains("WARN") && text.contains("fire: event not found"));
        assert!(text.contains("registry cleared"));
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut registry = Registry::new();
        let high = registry.add_unassigned(800.0).id;
        let mid_a = registry.add_unassigned(300.0).id;
        let low = registry.add_unassigned(100.0).id;
        let mid_b = registry.add_unassigned(300.0).id;

        registry.sort_by_threshold();
        let order: Vec<_> = registry.ids().collect();
        assert_eq!(order, vec![low, mid_a, mid_b, high]);

        registry.sort_by_threshold();
        assert_eq!(registry.ids().collect::<Vec<_>>(), order);
    }

    #[test]
    fn test_labels_follow_position() {
        let mut registry = Registry::new();
        let a = registry.add_unassigned(500.0).id;
        let b = registry.add_unassigned(100.0).id;
        assert_eq!(registry.label(a).as_deref(), Some("Event 1"));

        registry.sort_by_threshold();
        assert_eq!(registry.label(b).as_deref(), Some("Event 1"));
        assert_eq!(registry.label(a).as_deref(), Some("Event 2"));
        assert_eq!(registry.label(EventId::new(42)), None);
    }
}
