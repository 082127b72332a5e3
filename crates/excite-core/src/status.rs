//! Diagnostic side channel for presentation
//!
//! The board is written by the engine and read by whatever displays it.
//! Nothing in the control path ever reads it back.

use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::selector::SelectionOutcome;
use crate::EventId;

/// Last selection outcome plus a throttled status text
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBoard {
    refresh_every: f64,
    since_refresh: f64,
    last_outcome: Option<SelectionOutcome>,
    attempts: u64,
    text: String,
}

impl StatusBoard {
    /// Create a board that re-renders at most every `refresh_every` seconds
    ///
    /// The first refresh happens on the first poll.
    pub fn new(refresh_every: f64) -> Self {
        Self {
            refresh_every,
            since_refresh: f64::INFINITY,
            last_outcome: None,
            attempts: 0,
            text: String::new(),
        }
    }

    /// Change the refresh period
    pub fn set_refresh_every(&mut self, refresh_every: f64) {
        self.refresh_every = refresh_every;
    }

    /// Note the outcome of a selection attempt
    pub fn record(&mut self, outcome: SelectionOutcome) {
        self.last_outcome = Some(outcome);
        self.attempts += 1;
    }

    /// The event picked by the most recent attempt, if it picked one
    pub fn last_fired(&self) -> Option<EventId> {
        self.last_outcome.and_then(|outcome| outcome.chosen)
    }

    /// The most recent attempt's full outcome
    pub fn last_outcome(&self) -> Option<&SelectionOutcome> {
        self.last_outcome.as_ref()
    }

    /// Number of attempts recorded so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// The most recently rendered text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Count `dt` seconds of wall time and re-render when the period is up
    ///
    /// Returns true when the text was refreshed.
    pub fn poll(&mut self, dt: f64, registry: &Registry, scheduler: &Scheduler) -> bool {
        self.since_refresh += dt;
        if self.since_refresh <= self.refresh_every {
            return false;
        }
        self.since_refresh = 0.0;
        self.text = self.render(registry, scheduler);
        true
    }

    /// Render the status text now
    pub fn render(&self, registry: &Registry, scheduler: &Scheduler) -> String {
        let last = self
            .last_fired()
            .and_then(|id| registry.label(id))
            .unwrap_or_else(|| "<none>".to_string());
        format!(
            "Last Event: {}\nNext Event Time: {:.1}s / {:.1}s",
            last,
            scheduler.elapsed(),
            scheduler.next_fire_at()
        )
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(3.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::IntervalConfig;

    #[test]
    fn test_empty_board() {
        let board = StatusBoard::default();
        let text = board.render(&Registry::new(), &Scheduler::new());
        assert_eq!(text, "Last Event: <none>\nNext Event Time: 0.0s / 0.0s");
    }

    #[test]
    fn test_renders_label_and_timer() {
        let mut registry = Registry::new();
        registry.add_unassigned(0.0);
        let second = registry.add_unassigned(10.0).id;

        let mut scheduler = Scheduler::new();
        scheduler.advance(2.3);
        scheduler.complete_attempt(&IntervalConfig { min: 10.0, max: 10.0 }, &mut ScriptedRng::new(vec![0.0]));

        let mut board = StatusBoard::default();
        board.record(SelectionOutcome {
            chosen: Some(second),
            eligible: 2,
            total_weight: 1.5,
        });
        assert_eq!(
            board.render(&registry, &scheduler),
            "Last Event: Event 2\nNext Event Time: 2.3s / 12.3s"
        );
    }

    #[test]
    fn test_empty_attempt_clears_last_fired() {
        let mut board = StatusBoard::default();
        board.record(SelectionOutcome {
            chosen: Some(EventId::new(0)),
            ..Default::default()
        });
        board.record(SelectionOutcome::default());
        assert_eq!(board.last_fired(), None);
        assert_eq!(board.attempts(), 2);
    }

    #[test]
    fn test_poll_is_throttled() {
        let registry = Registry::new();
        let scheduler = Scheduler::new();
        let mut board = StatusBoard::new(0.5);

        assert!(board.poll(0.0, &registry, &scheduler));
        assert!(!board.poll(0.25, &registry, &scheduler));
        assert!(!board.poll(0.25, &registry, &scheduler));
        assert!(board.poll(0.25, &registry, &scheduler));
        assert!(!board.text().is_empty());
    }
}
