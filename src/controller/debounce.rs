use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::filter::TextField;

/// Quiet period before a text field counts as settled
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// One cancellable deadline per text field.
///
/// Scheduling a field that already has a deadline replaces it, so only the last
/// change in a burst ever expires.
#[derive(Debug, Clone)]
pub struct DebounceTimers {
    delay: Duration,
    deadlines: HashMap<TextField, Instant>,
}

impl DebounceTimers {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    /// (Re)start the timer for `field`, returning its deadline
    pub fn schedule(&mut self, field: TextField, now: Instant) -> Instant {
        let deadline = now + self.delay;
        self.deadlines.insert(field, deadline);
        deadline
    }

    /// Returns whether a timer was pending
    pub fn cancel(&mut self, field: TextField) -> bool {
        self.deadlines.remove(&field).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_pending(&self, field: TextField) -> bool {
        self.deadlines.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every field whose deadline is at or before `now`, earliest first
    pub fn take_expired(&mut self, now: Instant) -> Vec<TextField> {
        let mut expired: Vec<(Instant, TextField)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(field, deadline)| (*deadline, *field))
            .collect();
        expired.sort();

        for (_, field) in &expired {
            self.deadlines.remove(field);
        }
        expired.into_iter().map(|(_, field)| field).collect()
    }
}

impl Default for DebounceTimers {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
