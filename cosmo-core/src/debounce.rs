//! Trailing-edge debounce keyed by write target.
//!
//! Scheduling a key pushes its deadline out; the caller polls
//! [`Debouncer::take_due`] from its tick loop and performs the write for
//! every key whose quiet period has elapsed. Each key has its own window,
//! so overlapping windows for different keys never interfere.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Debouncer<K> {
    pending: HashMap<K, Instant>,
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy> Debouncer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the quiet period for `key`, ending `delay` from now.
    pub fn schedule(&mut self, key: K, delay: Duration) {
        self.schedule_at(key, Instant::now() + delay);
    }

    pub fn schedule_at(&mut self, key: K, deadline: Instant) {
        self.pending.insert(key, deadline);
    }

    /// Drop a pending write. Returns whether one was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, K)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        for (_, key) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    /// Remove and return every pending key regardless of deadline.
    pub fn drain(&mut self) -> Vec<K> {
        let mut all: Vec<(Instant, K)> = self.pending.drain().map(|(k, d)| (d, k)).collect();
        all.sort_by_key(|(deadline, _)| *deadline);
        all.into_iter().map(|(_, key)| key).collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
