use std::collections::HashMap;
use std::time::Duration;

use crate::world::player::PlayerId;
use crate::world::timer::Timestamp;

/// Per-requester rate limit. Stores only the absolute end instant of the
/// latest cooldown; arming again overwrites unconditionally. Expired
/// entries are evicted lazily on read, no background sweep.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: HashMap<PlayerId, Timestamp>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        CooldownTracker {
            entries: HashMap::new(),
        }
    }

    pub fn arm(&mut self, subject: PlayerId, duration: Duration, now: Timestamp) {
        self.entries.insert(subject, now.saturating_add(duration));
    }

    pub fn is_active(&mut self, subject: PlayerId, now: Timestamp) -> bool {
        match self.entries.get(&subject) {
            None => false,
            Some(&end) if now >= end => {
                self.entries.remove(&subject);
                false
            }
            Some(_) => true,
        }
    }

    /// Whole seconds left on the cooldown, floored; zero for absent or
    /// expired entries.
    pub fn remaining_seconds(&mut self, subject: PlayerId, now: Timestamp) -> u64 {
        if !self.is_active(subject, now) {
            return 0;
        }
        match self.entries.get(&subject) {
            Some(&end) => end.0.saturating_sub(now.0) / 1000,
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
