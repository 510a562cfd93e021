use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::telemetry::logging;
use crate::world::player::PlayerId;
use crate::world::timer::{TickScheduler, Timestamp};

/// A submitted teleport request occupying its target's single inbound
/// slot. Immutable once created; resolved (accepted or denied) at most
/// once, or removed by its own expiry task.
#[derive(Debug)]
pub struct TeleportRequest {
    requester: PlayerId,
    target: PlayerId,
    created_at: Timestamp,
    expires_at: Timestamp,
}

impl TeleportRequest {
    pub fn requester(&self) -> PlayerId {
        self.requester
    }

    pub fn target(&self) -> PlayerId {
        self.target
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    /// Whole seconds until expiry, floored, never negative.
    pub fn seconds_remaining(&self, now: Timestamp) -> u64 {
        self.expires_at.0.saturating_sub(now.0) / 1000
    }
}

#[derive(Debug, Clone)]
pub enum SubmitError {
    SlotOccupied { target: PlayerId },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::SlotOccupied { target } => {
                write!(f, "player {} already has a pending request", target.0)
            }
        }
    }
}

impl std::error::Error for SubmitError {}

type RequestMap = HashMap<PlayerId, Arc<TeleportRequest>>;

/// At most one pending request per target. Each entry self-expires via a
/// one-shot task; `resolve` consumes an entry exactly once. There is no
/// background sweep, so a lookup may momentarily return an entry whose
/// `is_expired` is already true before its removal task has run — accept
/// paths must re-check.
#[derive(Clone)]
pub struct RequestRegistry {
    entries: Arc<Mutex<RequestMap>>,
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRegistry {
    pub fn new() -> Self {
        RequestRegistry {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a request for `target`, rejecting if its slot is live, and arm
    /// the expiry task.
    pub fn submit(
        &self,
        sched: &mut TickScheduler,
        requester: PlayerId,
        target: PlayerId,
        expiry: Duration,
    ) -> Result<Arc<TeleportRequest>, SubmitError> {
        let now = sched.now();
        let request = {
            let mut entries = lock(&self.entries);
            if entries.contains_key(&target) {
                return Err(SubmitError::SlotOccupied { target });
            }
            let request = Arc::new(TeleportRequest {
                requester,
                target,
                created_at: now,
                expires_at: now.saturating_add(expiry),
            });
            entries.insert(target, Arc::clone(&request));
            request
        };

        let slot = Arc::clone(&self.entries);
        let expired = Arc::clone(&request);
        sched.after(expiry, move || {
            let mut entries = lock(&slot);
            // Only remove the exact request this task was armed for; the
            // slot may have been resolved and refilled since.
            let is_same = entries
                .get(&target)
                .map(|live| Arc::ptr_eq(live, &expired))
                .unwrap_or(false);
            if is_same {
                entries.remove(&target);
                logging::log_event(&format!(
                    "request {} -> {} expired",
                    expired.requester.0, target.0
                ));
            }
        });

        Ok(request)
    }

    /// Non-consuming lookup of `target`'s pending request.
    pub fn peek(&self, target: PlayerId) -> Option<Arc<TeleportRequest>> {
        lock(&self.entries).get(&target).cloned()
    }

    /// Remove and return `target`'s pending request. A second call for the
    /// same entry returns `None`.
    pub fn resolve(&self, target: PlayerId) -> Option<Arc<TeleportRequest>> {
        lock(&self.entries).remove(&target)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

fn lock(entries: &Mutex<RequestMap>) -> std::sync::MutexGuard<'_, RequestMap> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: PlayerId = PlayerId(1);
    const BOB: PlayerId = PlayerId(2);
    const CAROL: PlayerId = PlayerId(3);

    fn expiry() -> Duration {
        Duration::from_secs(30)
    }

    #[test]
    fn second_submission_to_an_occupied_slot_is_rejected() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        let rejected = registry.submit(&mut sched, CAROL, BOB, expiry());
        assert!(matches!(
            rejected,
            Err(SubmitError::SlotOccupied { target: BOB })
        ));

        // The first request is untouched.
        assert_eq!(registry.peek(BOB).unwrap().requester(), ALICE);
    }

    #[test]
    fn different_targets_hold_independent_slots() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        registry.submit(&mut sched, ALICE, CAROL, expiry()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_consumes_exactly_once() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        let submitted = registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        let resolved = registry.resolve(BOB).unwrap();
        assert!(Arc::ptr_eq(&submitted, &resolved));
        assert!(registry.resolve(BOB).is_none());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        assert!(registry.peek(BOB).is_some());
        assert!(registry.peek(BOB).is_some());
    }

    #[test]
    fn request_expires_out_of_the_registry() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        sched.advance(Duration::from_secs(29));
        assert!(registry.peek(BOB).is_some());

        sched.advance(Duration::from_secs(2));
        assert!(registry.peek(BOB).is_none());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn stale_expiry_task_does_not_remove_a_replacement_request() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        // First request is resolved before its expiry task runs, and the
        // slot refilled. The old task must leave the new entry alone.
        registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        sched.advance(Duration::from_secs(10));
        registry.resolve(BOB).unwrap();
        let replacement = registry.submit(&mut sched, CAROL, BOB, expiry()).unwrap();

        // Past the first request's deadline, before the second's.
        sched.advance(Duration::from_secs(25));
        let live = registry.peek(BOB).expect("replacement must survive");
        assert!(Arc::ptr_eq(&live, &replacement));
    }

    #[test]
    fn expiry_is_strictly_after_the_deadline() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        let request = registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        assert!(!request.is_expired(Timestamp(30_000)));
        assert!(request.is_expired(Timestamp(30_001)));
    }

    #[test]
    fn seconds_remaining_floors_and_never_goes_negative() {
        let mut sched = TickScheduler::new();
        let registry = RequestRegistry::new();

        let request = registry.submit(&mut sched, ALICE, BOB, expiry()).unwrap();
        assert_eq!(request.seconds_remaining(Timestamp(0)), 30);
        assert_eq!(request.seconds_remaining(Timestamp(500)), 29);
        assert_eq!(request.seconds_remaining(Timestamp(29_999)), 0);
        assert_eq!(request.seconds_remaining(Timestamp(120_000)), 0);
    }
}
