use crate::world::player::{Messenger, PlayerDirectory, PlayerId};
use crate::world::position::Position;

/// Cumulative distance from the countdown's start position that cancels
/// the teleport. Measured against the origin snapshot, not the previous
/// tick, so a slow drift cancels exactly like a single jump.
pub const MOVE_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEnd {
    Completed,
    Moved,
    Disconnected,
}

/// The delayed-relocation state machine for one subject. Driven by a
/// periodic scheduler task; each `tick` applies one transition and the
/// task stops itself as soon as a terminal outcome is returned.
///
/// Guard order matters: a disconnected subject is never sent the
/// movement-cancellation notice, because there is nobody to receive it.
#[derive(Debug)]
pub struct Countdown {
    subject: PlayerId,
    origin: Position,
    destination: Position,
    remaining: u64,
}

impl Countdown {
    /// `origin` is the subject's position when the countdown starts;
    /// `destination` is captured at acceptance and never re-read, so the
    /// subject arrives where the accepting player stood at that instant.
    pub fn new(subject: PlayerId, origin: Position, destination: Position, delay_secs: u64) -> Self {
        Countdown {
            subject,
            origin,
            destination,
            remaining: delay_secs,
        }
    }

    pub fn subject(&self) -> PlayerId {
        self.subject
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// One transition. Returns `None` while still counting.
    pub fn tick(
        &mut self,
        directory: &dyn PlayerDirectory,
        messenger: &dyn Messenger,
    ) -> Option<CountdownEnd> {
        if !directory.is_reachable(self.subject) {
            return Some(CountdownEnd::Disconnected);
        }
        let position = match directory.position_of(self.subject) {
            Some(position) => position,
            None => return Some(CountdownEnd::Disconnected),
        };
        if position.distance_to(self.origin) > MOVE_TOLERANCE {
            messenger.notify(self.subject, "Teleport cancelled: you moved.");
            return Some(CountdownEnd::Moved);
        }
        if self.remaining == 0 {
            directory.relocate(self.subject, self.destination);
            messenger.notify(self.subject, "Teleported.");
            return Some(CountdownEnd::Completed);
        }
        messenger.notify(
            self.subject,
            &format!("Teleporting in {}...", self.remaining),
        );
        self.remaining -= 1;
        None
    }
}
