use crate::world::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u32);

/// Session-state and position queries the teleport engine needs from the
/// surrounding server, plus the relocation itself. Implementations use
/// interior mutability; the engine only ever holds a shared reference.
pub trait PlayerDirectory: Send + Sync {
    fn is_reachable(&self, id: PlayerId) -> bool;

    /// Current position, or `None` once the player left the session.
    fn position_of(&self, id: PlayerId) -> Option<Position>;

    fn relocate(&self, id: PlayerId, to: Position);
}

/// Best-effort player notification. The player may have disconnected
/// between a reachability check and the notify call; that is benign and
/// implementations must tolerate it.
pub trait Messenger: Send + Sync {
    fn notify(&self, id: PlayerId, text: &str);
}
