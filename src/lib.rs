pub mod config;
pub mod telemetry;
pub mod teleport;
pub mod world;

pub use config::TeleportConfig;
pub use teleport::cooldown::CooldownTracker;
pub use teleport::countdown::{Countdown, CountdownEnd, MOVE_TOLERANCE};
pub use teleport::orchestrator::TeleportOrchestrator;
pub use teleport::request::{RequestRegistry, SubmitError, TeleportRequest};
pub use world::player::{Messenger, PlayerDirectory, PlayerId};
pub use world::position::Position;
pub use world::timer::{TaskControl, TickScheduler, TimerHandle, Timestamp};
