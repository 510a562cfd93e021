use std::sync::Arc;
use std::time::Duration;

use crate::config::TeleportConfig;
use crate::telemetry::logging;
use crate::teleport::cooldown::CooldownTracker;
use crate::teleport::countdown::{Countdown, CountdownEnd};
use crate::teleport::request::{RequestRegistry, SubmitError, TeleportRequest};
use crate::world::player::{Messenger, PlayerDirectory, PlayerId};
use crate::world::timer::{TaskControl, TickScheduler, Timestamp};

/// Ties the request registry, cooldown tracker, and countdown machinery
/// together behind the surface the command layer calls. Constructed once
/// at server start; the host game loop drives it through [`advance`].
///
/// Every outcome is a plain boolean: none of the rejection reasons are
/// faults, and user-facing wording for them belongs to the caller. The
/// countdown is the one exception — it notifies the subject itself, since
/// it runs from a scheduled task with no caller to return to.
///
/// [`advance`]: TeleportOrchestrator::advance
pub struct TeleportOrchestrator {
    config: TeleportConfig,
    scheduler: TickScheduler,
    registry: RequestRegistry,
    cooldowns: CooldownTracker,
    directory: Arc<dyn PlayerDirectory>,
    messenger: Arc<dyn Messenger>,
}

impl TeleportOrchestrator {
    pub fn new(
        config: TeleportConfig,
        directory: Arc<dyn PlayerDirectory>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        TeleportOrchestrator {
            config,
            scheduler: TickScheduler::new(),
            registry: RequestRegistry::new(),
            cooldowns: CooldownTracker::new(),
            directory,
            messenger,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.scheduler.now()
    }

    /// Pump: advances virtual time, firing request expiries and countdown
    /// ticks that fall due. The host loop calls this once per frame.
    pub fn advance(&mut self, elapsed: Duration) {
        self.scheduler.advance(elapsed);
    }

    /// Submit a teleport request. Fails without side effects if the
    /// requester is rate-limited or the target already has a pending
    /// request.
    pub fn send_request(&mut self, requester: PlayerId, target: PlayerId) -> bool {
        let now = self.scheduler.now();
        if self.cooldowns.is_active(requester, now) {
            return false;
        }
        match self.registry.submit(
            &mut self.scheduler,
            requester,
            target,
            self.config.request_expiry(),
        ) {
            Ok(_) => {
                logging::log_event(&format!("request {} -> {}", requester.0, target.0));
                true
            }
            Err(SubmitError::SlotOccupied { .. }) => false,
        }
    }

    /// Accept the pending request aimed at `target`, starting the
    /// requester's countdown and arming their cooldown. The cooldown runs
    /// from this instant, not from arrival, so a countdown that later
    /// cancels has still consumed it.
    pub fn accept_request(&mut self, target: PlayerId) -> bool {
        let now = self.scheduler.now();
        let request = match self.registry.resolve(target) {
            Some(request) => request,
            None => return false,
        };
        // The expiry task may not have swept this entry yet; an expired
        // request reads the same as an absent one.
        if request.is_expired(now) {
            return false;
        }
        let requester = request.requester();
        if !self.directory.is_reachable(requester) {
            return false;
        }
        let origin = match self.directory.position_of(requester) {
            Some(position) => position,
            None => return false,
        };
        let destination = match self.directory.position_of(target) {
            Some(position) => position,
            None => return false,
        };

        self.cooldowns.arm(requester, self.config.cooldown(), now);
        self.start_countdown(Countdown::new(
            requester,
            origin,
            destination,
            self.config.countdown_delay().as_secs(),
        ));
        logging::log_event(&format!("request {} -> {} accepted", requester.0, target.0));
        true
    }

    /// Discard the pending request aimed at `target`. Returns whether one
    /// existed.
    pub fn deny_request(&mut self, target: PlayerId) -> bool {
        match self.registry.resolve(target) {
            Some(request) => {
                logging::log_event(&format!(
                    "request {} -> {} denied",
                    request.requester().0,
                    target.0
                ));
                true
            }
            None => false,
        }
    }

    pub fn get_request(&self, target: PlayerId) -> Option<Arc<TeleportRequest>> {
        self.registry.peek(target)
    }

    pub fn is_on_cooldown(&mut self, id: PlayerId) -> bool {
        let now = self.scheduler.now();
        self.cooldowns.is_active(id, now)
    }

    pub fn cooldown_remaining(&mut self, id: PlayerId) -> u64 {
        let now = self.scheduler.now();
        self.cooldowns.remaining_seconds(id, now)
    }

    fn start_countdown(&mut self, mut countdown: Countdown) {
        let directory = Arc::clone(&self.directory);
        let messenger = Arc::clone(&self.messenger);
        // First tick on the next pump, then once per configured interval.
        // The task owns the countdown state and drops it on any terminal
        // outcome; there is no external cancel path.
        self.scheduler.every_from(
            Duration::ZERO,
            self.config.tick_interval(),
            move || match countdown.tick(directory.as_ref(), messenger.as_ref()) {
                None => TaskControl::Continue,
                Some(end) => {
                    let subject = countdown.subject();
                    match end {
                        CountdownEnd::Completed => {
                            logging::log_event(&format!("teleport of {} completed", subject.0));
                        }
                        CountdownEnd::Moved => {
                            logging::log_event(&format!(
                                "teleport of {} cancelled: moved",
                                subject.0
                            ));
                        }
                        CountdownEnd::Disconnected => {
                            logging::log_event(&format!(
                                "teleport of {} cancelled: disconnected",
                                subject.0
                            ));
                        }
                    }
                    TaskControl::Stop
                }
            },
        );
    }
}
