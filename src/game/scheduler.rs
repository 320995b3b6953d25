//! Tick-Keyed Event Scheduler
//!
//! All suspension in the simulation is expressed as deferred callbacks
//! registered here: walking bursts, animation cycles, and detector
//! polling are one-shot or repeating events keyed by tick count, with
//! explicit cancellation tokens. Nothing blocks.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

use crate::core::geometry::Direction;
use crate::game::thing::ThingId;

/// Cancellation token for a scheduled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// What a scheduled event does when it fires.
///
/// Actions are data, not closures, so the scheduler stays serializable
/// and dispatch happens against the single world context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAction {
    /// Deferred walking start for a character that declared intent.
    StartWalking(ThingId, Direction),
    /// Recurring end-of-burst callback for a walking character.
    WalkingStop(ThingId),
    /// Walking/standing visual class toggle.
    WalkingClassCycle(ThingId),
    /// Horizontal-flip toggle for vertically facing walkers.
    SwitchFlip(ThingId),
    /// Viewport-exit poll for a window detector.
    CheckWindowDetector(ThingId),
}

impl EventAction {
    /// The Thing this action belongs to.
    pub fn owner(&self) -> ThingId {
        match *self {
            EventAction::StartWalking(id, _)
            | EventAction::WalkingStop(id)
            | EventAction::WalkingClassCycle(id)
            | EventAction::SwitchFlip(id)
            | EventAction::CheckWindowDetector(id) => id,
        }
    }
}

/// A registered event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Cancellation token
    pub id: EventId,
    /// What to do
    pub action: EventAction,
    /// Tick at which the event next fires
    pub fire_tick: u64,
    /// Repeat period; `None` for one-shots
    pub interval: Option<u64>,
}

/// Tick-keyed task queue.
///
/// Events due on the same tick fire in registration order (`EventId`
/// order), keeping dispatch deterministic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Scheduler {
    events: BTreeMap<EventId, ScheduledEvent>,
    next_id: u64,
    /// Tokens cancelled while the current tick's batch is in flight.
    revoked: BTreeSet<EventId>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-shot event `delay` ticks from `now`.
    pub fn add_event(&mut self, action: EventAction, now: u64, delay: u64) -> EventId {
        self.push(action, now + delay.max(1), None)
    }

    /// Register a repeating event with the given period.
    ///
    /// The first firing happens one full period from `now`.
    pub fn add_event_interval(&mut self, action: EventAction, now: u64, period: u64) -> EventId {
        let period = period.max(1);
        self.push(action, now + period, Some(period))
    }

    fn push(&mut self, action: EventAction, fire_tick: u64, interval: Option<u64>) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.insert(id, ScheduledEvent { id, action, fire_tick, interval });
        id
    }

    /// Cancel a single event by token. Unknown tokens are ignored.
    pub fn cancel_event(&mut self, id: EventId) {
        self.events.remove(&id);
        self.revoked.insert(id);
    }

    /// Cancel every pending event owned by `thing`.
    ///
    /// Killing a Thing must revoke its callbacks atomically so no
    /// orphaned callback ever acts on a dead entity.
    pub fn cancel_events_for(&mut self, thing: ThingId) {
        let ids: Vec<EventId> = self
            .events
            .values()
            .filter(|event| event.action.owner() == thing)
            .map(|event| event.id)
            .collect();
        for id in ids {
            self.cancel_event(id);
        }
    }

    /// Cancel everything. Used by world transitions: no stale timer
    /// survives a location change.
    pub fn cancel_all(&mut self) {
        self.events.clear();
        self.revoked.clear();
    }

    /// Collect all events due at `tick`, rescheduling intervals.
    ///
    /// Returned events are in registration order. The revocation set is
    /// reset here; events cancelled *during* the batch's dispatch are
    /// caught by [`Scheduler::is_revoked`].
    pub fn take_due(&mut self, tick: u64) -> Vec<ScheduledEvent> {
        self.revoked.clear();

        let due_ids: Vec<EventId> = self
            .events
            .values()
            .filter(|event| event.fire_tick <= tick)
            .map(|event| event.id)
            .collect();

        let mut due = Vec::with_capacity(due_ids.len());
        for id in due_ids {
            let Some(event) = self.events.get_mut(&id) else { continue };
            due.push(*event);

            match event.interval {
                Some(period) => event.fire_tick = tick + period,
                None => {
                    self.events.remove(&id);
                }
            }
        }

        due
    }

    /// Whether a token was cancelled after the current batch was taken.
    pub fn is_revoked(&self, id: EventId) -> bool {
        self.revoked.contains(&id)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
