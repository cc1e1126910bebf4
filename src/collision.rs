//! Single-slot buffer between collision notifications from the physics
//! integrator and the decision step that turns them into penalties.
//!
//! The integrator may report any number of impacts between two decision
//! steps. Only the fastest of them is kept, and it is credited at most once
//! per cooldown window. Events drained inside the window are still handed
//! back as suppressed, so the caller can act on a hard crash.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Relative speed at impact [m/s]
    pub impact_speed: f32,
    /// Simulation time of the impact [s]
    pub timestamp: f32,
}

/// Outcome of draining a pending event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Drained {
    /// The cooldown had elapsed, the event is to be charged
    Credited(CollisionEvent),
    /// The event landed inside the cooldown of the last credited one
    Suppressed(CollisionEvent),
}

#[derive(Debug, Clone)]
pub struct CollisionTracker {
    cooldown: f32,
    pending: Option<CollisionEvent>,
    last_drain: Option<f32>,
}

impl CollisionTracker {
    /// Create a tracker which credits at most one event every `cooldown` seconds.
    pub fn new(cooldown: f32) -> Self {
        Self {
            cooldown: cooldown.max(0.0),
            pending: None,
            last_drain: None,
        }
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Record an impact of `speed` at time `now`. Keeps the worst impact
    /// since the last drain.
    pub fn record_impact(&mut self, speed: f32, now: f32) {
        let speed = speed.abs();
        match &mut self.pending {
            Some(event) if event.impact_speed >= speed => {}
            slot => {
                *slot = Some(CollisionEvent {
                    impact_speed: speed,
                    timestamp: now,
                })
            }
        }
    }

    pub fn pending(&self) -> Option<&CollisionEvent> {
        self.pending.as_ref()
    }

    /// Take the pending event, if any, provided the cooldown since the last
    /// credited event has elapsed. The slot is cleared either way, so impacts
    /// swallowed by the cooldown are not charged later.
    pub fn drain_if_cooldown_elapsed(&mut self, now: f32) -> Option<CollisionEvent> {
        match self.drain(now)? {
            Drained::Credited(event) => Some(event),
            Drained::Suppressed(_) => None,
        }
    }

    /// Take the pending event, if any, and tell whether it is credited or
    /// falls inside the cooldown. Only credited events restart the cooldown.
    pub fn drain(&mut self, now: f32) -> Option<Drained> {
        let event = self.pending.take()?;

        let cooled = self
            .last_drain
            .is_none_or(|last| now - last >= self.cooldown);

        if cooled {
            self.last_drain = Some(now);
            Some(Drained::Credited(event))
        } else {
            log::trace!(
                "Impact of {:.2} m/s within collision cooldown",
                event.impact_speed
            );
            Some(Drained::Suppressed(event))
        }
    }

    /// Forget pending events and the cooldown, e.g. on episode reset.
    pub fn clear(&mut self) {
        self.pending = None;
        self.last_drain = None;
    }
}
