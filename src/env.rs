//! Composition root of the hover environment.
//!
//! [`HoverEnv`] owns the vehicle body (inside its integrator), the flight
//! controller, the episode manager, the collision buffer and the ambient
//! forces, and drives them on a fixed [`Schedule`]. All wiring happens in the
//! constructors; no component looks up another on its own.

use crate::collision::CollisionTracker;
use crate::config::Config;
use crate::controller::{FlightController, FlightOutput};
use crate::episode::reward::RewardBreakdown;
use crate::episode::{EpisodeEnd, EpisodeManager, EpisodeStats};
use crate::errors::HoverError;
use crate::physics::{AmbientForces, CalmAir, Integrator};
use crate::schedule::Schedule;
use crate::types::{Action, Observation, RigidBody};

/// What the learner gets back from one [`HoverEnv::step`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f32,
    pub breakdown: RewardBreakdown,
    pub end: Option<EpisodeEnd>,
}

impl Transition {
    pub fn done(&self) -> bool {
        self.end.is_some()
    }

    pub fn terminal(&self) -> bool {
        self.end.is_some_and(|end| !end.is_truncation())
    }

    pub fn truncated(&self) -> bool {
        self.end.is_some_and(|end| end.is_truncation())
    }
}

pub struct HoverEnv<B, A = CalmAir> {
    body: B,
    ambient: A,
    controller: FlightController,
    episode: EpisodeManager,
    collisions: CollisionTracker,
    schedule: Schedule,
}

impl<B: RigidBody + Integrator> HoverEnv<B, CalmAir> {
    /// Environment without ambient forces.
    pub fn new(config: &Config, body: B) -> Result<Self, HoverError> {
        Self::with_ambient(config, body, CalmAir)
    }
}

impl<B: RigidBody + Integrator, A: AmbientForces> HoverEnv<B, A> {
    /// Wire up the environment around `body`. The configuration is
    /// validated first, so a hand-built [`Config`] is held to the same rules
    /// as one loaded from a file.
    pub fn with_ambient(config: &Config, mut body: B, ambient: A) -> Result<Self, HoverError> {
        config.validate()?;

        let schedule = Schedule::new(&config.schedule);
        let mut controller = FlightController::new(&config.flight);
        controller.start(&mut body);

        Ok(Self {
            episode: EpisodeManager::new(&config.episode, schedule.decision_dt()),
            collisions: CollisionTracker::new(config.episode.termination.collision_cooldown),
            body,
            ambient,
            controller,
            schedule,
        })
    }

    /// Start a new episode and return its first observation.
    pub fn reset(&mut self) -> Observation {
        self.schedule.reset();
        self.episode
            .reset(&mut self.body, &mut self.controller, &mut self.collisions)
    }

    /// Apply `action`, advance the physics until the next decision step and
    /// score the result. A malformed action is rejected before anything
    /// moves.
    pub fn step(&mut self, action: &[f32]) -> Result<Transition, HoverError> {
        self.apply_action(action)?;

        while !self.physics_step().1 {}

        let state = self.body.state();
        let outcome = self
            .episode
            .evaluate(&state, &mut self.collisions, self.schedule.now())?;

        Ok(Transition {
            observation: self.episode.observe(&state, &self.controller),
            reward: outcome.reward,
            breakdown: outcome.breakdown,
            end: outcome.end,
        })
    }

    /// Write `action` to the command surface without advancing anything.
    pub fn apply_action(&mut self, action: &[f32]) -> Result<Action, HoverError> {
        self.episode.apply_action(action, &mut self.controller)
    }

    /// Run the controller and the integrator for a single physics step.
    /// Returns the controller output, if any, and whether a decision step
    /// is now due.
    pub fn physics_step(&mut self) -> (Option<FlightOutput>, bool) {
        let dt = self.schedule.physics_dt();
        let output = self.controller.physics_step(&mut self.body, dt);
        let decide = self.schedule.tick();
        self.body.integrate(
            dt,
            self.schedule.now(),
            &mut self.ambient,
            &mut self.collisions,
        );
        (output, decide)
    }

    pub fn observe(&self) -> Observation {
        self.episode.observe(&self.body.state(), &self.controller)
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn ambient_mut(&mut self) -> &mut A {
        &mut self.ambient
    }

    pub fn controller(&self) -> &FlightController {
        &self.controller
    }

    pub fn episode(&self) -> &EpisodeManager {
        &self.episode
    }

    pub fn stats(&self) -> &EpisodeStats {
        self.episode.stats()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}
