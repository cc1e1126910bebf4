//! Episodic RL wrapper around the flight controller.
//!
//! The [`EpisodeManager`] owns the interaction contract with an external
//! learner. It resets the vehicle and goal, maps actions onto the command
//! surface of the [`FlightController`], scores every decision step and
//! decides when the episode is over. The learner must call
//! [`EpisodeManager::reset`] to leave the terminated state.

pub mod goal;
pub mod reward;
pub mod termination;

use core::f32::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionTracker, Drained};
use crate::controller::FlightController;
use crate::errors::HoverError;
use crate::types::{Action, AttitudeCommand, BodyState, Observation, RigidBody};

use goal::{GoalProvider, GoalSelector, SampleBox};
use reward::{RewardBreakdown, RewardCfg};
pub use termination::{EpisodeEnd, TerminationCfg};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Start positions are sampled uniformly from this box
    pub spawn: SampleBox,
    /// Give the vehicle a random heading at the start of each episode
    pub random_yaw: bool,
    /// Ordered goals, cycled through one per episode
    pub goals: Vec<[f32; 3]>,
    /// Goals are sampled from this box when no goals are listed
    pub goal_box: SampleBox,
    /// Seed of the episode randomisation
    pub seed: u64,
    pub reward: RewardCfg,
    pub termination: TerminationCfg,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            spawn: SampleBox::new([-5.0, 1.0, -5.0], [5.0, 3.0, 5.0]),
            random_yaw: true,
            goals: Vec::new(),
            goal_box: SampleBox::new([-10.0, 1.0, -10.0], [10.0, 5.0, 10.0]),
            seed: 0,
            reward: RewardCfg::default(),
            termination: TerminationCfg::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Terminated(EpisodeEnd),
}

/// Result of scoring one decision step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub breakdown: RewardBreakdown,
    pub end: Option<EpisodeEnd>,
}

impl StepOutcome {
    pub fn done(&self) -> bool {
        self.end.is_some()
    }

    /// Ended for a reason other than the time limit.
    pub fn terminal(&self) -> bool {
        self.end.is_some_and(|end| !end.is_truncation())
    }

    pub fn truncated(&self) -> bool {
        self.end.is_some_and(|end| end.is_truncation())
    }
}

/// Running totals of the current (or last) episode.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct EpisodeStats {
    /// Number of episodes started so far, this one included
    pub episode: u64,
    pub steps: u64,
    pub total_reward: f32,
    pub collisions: u32,
    pub end: Option<EpisodeEnd>,
}

pub struct EpisodeManager<G = GoalSelector> {
    reward: RewardCfg,
    termination: TerminationCfg,
    spawn: SampleBox,
    random_yaw: bool,
    goals: G,
    rng: StdRng,

    decision_dt: f32,
    max_steps: u64,
    stall_steps: Option<u64>,

    phase: Phase,
    goal: Vector3<f32>,
    steps: u64,
    best_distance: f32,
    previous_distance: f32,
    no_improvement_steps: u64,
    stats: EpisodeStats,
}

impl EpisodeManager<GoalSelector> {
    /// Episode manager cycling through the configured goals, with decision
    /// steps `decision_dt` seconds apart.
    pub fn new(cfg: &EpisodeConfig, decision_dt: f32) -> Self {
        let goals = GoalSelector::new(&cfg.goals, cfg.goal_box);
        Self::with_goals(cfg, decision_dt, goals)
    }
}

impl<G: GoalProvider> EpisodeManager<G> {
    pub fn with_goals(cfg: &EpisodeConfig, decision_dt: f32, goals: G) -> Self {
        let term = cfg.termination;
        Self {
            reward: cfg.reward,
            termination: term,
            spawn: cfg.spawn,
            random_yaw: cfg.random_yaw,
            goals,
            rng: StdRng::seed_from_u64(cfg.seed),
            decision_dt,
            max_steps: termination::steps_for(term.max_episode_time, decision_dt),
            stall_steps: term
                .stall_time
                .map(|t| termination::steps_for(t, decision_dt)),
            phase: Phase::Idle,
            goal: Vector3::zeros(),
            steps: 0,
            best_distance: 0.0,
            previous_distance: 0.0,
            no_improvement_steps: 0,
            stats: EpisodeStats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn goal(&self) -> Vector3<f32> {
        self.goal
    }

    pub fn elapsed_time(&self) -> f32 {
        self.steps as f32 * self.decision_dt
    }

    pub fn best_distance(&self) -> f32 {
        self.best_distance
    }

    pub fn previous_distance(&self) -> f32 {
        self.previous_distance
    }

    pub fn no_improvement_time(&self) -> f32 {
        self.no_improvement_steps as f32 * self.decision_dt
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Begin a new episode: place the vehicle at rest somewhere in the spawn
    /// box, pick the next goal and re-arm the controller and the collision
    /// buffer. Returns the first observation.
    pub fn reset(
        &mut self,
        body: &mut impl RigidBody,
        controller: &mut FlightController,
        collisions: &mut CollisionTracker,
    ) -> Observation {
        let position = self.spawn.sample(&mut self.rng);
        let rotation = match self.random_yaw {
            true => UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.rng.random_range(-PI..PI)),
            false => UnitQuaternion::identity(),
        };

        body.set_pose(position, rotation);
        body.set_velocities(Vector3::zeros(), Vector3::zeros());

        self.goal = self.goals.next_goal(&mut self.rng);
        controller.reset(position.y);
        collisions.clear();

        let distance = (self.goal - position).norm();
        self.steps = 0;
        self.best_distance = distance;
        self.previous_distance = distance;
        self.no_improvement_steps = 0;
        self.stats = EpisodeStats {
            episode: self.stats.episode + 1,
            ..Default::default()
        };
        self.phase = Phase::Running;

        log::debug!(
            "Episode {} from [{:.2}, {:.2}, {:.2}] to [{:.2}, {:.2}, {:.2}], {:.2} m",
            self.stats.episode,
            position.x,
            position.y,
            position.z,
            self.goal.x,
            self.goal.y,
            self.goal.z,
            distance
        );

        self.observe(&body.state(), controller)
    }

    /// Leave the current episode without scoring it.
    pub fn abort(&mut self) {
        if self.phase == Phase::Running {
            log::debug!("Episode {} aborted", self.stats.episode);
        }
        self.phase = Phase::Idle;
    }

    pub fn observe(&self, state: &BodyState, controller: &FlightController) -> Observation {
        Observation::build(state, &self.goal, controller.target_y())
    }

    /// Validate `raw` and write it onto the command surface of `controller`.
    pub fn apply_action(
        &self,
        raw: &[f32],
        controller: &mut FlightController,
    ) -> Result<Action, HoverError> {
        if !self.is_running() {
            return Err(HoverError::EpisodeNotRunning);
        }
        let action = Action::try_from(raw)?;
        controller.set_command(AttitudeCommand::from(action));
        Ok(action)
    }

    /// Score the decision step that just completed, with the vehicle in
    /// `state` at simulation time `now`.
    pub fn evaluate(
        &mut self,
        state: &BodyState,
        collisions: &mut CollisionTracker,
        now: f32,
    ) -> Result<StepOutcome, HoverError> {
        if !self.is_running() {
            return Err(HoverError::EpisodeNotRunning);
        }

        self.steps += 1;

        let to_goal = self.goal - state.position;
        let distance = to_goal.norm();

        let mut breakdown = RewardBreakdown {
            progress: reward::progress(&self.reward, self.previous_distance, distance),
            alignment: reward::alignment(&self.reward, &state.forward(), &to_goal),
            ..Default::default()
        };
        self.previous_distance = distance;

        if distance < self.best_distance - self.termination.stall_margin {
            self.best_distance = distance;
            self.no_improvement_steps = 0;
        } else {
            self.no_improvement_steps += 1;
        }

        let mut end = None;

        // The cooldown only rate-limits the speed-scaled penalty, a hard
        // crash ends the episode regardless
        let impact = match collisions.drain(now) {
            Some(Drained::Credited(event)) => {
                self.stats.collisions += 1;
                breakdown.collision = reward::collision(&self.reward, event.impact_speed);
                Some(event.impact_speed)
            }
            Some(Drained::Suppressed(event)) if self.termination.is_hard_crash(event.impact_speed) => {
                self.stats.collisions += 1;
                Some(event.impact_speed)
            }
            _ => None,
        };

        if impact.is_some_and(|speed| self.termination.is_hard_crash(speed)) {
            breakdown.terminal = -self.reward.crash_penalty;
            end = Some(EpisodeEnd::Crashed);
        }

        if end.is_none() {
            end = self.check_end(state, distance);
            breakdown.terminal = match end {
                Some(EpisodeEnd::Success) => self.reward.success_reward,
                Some(_) => self.reward.failure_reward,
                None => 0.0,
            };
        }

        let reward = breakdown.total();
        self.stats.steps = self.steps;
        self.stats.total_reward += reward;

        if let Some(end) = end {
            self.phase = Phase::Terminated(end);
            self.stats.end = Some(end);
            log::info!(
                "Episode {} ended {:?} after {} steps ({:.2} s), return {:.3}, {} collisions",
                self.stats.episode,
                end,
                self.steps,
                self.elapsed_time(),
                self.stats.total_reward,
                self.stats.collisions,
            );
        }

        Ok(StepOutcome {
            reward,
            breakdown,
            end,
        })
    }

    fn check_end(&self, state: &BodyState, distance: f32) -> Option<EpisodeEnd> {
        if self.termination.reached_goal(state, distance) {
            Some(EpisodeEnd::Success)
        } else if self.termination.tilted_over(state) {
            Some(EpisodeEnd::Tilted)
        } else if self.steps >= self.max_steps {
            Some(EpisodeEnd::Timeout)
        } else if self
            .stall_steps
            .is_some_and(|limit| self.no_improvement_steps >= limit)
        {
            Some(EpisodeEnd::Stalled)
        } else {
            None
        }
    }
}
