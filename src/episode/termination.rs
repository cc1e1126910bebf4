use serde::{Deserialize, Serialize};

use crate::types::BodyState;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationCfg {
    /// Distance to the goal counting as reached [m]
    pub success_radius: f32,
    /// The vehicle must be slower than this to count as arrived [m/s]
    pub success_speed: f32,
    /// The vehicle must be tilted less than this to count as arrived [deg]
    pub success_tilt_deg: f32,
    /// Tilting beyond this ends the episode as a failure [deg]
    pub max_tilt_deg: f32,
    /// Episode length limit [s]
    pub max_episode_time: f32,
    /// Failing to set a new best distance for this long ends the episode [s]
    pub stall_time: Option<f32>,
    /// A new best distance must beat the previous one by this margin [m]
    pub stall_margin: f32,
    /// Impacts at or above this speed end the episode as a crash [m/s]
    pub hard_crash_speed: f32,
    /// Minimum time between two charged collisions [s]
    pub collision_cooldown: f32,
}

impl Default for TerminationCfg {
    fn default() -> Self {
        Self {
            success_radius: 0.5,
            success_speed: 0.5,
            success_tilt_deg: 15.0,
            max_tilt_deg: 80.0,
            max_episode_time: 30.0,
            stall_time: Some(8.0),
            stall_margin: 0.1,
            hard_crash_speed: 6.0,
            collision_cooldown: 0.5,
        }
    }
}

/// How an episode ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// Reached the goal slowly and level
    Success,
    /// Ran out of time
    Timeout,
    /// No meaningful progress for too long
    Stalled,
    /// Tilted beyond the limit
    Tilted,
    /// Hit something too fast
    Crashed,
}

impl EpisodeEnd {
    pub fn is_success(&self) -> bool {
        matches!(self, EpisodeEnd::Success)
    }

    /// The episode was cut by the time limit rather than by the vehicle's
    /// own state, i.e. value bootstrapping is still valid.
    pub fn is_truncation(&self) -> bool {
        matches!(self, EpisodeEnd::Timeout)
    }
}

impl TerminationCfg {
    pub fn reached_goal(&self, state: &BodyState, distance: f32) -> bool {
        distance < self.success_radius
            && state.speed() < self.success_speed
            && state.tilt() < self.success_tilt_deg.to_radians()
    }

    pub fn tilted_over(&self, state: &BodyState) -> bool {
        state.tilt() > self.max_tilt_deg.to_radians()
    }

    pub fn is_hard_crash(&self, impact_speed: f32) -> bool {
        impact_speed >= self.hard_crash_speed
    }
}

/// Number of decision steps spanning `seconds`, for exact step-counted limits.
pub fn steps_for(seconds: f32, decision_dt: f32) -> u64 {
    (seconds / decision_dt).round().max(0.0) as u64
}
