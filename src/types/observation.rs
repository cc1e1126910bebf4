use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::body::{BodyState, WORLD_UP};
use crate::consts::OBS_SIZE;

/// Pose-invariant observation of the vehicle, every quantity expressed in
/// the body frame. In order: goal relative to the vehicle (3), linear
/// velocity (3), angular velocity (3), altitude error (1) and world up (3).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation(pub [f32; OBS_SIZE]);

impl Observation {
    /// Build the observation of `state` towards `goal`, where `target_y` is
    /// the current altitude target of the flight controller.
    pub fn build(state: &BodyState, goal: &Vector3<f32>, target_y: f32) -> Self {
        let goal_rel = state.to_body(&(goal - state.position));
        let lin_vel = state.to_body(&state.linear_velocity);
        let ang_vel = state.to_body(&state.angular_velocity);
        let alt_error = target_y - state.position.y;
        let up = state.to_body(&WORLD_UP);

        let mut obs = [0.0; OBS_SIZE];
        obs[0..3].copy_from_slice(goal_rel.as_slice());
        obs[3..6].copy_from_slice(lin_vel.as_slice());
        obs[6..9].copy_from_slice(ang_vel.as_slice());
        obs[9] = alt_error;
        obs[10..13].copy_from_slice(up.as_slice());
        Observation(obs)
    }

    pub fn goal_relative(&self) -> [f32; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn linear_velocity(&self) -> [f32; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    pub fn angular_velocity(&self) -> [f32; 3] {
        [self.0[6], self.0[7], self.0[8]]
    }

    pub fn altitude_error(&self) -> f32 {
        self.0[9]
    }

    pub fn world_up(&self) -> [f32; 3] {
        [self.0[10], self.0[11], self.0[12]]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}
