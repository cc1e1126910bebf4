use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardCfg {
    /// Reward per meter of distance closed towards the goal
    pub progress_scale: f32,
    /// Reward per decision step for facing the goal
    pub alignment_scale: f32,
    /// Terminal reward on reaching the goal
    pub success_reward: f32,
    /// Terminal reward on excess tilt, timeout or stall
    pub failure_reward: f32,
    /// Penalty per m/s of impact speed
    pub collision_scale: f32,
    /// Additional penalty on a hard crash
    pub crash_penalty: f32,
}

impl Default for RewardCfg {
    fn default() -> Self {
        Self {
            progress_scale: 1.0,
            alignment_scale: 0.01,
            success_reward: 1.0,
            failure_reward: -1.0,
            collision_scale: 0.1,
            crash_penalty: 1.0,
        }
    }
}

/// Contributions to the reward of one decision step.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RewardBreakdown {
    pub progress: f32,
    pub alignment: f32,
    pub collision: f32,
    pub terminal: f32,
}

impl RewardBreakdown {
    pub fn total(&self) -> f32 {
        self.progress + self.alignment + self.collision + self.terminal
    }
}

/// Positive when the distance to the goal shrank since the last step.
pub fn progress(cfg: &RewardCfg, previous_distance: f32, distance: f32) -> f32 {
    cfg.progress_scale * (previous_distance - distance)
}

/// Bonus for heading towards the goal. `to_goal` need not be normalized;
/// when the vehicle sits on the goal there is no heading to reward.
pub fn alignment(cfg: &RewardCfg, forward: &Vector3<f32>, to_goal: &Vector3<f32>) -> f32 {
    match to_goal.try_normalize(1e-6) {
        Some(dir) => cfg.alignment_scale * forward.dot(&dir),
        None => 0.0,
    }
}

/// Penalty for an impact of `impact_speed` (a non-positive reward).
pub fn collision(cfg: &RewardCfg, impact_speed: f32) -> f32 {
    -cfg.collision_scale * impact_speed
}
