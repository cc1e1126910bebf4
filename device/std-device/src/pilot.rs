use hoverloop::Observation;

/// Gains of the heuristic pilot. Each command is a PD law on the goal offset
/// and velocity along one body axis, clamped to the action range.
#[derive(Debug, Clone, Copy)]
pub struct PilotGains {
    pub lateral_p: f32,
    pub lateral_d: f32,
    pub vertical_p: f32,
    pub vertical_d: f32,
}

impl Default for PilotGains {
    fn default() -> Self {
        Self {
            lateral_p: 0.25,
            lateral_d: 0.6,
            vertical_p: 0.5,
            vertical_d: 0.3,
        }
    }
}

/// Scripted stand-in for a trained policy: banks and pitches towards the
/// goal while braking on its own velocity, and climbs to the goal height.
#[derive(Debug, Clone, Default)]
pub struct Pilot {
    gains: PilotGains,
}

impl Pilot {
    /// Action for `obs`, in order roll, pitch and climb.
    pub fn act(&self, obs: &Observation) -> [f32; 3] {
        let [right, up, forward] = obs.goal_relative();
        let [vel_right, vel_up, vel_forward] = obs.linear_velocity();
        let g = &self.gains;

        let roll = g.lateral_p * right - g.lateral_d * vel_right;
        let pitch = g.lateral_p * forward - g.lateral_d * vel_forward;
        let climb = g.vertical_p * up - g.vertical_d * vel_up;

        [roll, pitch, climb].map(|x| x.clamp(-1.0, 1.0))
    }
}
