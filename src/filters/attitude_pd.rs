use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::{AttitudeCommand, BodyState, WORLD_UP};

/// Below this, the up axis is considered aligned with the desired up axis.
const ALIGNED_EPS: f32 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttitudeCfg {
    /// Proportional gain on the tilt error angle
    pub tilt_kp: f32,
    /// Damping gain on the roll/pitch angular velocity
    pub tilt_kd: f32,
    /// Damping gain on the yaw angular velocity
    pub yaw_damp: f32,
    /// Magnitude limit of the tilt torque and of the yaw torque, each [rad/s^2]
    pub max_level_torque: f32,
    /// Tilt angle commanded by a full `±1` roll or pitch bias [deg]
    pub max_tilt_bias_deg: f32,
    /// When set, yaw damping is scaled by `cos(tilt error)` but never below
    /// this floor, so banked turns are not fought as hard.
    pub yaw_tilt_floor: Option<f32>,
}

impl Default for AttitudeCfg {
    fn default() -> Self {
        Self {
            tilt_kp: 40.0,
            tilt_kd: 8.0,
            yaw_damp: 4.0,
            max_level_torque: 60.0,
            max_tilt_bias_deg: 20.0,
            yaw_tilt_floor: Some(0.3),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AttitudeOutput {
    /// Total torque to apply in acceleration mode [rad/s^2]
    pub torque: Vector3<f32>,
    /// Angle between the current and the desired up axis [rad]
    pub tilt_error: f32,
}

/// PD stabilizer driving the body up axis towards a commanded tilt, with
/// independent yaw-rate damping.
#[derive(Debug, Clone)]
pub struct AttitudeStabilizer {
    cfg: AttitudeCfg,
}

impl AttitudeStabilizer {
    pub fn new(cfg: AttitudeCfg) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &AttitudeCfg {
        &self.cfg
    }

    /// Up axis the body should have for the given command. Pitch tilts
    /// about the body right axis (positive noses down, towards forward) and
    /// roll about the body forward axis (positive banks towards right).
    pub fn desired_up(&self, state: &BodyState, cmd: &AttitudeCommand) -> Vector3<f32> {
        let max_bias = self.cfg.max_tilt_bias_deg.to_radians();
        let pitch = UnitQuaternion::from_axis_angle(
            &Unit::new_normalize(state.right()),
            cmd.pitch() * max_bias,
        );
        let roll = UnitQuaternion::from_axis_angle(
            &Unit::new_normalize(state.forward()),
            -cmd.roll() * max_bias,
        );
        pitch * roll * WORLD_UP
    }

    pub fn update(&self, state: &BodyState, cmd: &AttitudeCommand) -> AttitudeOutput {
        let up = state.up();
        let desired_up = self.desired_up(state, cmd);

        // The norm of the cross product is the sine of the error angle. It may
        // overshoot 1.0 slightly from rounding, which asin does not tolerate.
        let axis = up.cross(&desired_up);
        let sin = axis.norm().clamp(0.0, 1.0);
        let angle = sin.asin();

        let correction = if sin > ALIGNED_EPS {
            axis.unscale(axis.norm()) * (self.cfg.tilt_kp * angle)
        } else {
            Vector3::zeros()
        };

        // Split angular velocity into yaw (about own up) and roll/pitch parts
        let w = state.angular_velocity;
        let w_yaw = up * w.dot(&up);
        let w_perp = w - w_yaw;

        let max = self.cfg.max_level_torque;
        let tilt_torque = (correction - w_perp * self.cfg.tilt_kd).cap_magnitude(max);

        let yaw_scale = self
            .cfg
            .yaw_tilt_floor
            .map_or(1.0, |floor| angle.cos().max(floor));
        let yaw_torque = (-w_yaw * (self.cfg.yaw_damp * yaw_scale)).cap_magnitude(max);

        AttitudeOutput {
            torque: tilt_torque + yaw_torque,
            tilt_error: angle,
        }
    }
}
