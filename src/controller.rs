use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;
use crate::filters::altitude_pid::{lift_per_point, AltitudePid, AltitudePidCfg};
use crate::filters::attitude_pd::{AttitudeCfg, AttitudeStabilizer};
use crate::types::{AttitudeCommand, RigidBody};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub altitude: AltitudePidCfg,
    pub attitude: AttitudeCfg,
    /// Vertical speed of the altitude target at full climb command [m/s]
    pub climb_rate: f32,
    /// Rotor positions in body coordinates [m]
    pub lift_points: Vec<[f32; 3]>,
    /// Center of mass set by the start sequence, in body coordinates [m]
    pub center_of_mass: [f32; 3],
    /// Magnitude of gravity used for the hover feed-forward [m/s^2]
    pub gravity: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            altitude: AltitudePidCfg::default(),
            attitude: AttitudeCfg::default(),
            climb_rate: 2.0,
            lift_points: vec![
                [0.25, 0.0, 0.25],
                [-0.25, 0.0, 0.25],
                [0.25, 0.0, -0.25],
                [-0.25, 0.0, -0.25],
            ],
            center_of_mass: [0.0, -0.1, 0.0],
            gravity: GRAVITY,
        }
    }
}

/// What the controller applied to the body on one physics step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlightOutput {
    pub target_y: f32,
    pub extra_lift: f32,
    pub lift_per_point: f32,
    pub torque: Vector3<f32>,
    pub tilt_error: f32,
}

/// Altitude and attitude stabilizer of the vehicle.
///
/// Every physics step the climb command moves the altitude target, the
/// altitude loop distributes lift over the lift points (along body up, at
/// their world positions) and the attitude loop applies a corrective torque.
/// Lift and attitude are coupled only through the rigid-body dynamics.
///
/// Until [`FlightController::start`] has run, or with no lift points, the
/// controller idles: it applies nothing and reports nothing.
#[derive(Debug, Clone)]
pub struct FlightController {
    altitude: AltitudePid,
    attitude: AttitudeStabilizer,
    climb_rate: f32,
    lift_points: Vec<Point3<f32>>,
    center_of_mass: Point3<f32>,
    gravity: f32,
    command: AttitudeCommand,
    ready: bool,
    idle: bool,
    last_output: Option<FlightOutput>,
}

impl FlightController {
    pub fn new(cfg: &FlightConfig) -> Self {
        Self {
            altitude: AltitudePid::new(cfg.altitude),
            attitude: AttitudeStabilizer::new(cfg.attitude),
            climb_rate: cfg.climb_rate,
            lift_points: cfg.lift_points.iter().map(|p| Point3::from(*p)).collect(),
            center_of_mass: Point3::from(cfg.center_of_mass),
            gravity: cfg.gravity,
            command: AttitudeCommand::default(),
            ready: false,
            idle: false,
            last_output: None,
        }
    }

    /// Start sequence: lower the center of mass for stability and hold the
    /// current height. The controller is idle until this has been called.
    pub fn start(&mut self, body: &mut impl RigidBody) {
        body.set_local_center_of_mass(self.center_of_mass);
        let y = body.state().position.y;
        self.altitude.set_target(y, y);
        self.command = AttitudeCommand::default();
        self.ready = true;
        log::debug!("Flight controller started, holding {y:.2} m");
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Target the height `target_y`, resetting the altitude loop memory.
    pub fn set_target(&mut self, target_y: f32, current_y: f32) {
        self.altitude.set_target(target_y, current_y);
    }

    /// Current altitude target [m], for telemetry.
    pub fn target_y(&self) -> f32 {
        self.altitude.target()
    }

    pub fn command(&self) -> &AttitudeCommand {
        &self.command
    }

    /// Overwrite the command surface. Components are clamped to `[-1, 1]`.
    pub fn set_command(&mut self, command: AttitudeCommand) {
        self.command = command.clamped();
    }

    /// Hold `current_y` with a neutral command, as at the start of an episode.
    pub fn reset(&mut self, current_y: f32) {
        self.altitude.set_target(current_y, current_y);
        self.command = AttitudeCommand::default();
        self.last_output = None;
    }

    /// Output of the last non-idle physics step.
    pub fn last_output(&self) -> Option<&FlightOutput> {
        self.last_output.as_ref()
    }

    pub fn lift_points(&self) -> &[Point3<f32>] {
        &self.lift_points
    }

    /// Run one physics step of `dt` seconds on `body`. Returns `None` when
    /// idle, in which case nothing is applied to the body.
    pub fn physics_step(&mut self, body: &mut impl RigidBody, dt: f32) -> Option<FlightOutput> {
        if !self.ready || self.lift_points.is_empty() || dt <= 0.0 {
            if !self.idle {
                log::warn!(
                    "Flight controller idle (started: {}, lift points: {}, dt: {dt})",
                    self.ready,
                    self.lift_points.len()
                );
                self.idle = true;
            }
            return None;
        }
        self.idle = false;

        let state = body.state();

        self.altitude
            .shift_target(self.command.climb * self.climb_rate * dt);
        let extra_lift = self.altitude.update(state.position.y, dt);
        let per_point = lift_per_point(state.mass, self.gravity, extra_lift, self.lift_points.len());

        let lift = state.up() * per_point;
        for point in &self.lift_points {
            body.add_force_at_point(lift, state.to_world_point(point));
        }

        let attitude = self.attitude.update(&state, &self.command);
        body.add_torque_accel(attitude.torque);

        let output = FlightOutput {
            target_y: self.altitude.target(),
            extra_lift,
            lift_per_point: per_point,
            torque: attitude.torque,
            tilt_error: attitude.tilt_error,
        };

        log::trace!(
            "target {:.3} extra {:.3} lift/pt {:.3} tilt {:.3}",
            output.target_y,
            output.extra_lift,
            output.lift_per_point,
            output.tilt_error
        );

        self.last_output = Some(output);
        Some(output)
    }
}
