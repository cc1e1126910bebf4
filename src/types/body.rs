use nalgebra::{Point3, UnitQuaternion, Vector3};

/// World up. The world is y-up; the body frame is x-right, y-up, z-forward.
pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Snapshot of the rigid body, as last resolved by the physics integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Position of the body origin in the world frame [m]
    pub position: Vector3<f32>,
    /// Orientation of the body relative to the world frame
    pub rotation: UnitQuaternion<f32>,
    /// Linear velocity in the world frame [m/s]
    pub linear_velocity: Vector3<f32>,
    /// Angular velocity in the world frame [rad/s]
    pub angular_velocity: Vector3<f32>,
    /// Total mass of the body [kg]
    pub mass: f32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass: 1.0,
        }
    }
}

impl BodyState {
    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rotation * Vector3::x()
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    /// Express a world-frame vector in the body frame.
    pub fn to_body(&self, world: &Vector3<f32>) -> Vector3<f32> {
        self.rotation.inverse_transform_vector(world)
    }

    /// World position of a point given in body coordinates.
    pub fn to_world_point(&self, local: &Point3<f32>) -> Point3<f32> {
        Point3::from(self.position + self.rotation * local.coords)
    }

    pub fn speed(&self) -> f32 {
        self.linear_velocity.norm()
    }

    /// Angle between the body up axis and world up [rad].
    pub fn tilt(&self) -> f32 {
        self.up().dot(&WORLD_UP).clamp(-1.0, 1.0).acos()
    }
}

/// Handle to the vehicle body inside an external physics integrator.
///
/// Forces and torques are accumulated by the integrator and resolved on its
/// next step. The controller never replaces the state wholesale; only the
/// episode reset is allowed to teleport the body.
pub trait RigidBody {
    fn state(&self) -> BodyState;

    /// Apply a continuous force [N] at a point in world coordinates.
    fn add_force_at_point(&mut self, force: Vector3<f32>, point: Point3<f32>);

    /// Apply a continuous torque in acceleration mode [rad/s^2], i.e.
    /// independent of the mass and inertia of the body.
    fn add_torque_accel(&mut self, torque: Vector3<f32>);

    fn set_pose(&mut self, position: Vector3<f32>, rotation: UnitQuaternion<f32>);

    fn set_velocities(&mut self, linear: Vector3<f32>, angular: Vector3<f32>);

    /// Move the center of mass to `com`, given in body coordinates.
    fn set_local_center_of_mass(&mut self, com: Point3<f32>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn axes_follow_rotation() {
        let state = BodyState {
            rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
            ..Default::default()
        };

        // Yawing a quarter turn about up swings forward onto +x
        assert_abs_diff_eq!(state.forward(), Vector3::x(), epsilon = 1e-6);
        assert_abs_diff_eq!(state.up(), WORLD_UP, epsilon = 1e-6);
        assert_abs_diff_eq!(state.tilt(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn body_frame_roundtrip_of_forward() {
        let state = BodyState {
            rotation: UnitQuaternion::from_euler_angles(0.3, -0.7, 1.1),
            ..Default::default()
        };
        assert_abs_diff_eq!(state.to_body(&state.forward()), Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn tilt_of_rolled_body() {
        let state = BodyState {
            rotation: UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.4),
            ..Default::default()
        };
        assert_abs_diff_eq!(state.tilt(), 0.4, epsilon = 1e-4);
    }

    #[test]
    fn world_point_includes_rotation() {
        let state = BodyState {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2),
            ..Default::default()
        };
        let p = state.to_world_point(&Point3::new(0.0, 0.0, 1.0));
        assert_abs_diff_eq!(p, Point3::new(2.0, 2.0, 3.0), epsilon = 1e-6);
    }
}
