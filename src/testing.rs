//! Test doubles shared by the unit tests.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::collision::CollisionTracker;
use crate::consts::GRAVITY;
use crate::physics::{AmbientForces, Integrator};
use crate::types::{BodyState, RigidBody, WORLD_UP};

/// A body which records everything applied to it but never moves.
#[derive(Debug, Clone, Default)]
pub struct FrozenBody {
    pub state: BodyState,
    pub forces: Vec<(Vector3<f32>, Point3<f32>)>,
    pub torques: Vec<Vector3<f32>>,
    pub center_of_mass: Option<Point3<f32>>,
}

impl FrozenBody {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            state: BodyState {
                position,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl RigidBody for FrozenBody {
    fn state(&self) -> BodyState {
        self.state
    }

    fn add_force_at_point(&mut self, force: Vector3<f32>, point: Point3<f32>) {
        self.forces.push((force, point));
    }

    fn add_torque_accel(&mut self, torque: Vector3<f32>) {
        self.torques.push(torque);
    }

    fn set_pose(&mut self, position: Vector3<f32>, rotation: UnitQuaternion<f32>) {
        self.state.position = position;
        self.state.rotation = rotation;
    }

    fn set_velocities(&mut self, linear: Vector3<f32>, angular: Vector3<f32>) {
        self.state.linear_velocity = linear;
        self.state.angular_velocity = angular;
    }

    fn set_local_center_of_mass(&mut self, com: Point3<f32>) {
        self.center_of_mass = Some(com);
    }
}

/// A body which translates under the applied forces and gravity, but never
/// rotates. The ground plane sits at `y = 0` and reports impacts.
#[derive(Debug, Clone, Default)]
pub struct PointMass {
    pub state: BodyState,
    pub force: Vector3<f32>,
    pub torque: Vector3<f32>,
}

impl RigidBody for PointMass {
    fn state(&self) -> BodyState {
        self.state
    }

    fn add_force_at_point(&mut self, force: Vector3<f32>, _point: Point3<f32>) {
        self.force += force;
    }

    fn add_torque_accel(&mut self, torque: Vector3<f32>) {
        self.torque += torque;
    }

    fn set_pose(&mut self, position: Vector3<f32>, rotation: UnitQuaternion<f32>) {
        self.state.position = position;
        self.state.rotation = rotation;
    }

    fn set_velocities(&mut self, linear: Vector3<f32>, angular: Vector3<f32>) {
        self.state.linear_velocity = linear;
        self.state.angular_velocity = angular;
    }

    fn set_local_center_of_mass(&mut self, _com: Point3<f32>) {}
}

impl Integrator for PointMass {
    fn integrate(
        &mut self,
        dt: f32,
        now: f32,
        ambient: &mut dyn AmbientForces,
        collisions: &mut CollisionTracker,
    ) {
        let mass = self.state.mass;
        let force = self.force + ambient.force(&self.state, now, dt) - WORLD_UP * GRAVITY * mass;

        self.state.linear_velocity += force / mass * dt;
        self.state.position += self.state.linear_velocity * dt;

        if self.state.position.y < 0.0 {
            collisions.record_impact(self.state.linear_velocity.y, now);
            self.state.position.y = 0.0;
            self.state.linear_velocity.y = 0.0;
        }

        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }
}
