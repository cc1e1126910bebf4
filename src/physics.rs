//! Seams towards the physics integrator driving the vehicle body.

use nalgebra::Vector3;

use crate::collision::CollisionTracker;
use crate::types::BodyState;

/// Environment forces acting on the vehicle besides gravity and its own
/// lift, e.g. wind. Handed explicitly to the integrator on every step.
pub trait AmbientForces {
    /// Force [N] acting on a body in `state` at simulation time `now`, over
    /// the coming step of `dt` seconds.
    fn force(&mut self, state: &BodyState, now: f32, dt: f32) -> Vector3<f32>;
}

/// No ambient forces at all.
#[derive(Debug, Copy, Clone, Default)]
pub struct CalmAir;

impl AmbientForces for CalmAir {
    fn force(&mut self, _state: &BodyState, _now: f32, _dt: f32) -> Vector3<f32> {
        Vector3::zeros()
    }
}

/// A steady force, independent of the state of the body.
#[derive(Debug, Copy, Clone, Default)]
pub struct ConstantForce(pub Vector3<f32>);

impl AmbientForces for ConstantForce {
    fn force(&mut self, _state: &BodyState, _now: f32, _dt: f32) -> Vector3<f32> {
        self.0
    }
}

/// A physics integrator owning the vehicle body.
pub trait Integrator {
    /// Resolve the forces and torques accumulated since the last step and
    /// advance the body by `dt` seconds, ending at simulation time `now`.
    /// Impacts resolved during the step are reported to `collisions`.
    fn integrate(
        &mut self,
        dt: f32,
        now: f32,
        ambient: &mut dyn AmbientForces,
        collisions: &mut CollisionTracker,
    );
}
