use hoverloop::collision::CollisionTracker;
use hoverloop::consts::GRAVITY;
use hoverloop::physics::{AmbientForces, Integrator};
use hoverloop::types::{BodyState, RigidBody};
use nalgebra::{Isometry3, Matrix3, Point3, UnitQuaternion, Vector3};

use rapier3d::prelude::*;

/// Half extents of the ground slab in the horizontal directions and its thickness.
const GROUND_HALF_WIDTH: f32 = 500.0;
const GROUND_HALF_THICKNESS: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct VehicleParams {
    /// The total mass of the vehicle
    pub mass: f32,
    /// The angular inertia along the principal axes
    pub principal_inertia: Vector3<f32>,
    /// Linear velocity damping (air resistance)
    pub lin_damp: f32,
    /// Angular velocity damping (air resistance)
    pub ang_damp: f32,
    /// Radius of the collision sphere around the body origin
    pub radius: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            principal_inertia: Vector3::new(0.02, 0.04, 0.02),
            lin_damp: 0.1,
            ang_damp: 0.5,
            radius: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroundParams {
    /// Height of the ground surface
    pub height: f32,
    /// Restitution coefficient of the ground and obstacles
    pub restitution: f32,
    /// Coulomb friction coefficient of the ground and obstacles
    pub friction: f32,
    /// Contacts approaching slower than this are resting, not impacts [m/s]
    pub min_impact_speed: f32,
}

impl Default for GroundParams {
    fn default() -> Self {
        Self {
            height: 0.0,
            restitution: 0.2,
            friction: 0.5,
            min_impact_speed: 0.5,
        }
    }
}

/// Static axis-aligned box in the world.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Obstacle {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Obstacle {
    pub fn new(min: impl Into<Vector3<f32>>, max: impl Into<Vector3<f32>>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    fn collider(&self, ground: &GroundParams) -> Collider {
        let half = (self.max - self.min) / 2.0;
        ColliderBuilder::cuboid(half.x, half.y, half.z)
            .translation(self.min + half)
            .restitution(ground.restitution)
            .friction(ground.friction)
            .build()
    }
}

#[derive(Default)]
struct RapierPhys {
    gravity: Vector3<f32>,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl RapierPhys {
    fn step(&mut self, dt: f32) {
        let physics_hooks = ();
        let events = ();
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &physics_hooks,
            &events,
        )
    }
}

/// The vehicle as a single rapier rigid body with a ball collider, among a
/// ground slab and static boxes.
///
/// The body origin is the reference point of the pose. The linear velocity is
/// that of the center of mass.
pub struct SimBody {
    params: VehicleParams,
    ground: GroundParams,
    local_com: Point3<f32>,
    rb_handle: RigidBodyHandle,
    collider: ColliderHandle,
    torque_accel: Vector3<f32>,
    phys: RapierPhys,
}

impl SimBody {
    pub fn new(params: VehicleParams, ground: GroundParams, obstacles: Vec<Obstacle>) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let vehicle_rb = RigidBodyBuilder::dynamic()
            .linear_damping(params.lin_damp)
            .angular_damping(params.ang_damp)
            .ccd_enabled(true)
            .can_sleep(false)
            .build();

        let vehicle_collider = ColliderBuilder::ball(params.radius)
            .mass_properties(MassProperties::new(Point3::origin(), params.mass, params.principal_inertia))
            .restitution(ground.restitution)
            .friction(ground.friction)
            .build();

        let rb_handle = bodies.insert(vehicle_rb);
        let collider = colliders.insert_with_parent(vehicle_collider, rb_handle, &mut bodies);

        // Let the body hit the floor
        let floor = ColliderBuilder::cuboid(GROUND_HALF_WIDTH, GROUND_HALF_THICKNESS, GROUND_HALF_WIDTH)
            .translation(vector![0.0, ground.height - GROUND_HALF_THICKNESS, 0.0])
            .restitution(ground.restitution)
            .friction(ground.friction)
            .build();
        colliders.insert(floor);

        for obstacle in &obstacles {
            colliders.insert(obstacle.collider(&ground));
        }

        SimBody {
            params,
            ground,
            local_com: Point3::origin(),
            rb_handle,
            collider,
            torque_accel: Vector3::zeros(),
            phys: RapierPhys {
                bodies,
                colliders,
                gravity: vector![0.0, -GRAVITY, 0.0],
                ..RapierPhys::default()
            },
        }
    }

    /// Center of mass in world coordinates.
    pub fn world_com(&self) -> Vector3<f32> {
        let rb = &self.phys.bodies[self.rb_handle];
        rb.translation() + rb.rotation() * self.local_com.coords
    }

    fn world_inertia(&self) -> Matrix3<f32> {
        let rot = self.phys.bodies[self.rb_handle].rotation().to_rotation_matrix();
        rot.matrix() * Matrix3::from_diagonal(&self.params.principal_inertia) * rot.matrix().transpose()
    }

    /// Fastest approach speed towards any surface the vehicle is in contact
    /// with, given its velocity before the step.
    fn impact_speed(&self, prev_linvel: &Vector3<f32>) -> Option<f32> {
        self.phys
            .narrow_phase
            .contact_pairs_with(self.collider)
            .flat_map(|pair| {
                // Manifold normals point from the first collider towards the second
                let sign = if pair.collider1 == self.collider { 1.0 } else { -1.0 };
                pair.manifolds
                    .iter()
                    .filter(|manifold| !manifold.points.is_empty())
                    .map(move |manifold| sign * prev_linvel.dot(&manifold.data.normal))
            })
            .reduce(f32::max)
    }
}

impl RigidBody for SimBody {
    fn state(&self) -> BodyState {
        let rb = &self.phys.bodies[self.rb_handle];
        BodyState {
            position: *rb.translation(),
            rotation: *rb.rotation(),
            linear_velocity: *rb.linvel(),
            angular_velocity: *rb.angvel(),
            mass: self.params.mass,
        }
    }

    fn add_force_at_point(&mut self, force: Vector3<f32>, point: Point3<f32>) {
        let torque = (point.coords - self.world_com()).cross(&force);
        let rb = &mut self.phys.bodies[self.rb_handle];
        rb.add_force(force, true);
        rb.add_torque(torque, true);
    }

    fn add_torque_accel(&mut self, torque: Vector3<f32>) {
        self.torque_accel += torque;
    }

    fn set_pose(&mut self, position: Vector3<f32>, rotation: UnitQuaternion<f32>) {
        let rb = &mut self.phys.bodies[self.rb_handle];
        rb.set_position(Isometry3::from_parts(position.into(), rotation), true);
    }

    fn set_velocities(&mut self, linear: Vector3<f32>, angular: Vector3<f32>) {
        let rb = &mut self.phys.bodies[self.rb_handle];
        rb.set_linvel(linear, true);
        rb.set_angvel(angular, true);
    }

    fn set_local_center_of_mass(&mut self, com: Point3<f32>) {
        self.local_com = com;
        self.phys.colliders[self.collider].set_mass_properties(MassProperties::new(
            com,
            self.params.mass,
            self.params.principal_inertia,
        ));
        self.phys.bodies[self.rb_handle].recompute_mass_properties_from_colliders(&self.phys.colliders);
    }
}

impl Integrator for SimBody {
    fn integrate(&mut self, dt: f32, now: f32, ambient: &mut dyn AmbientForces, collisions: &mut CollisionTracker) {
        let ambient_force = ambient.force(&self.state(), now, dt);
        let torque = self.world_inertia() * self.torque_accel;
        self.torque_accel = Vector3::zeros();

        let rb = &mut self.phys.bodies[self.rb_handle];
        rb.add_force(ambient_force, true);
        rb.add_torque(torque, true);

        // Get velocity prior to simulation step
        let prev_linvel = *rb.linvel();

        self.phys.step(dt);

        let rb = &mut self.phys.bodies[self.rb_handle];
        rb.reset_forces(true);
        rb.reset_torques(true);

        if let Some(speed) = self.impact_speed(&prev_linvel) {
            if speed >= self.ground.min_impact_speed {
                log::trace!("Impact at {speed:.2} m/s");
                collisions.record_impact(speed, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hoverloop::physics::{CalmAir, ConstantForce};
    use hoverloop::types::WORLD_UP;

    const DT: f32 = 0.01;

    fn free_body(obstacles: Vec<Obstacle>) -> SimBody {
        let params = VehicleParams {
            lin_damp: 0.0,
            ang_damp: 0.0,
            ..Default::default()
        };
        let ground = GroundParams {
            height: -1000.0,
            ..Default::default()
        };
        SimBody::new(params, ground, obstacles)
    }

    #[test]
    fn free_fall() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);

        for i in 1..=100 {
            body.integrate(DT, i as f32 * DT, &mut CalmAir, &mut collisions);
        }

        assert_abs_diff_eq!(body.state().linear_velocity.y, -GRAVITY, epsilon = 1e-3);
        // Symplectic Euler overshoots the exact 4.905 m slightly
        assert!((body.state().position.y + 4.905).abs() < 0.06);
        assert!(collisions.pending().is_none());
    }

    #[test]
    fn hover_force_balances_gravity() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);

        for i in 1..=100 {
            body.add_force_at_point(WORLD_UP * GRAVITY, Point3::origin());
            body.integrate(DT, i as f32 * DT, &mut CalmAir, &mut collisions);
        }

        assert_abs_diff_eq!(body.state().position, Vector3::zeros(), epsilon = 1e-4);
    }

    #[test]
    fn off_center_force_spins_the_body() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);

        // Push up on the right side
        body.add_force_at_point(Vector3::new(0.0, 1.0, 0.0), Point3::new(0.5, 0.0, 0.0));
        body.integrate(DT, DT, &mut CalmAir, &mut collisions);

        assert!(body.state().angular_velocity.z > 0.0);
        assert_abs_diff_eq!(body.state().angular_velocity.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn forces_do_not_carry_over_between_steps() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);

        body.add_force_at_point(Vector3::new(1.0, 0.0, 0.0), Point3::origin());
        body.integrate(DT, DT, &mut CalmAir, &mut collisions);
        let after_push = body.state().linear_velocity.x;
        body.integrate(DT, 2.0 * DT, &mut CalmAir, &mut collisions);

        assert_abs_diff_eq!(body.state().linear_velocity.x, after_push, epsilon = 1e-6);
    }

    #[test]
    fn torque_accel_ignores_inertia() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);

        body.add_torque_accel(Vector3::new(2.0, 0.0, 0.0));
        body.integrate(DT, DT, &mut CalmAir, &mut collisions);

        assert_abs_diff_eq!(body.state().angular_velocity.x, 2.0 * DT, epsilon = 1e-5);
    }

    #[test]
    fn ambient_force_is_applied() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);
        let mut wind = ConstantForce(Vector3::new(1.0, GRAVITY, 0.0));

        for i in 1..=100 {
            body.integrate(DT, i as f32 * DT, &mut wind, &mut collisions);
        }

        assert_abs_diff_eq!(body.state().linear_velocity, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn ground_impact_is_reported() {
        let mut body = SimBody::new(VehicleParams::default(), GroundParams::default(), vec![]);
        let mut collisions = CollisionTracker::new(0.0);
        body.set_pose(Vector3::new(0.0, 0.35, 0.0), UnitQuaternion::identity());
        body.set_velocities(Vector3::new(0.0, -4.0, 0.0), Vector3::zeros());

        for i in 1..=10 {
            body.integrate(DT, i as f32 * DT, &mut CalmAir, &mut collisions);
        }

        let event = collisions.pending().copied().unwrap();
        assert!(event.impact_speed > 4.0);
        assert!(body.state().position.y > 0.25);
    }

    #[test]
    fn resting_contact_is_not_an_impact() {
        let mut body = SimBody::new(VehicleParams::default(), GroundParams::default(), vec![]);
        let mut collisions = CollisionTracker::new(0.0);
        body.set_pose(Vector3::new(0.0, 0.3, 0.0), UnitQuaternion::identity());

        for i in 1..=100 {
            body.integrate(DT, i as f32 * DT, &mut CalmAir, &mut collisions);
        }

        assert!(collisions.pending().is_none());
        assert_abs_diff_eq!(body.state().position.y, 0.3, epsilon = 1e-2);
    }

    #[test]
    fn bounces_off_obstacle() {
        let wall = Obstacle::new([-1.0, -1.0, 1.0], [1.0, 1.0, 2.0]);
        let mut body = free_body(vec![wall]);
        let mut collisions = CollisionTracker::new(0.0);
        let mut hover = ConstantForce(WORLD_UP * GRAVITY);
        body.set_velocities(Vector3::new(0.0, 0.0, 5.0), Vector3::zeros());

        for i in 1..=40 {
            body.integrate(DT, i as f32 * DT, &mut hover, &mut collisions);
        }

        assert!(collisions.pending().is_some_and(|e| e.impact_speed > 4.0));
        assert!(body.state().linear_velocity.z <= 1e-3);
        assert!(body.state().position.z < 0.75);
    }

    #[test]
    fn com_offset_keeps_origin_consistent() {
        let mut body = free_body(vec![]);
        let mut collisions = CollisionTracker::new(0.0);
        body.set_local_center_of_mass(Point3::new(0.0, -0.1, 0.0));
        body.set_pose(Vector3::new(0.0, 5.0, 0.0), UnitQuaternion::identity());

        body.add_force_at_point(WORLD_UP * GRAVITY, Point3::new(0.0, 5.0, 0.0));
        body.integrate(DT, DT, &mut CalmAir, &mut collisions);

        assert_abs_diff_eq!(body.world_com(), Vector3::new(0.0, 4.9, 0.0), epsilon = 1e-4);
        assert_abs_diff_eq!(body.state().position, Vector3::new(0.0, 5.0, 0.0), epsilon = 1e-4);
        assert_abs_diff_eq!(body.state().angular_velocity, Vector3::zeros(), epsilon = 1e-5);
    }
}
