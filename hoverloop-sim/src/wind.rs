use hoverloop::physics::AmbientForces;
use hoverloop::types::BodyState;
use nalgebra::Vector3;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};

use crate::lowpass::Lowpass;

/// Wind made of a steady component plus low-pass filtered gaussian gusts.
/// The force on the body is drag towards the relative air velocity.
#[derive(Debug, Clone)]
pub struct GustyWind {
    mean: Vector3<f32>,
    gust: [Normal<f32>; 3],
    dlpf: [Lowpass<f32>; 3],
    drag: f32,
    velocity: Vector3<f32>,
    rng: StdRng,
}

impl GustyWind {
    /// Wind blowing at `mean` [m/s] with gusts of standard deviation `gust`
    /// per axis, correlated over `gust_time` seconds. The drag coefficient
    /// is in N per m/s of relative air speed.
    pub fn new(
        mean: Vector3<f32>,
        gust: Vector3<f32>,
        gust_time: f32,
        drag: f32,
        seed: u64,
    ) -> Result<Self, NormalError> {
        Ok(Self {
            mean,
            gust: [
                Normal::new(0.0, gust.x)?,
                Normal::new(0.0, gust.y)?,
                Normal::new(0.0, gust.z)?,
            ],
            dlpf: [Lowpass::new(gust_time); 3],
            drag,
            velocity: mean,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Current air velocity [m/s]
    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }
}

impl AmbientForces for GustyWind {
    fn force(&mut self, state: &BodyState, _now: f32, dt: f32) -> Vector3<f32> {
        if dt > 0.0 {
            for i in 0..3 {
                // Filtered white noise loses variance by alpha / (2 - alpha)
                let alpha = self.dlpf[i].alpha(dt);
                let stretch = ((2.0 - alpha) / alpha).sqrt();
                let sample = self.gust[i].sample(&mut self.rng) * stretch;
                self.velocity[i] = self.mean[i] + self.dlpf[i].update(sample, dt);
            }
        }

        (self.velocity - state.linear_velocity) * self.drag
    }
}
