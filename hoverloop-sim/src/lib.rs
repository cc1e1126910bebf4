//! Physics for driving a `hoverloop` environment: the vehicle as a rapier
//! rigid body among a ground slab and box obstacles, and a gusty wind model.

pub mod config;
pub mod lowpass;
pub mod physics_sim;
pub mod wind;

use config::WindConfig;
use physics_sim::{GroundParams, Obstacle, SimBody, VehicleParams};
use wind::GustyWind;

#[derive(Debug, Clone, Default)]
pub struct Configuration {
    pub vehicle: VehicleParams,
    pub ground: GroundParams,
    pub obstacles: Vec<Obstacle>,
    pub wind: WindConfig,
}

/// Build the vehicle body and the wind described by `config`.
pub fn initialize(config: Configuration) -> Result<(SimBody, GustyWind), Box<dyn std::error::Error>> {
    let Configuration {
        vehicle,
        ground,
        obstacles,
        wind,
    } = config;

    log::debug!(
        "Simulating a {:.2} kg vehicle among {} obstacles",
        vehicle.mass,
        obstacles.len()
    );

    let body = SimBody::new(vehicle, ground, obstacles);
    let wind = GustyWind::new(
        wind.mean.into(),
        wind.gust.into(),
        wind.gust_time,
        wind.drag,
        wind.seed,
    )?;

    Ok((body, wind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoverloop::episode::goal::SampleBox;
    use hoverloop::{Config, EpisodeEnd, HoverEnv, RigidBody};

    fn hover_config() -> Config {
        let mut config = Config::default();
        config.episode.spawn = SampleBox::new([0.0, 2.0, 0.0], [0.0, 2.0, 0.0]);
        config.episode.random_yaw = false;
        config.episode.goals = vec![[0.0, 2.0, 20.0]];
        config.episode.termination.stall_time = None;
        config.episode.termination.max_episode_time = 5.0;
        config
    }

    #[test]
    fn controller_hovers_the_simulated_body() {
        let (body, wind) = initialize(Configuration::default()).unwrap();
        let mut env = HoverEnv::with_ambient(&hover_config(), body, wind).unwrap();
        env.reset();

        let end = loop {
            let transition = env.step(&[0.0; 3]).unwrap();
            if let Some(end) = transition.end {
                break end;
            }
        };

        assert_eq!(end, EpisodeEnd::Timeout);
        let state = env.body().state();
        assert!((state.position.y - 2.0).abs() < 0.1, "drifted to {}", state.position.y);
        assert!(state.tilt() < 0.05);
        assert_eq!(env.stats().collisions, 0);
    }

    #[test]
    fn forward_pitch_moves_towards_the_goal() {
        let (body, wind) = initialize(Configuration::default()).unwrap();
        let mut env = HoverEnv::with_ambient(&hover_config(), body, wind).unwrap();
        env.reset();

        let mut total = 0.0;
        for _ in 0..20 {
            let transition = env.step(&[0.0, 0.5, 0.0]).unwrap();
            total += transition.breakdown.progress;
        }

        let state = env.body().state();
        assert!(state.position.z > 0.5, "only reached z = {}", state.position.z);
        assert!(total > 0.0);
    }
}
