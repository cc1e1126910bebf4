use serde::{Deserialize, Serialize};

use crate::controller::FlightConfig;
use crate::episode::EpisodeConfig;
use crate::errors::ConfigError;

/// Load and validate a configuration from a TOML file. Missing sections and
/// fields take their default values.
pub fn load_from_file_path(path: &str) -> Result<Config, ConfigError> {
    let string = std::fs::read_to_string(path)?;
    let config = load_from_str(&string)?;
    log::debug!("Loaded configuration from {path}");
    Ok(config)
}

pub fn load_from_str(string: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(string)?;
    config.validate()?;
    Ok(config)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub flight: FlightConfig,
    pub episode: EpisodeConfig,
    pub schedule: ScheduleCfg,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleCfg {
    /// Fixed time step of the physics update [s]
    pub physics_dt: f32,
    /// Number of physics steps per decision step
    pub decision_interval: u32,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            physics_dt: 0.02,
            decision_interval: 5,
        }
    }
}

impl ScheduleCfg {
    /// Time between two decision steps [s]
    pub fn decision_dt(&self) -> f32 {
        self.physics_dt * self.decision_interval as f32
    }
}

fn non_negative(param: &'static str, value: f32) -> Result<(), ConfigError> {
    match value >= 0.0 {
        true => Ok(()),
        false => Err(ConfigError::invalid(param, format!("must not be negative, got {value}"))),
    }
}

fn positive(param: &'static str, value: f32) -> Result<(), ConfigError> {
    match value > 0.0 {
        true => Ok(()),
        false => Err(ConfigError::invalid(param, format!("must be positive, got {value}"))),
    }
}

impl Config {
    /// Reject values the control loops and the episode logic cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Config {
            flight,
            episode,
            schedule,
        } = self;

        positive("schedule.physics_dt", schedule.physics_dt)?;
        if schedule.decision_interval == 0 {
            return Err(ConfigError::invalid(
                "schedule.decision_interval",
                "must be at least one physics step",
            ));
        }

        non_negative("flight.altitude.integral_clamp", flight.altitude.integral_clamp)?;
        non_negative("flight.altitude.max_extra_lift", flight.altitude.max_extra_lift)?;
        non_negative("flight.attitude.max_level_torque", flight.attitude.max_level_torque)?;
        non_negative("flight.attitude.max_tilt_bias_deg", flight.attitude.max_tilt_bias_deg)?;
        non_negative("flight.climb_rate", flight.climb_rate)?;
        positive("flight.gravity", flight.gravity)?;
        if flight.lift_points.is_empty() {
            log::warn!("No lift points configured, the flight controller will stay idle");
        }

        if !episode.spawn.is_valid() {
            return Err(ConfigError::invalid("episode.spawn", "min exceeds max"));
        }
        if episode.goals.is_empty() && !episode.goal_box.is_valid() {
            return Err(ConfigError::invalid("episode.goal_box", "min exceeds max"));
        }

        let term = &episode.termination;
        positive("episode.termination.success_radius", term.success_radius)?;
        positive("episode.termination.max_episode_time", term.max_episode_time)?;
        non_negative("episode.termination.stall_margin", term.stall_margin)?;
        non_negative("episode.termination.collision_cooldown", term.collision_cooldown)?;
        if let Some(stall_time) = term.stall_time {
            positive("episode.termination.stall_time", stall_time)?;
        }
        if term.success_tilt_deg > term.max_tilt_deg {
            return Err(ConfigError::invalid(
                "episode.termination.success_tilt_deg",
                "must not exceed max_tilt_deg",
            ));
        }
        if term.max_episode_time < schedule.decision_dt() {
            return Err(ConfigError::invalid(
                "episode.termination.max_episode_time",
                "shorter than a single decision step",
            ));
        }

        Ok(())
    }
}
