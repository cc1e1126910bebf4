use serde::{Deserialize, Serialize};

use crate::{
    physics_sim::{GroundParams, Obstacle, VehicleParams},
    Configuration,
};

pub fn load_from_file_path(path: &str) -> Result<Configuration, Box<dyn std::error::Error>> {
    let string = std::fs::read_to_string(path)?;
    load_from_str(&string)
}

pub fn load_from_str(string: &str) -> Result<Configuration, Box<dyn std::error::Error>> {
    let config: ToplevelConfig = toml::from_str(string)?;
    config.validate()?;
    Ok(config.into())
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct ToplevelConfig {
    #[serde(default)]
    vehicle: VehicleConfig,
    #[serde(default)]
    ground: GroundConfig,
    #[serde(default)]
    obstacles: Vec<ObstacleConfig>,
    #[serde(default)]
    wind: WindConfig,
}

impl ToplevelConfig {
    fn validate(&self) -> Result<(), String> {
        if self.vehicle.mass <= 0.0 {
            return Err(format!("vehicle.mass must be positive, got {}", self.vehicle.mass));
        }
        if self.vehicle.principal_inertia.iter().any(|i| *i <= 0.0) {
            return Err("vehicle.principal_inertia must be positive on every axis".into());
        }
        if self.wind.gust_time < 0.0 {
            return Err("wind.gust_time must not be negative".into());
        }
        for (i, o) in self.obstacles.iter().enumerate() {
            if o.min.iter().zip(&o.max).any(|(lo, hi)| lo > hi) {
                return Err(format!("obstacles[{i}]: min exceeds max"));
            }
        }
        Ok(())
    }
}

impl From<ToplevelConfig> for Configuration {
    fn from(config: ToplevelConfig) -> Self {
        Configuration {
            vehicle: VehicleParams {
                mass: config.vehicle.mass,
                principal_inertia: config.vehicle.principal_inertia.into(),
                lin_damp: config.vehicle.linear_damp,
                ang_damp: config.vehicle.angular_damp,
                radius: config.vehicle.radius,
            },
            ground: GroundParams {
                height: config.ground.height,
                restitution: config.ground.restitution,
                friction: config.ground.friction,
                min_impact_speed: config.ground.min_impact_speed,
            },
            obstacles: config
                .obstacles
                .iter()
                .map(|o| Obstacle::new(o.min, o.max))
                .collect(),
            wind: config.wind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// The total mass of the vehicle
    pub mass: f32,
    /// The angular inertia along the principal axes
    pub principal_inertia: [f32; 3],
    /// Linear velocity damping (air resistance)
    pub linear_damp: f32,
    /// Angular velocity damping (air resistance)
    pub angular_damp: f32,
    /// Radius of the collision sphere
    pub radius: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        let params = VehicleParams::default();
        Self {
            mass: params.mass,
            principal_inertia: params.principal_inertia.into(),
            linear_damp: params.lin_damp,
            angular_damp: params.ang_damp,
            radius: params.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub height: f32,
    pub restitution: f32,
    pub friction: f32,
    pub min_impact_speed: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        let params = GroundParams::default();
        Self {
            height: params.height,
            restitution: params.restitution,
            friction: params.friction,
            min_impact_speed: params.min_impact_speed,
        }
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleConfig {
    /// Label for the obstacle, only used for readability of the file
    #[serde(default)]
    pub name: String,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Configuration of the gusty wind. Any fields not defined leave the air calm.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Steady wind velocity [m/s]
    pub mean: [f32; 3],
    /// Standard deviation of the gusts per axis [m/s]
    pub gust: [f32; 3],
    /// Correlation time of the gusts [s]
    pub gust_time: f32,
    /// Drag per m/s of air speed relative to the vehicle [N s/m]
    pub drag: f32,
    pub seed: u64,
}
