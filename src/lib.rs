//! Altitude and attitude stabilization of a multirotor rigid body driven by
//! an external physics integrator, wrapped in an episodic environment for
//! reinforcement learning.
//!
//! The learner sets roll, pitch and climb biases once per decision step
//! through [`env::HoverEnv::step`]. On every physics step in between, the
//! [`controller::FlightController`] holds the commanded height and tilt.

pub mod collision;
pub mod config;
pub mod consts;
pub mod controller;
pub mod env;
pub mod episode;
pub mod errors;
pub mod filters;
pub mod physics;
pub mod schedule;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-exported for implementors
pub use nalgebra;

pub use config::Config;
pub use controller::{FlightConfig, FlightController, FlightOutput};
pub use env::{HoverEnv, Transition};
pub use episode::{EpisodeEnd, EpisodeManager};
pub use errors::{ConfigError, HoverError};
pub use physics::{AmbientForces, CalmAir, Integrator};
pub use types::{Action, AttitudeCommand, BodyState, Observation, RigidBody};
