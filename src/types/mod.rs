pub mod body;
pub mod control;
pub mod observation;

pub use body::{BodyState, RigidBody, WORLD_UP};
pub use control::{Action, AttitudeCommand};
pub use observation::Observation;
