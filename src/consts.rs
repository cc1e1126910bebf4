/// The gravitational constant [m/s^2]
pub const GRAVITY: f32 = 9.81;

/// Number of scalars in an [`crate::types::Observation`]
pub const OBS_SIZE: usize = 13;

/// Number of scalars in an [`crate::types::Action`]: roll, pitch and climb
pub const ACTION_SIZE: usize = 3;
