use serde::{Deserialize, Serialize};

use crate::consts::ACTION_SIZE;
use crate::errors::HoverError;

/// Command surface of the flight controller. Written once per decision
/// step and read on every physics step until overwritten.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttitudeCommand {
    /// Roll and pitch bias in `[-1, 1]`, scaled by the maximum bias angle.
    pub tilt: [f32; 2],
    /// Vertical rate bias in `[-1, 1]`, scaled by the climb rate.
    pub climb: f32,
}

impl AttitudeCommand {
    pub fn new(roll: f32, pitch: f32, climb: f32) -> Self {
        Self {
            tilt: [roll.clamp(-1.0, 1.0), pitch.clamp(-1.0, 1.0)],
            climb: climb.clamp(-1.0, 1.0),
        }
    }

    pub fn roll(&self) -> f32 {
        self.tilt[0]
    }

    pub fn pitch(&self) -> f32 {
        self.tilt[1]
    }

    /// Return a copy with every component clamped to `[-1, 1]`.
    pub fn clamped(self) -> Self {
        Self::new(self.tilt[0], self.tilt[1], self.climb)
    }
}

/// Action vector from the RL runtime, in order roll, pitch and climb.
/// Each component is clamped to `[-1, 1]` on construction.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action(pub [f32; ACTION_SIZE]);

impl Action {
    pub fn new(roll: f32, pitch: f32, climb: f32) -> Self {
        Action([roll, pitch, climb].map(|x| x.clamp(-1.0, 1.0)))
    }

    pub fn roll(&self) -> f32 {
        self.0[0]
    }

    pub fn pitch(&self) -> f32 {
        self.0[1]
    }

    pub fn climb(&self) -> f32 {
        self.0[2]
    }
}

impl TryFrom<&[f32]> for Action {
    type Error = HoverError;

    /// A malformed action is a training bug on the caller's side, so it is
    /// rejected instead of being padded, truncated or sanitised.
    fn try_from(raw: &[f32]) -> Result<Self, Self::Error> {
        let raw: [f32; ACTION_SIZE] = raw.try_into().map_err(|_| HoverError::ActionShape {
            expected: ACTION_SIZE,
            actual: raw.len(),
        })?;

        if raw.iter().any(|x| !x.is_finite()) {
            return Err(HoverError::NonFiniteAction);
        }

        Ok(Action::new(raw[0], raw[1], raw[2]))
    }
}

impl From<Action> for AttitudeCommand {
    fn from(action: Action) -> Self {
        AttitudeCommand::new(action.roll(), action.pitch(), action.climb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_is_clamped() {
        let action = Action::try_from(&[2.0, -3.0, 0.5][..]).unwrap();
        assert_eq!(action, Action([1.0, -1.0, 0.5]));
    }

    #[test]
    fn action_wrong_shape_is_rejected() {
        let short = Action::try_from(&[0.0, 0.0][..]);
        assert!(matches!(
            short,
            Err(HoverError::ActionShape {
                expected: 3,
                actual: 2
            })
        ));

        let long = Action::try_from(&[0.0; 4][..]);
        assert!(matches!(long, Err(HoverError::ActionShape { actual: 4, .. })));
    }

    #[test]
    fn action_non_finite_is_rejected() {
        let nan = Action::try_from(&[0.0, f32::NAN, 0.0][..]);
        assert!(matches!(nan, Err(HoverError::NonFiniteAction)));
    }

    #[test]
    fn command_from_action() {
        let cmd = AttitudeCommand::from(Action::new(0.25, -0.5, 1.0));
        assert_eq!(cmd.roll(), 0.25);
        assert_eq!(cmd.pitch(), -0.5);
        assert_eq!(cmd.climb, 1.0);
    }
}
