use serde::{Deserialize, Serialize};

/// Gains and limits of the altitude loop.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltitudePidCfg {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// The accumulated integral is clamped to `±integral_clamp`.
    pub integral_clamp: f32,
    /// The extra force is clamped to `±max_extra_lift` [N].
    pub max_extra_lift: f32,
}

impl Default for AltitudePidCfg {
    fn default() -> Self {
        Self {
            kp: 8.0,
            ki: 1.5,
            kd: 4.0,
            integral_clamp: 4.0,
            max_extra_lift: 15.0,
        }
    }
}

/// The individual terms of the last update, kept for telemetry.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PidTerms {
    pub p: f32,
    pub i: f32,
    pub d: f32,
}

/// PID controller holding the vehicle at a target height.
///
/// The derivative acts on the error signal, and the integral is bounded by
/// clamping the accumulated value rather than by conditional integration.
/// Re-targeting through [`AltitudePid::set_target`] re-bases the derivative
/// memory on the current height, so a target jump does not produce a kick.
#[derive(Debug, Clone)]
pub struct AltitudePid {
    cfg: AltitudePidCfg,
    target: f32,
    integral: f32,
    prev_error: Option<f32>,
    terms: PidTerms,
}

impl AltitudePid {
    #[must_use]
    pub fn new(cfg: AltitudePidCfg) -> Self {
        Self {
            cfg,
            target: 0.0,
            integral: 0.0,
            prev_error: None,
            terms: PidTerms::default(),
        }
    }

    pub fn config(&self) -> &AltitudePidCfg {
        &self.cfg
    }

    /// Set a new target height, resetting the integral and the derivative
    /// memory against the `current` height.
    pub fn set_target(&mut self, target: f32, current: f32) {
        self.target = target;
        self.integral = 0.0;
        self.prev_error = Some(target - current);
        self.terms = PidTerms::default();
    }

    /// Move the target by `delta` without touching the loop memory. Used for
    /// the continuous climb command, which must not reset the integral.
    pub fn shift_target(&mut self, delta: f32) {
        self.target += delta;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn terms(&self) -> PidTerms {
        self.terms
    }

    /// Compute the extra lift [N] for the `current` height over time step `dt`.
    pub fn update(&mut self, current: f32, dt: f32) -> f32 {
        let error = self.target - current;

        let clamp = self.cfg.integral_clamp;
        self.integral = (self.integral + error * dt).clamp(-clamp, clamp);

        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.prev_error = Some(error);

        self.terms = PidTerms {
            p: self.cfg.kp * error,
            i: self.cfg.ki * self.integral,
            d: self.cfg.kd * derivative,
        };

        let limit = self.cfg.max_extra_lift;
        (self.terms.p + self.terms.i + self.terms.d).clamp(-limit, limit)
    }
}

/// Total lift for holding `mass` against `gravity` plus `extra`, split evenly
/// across `points` lift points. A lift point can only push, so the share is
/// never negative.
pub fn lift_per_point(mass: f32, gravity: f32, extra: f32, points: usize) -> f32 {
    if points == 0 {
        return 0.0;
    }
    (mass * gravity + extra).max(0.0) / points as f32
}
