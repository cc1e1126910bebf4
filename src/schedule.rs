use crate::config::ScheduleCfg;

/// Fixed-rate update cadence: a physics step every `physics_dt` seconds and
/// a decision step after every `decision_interval` physics steps.
#[derive(Debug, Clone)]
pub struct Schedule {
    physics_dt: f32,
    decision_interval: u32,
    ticks: u64,
}

impl Schedule {
    pub fn new(cfg: &ScheduleCfg) -> Self {
        Self {
            physics_dt: cfg.physics_dt,
            decision_interval: cfg.decision_interval.max(1),
            ticks: 0,
        }
    }

    pub fn physics_dt(&self) -> f32 {
        self.physics_dt
    }

    pub fn decision_interval(&self) -> u32 {
        self.decision_interval
    }

    pub fn decision_dt(&self) -> f32 {
        self.physics_dt * self.decision_interval as f32
    }

    /// Number of physics steps taken since the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulation time since the last reset [s]
    pub fn now(&self) -> f32 {
        self.ticks as f32 * self.physics_dt
    }

    /// Account for one physics step. Returns true when a decision step is due.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        self.ticks % self.decision_interval as u64 == 0
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn decision_every_interval() {
        let mut schedule = Schedule::new(&ScheduleCfg {
            physics_dt: 0.01,
            decision_interval: 4,
        });

        let due: Vec<bool> = (0..8).map(|_| schedule.tick()).collect();
        assert_eq!(due, [false, false, false, true, false, false, false, true]);
        assert_abs_diff_eq!(schedule.now(), 0.08, epsilon = 1e-6);
        assert_abs_diff_eq!(schedule.decision_dt(), 0.04, epsilon = 1e-7);

        schedule.reset();
        assert_eq!(schedule.ticks(), 0);
        assert_eq!(schedule.now(), 0.0);
    }

    #[test]
    fn interval_of_one_decides_every_step() {
        let mut schedule = Schedule::new(&ScheduleCfg {
            physics_dt: 0.02,
            decision_interval: 1,
        });
        assert!(schedule.tick());
        assert!(schedule.tick());
    }
}
