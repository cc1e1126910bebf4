use num_traits::Float;

/// First order low-pass filter with time constant `tau`. The sample time is
/// given on every update, so the filter follows a variable step size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lowpass<T: Float> {
    tau: T,
    y: T,
}

impl<T: Float> Lowpass<T> {
    pub fn new(tau: T) -> Self {
        Self { tau, y: T::zero() }
    }

    /// Weight of a new sample taken `dt` after the previous one.
    pub fn alpha(&self, dt: T) -> T {
        dt / (self.tau + dt)
    }

    pub fn value(&self) -> T {
        self.y
    }

    pub fn update(&mut self, x: T, dt: T) -> T {
        let alpha = self.alpha(dt);
        self.y = self.y + alpha * (x - self.y);
        self.y
    }
}
