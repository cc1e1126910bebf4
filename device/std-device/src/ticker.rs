use std::time::{Duration, Instant};

/// Paces a loop to a fixed period of wall-clock time.
pub struct Ticker {
    expires_at: Instant,
    duration: Duration,
}

impl Ticker {
    /// Creates a new ticker that ticks at the specified duration interval.
    pub fn every(duration: Duration) -> Self {
        let expires_at = Instant::now() + duration;
        Self {
            expires_at,
            duration,
        }
    }

    /// Resets the ticker back to its original state.
    /// This causes the ticker to go back to zero, even if the current tick isn't over yet.
    pub fn reset(&mut self) {
        self.expires_at = Instant::now() + self.duration;
    }

    /// Waits for the next tick. If the loop fell behind by more than a full
    /// period, the ticker catches up instead of firing a burst of ticks.
    pub fn next(&mut self) {
        let now = Instant::now();
        match self.expires_at.checked_duration_since(now) {
            Some(duration) => std::thread::sleep(duration),
            None if now - self.expires_at > self.duration => {
                log::trace!("Ticker fell behind by {:?}", now - self.expires_at);
                self.expires_at = now;
            }
            None => {}
        }

        self.expires_at += self.duration;
    }
}
