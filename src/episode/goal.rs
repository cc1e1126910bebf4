use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Axis-aligned box that positions are sampled from uniformly.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl SampleBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// True if `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.iter().zip(&self.max).all(|(lo, hi)| lo <= hi)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Vector3<f32> {
        Vector3::from_fn(|i, _| rng.random_range(self.min[i]..=self.max[i]))
    }

    pub fn contains(&self, p: &Vector3<f32>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

/// Source of the goal for each new episode.
pub trait GoalProvider {
    fn next_goal(&mut self, rng: &mut StdRng) -> Vector3<f32>;
}

/// Cycles through an ordered list of waypoints, wrapping around at the end.
/// With no waypoints, goals are drawn from the fallback box instead.
#[derive(Debug, Clone)]
pub struct GoalSelector {
    waypoints: Vec<Vector3<f32>>,
    next: usize,
    fallback: SampleBox,
}

impl GoalSelector {
    pub fn new(waypoints: &[[f32; 3]], fallback: SampleBox) -> Self {
        Self {
            waypoints: waypoints.iter().map(|w| Vector3::from(*w)).collect(),
            next: 0,
            fallback,
        }
    }

    pub fn waypoints(&self) -> &[Vector3<f32>] {
        &self.waypoints
    }
}

impl GoalProvider for GoalSelector {
    fn next_goal(&mut self, rng: &mut StdRng) -> Vector3<f32> {
        match self.waypoints.get(self.next) {
            Some(goal) => {
                self.next = (self.next + 1) % self.waypoints.len();
                *goal
            }
            None => self.fallback.sample(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn fallback() -> SampleBox {
        SampleBox::new([-1.0, 2.0, -1.0], [1.0, 4.0, 1.0])
    }

    #[test]
    fn waypoints_wrap_in_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut goals = GoalSelector::new(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], fallback());

        let xs: Vec<f32> = (0..5).map(|_| goals.next_goal(&mut rng).x).collect();
        assert_eq!(xs, [1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn random_goal_without_waypoints() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut goals = GoalSelector::new(&[], fallback());

        for _ in 0..100 {
            let goal = goals.next_goal(&mut rng);
            assert!(fallback().contains(&goal));
        }
    }

    #[test]
    fn degenerate_box_samples_its_point() {
        let mut rng = StdRng::seed_from_u64(1);
        let point = SampleBox::new([1.0, 2.0, 3.0], [1.0, 2.0, 3.0]);
        assert_eq!(point.sample(&mut rng), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn inverted_box_is_invalid() {
        assert!(fallback().is_valid());
        assert!(!SampleBox::new([0.0, 1.0, 0.0], [1.0, 0.0, 1.0]).is_valid());
    }
}
