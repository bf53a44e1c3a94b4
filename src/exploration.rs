use rand::Rng;

use crate::assert_interval;

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a fixed epsilon threshold
///
/// Draws from a caller-provided randomness source so that policies can be
/// made deterministic in tests by seeding the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy with an exploration probability
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f64) -> Self {
        assert_interval!(epsilon, 0.0, 1.0);
        Self { epsilon }
    }

    /// Invoke epsilon greedy policy, exploring with probability `epsilon`
    pub fn choose(&self, rng: &mut impl Rng) -> Choice {
        if rng.gen::<f64>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Replace the exploration probability, e.g. when a driver anneals it
    /// between episodes
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn set_epsilon(&mut self, epsilon: f64) {
        assert_interval!(epsilon, 0.0, 1.0);
        self.epsilon = epsilon;
    }
}
