use std::{collections::HashMap, fmt::Debug, hash::Hash, path::Path};

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::Result,
    exploration::{Choice, EpsilonGreedy},
    snapshot::Snapshot,
};

/// A trait for state and action types that can be used as keys in a [`HashMap`]
pub trait Key: Clone + Eq + Hash {}

impl<T> Key for T where T: Clone + Eq + Hash {}

/// A tabular Q-learning value table
///
/// Maps (state, action) pairs to scalar estimates of expected discounted
/// return, updated with the one-step Bellman rule and queried through an
/// epsilon-greedy policy. Entries are created lazily: a pair that no update
/// has touched reads as `0.0` without being stored.
///
/// The table is a passive component. A driver owns the loop: call
/// [`choose`](Self::choose), apply the action to the environment, observe the
/// reward and next state, then call [`learn`](Self::learn), once per
/// decision step.
///
/// ### Generics
/// - `S` - The state type, an opaque identifier supplied by the driver
/// - `A` - The action type, drawn from a fixed set given at construction
///     - Both are used as [`HashMap`] keys and so must be `Clone`, `Eq`, and `Hash`
pub struct ValueTable<S, A>
where
    S: Key,
    A: Key,
{
    values: HashMap<(S, A), f64>,
    actions: Vec<A>,
    policy: EpsilonGreedy,
    alpha: f64, // learning rate
    gamma: f64, // discount factor
    rng: StdRng,
}

impl<S, A> ValueTable<S, A>
where
    S: Key,
    A: Key,
{
    /// Initialize an empty table over a fixed action set
    ///
    /// ### Parameters
    /// - `actions` - The legal actions; the set is immutable for the lifetime of the table
    /// - `epsilon` - The exploration probability - must be in `[0,1]`
    /// - `alpha` - The learning rate - must be in `(0,1]`
    /// - `gamma` - The discount factor - must be in `[0,1]`
    ///
    /// **Panics** if `actions` is empty or a hyperparameter is outside its interval
    pub fn new(actions: Vec<A>, epsilon: f64, alpha: f64, gamma: f64) -> Self {
        assert!(!actions.is_empty(), "Action set must not be empty.");
        assert!(
            alpha > 0.0 && alpha <= 1.0,
            "Invalid value for `alpha`. Must be in the interval (0.0, 1.0].",
        );
        crate::assert_interval!(gamma, 0.0, 1.0);
        Self {
            values: HashMap::new(),
            actions,
            policy: EpsilonGreedy::new(epsilon),
            alpha,
            gamma,
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed the internal randomness source, making exploration and
    /// tie-breaking deterministic
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Get the stored estimate for a (state, action) pair, or `0.0` if the
    /// pair has never been updated
    ///
    /// A pure read: querying an absent pair does not create an entry.
    pub fn value(&self, state: &S, action: &A) -> f64 {
        self.values
            .get(&(state.clone(), action.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Choose an action for `state` under the epsilon-greedy policy
    pub fn choose(&mut self, state: &S) -> A {
        self.choose_with_value(state).0
    }

    /// Choose an action for `state`, paired with its estimate
    ///
    /// With probability epsilon the action is drawn uniformly from the action
    /// set, independent of any estimate, and paired with its own value.
    /// Otherwise every configured action is evaluated and one of the
    /// maximizers is drawn uniformly, paired with the shared maximum.
    /// Random tie resolution avoids a systematic bias toward whichever
    /// action happens to come first.
    ///
    /// Never mutates the table.
    pub fn choose_with_value(&mut self, state: &S) -> (A, f64) {
        match self.policy.choose(&mut self.rng) {
            Choice::Explore => {
                let action = self
                    .actions
                    .choose(&mut self.rng)
                    .expect("action set is non-empty")
                    .clone();
                let value = self.value(state, &action);
                (action, value)
            }
            Choice::Exploit => {
                let values = self
                    .actions
                    .iter()
                    .map(|a| self.value(state, a))
                    .collect::<Vec<_>>();
                let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let tied = self
                    .actions
                    .iter()
                    .zip(&values)
                    .filter(|&(_, &v)| v == best)
                    .map(|(a, _)| a)
                    .collect::<Vec<_>>();
                let action = (*tied
                    .choose(&mut self.rng)
                    .expect("action set is non-empty"))
                .clone();
                (action, best)
            }
        }
    }

    /// Update the estimate for `(state, action)` from an observed transition
    /// using the one-step Bellman rule:
    ///
    /// q = q + alpha * (reward + gamma * max<sub>a</sub> q(next_state, a) - q)
    ///
    /// The pair is materialized even when the computed change is zero.
    /// Estimates are applied unconditionally, with no clipping; degenerate
    /// reward streams can grow them without bound.
    pub fn learn(&mut self, state: S, action: A, reward: f64, next_state: &S) {
        let best_next = self
            .actions
            .iter()
            .map(|a| self.value(next_state, a))
            .fold(f64::NEG_INFINITY, f64::max);
        let current = self.value(&state, &action);
        let updated = current + self.alpha * (reward + self.gamma * best_next - current);
        debug!("updating estimate: {current} -> {updated} (reward {reward})");
        self.values.insert((state, action), updated);
    }

    /// The number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over every stored (state, action, value) entry
    pub fn entries(&self) -> impl Iterator<Item = (&S, &A, f64)> {
        self.values.iter().map(|((s, a), v)| (s, a, *v))
    }

    /// The configured action set
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Replace the exploration probability, e.g. when annealing it between
    /// episodes
    ///
    /// **Panics** if `epsilon` is not in the interval `[0,1]`
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.policy.set_epsilon(epsilon);
    }
}

impl<S, A> ValueTable<S, A>
where
    S: Key + Serialize + Debug,
    A: Key + Serialize + Debug,
{
    /// Persist the table to `<base>.msgpack` (the reloadable snapshot) and
    /// `<base>.csv` (a write-only human-readable export)
    pub fn save<P: AsRef<Path>>(&self, base: P) -> Result<()> {
        let entries = self
            .values
            .iter()
            .map(|((s, a), v)| (s.clone(), a.clone(), *v))
            .collect();
        Snapshot::new(entries).write(base.as_ref())
    }
}

impl<S, A> ValueTable<S, A>
where
    S: Key + DeserializeOwned,
    A: Key + DeserializeOwned,
{
    /// Replace the stored entries with the snapshot at `<base>.msgpack`
    ///
    /// On any failure the in-memory table is left unchanged; the caller
    /// decides whether to proceed from an empty table instead.
    pub fn load<P: AsRef<Path>>(&mut self, base: P) -> Result<()> {
        let snapshot = Snapshot::read(base.as_ref())?;
        self.values = snapshot
            .into_entries()
            .into_iter()
            .map(|(s, a, v)| ((s, a), v))
            .collect();
        Ok(())
    }
}
