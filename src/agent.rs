use ndarray::{Array2, ArrayView1};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::Movement;

/// Tabular Q-learner over grid cells and the four movements.
///
/// Epsilon is not stored here; the caller owns the exploration schedule and
/// passes the current rate in.
pub struct QLearningAgent {
    q_table: Array2<f32>,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(states: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            q_table: Array2::zeros((states, Movement::COUNT)),
            rng,
        }
    }

    pub fn states(&self) -> usize {
        self.q_table.nrows()
    }

    pub fn q_table(&self) -> &Array2<f32> {
        &self.q_table
    }

    pub fn value(&self, state: usize, action: Movement) -> f32 {
        self.q_table[[state, action.index()]]
    }

    pub fn values(&self, state: usize) -> ArrayView1<'_, f32> {
        self.q_table.row(state)
    }

    pub fn max_value(&self, state: usize) -> f32 {
        self.values(state)
            .iter()
            .map(|&v| OrderedFloat(v))
            .max()
            .map_or(0.0, OrderedFloat::into_inner)
    }

    /// Highest-valued action; ties go to the earliest in `Movement::actions()`.
    pub fn greedy_action(&self, state: usize) -> Movement {
        let values = self.values(state);
        Movement::actions()
            .into_iter()
            .fold(Movement::North, |best, m| {
                if values[m.index()] > values[best.index()] {
                    m
                } else {
                    best
                }
            })
    }

    /// Epsilon-greedy choice. Exploration draws uniformly from all four actions.
    ///
    /// # Panics
    /// If `state` is outside the table.
    pub fn select_action(&mut self, state: usize, epsilon: f32) -> Movement {
        if epsilon > 0.0 && self.rng.gen::<f32>() < epsilon {
            return self.rng.gen::<Movement>();
        }
        self.greedy_action(state)
    }

    /// One temporal-difference step:
    /// Q(s,a) += lr * (r + discount * max_a' Q(s',a') - Q(s,a)).
    ///
    /// `next_state` is `None` when the move left the board; such transitions
    /// have no successor value. Returns the stored value.
    pub fn update(
        &mut self,
        state: usize,
        action: Movement,
        reward: f32,
        next_state: Option<usize>,
        learning_rate: f32,
        discount: f32,
    ) -> f32 {
        let next_max = next_state.map_or(0.0, |s| self.max_value(s));
        let old = self.q_table[[state, action.index()]];
        let new = old + learning_rate * (reward + discount * next_max - old);
        self.q_table[[state, action.index()]] = new;
        new
    }

    /// Linear decay clamped at zero.
    pub fn decay_epsilon(current: f32, step: f32) -> f32 {
        (current - step).max(0.0)
    }
}
