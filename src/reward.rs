use serde::{Deserialize, Serialize};

use crate::grid::{GridGraph, Terrain};
use crate::pathfinding::ShortestPathSolver;

/// Penalties applied on top of the distance-to-goal shaping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Charged for stepping into the void, off the board, or into a cell
    /// that has no route to the goal. Ends the episode.
    pub void_penalty: f32,
    /// Extra charge for entering hazardous terrain.
    pub hazard_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            void_penalty: 99.0,
            hazard_penalty: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub reward: f32,
    pub terminal: bool,
}

/// Scores a candidate transition by the negative remaining shortest
/// distance to the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardModel {
    config: RewardConfig,
}

impl RewardModel {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// `candidate` is `None` when the move left the board.
    pub fn evaluate(&self, graph: &GridGraph, candidate: Option<usize>, goal: usize) -> Outcome {
        let void = Outcome {
            reward: -self.config.void_penalty,
            terminal: true,
        };
        let Some(cell) = candidate else {
            return void;
        };
        let terrain = match graph.terrain(cell) {
            Some(t) if t.is_traversable() => t,
            _ => return void,
        };
        let remaining = match ShortestPathSolver::distance(graph, cell, goal) {
            Ok(hops) => hops as f32,
            Err(err) => {
                tracing::debug!(cell, goal, %err, "candidate cut off from goal");
                return void;
            }
        };

        match terrain {
            Terrain::Hazard => Outcome {
                reward: -remaining - self.config.hazard_penalty,
                terminal: false,
            },
            _ if cell == goal => Outcome {
                reward: -remaining,
                terminal: true,
            },
            _ => Outcome {
                reward: -remaining,
                terminal: false,
            },
        }
    }
}
