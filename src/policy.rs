use crate::agent::QLearningAgent;
use crate::grid::{GridGraph, Movement};

// Represents deterministic policy
pub struct GreedyPolicy {
    pub policy: Vec<Movement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    pub path: Vec<usize>,
    pub actions: Vec<Movement>,
    pub reached_goal: bool,
}

impl GreedyPolicy {
    pub fn from_agent(agent: &QLearningAgent) -> Self {
        Self {
            policy: (0..agent.states()).map(|s| agent.greedy_action(s)).collect(),
        }
    }

    pub fn action(&self, state: usize) -> Option<Movement> {
        self.policy.get(state).copied()
    }

    /// Follows the policy from `start` until the goal, a void cell, the
    /// board edge, or `max_steps` moves.
    pub fn rollout(&self, graph: &GridGraph, start: usize, goal: usize, max_steps: usize) -> Rollout {
        let mut path = vec![start];
        let mut actions = Vec::new();
        let mut current = start;

        while current != goal && actions.len() < max_steps {
            let Some(movement) = self.action(current) else {
                break;
            };
            actions.push(movement);
            match graph.step(current, movement) {
                Some(next) if graph.is_traversable(next) => {
                    path.push(next);
                    current = next;
                }
                _ => break,
            }
        }

        Rollout {
            path,
            actions,
            reached_goal: current == goal,
        }
    }
}
