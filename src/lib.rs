//! Grid-world navigation by tabular Q-learning, with a shortest-path oracle
//! shaping the reward.

pub mod agent;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod policy;
pub mod reward;
pub mod rl;

pub use agent::QLearningAgent;
pub use config::TrainingConfig;
pub use diagnostics::DiagnosticsLog;
pub use environment::{Environment, MapSpec, Poller, SimulatedEnvironment};
pub use error::{Error, Result};
pub use grid::{Grid, GridGraph, Movement, Terrain};
pub use pathfinding::ShortestPathSolver;
pub use policy::GreedyPolicy;
pub use reward::{RewardConfig, RewardModel};
pub use rl::{EpisodeEnd, EpisodeSummary, Trainer, TrainingReport};
