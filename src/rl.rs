use crate::agent::QLearningAgent;
use crate::config::TrainingConfig;
use crate::diagnostics::{error_count, DiagnosticsLog};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::grid::{GridGraph, Movement};
use crate::pathfinding::{actions_from_path, ShortestPathSolver};
use crate::policy::{GreedyPolicy, Rollout};
use crate::reward::RewardModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    Terminal,
    StepLimitReached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub index: usize,
    pub steps: usize,
    pub total_reward: f32,
    pub actions: Vec<Movement>,
    pub end: EpisodeEnd,
    /// Set on terminal episodes that fall on the report interval.
    pub error_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub terminal_episodes: usize,
    pub final_epsilon: f32,
    pub total_reward: f32,
    /// Greedy walk on the last observed map.
    pub greedy: Option<Rollout>,
}

struct ObservedMap {
    graph: GridGraph,
    start: usize,
    goal: usize,
}

/// Drives episodes against an environment and owns everything that lives
/// for the whole run: the Q-table, epsilon, and the diagnostics.
pub struct Trainer {
    config: TrainingConfig,
    agent: QLearningAgent,
    reward_model: RewardModel,
    epsilon: f32,
    epsilon_step: f32,
    reference: Option<Vec<Movement>>,
    diagnostics: DiagnosticsLog,
    endpoints: Option<(usize, usize)>,
    last_map: Option<ObservedMap>,
}

impl Trainer {
    /// `states` fixes the Q-table height, which every observed grid must match.
    /// Without a `reference`, the first observed map's shortest route is used.
    pub fn new(config: TrainingConfig, states: usize, reference: Option<Vec<Movement>>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            agent: QLearningAgent::new(states, config.seed),
            reward_model: RewardModel::new(config.reward),
            epsilon: config.initial_epsilon,
            epsilon_step: config.epsilon_step(),
            reference,
            diagnostics: DiagnosticsLog::new(),
            endpoints: None,
            last_map: None,
            config,
        })
    }

    /// Pins the source and goal cells instead of reading them from the
    /// start and goal markers of each observed map.
    pub fn with_endpoints(mut self, start: usize, goal: usize) -> Self {
        self.endpoints = Some((start, goal));
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn diagnostics(&self) -> &DiagnosticsLog {
        &self.diagnostics
    }

    pub fn reference(&self) -> Option<&[Movement]> {
        self.reference.as_deref()
    }

    /// Runs all configured episodes.
    pub fn train<E: Environment>(&mut self, env: &mut E) -> Result<TrainingReport> {
        self.run(env, self.config.episodes)
    }

    pub fn run<E: Environment>(&mut self, env: &mut E, episodes: usize) -> Result<TrainingReport> {
        let mut terminal_episodes = 0;
        for index in 0..episodes {
            let summary = self.run_episode(env, index).inspect_err(|err| {
                tracing::error!(episode = index, %err, "aborting training run");
            })?;
            if summary.end == EpisodeEnd::Terminal {
                terminal_episodes += 1;
            }
            tracing::debug!(
                episode = index,
                steps = summary.steps,
                reward = summary.total_reward,
                epsilon = self.epsilon,
                "score over time: {:.3}",
                self.diagnostics.total_reward() / self.config.episodes as f32
            );
        }

        let report = TrainingReport {
            episodes,
            terminal_episodes,
            final_epsilon: self.epsilon,
            total_reward: self.diagnostics.total_reward(),
            greedy: self.greedy_rollout(),
        };
        if let Some(greedy) = &report.greedy {
            tracing::info!(
                reached_goal = greedy.reached_goal,
                length = greedy.actions.len(),
                "greedy route: {:?}",
                greedy.actions
            );
        }
        Ok(report)
    }

    /// Greedy walk over the most recently observed map.
    pub fn greedy_rollout(&self) -> Option<Rollout> {
        let map = self.last_map.as_ref()?;
        let policy = GreedyPolicy::from_agent(&self.agent);
        Some(policy.rollout(&map.graph, map.start, map.goal, self.config.max_steps))
    }

    pub fn run_episode<E: Environment>(&mut self, env: &mut E, index: usize) -> Result<EpisodeSummary> {
        env.start_episode(index)?;
        let floor = env.observe()?;
        let graph = GridGraph::new(&floor)?;
        if graph.len() != self.agent.states() {
            return Err(Error::InvalidGrid {
                message: format!(
                    "observed {} cells but the Q-table holds {} states",
                    graph.len(),
                    self.agent.states()
                ),
            });
        }
        let (start, goal) = match self.endpoints {
            Some((start, goal)) if start < graph.len() && goal < graph.len() => (start, goal),
            Some((start, goal)) => {
                return Err(Error::InvalidGrid {
                    message: format!("endpoints {start} and {goal} must lie within {} cells", graph.len()),
                })
            }
            None => graph.find_start_end()?,
        };

        let mut summary = EpisodeSummary {
            index,
            steps: 0,
            total_reward: 0.0,
            actions: Vec::new(),
            end: EpisodeEnd::StepLimitReached,
            error_count: None,
        };

        if start == goal {
            let action = self.agent.select_action(start, self.epsilon);
            self.agent
                .update(start, action, 0.0, Some(start), self.config.learning_rate, self.config.discount);
            summary.steps = 1;
            summary.end = EpisodeEnd::Terminal;
        } else {
            self.step_until_done(env, &graph, start, goal, &mut summary)?;
        }

        self.diagnostics.record_reward(summary.total_reward);
        if summary.end == EpisodeEnd::Terminal {
            self.epsilon = QLearningAgent::decay_epsilon(self.epsilon, self.epsilon_step);
            if index % self.config.report_interval == 0 {
                summary.error_count = self.report(&graph, start, goal, &summary);
            }
        }

        self.last_map = Some(ObservedMap { graph, start, goal });
        Ok(summary)
    }

    fn step_until_done<E: Environment>(
        &mut self,
        env: &mut E,
        graph: &GridGraph,
        start: usize,
        goal: usize,
        summary: &mut EpisodeSummary,
    ) -> Result<()> {
        let mut state = start;
        while summary.steps < self.config.max_steps {
            summary.steps += 1;

            let action = self.agent.select_action(state, self.epsilon);
            let candidate = graph.step(state, action);
            let outcome = self.reward_model.evaluate(graph, candidate, goal);
            self.agent.update(
                state,
                action,
                outcome.reward,
                candidate,
                self.config.learning_rate,
                self.config.discount,
            );
            summary.total_reward += outcome.reward;

            env.execute(action)?;
            summary.actions.push(action);
            tracing::trace!(state, ?candidate, %action, reward = outcome.reward, "step");

            if outcome.terminal {
                summary.end = EpisodeEnd::Terminal;
                return Ok(());
            }
            if let Some(next) = candidate {
                state = next;
            }
        }
        Ok(())
    }

    fn report(&mut self, graph: &GridGraph, start: usize, goal: usize, summary: &EpisodeSummary) -> Option<usize> {
        if self.reference.is_none() {
            match ShortestPathSolver::find_path(graph, start, goal) {
                Ok(path) => self.reference = Some(actions_from_path(graph, &path)),
                Err(err) => {
                    tracing::warn!(%err, "no reference route, skipping error count");
                    return None;
                }
            }
        }
        let reference = self.reference.as_deref()?;
        let count = error_count(&summary.actions, reference);
        self.diagnostics.record_error(summary.index, count);
        tracing::info!(
            episode = summary.index,
            path_length = summary.actions.len(),
            errors = count,
            "move list: {:?}",
            summary.actions
        );
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{MapSpec, SimulatedEnvironment};

    fn map(rows: &[&str], reference: Option<Vec<Movement>>) -> MapSpec {
        MapSpec {
            name: "test".to_string(),
            floor: rows
                .iter()
                .flat_map(|row| row.chars())
                .map(|c| {
                    match c {
                        '#' => "air",
                        'H' => "netherrack",
                        'S' => "emerald_block",
                        'G' => "redstone_block",
                        _ => "stone",
                    }
                    .to_string()
                })
                .collect(),
            reference,
        }
    }

    fn config() -> TrainingConfig {
        TrainingConfig::default()
            .with_episodes(20)
            .with_greedy_episodes(10)
            .with_seed(11)
    }

    #[test]
    fn void_move_ends_episode_with_penalty() {
        // greedy on a fresh table heads north, straight off the board
        let spec = map(&["S.G", "###", "###"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let mut trainer = Trainer::new(config().with_initial_epsilon(0.0), 9, None).unwrap();

        let summary = trainer.run_episode(&mut env, 1).unwrap();
        assert_eq!(summary.end, EpisodeEnd::Terminal);
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.total_reward, -99.0);
        assert_eq!(summary.actions, vec![Movement::North]);
        assert_eq!(env.commands(), &[Movement::North]);
        assert!((trainer.agent().value(0, Movement::North) + 0.9 * 99.0).abs() < 1e-4);
    }

    #[test]
    fn terminal_episode_decays_epsilon() {
        let spec = map(&["S.G", "###", "###"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let mut trainer = Trainer::new(config(), 9, None).unwrap();
        let before = trainer.epsilon();
        trainer.run_episode(&mut env, 1).unwrap();
        assert!((before - trainer.epsilon() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn unreachable_goal_skips_error_count() {
        // the start room is walled off from the goal by void
        let spec = map(&["S.#.", "..#.", "####", "...G"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let config = config().with_max_steps(5).with_initial_epsilon(0.0);
        let mut trainer = Trainer::new(config, 16, None).unwrap();

        let summary = trainer.run_episode(&mut env, 0).unwrap();
        assert_eq!(summary.end, EpisodeEnd::Terminal);
        assert_eq!(summary.error_count, None);
        assert!(trainer.reference().is_none());
        assert!(trainer.diagnostics().errors().is_empty());
    }

    #[test]
    fn step_limit_is_enforced() {
        // corridor long enough that five steps cannot reach the goal
        let mut rows = vec!["S......G"];
        rows.extend(["########"; 7]);
        let spec = map(&rows, None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let config = config().with_max_steps(5).with_initial_epsilon(0.0);
        let mut trainer = Trainer::new(config, 64, None).unwrap();
        // make east the preferred move everywhere in the corridor
        for cell in 0..8 {
            trainer.agent.update(cell, Movement::East, 1.0, None, 1.0, 0.0);
        }

        let epsilon = trainer.epsilon();
        let summary = trainer.run_episode(&mut env, 0).unwrap();
        assert_eq!(summary.end, EpisodeEnd::StepLimitReached);
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.actions, vec![Movement::East; 5]);
        assert_eq!(trainer.epsilon(), epsilon);
        assert!(trainer.diagnostics().errors().is_empty());
        assert_eq!(trainer.diagnostics().rewards().len(), 1);
        // remaining distances 6, 5, 4, 3, 2
        assert_eq!(summary.total_reward, -20.0);
    }

    #[test]
    fn start_on_goal_terminates_immediately() {
        let spec = map(&["S..", "...", "..G"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let mut trainer = Trainer::new(config(), 9, None)
            .unwrap()
            .with_endpoints(4, 4);

        let summary = trainer.run_episode(&mut env, 3).unwrap();
        assert_eq!(summary.end, EpisodeEnd::Terminal);
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.total_reward, 0.0);
        assert!(summary.actions.is_empty());
        assert!(env.commands().is_empty());
        assert!(trainer.agent().q_table().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn endpoints_outside_grid_are_rejected() {
        let spec = map(&["S..", "...", "..G"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let mut trainer = Trainer::new(config(), 9, None)
            .unwrap()
            .with_endpoints(0, 9);
        assert!(matches!(
            trainer.run_episode(&mut env, 0),
            Err(Error::InvalidGrid { .. })
        ));
    }

    #[test]
    fn report_uses_shortest_route_when_no_reference_given() {
        let spec = map(&["S.G", "###", "###"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let mut trainer = Trainer::new(config().with_initial_epsilon(0.0), 9, None).unwrap();
        let summary = trainer.run_episode(&mut env, 0).unwrap();
        assert_eq!(trainer.reference(), Some(&[Movement::East, Movement::East][..]));
        // took North instead of East, East
        assert_eq!(summary.error_count, Some(2));
        assert_eq!(trainer.diagnostics().errors(), &[(0, 2)]);
    }

    #[test]
    fn grid_size_must_match_table() {
        let spec = map(&["S.G", "###", "###"], None);
        let mut env = SimulatedEnvironment::new(&spec).unwrap();
        let mut trainer = Trainer::new(config(), 16, None).unwrap();
        assert!(matches!(
            trainer.run_episode(&mut env, 0),
            Err(Error::InvalidGrid { .. })
        ));
    }
}
