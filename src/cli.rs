//! Command-line front end for training runs.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::TrainingConfig;
use crate::environment::{MapSpec, Poller, SimulatedEnvironment};
use crate::rl::{Trainer, TrainingReport};

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Map file: JSON with `name`, `floor` (or `floorAll`) and optional `reference`
    #[arg(long)]
    pub map: PathBuf,

    /// JSON training configuration; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Trailing episodes run without exploration
    #[arg(long)]
    pub greedy_episodes: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for the stats and rewards dumps
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Delay between polls of the simulated world, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub poll_delay_ms: u64,

    /// Run a single episode
    #[arg(long)]
    pub test: bool,
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub report: TrainingReport,
    pub stats_path: PathBuf,
    pub rewards_path: PathBuf,
}

pub fn execute(args: TrainArgs) -> Result<TrainOutcome> {
    let map = MapSpec::from_json_file(&args.map)
        .with_context(|| format!("loading map {}", args.map.display()))?;

    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    if let Some(episodes) = args.episodes {
        config.episodes = episodes;
    }
    if let Some(greedy) = args.greedy_episodes {
        config.greedy_episodes = greedy;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let poller = Poller::new(Duration::from_millis(args.poll_delay_ms), None);
    let mut env = SimulatedEnvironment::new(&map)?.with_poller(poller);
    let mut trainer = Trainer::new(config, map.floor.len(), map.reference.clone())?;

    let episodes = if args.test { 1 } else { trainer.config().episodes };
    tracing::info!(map = %map.name, episodes, "starting training");
    let report = trainer.run(&mut env, episodes)?;

    let (stats_path, rewards_path) = trainer
        .diagnostics()
        .write(&args.output_dir, &map.name)?;

    Ok(TrainOutcome {
        report,
        stats_path,
        rewards_path,
    })
}
