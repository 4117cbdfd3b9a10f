//! Per-episode training diagnostics and their plain-text dumps.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::error::{Error, Result};
use crate::grid::Movement;

/// Mismatches between the moves taken and a reference sequence.
///
/// Every position that differs counts once, as does every position where one
/// sequence runs longer than the other.
pub fn error_count(actions: &[Movement], reference: &[Movement]) -> usize {
    let mismatched = actions
        .iter()
        .zip(reference)
        .filter(|(taken, expected)| taken != expected)
        .count();
    mismatched + actions.len().abs_diff(reference.len())
}

/// Append-only record of training progress.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsLog {
    errors: Vec<(usize, usize)>,
    rewards: Vec<f32>,
}

impl DiagnosticsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, episode: usize, count: usize) {
        self.errors.push((episode, count));
    }

    pub fn record_reward(&mut self, total: f32) {
        self.rewards.push(total);
    }

    pub fn errors(&self) -> &[(usize, usize)] {
        &self.errors
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn last_error_count(&self) -> Option<usize> {
        self.errors.last().map(|&(_, count)| count)
    }

    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Writes `QLearning_<map>_stats.dat` and `QLearning_<map>_rewards.dat`
    /// into `dir` and returns their paths.
    pub fn write(&self, dir: &Path, map_name: &str) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)
            .map_err(|e| Error::io(format!("create {}", dir.display()), e))?;

        let stats_path = dir.join(format!("QLearning_{map_name}_stats.dat"));
        let mut stats = WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_path(&stats_path)?;
        for &(episode, count) in &self.errors {
            stats.serialize((episode, count))?;
        }
        stats
            .flush()
            .map_err(|e| Error::io(format!("flush {}", stats_path.display()), e))?;

        let rewards_path = dir.join(format!("QLearning_{map_name}_rewards.dat"));
        let mut rewards = WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_path(&rewards_path)?;
        for &reward in &self.rewards {
            rewards.serialize((reward,))?;
        }
        rewards
            .flush()
            .map_err(|e| Error::io(format!("flush {}", rewards_path.display()), e))?;

        tracing::info!(
            stats = %stats_path.display(),
            rewards = %rewards_path.display(),
            "wrote diagnostics"
        );
        Ok((stats_path, rewards_path))
    }
}
