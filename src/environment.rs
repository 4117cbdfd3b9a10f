//! The world the agent acts in, seen only through observations and commands.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{Grid, GridGraph, Movement};

/// Boundary to the simulation backend.
///
/// Any `Err` returned here is fatal for the run; retries belong inside the
/// implementation.
pub trait Environment {
    /// Starts a fresh session for `episode` and blocks until it is running.
    fn start_episode(&mut self, episode: usize) -> Result<()>;

    /// Blocks until the terrain snapshot for the current episode is available.
    fn observe(&mut self) -> Result<Grid>;

    fn execute(&mut self, movement: Movement) -> Result<()>;
}

/// Blocking poll with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poller {
    pub retry_delay: Duration,
    /// `None` polls until the attempt yields a value or an error.
    pub max_attempts: Option<usize>,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

impl Poller {
    pub fn new(retry_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            retry_delay,
            max_attempts,
        }
    }

    pub fn poll<T, F>(&self, what: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        let mut attempts = 0;
        loop {
            if let Some(value) = attempt()? {
                return Ok(value);
            }
            attempts += 1;
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(Error::environment(format!(
                    "gave up waiting for {what} after {attempts} attempts"
                )));
            }
            tracing::trace!(what, attempts, "not ready, retrying");
            thread::sleep(self.retry_delay);
        }
    }
}

/// A map as delivered by the world: the flat floor observation plus an
/// optional reference route used for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    pub name: String,
    #[serde(alias = "floorAll")]
    pub floor: Vec<String>,
    #[serde(default)]
    pub reference: Option<Vec<Movement>>,
}

impl MapSpec {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("read map {}", path.display()), e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// In-process stand-in for the simulation backend.
///
/// Tracks where the agent would be after each command and records the
/// commands it receives. Session start and observations can be made to lag
/// behind by a number of polls.
pub struct SimulatedEnvironment {
    floor: Grid,
    graph: GridGraph,
    start: usize,
    position: Option<usize>,
    startup_delay: usize,
    observation_delay: usize,
    pending_polls: usize,
    poller: Poller,
    commands: Vec<Movement>,
    episodes_started: usize,
}

impl SimulatedEnvironment {
    pub fn new(map: &MapSpec) -> Result<Self> {
        let graph = GridGraph::new(&map.floor)?;
        let (start, _) = graph.find_start_end()?;
        Ok(Self {
            floor: map.floor.clone(),
            graph,
            start,
            position: Some(start),
            startup_delay: 0,
            observation_delay: 0,
            pending_polls: 0,
            poller: Poller::new(Duration::ZERO, None),
            commands: Vec::new(),
            episodes_started: 0,
        })
    }

    pub fn with_delays(mut self, startup_polls: usize, observation_polls: usize) -> Self {
        self.startup_delay = startup_polls;
        self.observation_delay = observation_polls;
        self
    }

    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    /// Cell the agent occupies, or `None` once it has walked off the board.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn commands(&self) -> &[Movement] {
        &self.commands
    }

    pub fn episodes_started(&self) -> usize {
        self.episodes_started
    }

    fn wait(&mut self, what: &str, polls: usize) -> Result<()> {
        let poller = self.poller;
        self.pending_polls = polls;
        let pending = &mut self.pending_polls;
        poller.poll(what, || {
            if *pending == 0 {
                return Ok(Some(()));
            }
            *pending -= 1;
            Ok(None)
        })
    }
}

impl Environment for SimulatedEnvironment {
    fn start_episode(&mut self, episode: usize) -> Result<()> {
        self.wait("session start", self.startup_delay)?;
        self.position = Some(self.start);
        self.episodes_started += 1;
        tracing::debug!(episode, "simulated session started");
        Ok(())
    }

    fn observe(&mut self) -> Result<Grid> {
        self.wait("observation", self.observation_delay)?;
        Ok(self.floor.clone())
    }

    fn execute(&mut self, movement: Movement) -> Result<()> {
        self.commands.push(movement);
        self.position = self.position.and_then(|p| self.graph.step(p, movement));
        Ok(())
    }
}
