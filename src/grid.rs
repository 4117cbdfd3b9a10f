use std::fmt;
use std::str::FromStr;

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const VOID_LABEL: &str = "air";
pub const HAZARD_LABEL: &str = "netherrack";
pub const START_LABEL: &str = "emerald_block";
pub const GOAL_LABEL: &str = "redstone_block";

/// Raw terrain labels as observed from the world, row-major.
pub type Grid = Vec<String>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Terrain {
    Void,
    Hazard,
    Start,
    Goal,
    Floor,
}

impl Terrain {
    pub fn from_label(label: &str) -> Self {
        match label {
            VOID_LABEL => Terrain::Void,
            HAZARD_LABEL => Terrain::Hazard,
            START_LABEL => Terrain::Start,
            GOAL_LABEL => Terrain::Goal,
            _ => Terrain::Floor,
        }
    }

    pub fn is_traversable(self) -> bool {
        self != Terrain::Void
    }

    /// Cost of entering a cell of this terrain during path search.
    /// Uniform for now; hazards are priced by the reward model instead.
    pub fn entry_cost(self) -> u32 {
        1
    }
}

// Action
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    #[serde(rename = "movenorth 1")]
    North,
    #[serde(rename = "movesouth 1")]
    South,
    #[serde(rename = "movewest 1")]
    West,
    #[serde(rename = "moveeast 1")]
    East,
}

impl Movement {
    pub const COUNT: usize = 4;

    /// The fixed action order; also the column order of the Q-table.
    pub fn actions() -> [Movement; Movement::COUNT] {
        [Movement::North, Movement::South, Movement::West, Movement::East]
    }

    pub fn index(self) -> usize {
        match self {
            Movement::North => 0,
            Movement::South => 1,
            Movement::West => 2,
            Movement::East => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Movement> {
        Movement::actions().get(index).copied()
    }

    /// Index delta on a row-major grid of the given width.
    pub fn offset(self, width: usize) -> isize {
        let width = width as isize;
        match self {
            Movement::North => -width,
            Movement::South => width,
            Movement::West => -1,
            Movement::East => 1,
        }
    }

    /// Command string understood by the simulation backend.
    pub fn command(self) -> &'static str {
        match self {
            Movement::North => "movenorth 1",
            Movement::South => "movesouth 1",
            Movement::West => "movewest 1",
            Movement::East => "moveeast 1",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for Movement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Movement::actions()
            .into_iter()
            .find(|m| m.command() == s)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

impl Distribution<Movement> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Movement {
        match rng.gen_range(0..Movement::COUNT) {
            0 => Movement::North,
            1 => Movement::South,
            2 => Movement::West,
            _ => Movement::East,
        }
    }
}

/// Read-only graph view over a square, row-major grid snapshot.
#[derive(Debug, Clone)]
pub struct GridGraph {
    cells: Vec<Terrain>,
    width: usize,
}

impl GridGraph {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::InvalidGrid {
                message: "grid has no cells".to_string(),
            });
        }
        let width = (labels.len() as f64).sqrt().round() as usize;
        if width * width != labels.len() {
            return Err(Error::InvalidGrid {
                message: format!("{} cells do not form a square grid", labels.len()),
            });
        }
        let cells = labels
            .iter()
            .map(|label| Terrain::from_label(label.as_ref()))
            .collect();
        Ok(Self { cells, width })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn terrain(&self, index: usize) -> Option<Terrain> {
        self.cells.get(index).copied()
    }

    /// False for void cells and for anything off the grid.
    pub fn is_traversable(&self, index: usize) -> bool {
        self.terrain(index).is_some_and(Terrain::is_traversable)
    }

    /// Raw neighbor indices for the four actions. No boundary handling: the
    /// results may be negative, past the end, or wrapped onto the adjacent row.
    pub fn neighbors(&self, index: usize) -> [(Movement, isize); Movement::COUNT] {
        Movement::actions().map(|m| (m, index as isize + m.offset(self.width)))
    }

    /// Bounds-checked move. `None` when the move leaves the board, including
    /// stepping west off the first column or east off the last one.
    pub fn step(&self, index: usize, movement: Movement) -> Option<usize> {
        if index >= self.len() {
            return None;
        }
        let (row, col) = (index / self.width, index % self.width);
        let height = self.len() / self.width;
        match movement {
            Movement::North if row > 0 => Some(index - self.width),
            Movement::South if row + 1 < height => Some(index + self.width),
            Movement::West if col > 0 => Some(index - 1),
            Movement::East if col + 1 < self.width => Some(index + 1),
            _ => None,
        }
    }

    pub fn traversable_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.is_traversable(i))
    }

    /// Locates the first start marker and the first goal marker.
    pub fn find_start_end(&self) -> Result<(usize, usize)> {
        let find = |wanted: Terrain, marker: &'static str| {
            self.cells
                .iter()
                .position(|&t| t == wanted)
                .ok_or(Error::MissingMarker { marker })
        };
        Ok((
            find(Terrain::Start, START_LABEL)?,
            find(Terrain::Goal, GOAL_LABEL)?,
        ))
    }
}
