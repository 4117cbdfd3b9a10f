use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::grid::{GridGraph, Movement};

/// Shortest-path oracle over the traversable cells of a grid.
///
/// Dijkstra where entering a cell costs `Terrain::entry_cost`. With the
/// current uniform costs this is the minimum-hop path.
pub struct ShortestPathSolver;

impl ShortestPathSolver {
    /// Path from `source` to `destination`, both inclusive.
    ///
    /// Fails with `Error::Unreachable` when the source is not traversable or
    /// the destination cannot be reached through traversable cells.
    #[tracing::instrument(level = "trace", skip(graph))]
    pub fn find_path(graph: &GridGraph, source: usize, destination: usize) -> Result<Vec<usize>> {
        let unreachable = || Error::Unreachable {
            source_cell: source,
            destination,
        };
        if !graph.is_traversable(source) || !graph.is_traversable(destination) {
            return Err(unreachable());
        }

        let mut distance = vec![u32::MAX; graph.len()];
        let mut predecessor: Vec<Option<usize>> = vec![None; graph.len()];
        let mut visited = vec![false; graph.len()];
        let mut frontier = BinaryHeap::new();

        distance[source] = 0;
        frontier.push(Reverse((0u32, source)));

        while let Some(Reverse((dist, current))) = frontier.pop() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            if current == destination {
                break;
            }

            for movement in Movement::actions() {
                let Some(next) = graph.step(current, movement) else {
                    continue;
                };
                let Some(terrain) = graph.terrain(next).filter(|t| t.is_traversable()) else {
                    continue;
                };
                if visited[next] {
                    continue;
                }
                let candidate = dist + terrain.entry_cost();
                if candidate < distance[next] {
                    distance[next] = candidate;
                    predecessor[next] = Some(current);
                    frontier.push(Reverse((candidate, next)));
                }
            }
        }

        if !visited[destination] {
            tracing::trace!("destination never settled");
            return Err(unreachable());
        }

        let mut path = vec![destination];
        let mut cursor = destination;
        while cursor != source {
            cursor = predecessor[cursor].ok_or_else(unreachable)?;
            path.push(cursor);
        }
        path.reverse();
        Ok(path)
    }

    /// Number of hops on the shortest path, i.e. path length minus one.
    pub fn distance(graph: &GridGraph, source: usize, destination: usize) -> Result<usize> {
        Self::find_path(graph, source, destination).map(|path| path.len() - 1)
    }
}

/// Converts a vertex path into the movement commands that walk it.
/// Stops at the first pair of cells that are not adjacent.
pub fn actions_from_path(graph: &GridGraph, path: &[usize]) -> Vec<Movement> {
    path.windows(2)
        .map_while(|pair| {
            Movement::actions()
                .into_iter()
                .find(|&m| graph.step(pair[0], m) == Some(pair[1]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GOAL_LABEL, HAZARD_LABEL, START_LABEL, VOID_LABEL};

    fn graph(rows: &[&str]) -> GridGraph {
        let labels: Vec<String> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| {
                match c {
                    '#' => VOID_LABEL,
                    'H' => HAZARD_LABEL,
                    'S' => START_LABEL,
                    'G' => GOAL_LABEL,
                    _ => "stone",
                }
                .to_string()
            })
            .collect();
        GridGraph::new(&labels).unwrap()
    }

    fn assert_well_formed(graph: &GridGraph, path: &[usize], source: usize, destination: usize) {
        assert_eq!(path.first(), Some(&source));
        assert_eq!(path.last(), Some(&destination));
        for pair in path.windows(2) {
            let delta = pair[1] as isize - pair[0] as isize;
            let width = graph.width() as isize;
            assert!(
                [-width, width, -1, 1].contains(&delta),
                "bad step {} -> {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn open_grid_paths_match_manhattan_distance() {
        let g = graph(&[".....", ".....", ".....", ".....", "....."]);
        let width = g.width();
        for source in 0..g.len() {
            for destination in 0..g.len() {
                let path = ShortestPathSolver::find_path(&g, source, destination).unwrap();
                let manhattan = (source / width).abs_diff(destination / width)
                    + (source % width).abs_diff(destination % width);
                assert_eq!(path.len() - 1, manhattan);
                assert_well_formed(&g, &path, source, destination);
            }
        }
    }

    #[test]
    fn does_not_wrap_around_rows() {
        // cell 5 is the start of row 1; west of it must not be cell 4
        let g = graph(&[".....", ".....", ".....", ".....", "....."]);
        let path = ShortestPathSolver::find_path(&g, 5, 4).unwrap();
        assert_eq!(path.len() - 1, 5);
    }

    #[test]
    fn routes_around_void() {
        let g = graph(&["S.#..", ".##.G", ".....", "#####", "#####"]);
        let path = ShortestPathSolver::find_path(&g, 0, 9).unwrap();
        assert_eq!(path.len() - 1, 7);
        assert_well_formed(&g, &path, 0, 9);
        assert!(path.iter().all(|&i| g.is_traversable(i)));
    }

    #[test]
    fn hazards_do_not_change_path_length() {
        let g = graph(&["SHG", "...", "..."]);
        assert_eq!(ShortestPathSolver::distance(&g, 0, 2).unwrap(), 2);
    }

    #[test]
    fn source_equal_to_destination_is_single_cell() {
        let g = graph(&["S.", ".G"]);
        assert_eq!(ShortestPathSolver::find_path(&g, 3, 3).unwrap(), vec![3]);
    }

    #[test]
    fn void_source_is_unreachable() {
        let g = graph(&["#.", ".G"]);
        let err = ShortestPathSolver::find_path(&g, 0, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::Unreachable {
                source_cell: 0,
                destination: 3
            }
        ));
    }

    #[test]
    fn isolated_destination_is_unreachable() {
        let g = graph(&["S.#", "..#", "##G"]);
        assert!(matches!(
            ShortestPathSolver::find_path(&g, 0, 8),
            Err(Error::Unreachable { .. })
        ));
    }

    #[test]
    fn repeated_queries_agree() {
        let g = graph(&["S....", ".#.#.", ".....", ".#.#.", "....G"]);
        let first = ShortestPathSolver::find_path(&g, 0, 24).unwrap();
        let second = ShortestPathSolver::find_path(&g, 0, 24).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first.len() - 1, 8);
    }

    #[test]
    fn converts_path_to_commands() {
        let g = graph(&["S..", "..#", "..G"]);
        let path = vec![0, 1, 4, 7, 8];
        assert_eq!(
            actions_from_path(&g, &path),
            vec![Movement::East, Movement::South, Movement::South, Movement::East]
        );
    }
}
