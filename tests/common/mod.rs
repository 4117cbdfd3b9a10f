#![allow(dead_code)]

use gridq::MapSpec;

/// Builds a map from rows of single-character cells:
/// `#` void, `H` hazard, `S` start, `G` goal, anything else floor.
pub fn map(name: &str, rows: &[&str]) -> MapSpec {
    let floor = rows
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
        .collect();
    MapSpec {
        name: name.to_string(),
        floor,
        reference: None,
    }
}

pub fn corridor() -> MapSpec {
    map("corridor", &["#####", "#####", "S...G", "#####", "#####"])
}

pub fn hazard_room() -> MapSpec {
    map("hazard", &["#####", "#S..#", "#.H.#", "#..G#", "#####"])
}
