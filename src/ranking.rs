//! Race results
//!
//! Orders cars by laps completed, then distance, and turns them into rows
//! for the results table.

use serde::{Deserialize, Serialize};

use crate::sim::GameSimulation;
use crate::ticks_to_seconds;

/// A single results row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-indexed place
    pub rank: usize,
    pub name: String,
    /// Tick at which each lap was completed
    pub laps: Vec<u64>,
    pub distance: f32,
    pub finished: bool,
    pub is_player: bool,
}

impl Standing {
    /// Lap times in seconds with "-" for laps not driven, `max_laps` cells
    pub fn lap_cells(&self, max_laps: usize) -> Vec<String> {
        (0..max_laps)
            .map(|i| {
                self.laps
                    .get(i)
                    .map(|&tick| format_lap_time(tick))
                    .unwrap_or_else(|| "-".to_string())
            })
            .collect()
    }
}

/// Seconds with two decimals, e.g. "12.50"
pub fn format_lap_time(tick: u64) -> String {
    format!("{:.2}", ticks_to_seconds(tick))
}

/// Results table in race order
pub fn standings(sim: &GameSimulation) -> Vec<Standing> {
    sim.ranked_cars()
        .into_iter()
        .enumerate()
        .map(|(i, car)| Standing {
            rank: i + 1,
            name: car.name().to_string(),
            laps: car.get_laps(),
            distance: car.distance(),
            finished: car.finished(),
            is_player: car.is_player(),
        })
        .collect()
}

/// Best place achieved by any human driver
pub fn best_player_rank(standings: &[Standing]) -> Option<usize> {
    standings.iter().find(|s| s.is_player).map(|s| s.rank)
}
