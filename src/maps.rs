//! Map catalog
//!
//! Static per-map data: spawn pose, finish and decoy lines, asset paths.
//! Asset paths are opaque to the simulation; the caller decodes the
//! collision mask into a `CollisionField`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::geometry::{Line, Pose};

/// Spawn point shared by every car on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub x: f32,
    pub y: f32,
    /// Radians
    pub start_angle: f32,
}

impl Spawn {
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.start_angle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub name: String,
    pub spawn: Spawn,
    pub end_line: Line,
    pub false_end_line: Line,
    /// The first finish-line crossing only starts the race. Circuits set
    /// this; point-to-point maps are limited to one lap.
    pub start_before_end_line: bool,
    pub collision_mask: String,
    pub background: String,
}

impl MapConfig {
    /// Lap count this map allows for a requested value
    pub fn allowed_laps(&self, requested: u32) -> u32 {
        if self.start_before_end_line {
            requested.max(1)
        } else {
            1
        }
    }
}

/// Maps bundled with the game
pub fn builtin_maps() -> Vec<MapConfig> {
    vec![MapConfig {
        name: "Easy Peasy".to_string(),
        spawn: Spawn {
            x: 60.0,
            y: 50.0,
            start_angle: 0.0,
        },
        end_line: Line::from_points((100.0, 0.0), (100.0, 100.0)),
        false_end_line: Line::from_points((110.0, 0.0), (110.0, 100.0)),
        start_before_end_line: true,
        collision_mask: "images/map1_walls.png".to_string(),
        background: "images/map1.png".to_string(),
    }]
}

/// Look up a map, failing on an out-of-range index
pub fn map_at(maps: &[MapConfig], index: usize) -> Result<&MapConfig, ConfigError> {
    maps.get(index).ok_or(ConfigError::UnknownMap {
        index,
        available: maps.len(),
    })
}
