//! Race configuration
//!
//! Car, driver and race settings as edited by the menus. A simulation takes
//! a snapshot of these when it is created; later edits do not reach it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::policy::NetworkShape;
use crate::sim::raycast::RayCaster;

/// Car images shipped with the game, assigned round-robin
pub const CAR_IMAGES: [&str; 6] = [
    "images/car1.png",
    "images/car2.png",
    "images/car3.png",
    "images/car4.png",
    "images/car5.png",
    "images/car6.png",
];

/// Allowed (min, max) for every tunable car value
pub mod ranges {
    pub const MAX_SPEED: (f32, f32) = (0.0, 10.0);
    pub const MIN_SPEED: (f32, f32) = (-2.0, 0.0);
    pub const ACCELERATION: (f32, f32) = (0.0, 0.2);
    pub const TURN_SPEED: (f32, f32) = (0.0, 0.2);
    pub const INACTIVE_STEPS: (u32, u32) = (0, 20);
    pub const WIDTH: (f32, f32) = (5.0, 15.0);
    pub const HEIGHT: (f32, f32) = (10.0, 30.0);
}

/// Physical parameters of one car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarSettings {
    pub max_speed: f32,
    pub min_speed: f32,
    pub acceleration: f32,
    /// Radians per tick at full lock
    pub turn_speed: f32,
    /// Ticks a car stays stalled after hitting a wall
    pub inactive_steps: u32,
    pub width: f32,
    /// Length along the heading
    pub height: f32,
}

impl Default for CarSettings {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            min_speed: -1.0,
            acceleration: 0.1,
            turn_speed: 0.1,
            inactive_steps: 10,
            width: 10.0,
            height: 20.0,
        }
    }
}

impl CarSettings {
    /// Check values a car can be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("max_speed", self.max_speed),
            ("min_speed", self.min_speed),
            ("acceleration", self.acceleration),
            ("turn_speed", self.turn_speed),
            ("width", self.width),
            ("height", self.height),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::InvalidCarParameter { field, value });
            }
        }
        for &(field, value) in &fields[2..] {
            if value < 0.0 {
                return Err(ConfigError::InvalidCarParameter { field, value });
            }
        }
        if self.min_speed > 0.0 || self.max_speed < 0.0 {
            return Err(ConfigError::SpeedRangeExcludesZero {
                min_speed: self.min_speed,
                max_speed: self.max_speed,
            });
        }
        Ok(())
    }

    /// Copy with every value forced into its allowed range
    pub fn clamped(&self) -> Self {
        let clamped = Self {
            max_speed: clamp_range(self.max_speed, ranges::MAX_SPEED),
            min_speed: clamp_range(self.min_speed, ranges::MIN_SPEED),
            acceleration: clamp_range(self.acceleration, ranges::ACCELERATION),
            turn_speed: clamp_range(self.turn_speed, ranges::TURN_SPEED),
            inactive_steps: self
                .inactive_steps
                .clamp(ranges::INACTIVE_STEPS.0, ranges::INACTIVE_STEPS.1),
            width: clamp_range(self.width, ranges::WIDTH),
            height: clamp_range(self.height, ranges::HEIGHT),
        };
        if clamped != *self {
            log::warn!("Car settings clamped into allowed range: {:?}", clamped);
        }
        clamped
    }
}

fn clamp_range(value: f32, (lo, hi): (f32, f32)) -> f32 {
    if value.is_nan() { lo } else { value.clamp(lo, hi) }
}

/// AI skill level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Chance per tick that the driver ignores its network
    pub fn random_action_prob(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.2,
            Difficulty::Medium => 0.1,
            Difficulty::Hard => 0.02,
        }
    }
}

/// Human driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub name: String,
    pub image: String,
    pub car: CarSettings,
    /// Quadratic steering ramp instead of instant full lock
    pub steering_ramp: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            image: CAR_IMAGES[0].to_string(),
            car: CarSettings::default(),
            steering_ramp: true,
        }
    }
}

impl PlayerSettings {
    /// Rename, truncating to the display limit. Empty names are ignored.
    pub fn set_name(&mut self, name: &str) {
        if !name.is_empty() {
            self.name = name.chars().take(MAX_NAME_LEN).collect();
        }
    }
}

/// Computer driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub name: String,
    pub image: String,
    pub difficulty: Difficulty,
    /// Inactive drivers are not spawned
    pub active: bool,
    pub car: CarSettings,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self::numbered(1)
    }
}

impl AiSettings {
    /// Default roster entry "AI n"
    pub fn numbered(n: usize) -> Self {
        Self {
            name: format!("AI {n}"),
            image: CAR_IMAGES[n % CAR_IMAGES.len()].to_string(),
            difficulty: Difficulty::default(),
            active: true,
            car: CarSettings::default(),
        }
    }
}

/// Sensor and network layout shared by all AI drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiStructure {
    pub rays_degrees: Vec<f32>,
    pub rays_distances_scale_factor: f32,
    pub ray_input_clip: f32,
    pub network: NetworkShape,
}

impl Default for AiStructure {
    fn default() -> Self {
        Self {
            rays_degrees: vec![-90.0, -67.5, -45.0, -22.5, 0.0, 22.5, 45.0, 67.5, 90.0],
            rays_distances_scale_factor: 100.0,
            ray_input_clip: 5.0,
            network: NetworkShape::default(),
        }
    }
}

impl AiStructure {
    pub fn sensor(&self) -> RayCaster {
        RayCaster::new(
            self.rays_degrees.clone(),
            self.rays_distances_scale_factor,
            self.ray_input_clip,
        )
    }
}

/// Everything needed to start a race, persisted as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    pub map_index: usize,
    pub max_laps: u32,
    pub max_timesteps: u64,
    /// Seed for AI exploration
    pub seed: u64,
    pub player: PlayerSettings,
    pub ai_players: Vec<AiSettings>,
    pub ai_structure: AiStructure,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            map_index: 0,
            max_laps: DEFAULT_LAPS,
            max_timesteps: DEFAULT_RACE_SECONDS * FPS as u64,
            seed: 0,
            player: PlayerSettings::default(),
            ai_players: (1..=MAX_AI_CARS).map(AiSettings::numbered).collect(),
            ai_structure: AiStructure::default(),
        }
    }
}

impl RaceSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.ai_players.truncate(MAX_AI_CARS);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&text)?;
        log::info!("Loaded race settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Race settings saved to {}", path.display());
        Ok(())
    }

    /// Number of AI drivers that will be spawned
    pub fn active_ai_count(&self) -> usize {
        self.ai_players.iter().filter(|ai| ai.active).count()
    }
}
