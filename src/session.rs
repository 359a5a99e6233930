//! Race session
//!
//! Holds the settings the menus edit and builds a fresh `GameSimulation`
//! from a snapshot of them on every "play".

use std::sync::Arc;

use crate::config::RaceSettings;
use crate::error::ConfigError;
use crate::maps::{MapConfig, builtin_maps, map_at};
use crate::sim::{
    AiController, Car, CollisionField, Controller, GameSimulation, LapTracker, PlayerController,
    Policy, RaceCar,
};

/// Splitmix-style spread so neighbouring AI seeds diverge
fn derive_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed.wrapping_add((index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone)]
pub struct RaceSession {
    maps: Vec<MapConfig>,
    settings: RaceSettings,
}

impl Default for RaceSession {
    fn default() -> Self {
        Self::new(builtin_maps(), RaceSettings::default())
    }
}

impl RaceSession {
    /// Session over a map catalog. Out-of-range selections are clamped.
    pub fn new(maps: Vec<MapConfig>, settings: RaceSettings) -> Self {
        let mut session = Self { maps, settings };
        let index = session.settings.map_index;
        let laps = session.settings.max_laps;
        session.select_map(index);
        session.set_max_laps(laps);
        session.set_max_timesteps(session.settings.max_timesteps);
        session
    }

    pub fn settings(&self) -> &RaceSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RaceSettings {
        &mut self.settings
    }

    pub fn maps(&self) -> &[MapConfig] {
        &self.maps
    }

    /// Select a map and reset the lap count to the default
    pub fn set_map(&mut self, index: usize) {
        self.select_map(index);
        self.set_max_laps(crate::consts::DEFAULT_LAPS);
    }

    fn select_map(&mut self, index: usize) {
        self.settings.map_index = index.min(self.maps.len().saturating_sub(1));
    }

    pub fn set_max_laps(&mut self, laps: u32) {
        self.settings.max_laps = match self.selected_map() {
            Ok(map) => map.allowed_laps(laps),
            Err(_) => laps.max(1),
        };
    }

    pub fn set_max_timesteps(&mut self, timesteps: u64) {
        self.settings.max_timesteps = timesteps.max(1);
    }

    pub fn max_laps(&self) -> u32 {
        self.settings.max_laps
    }

    pub fn max_timesteps(&self) -> u64 {
        self.settings.max_timesteps
    }

    pub fn selected_map(&self) -> Result<&MapConfig, ConfigError> {
        map_at(&self.maps, self.settings.map_index)
    }

    pub fn map_name(&self) -> Option<&str> {
        self.selected_map().ok().map(|m| m.name.as_str())
    }

    /// Build a simulation for the selected map.
    ///
    /// `field` is the decoded collision mask of that map and `policy` the
    /// network every AI driver shares. Fails before any car is stepped.
    pub fn create_game_simulation(
        &self,
        field: Arc<CollisionField>,
        policy: Arc<Policy>,
    ) -> Result<GameSimulation, ConfigError> {
        let map = self.selected_map()?;
        let spawn = map.spawn.pose();
        let max_laps = self.settings.max_laps as usize;
        let tracker = || {
            LapTracker::new(
                map.end_line,
                map.false_end_line,
                map.start_before_end_line,
                max_laps,
                spawn.position(),
            )
        };

        let sensor = self.settings.ai_structure.sensor();
        let mut cars_ai = Vec::new();
        for (index, ai) in self.settings.ai_players.iter().enumerate() {
            if !ai.active {
                continue;
            }
            let car = Car::new(&ai.car, spawn, field.clone())?;
            let controller = AiController::new(
                policy.clone(),
                sensor.clone(),
                ai.difficulty.random_action_prob(),
                derive_seed(self.settings.seed, index),
            )?;
            cars_ai.push(RaceCar::new(
                ai.name.clone(),
                ai.image.clone(),
                car,
                tracker(),
                Controller::Ai(controller),
            ));
        }

        let player = &self.settings.player;
        let car = Car::new(&player.car, spawn, field)?;
        let cars_players = vec![RaceCar::new(
            player.name.clone(),
            player.image.clone(),
            car,
            tracker(),
            Controller::Player(PlayerController::new(player.steering_ramp)),
        )];

        log::info!(
            "Starting race on {}: {} laps, {} ticks",
            map.name,
            max_laps,
            self.settings.max_timesteps
        );
        Ok(GameSimulation::new(
            cars_ai,
            cars_players,
            self.settings.max_timesteps,
        ))
    }
}
