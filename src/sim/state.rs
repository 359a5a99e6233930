//! Race state
//!
//! A `RaceCar` bundles one car with its lap tracker and driver. The
//! `GameSimulation` owns every car in the round and the tick counter.

use std::cmp::Ordering;

use super::car::{Car, CarDrawInfo};
use super::controller::{Controller, PlayerKeys};
use super::laps::LapTracker;
use crate::consts::PARKED_SPEED;

/// One competitor
#[derive(Debug, Clone)]
pub struct RaceCar {
    name: String,
    image: String,
    car: Car,
    tracker: LapTracker,
    controller: Controller,
}

impl RaceCar {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        car: Car,
        tracker: LapTracker,
        controller: Controller,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            car,
            tracker,
            controller,
        }
    }

    /// Advance this car by one tick. `tick` is the number of the tick being run.
    pub fn step(&mut self, tick: u64, keys: &PlayerKeys) {
        if self.car.is_inactive() {
            // Stalled cars are not driven and cannot move
            self.car.step();
            return;
        }

        let mut intent = self.controller.react(&self.car, keys);
        if self.tracker.finished() {
            // Brake to a standstill and stay parked
            if self.car.velocity() < PARKED_SPEED {
                self.car.stop();
                intent.engine = 0.0;
            } else {
                intent.engine = -1.0;
            }
        }

        self.car.react(intent.engine, intent.steering);
        self.car.step();
        if self.tracker.update(self.car.position(), tick) && self.tracker.finished() {
            log::info!("{} finished at tick {}", self.name, tick);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn tracker(&self) -> &LapTracker {
        &self.tracker
    }

    pub fn is_player(&self) -> bool {
        self.controller.is_player()
    }

    pub fn get_car_draw_info(&self) -> CarDrawInfo {
        self.car.draw_info(&self.image)
    }

    /// Copy of the tick numbers at which laps were completed
    pub fn get_laps(&self) -> Vec<u64> {
        self.tracker.laps().to_vec()
    }

    pub fn finished(&self) -> bool {
        self.tracker.finished()
    }

    pub fn distance(&self) -> f32 {
        self.car.distance()
    }

    /// Race order: more laps first, then further distance first
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .tracker
            .lap_count()
            .cmp(&self.tracker.lap_count())
            .then_with(|| other.distance().total_cmp(&self.distance()))
    }
}

/// One round of racing
#[derive(Debug, Clone)]
pub struct GameSimulation {
    pub(crate) cars_ai: Vec<RaceCar>,
    pub(crate) cars_players: Vec<RaceCar>,
    pub(crate) current_timestep: u64,
    pub(crate) max_timesteps: u64,
}

impl GameSimulation {
    pub fn new(cars_ai: Vec<RaceCar>, cars_players: Vec<RaceCar>, max_timesteps: u64) -> Self {
        log::info!(
            "Simulation created: {} AI, {} players, {} timesteps",
            cars_ai.len(),
            cars_players.len(),
            max_timesteps
        );
        Self {
            cars_ai,
            cars_players,
            current_timestep: 0,
            max_timesteps,
        }
    }

    pub fn current_timestep(&self) -> u64 {
        self.current_timestep
    }

    pub fn max_timesteps(&self) -> u64 {
        self.max_timesteps
    }

    /// Ticks left before the time limit
    pub fn remaining_timesteps(&self) -> u64 {
        self.max_timesteps.saturating_sub(self.current_timestep)
    }

    pub fn cars_ai(&self) -> &[RaceCar] {
        &self.cars_ai
    }

    pub fn cars_players(&self) -> &[RaceCar] {
        &self.cars_players
    }

    /// AI cars followed by player cars
    pub fn cars(&self) -> impl Iterator<Item = &RaceCar> {
        self.cars_ai.iter().chain(self.cars_players.iter())
    }

    /// All players done, or out of time
    pub fn is_finished(&self) -> bool {
        self.cars_players.iter().all(RaceCar::finished)
            || self.current_timestep >= self.max_timesteps
    }

    /// Cars sorted into race order
    pub fn ranked_cars(&self) -> Vec<&RaceCar> {
        let mut cars: Vec<&RaceCar> = self.cars().collect();
        cars.sort_by(|a, b| a.ranking_cmp(b));
        cars
    }
}
