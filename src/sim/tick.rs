//! Fixed timestep simulation tick
//!
//! The presentation layer calls `tick` once per frame. There is no internal
//! clock; `max_timesteps` is enforced by counting.

use super::controller::PlayerKeys;
use super::state::GameSimulation;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Key state per player car, by index. Missing entries mean no keys held.
    pub players: Vec<PlayerKeys>,
}

impl TickInput {
    /// Input for a race with a single human driver
    pub fn single(keys: PlayerKeys) -> Self {
        Self {
            players: vec![keys],
        }
    }

    fn keys_for(&self, index: usize) -> PlayerKeys {
        self.players.get(index).copied().unwrap_or_default()
    }
}

/// Advance the simulation by one fixed timestep: AI cars first, then players
pub fn tick(sim: &mut GameSimulation, input: &TickInput) {
    let tick = sim.current_timestep + 1;
    let idle = PlayerKeys::default();

    for car in &mut sim.cars_ai {
        car.step(tick, &idle);
    }
    for (index, car) in sim.cars_players.iter_mut().enumerate() {
        car.step(tick, &input.keys_for(index));
    }

    sim.current_timestep = tick;
}

impl GameSimulation {
    /// Advance one tick, see [`tick`]
    pub fn step(&mut self, input: &TickInput) {
        tick(self, input);
    }
}
