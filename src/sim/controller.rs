//! Car controllers
//!
//! A controller turns what it can observe into engine and steering intent.
//! Players read externally supplied key state; AI drivers run the ray
//! sensor through the policy network.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::car::Car;
use super::policy::Policy;
use super::raycast::RayCaster;
use crate::consts::STEERING_RAMP_STEP;
use crate::error::ConfigError;

/// Engine and steering intent, both in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intent {
    pub engine: f32,
    pub steering: f32,
}

impl Intent {
    pub fn new(engine: f32, steering: f32) -> Self {
        Self { engine, steering }
    }
}

/// Key state for one human driver, polled by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerKeys {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
}

/// Human driver
#[derive(Debug, Clone)]
pub struct PlayerController {
    steering_ramp: bool,
    previous_direction: f32,
    ramp_value: f32,
}

impl PlayerController {
    pub fn new(steering_ramp: bool) -> Self {
        Self {
            steering_ramp,
            previous_direction: 0.0,
            ramp_value: 0.0,
        }
    }

    pub fn react(&mut self, keys: &PlayerKeys) -> Intent {
        let engine = if keys.accelerate {
            1.0
        } else if keys.brake {
            -1.0
        } else {
            0.0
        };

        let direction = if keys.right {
            -1.0
        } else if keys.left {
            1.0
        } else {
            0.0
        };

        if !self.steering_ramp {
            return Intent::new(engine, direction);
        }

        // Quadratic turn-in, restarted whenever the direction changes
        if direction != self.previous_direction {
            self.ramp_value = STEERING_RAMP_STEP;
            self.previous_direction = direction;
        }
        self.ramp_value += STEERING_RAMP_STEP;
        let steering = (direction * self.ramp_value * self.ramp_value).clamp(-1.0, 1.0);

        Intent::new(engine, steering)
    }
}

/// Network-driven driver with optional random exploration
#[derive(Debug, Clone)]
pub struct AiController {
    policy: Arc<Policy>,
    sensor: RayCaster,
    random_action_prob: f32,
    rng: Pcg32,
}

impl AiController {
    /// Features are the ray readings followed by the current velocity
    pub fn new(
        policy: Arc<Policy>,
        sensor: RayCaster,
        random_action_prob: f32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        sensor.validate()?;
        let features = sensor.ray_count() + 1;
        if features != policy.input_size() {
            return Err(ConfigError::FeatureSizeMismatch {
                features,
                network_inputs: policy.input_size(),
            });
        }
        if policy.shape().output_size < 4 {
            return Err(ConfigError::NetworkShape {
                layer: policy.shape().hidden_layers,
                detail: format!(
                    "driving needs 4 outputs, network has {}",
                    policy.shape().output_size
                ),
            });
        }
        if !(0.0..=1.0).contains(&random_action_prob) {
            return Err(ConfigError::InvalidProbability {
                value: random_action_prob,
            });
        }

        Ok(Self {
            policy,
            sensor,
            random_action_prob,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    pub fn features(&self, car: &Car) -> Vec<f32> {
        let mut features = self.sensor.cast(car.field(), &car.pose());
        features.push(car.velocity());
        features
    }

    pub fn react(&mut self, car: &Car) -> Intent {
        let output: Vec<f32> = if self.rng.random::<f32>() < self.random_action_prob {
            (0..4).map(|_| self.rng.random_range(-1.0f32..=1.0)).collect()
        } else {
            self.policy.forward(&self.features(car))
        };
        decode_output(&output).unwrap_or_default()
    }
}

/// First three outputs vote straight / left / right, the fourth is engine.
/// `None` if fewer than four outputs are given.
pub fn decode_output(output: &[f32]) -> Option<Intent> {
    let [straight, left, right, engine] = *output.first_chunk::<4>()?;
    let choice = [straight, left, right]
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0;
    let steering = match choice {
        1 => 1.0,
        2 => -1.0,
        _ => 0.0,
    };
    let engine = if engine.is_nan() {
        0.0
    } else {
        engine.clamp(-1.0, 1.0)
    };
    Some(Intent::new(engine, steering))
}

/// Either kind of driver
#[derive(Debug, Clone)]
pub enum Controller {
    Player(PlayerController),
    Ai(AiController),
}

impl Controller {
    /// Decide this tick's intent. `keys` is ignored by AI drivers.
    pub fn react(&mut self, car: &Car, keys: &PlayerKeys) -> Intent {
        match self {
            Controller::Player(player) => player.react(keys),
            Controller::Ai(ai) => ai.react(car),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Controller::Player(_))
    }
}
