//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - One logical step per external tick, no wall clock
//! - Seeded RNG only, owned by each AI driver
//! - Stable iteration order (AI cars, then players)
//! - No rendering or input-device dependencies

pub mod car;
pub mod controller;
pub mod field;
pub mod geometry;
pub mod laps;
pub mod policy;
pub mod raycast;
pub mod state;
pub mod tick;

pub use car::{Car, CarDrawInfo, StepOutcome};
pub use controller::{AiController, Controller, Intent, PlayerController, PlayerKeys};
pub use field::CollisionField;
pub use geometry::{Line, Pose};
pub use laps::LapTracker;
pub use policy::{Activation, NetworkShape, Policy, PolicyParams};
pub use raycast::RayCaster;
pub use state::{GameSimulation, RaceCar};
pub use tick::{TickInput, tick};
