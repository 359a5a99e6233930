//! Topdown Racer - A top-down car racing simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (car physics, ray casting, lap tracking, AI)
//! - `config`: Car, player, AI and race settings
//! - `maps`: Map configuration catalog
//! - `session`: Race setup and simulation factory
//! - `ranking`: Result ordering and standings table
//! - `error`: Configuration errors surfaced at construction time

pub mod config;
pub mod error;
pub mod maps;
pub mod ranking;
pub mod session;
pub mod sim;

pub use config::{AiSettings, CarSettings, Difficulty, PlayerSettings, RaceSettings};
pub use error::ConfigError;
pub use maps::MapConfig;
pub use ranking::Standing;
pub use session::RaceSession;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second expected from the presentation layer
    pub const FPS: u32 = 60;

    /// Default race length (seconds)
    pub const DEFAULT_RACE_SECONDS: u64 = 120;
    /// Default number of laps
    pub const DEFAULT_LAPS: u32 = 3;

    /// Roster limits
    pub const MAX_AI_CARS: usize = 6;
    pub const MAX_NAME_LEN: usize = 20;

    /// Luminance strictly above this value is free space
    pub const FREE_LUMINANCE_THRESHOLD: u8 = 0;

    /// Speed below which a finished car is considered parked
    pub const PARKED_SPEED: f32 = 0.01;

    /// Player steering ramp increment per tick
    pub const STEERING_RAMP_STEP: f32 = 0.11;

    /// Ray-march increment (pixels)
    pub const RAY_STEP: f32 = 1.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `heading` (radians)
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

/// Convert a tick count to seconds at the nominal frame rate
#[inline]
pub fn ticks_to_seconds(ticks: u64) -> f32 {
    ticks as f32 / consts::FPS as f32
}
