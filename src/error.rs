//! Configuration errors
//!
//! Everything that can go wrong is caught while building a simulation.
//! Once a `GameSimulation` exists, stepping it cannot fail.

use core::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Collision grid with zero width or height
    InvalidDimensions { width: usize, height: usize },
    /// Raster buffer length does not match width * height
    PixelCountMismatch { expected: usize, actual: usize },
    /// A car parameter is negative, NaN or infinite
    InvalidCarParameter { field: &'static str, value: f32 },
    /// `min_speed <= 0 <= max_speed` does not hold
    SpeedRangeExcludesZero { min_speed: f32, max_speed: f32 },
    /// Spawn pose contains NaN or infinity
    SpawnNotFinite { x: f32, y: f32, heading: f32 },
    /// Spawn point lies on a wall or off the map
    SpawnBlocked { x: f32, y: f32 },
    /// Ray sensor scale or clip is NaN, infinite or out of range
    InvalidSensor { field: &'static str, value: f32 },
    /// Network parameters do not fit the declared layer sizes
    NetworkShape { layer: usize, detail: String },
    /// Ray sensor produces a feature vector the network cannot consume
    FeatureSizeMismatch { features: usize, network_inputs: usize },
    /// Probability outside [0, 1]
    InvalidProbability { value: f32 },
    /// Map index outside the catalog
    UnknownMap { index: usize, available: usize },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid collision grid size {width}x{height}")
            }
            Self::PixelCountMismatch { expected, actual } => {
                write!(f, "raster has {actual} pixels, expected {expected}")
            }
            Self::InvalidCarParameter { field, value } => {
                write!(f, "invalid car parameter {field}={value}")
            }
            Self::SpeedRangeExcludesZero {
                min_speed,
                max_speed,
            } => write!(
                f,
                "speed range [{min_speed}, {max_speed}] must contain zero"
            ),
            Self::SpawnNotFinite { x, y, heading } => {
                write!(f, "spawn pose is not finite: ({x}, {y}, {heading})")
            }
            Self::SpawnBlocked { x, y } => write!(f, "spawn point ({x}, {y}) is blocked"),
            Self::InvalidSensor { field, value } => {
                write!(f, "invalid ray sensor parameter {field}={value}")
            }
            Self::NetworkShape { layer, detail } => {
                write!(f, "network layer {layer} shape mismatch: {detail}")
            }
            Self::FeatureSizeMismatch {
                features,
                network_inputs,
            } => write!(
                f,
                "sensor produces {features} features but network expects {network_inputs}"
            ),
            Self::InvalidProbability { value } => {
                write!(f, "probability {value} outside [0, 1]")
            }
            Self::UnknownMap { index, available } => {
                write!(f, "map index {index} out of range ({available} maps)")
            }
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
