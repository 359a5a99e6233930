//! Bitmap collision field
//!
//! Immutable occupancy grid built once from a luminance mask. Shared
//! read-only by every car on the map.

use glam::Vec2;

use crate::consts::FREE_LUMINANCE_THRESHOLD;
use crate::error::ConfigError;

/// Boolean occupancy grid, row-major, `true` = blocked
#[derive(Debug, Clone)]
pub struct CollisionField {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl CollisionField {
    /// Build from an 8-bit single-channel raster using the default threshold
    pub fn from_luminance(width: usize, height: usize, pixels: &[u8]) -> Result<Self, ConfigError> {
        Self::from_luminance_with_threshold(width, height, pixels, FREE_LUMINANCE_THRESHOLD)
    }

    /// Build from a raster where luminance > `threshold` means free space
    pub fn from_luminance_with_threshold(
        width: usize,
        height: usize,
        pixels: &[u8],
        threshold: u8,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        let expected = width * height;
        if pixels.len() != expected {
            return Err(ConfigError::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let blocked = pixels.iter().map(|&lum| lum <= threshold).collect();
        Ok(Self {
            width,
            height,
            blocked,
        })
    }

    /// Build by evaluating `is_blocked(col, row)` for every cell
    pub fn from_fn<F>(width: usize, height: usize, is_blocked: F) -> Result<Self, ConfigError>
    where
        F: Fn(usize, usize) -> bool,
    {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        let mut blocked = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                blocked.push(is_blocked(col, row));
            }
        }
        Ok(Self {
            width,
            height,
            blocked,
        })
    }

    /// Grid with no walls (everything outside is still blocked)
    pub fn open(width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::from_fn(width, height, |_, _| false)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the point falls on the grid
    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        x.is_finite()
            && y.is_finite()
            && x >= 0.0
            && y >= 0.0
            && (x as usize) < self.width
            && (y as usize) < self.height
    }

    /// Out-of-bounds and non-finite points count as walls
    pub fn is_blocked(&self, x: f32, y: f32) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        let col = x as usize;
        let row = y as usize;
        self.blocked[row * self.width + col]
    }

    #[inline]
    pub fn is_blocked_at(&self, p: Vec2) -> bool {
        self.is_blocked(p.x, p.y)
    }
}
