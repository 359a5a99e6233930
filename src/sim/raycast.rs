//! Ray casting against the collision field
//!
//! Rays are marched outward from the car centre in fixed increments until
//! they hit a wall or run out of range. Results feed the AI policy.

use serde::{Deserialize, Serialize};

use super::field::CollisionField;
use super::geometry::Pose;
use crate::consts::RAY_STEP;
use crate::error::ConfigError;
use crate::heading_vector;

/// Ray fan relative to the car heading plus output scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayCaster {
    /// Ray offsets from the heading (degrees)
    pub angles_deg: Vec<f32>,
    /// Longest distance a ray travels (pixels)
    pub max_distance: f32,
    /// Traveled distance is divided by this before clipping
    pub scale_factor: f32,
    /// Upper clamp on each returned value
    pub distance_clip: f32,
}

impl RayCaster {
    /// Sensor whose range is exactly what the clip can express
    pub fn new(angles_deg: Vec<f32>, scale_factor: f32, distance_clip: f32) -> Self {
        Self {
            angles_deg,
            max_distance: scale_factor * distance_clip,
            scale_factor,
            distance_clip,
        }
    }

    /// Scale must be positive, clip non-negative, angles finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ConfigError::InvalidSensor {
                field: "scale_factor",
                value: self.scale_factor,
            });
        }
        if !self.distance_clip.is_finite() || self.distance_clip < 0.0 {
            return Err(ConfigError::InvalidSensor {
                field: "distance_clip",
                value: self.distance_clip,
            });
        }
        if let Some(&angle) = self.angles_deg.iter().find(|a| !a.is_finite()) {
            return Err(ConfigError::InvalidSensor {
                field: "angles_deg",
                value: angle,
            });
        }
        Ok(())
    }

    pub fn ray_count(&self) -> usize {
        self.angles_deg.len()
    }

    /// One scaled, clipped distance per configured ray
    pub fn cast(&self, field: &CollisionField, pose: &Pose) -> Vec<f32> {
        self.angles_deg
            .iter()
            .map(|deg| {
                let traveled = march(field, pose, pose.heading + deg.to_radians(), self.max_distance);
                self.scale(traveled)
            })
            .collect()
    }

    #[inline]
    fn scale(&self, traveled: f32) -> f32 {
        (traveled / self.scale_factor).min(self.distance_clip).max(0.0)
    }
}

/// Distance from the pose centre to the first blocked sample along `angle`
pub fn march(field: &CollisionField, pose: &Pose, angle: f32, max_distance: f32) -> f32 {
    let origin = pose.position();
    let dir = heading_vector(angle);

    let mut t = RAY_STEP;
    while t < max_distance {
        if field.is_blocked_at(origin + dir * t) {
            return t;
        }
        t += RAY_STEP;
    }
    max_distance.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nine_rays() -> Vec<f32> {
        vec![-90.0, -67.5, -45.0, -22.5, 0.0, 22.5, 45.0, 67.5, 90.0]
    }

    #[test]
    fn test_open_field_returns_clip() {
        let field = CollisionField::open(200, 200).unwrap();
        let caster = RayCaster::new(nine_rays(), 10.0, 5.0);
        for heading in [0.0_f32, 0.7, 2.0, -2.9] {
            let pose = Pose::new(100.0, 100.0, heading);
            let rays = caster.cast(&field, &pose);
            assert_eq!(rays.len(), 9);
            for r in rays {
                assert!((r - 5.0).abs() < 1e-6, "ray {r} at heading {heading}");
            }
        }
    }

    #[test]
    fn test_wall_distance_is_scaled() {
        // Wall from column 120 onward
        let field = CollisionField::from_fn(200, 200, |col, _| col >= 120).unwrap();
        let caster = RayCaster::new(vec![0.0], 10.0, 5.0);
        let pose = Pose::new(100.0, 100.0, 0.0);
        let rays = caster.cast(&field, &pose);
        assert!((rays[0] - 2.0).abs() < 1e-4, "got {}", rays[0]);
    }

    #[test]
    fn test_ray_offset_is_relative_to_heading() {
        let field = CollisionField::from_fn(200, 200, |col, _| col >= 120).unwrap();
        let caster = RayCaster::new(vec![90.0], 10.0, 5.0);
        // Facing -y, a +90 degree ray points along +x toward the wall
        let pose = Pose::new(100.0, 100.0, -std::f32::consts::FRAC_PI_2);
        let rays = caster.cast(&field, &pose);
        assert!((rays[0] - 2.0).abs() < 0.15, "got {}", rays[0]);
    }

    #[test]
    fn test_map_edge_clips_ray() {
        let field = CollisionField::open(50, 50).unwrap();
        let caster = RayCaster::new(vec![180.0], 1.0, 100.0);
        let pose = Pose::new(10.5, 25.0, 0.0);
        let rays = caster.cast(&field, &pose);
        // Leaves the grid just past x = 0
        assert!(rays[0] > 10.0 && rays[0] < 12.0, "got {}", rays[0]);
    }

    #[test]
    fn test_validate_rejects_bad_scaling() {
        assert!(RayCaster::new(nine_rays(), 100.0, 5.0).validate().is_ok());
        assert!(RayCaster::new(nine_rays(), 100.0, 0.0).validate().is_ok());
        assert!(matches!(
            RayCaster::new(nine_rays(), 100.0, -1.0).validate(),
            Err(ConfigError::InvalidSensor { field: "distance_clip", .. })
        ));
        assert!(matches!(
            RayCaster::new(nine_rays(), 100.0, f32::NAN).validate(),
            Err(ConfigError::InvalidSensor { field: "distance_clip", .. })
        ));
        assert!(matches!(
            RayCaster::new(nine_rays(), 0.0, 5.0).validate(),
            Err(ConfigError::InvalidSensor { field: "scale_factor", .. })
        ));
        assert!(matches!(
            RayCaster::new(vec![0.0, f32::INFINITY], 100.0, 5.0).validate(),
            Err(ConfigError::InvalidSensor { field: "angles_deg", .. })
        ));
    }
}
