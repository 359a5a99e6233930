//! Car kinematic model
//!
//! One vehicle's pose and speed, integrated once per tick against the shared
//! collision field. Hitting a wall stalls the car for a fixed number of ticks.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::CollisionField;
use super::geometry::Pose;
use crate::config::CarSettings;
use crate::error::ConfigError;
use crate::normalize_angle;

/// Snapshot handed to the presentation layer each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarDrawInfo {
    /// Sprite path, opaque to the simulation
    pub image: String,
    pub x: f32,
    pub y: f32,
    pub angle_radians: f32,
    pub width: f32,
    pub height: f32,
    /// 1.0 right after a crash, 0.0 once drivable again
    pub inactive_ratio: f32,
}

/// What happened during the last `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Collided,
    /// Recovering from an earlier collision; intent ignored
    Stalled,
}

#[derive(Debug, Clone)]
pub struct Car {
    pose: Pose,
    velocity: f32,
    width: f32,
    height: f32,
    max_speed: f32,
    min_speed: f32,
    acceleration: f32,
    turn_speed: f32,
    inactive_counter: u32,
    inactive_steps_threshold: u32,
    /// Signed odometer: forward travel minus reverse travel
    distance: f32,
    engine_intent: f32,
    steering_intent: f32,
    field: Arc<CollisionField>,
}

impl Car {
    /// Create a car at `spawn`. The whole body must be finite and on free cells.
    pub fn new(
        settings: &CarSettings,
        spawn: Pose,
        field: Arc<CollisionField>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        if !spawn.is_finite() {
            return Err(ConfigError::SpawnNotFinite {
                x: spawn.x,
                y: spawn.y,
                heading: spawn.heading,
            });
        }
        let body_blocked = spawn
            .outline_samples(settings.width, settings.height)
            .iter()
            .any(|p| field.is_blocked_at(*p));
        if field.is_blocked(spawn.x, spawn.y) || body_blocked {
            return Err(ConfigError::SpawnBlocked {
                x: spawn.x,
                y: spawn.y,
            });
        }

        Ok(Self {
            pose: spawn,
            velocity: 0.0,
            width: settings.width,
            height: settings.height,
            max_speed: settings.max_speed,
            min_speed: settings.min_speed,
            acceleration: settings.acceleration,
            turn_speed: settings.turn_speed,
            inactive_counter: 0,
            inactive_steps_threshold: settings.inactive_steps,
            distance: 0.0,
            engine_intent: 0.0,
            steering_intent: 0.0,
            field,
        })
    }

    /// Stage engine and steering intent for the next `step`
    pub fn react(&mut self, engine: f32, steering: f32) {
        self.engine_intent = sanitize_intent(engine);
        self.steering_intent = sanitize_intent(steering);
    }

    /// Advance one tick
    pub fn step(&mut self) -> StepOutcome {
        let engine = std::mem::take(&mut self.engine_intent);
        let steering = std::mem::take(&mut self.steering_intent);

        if self.inactive_counter > 0 {
            self.inactive_counter -= 1;
            return StepOutcome::Stalled;
        }

        self.velocity =
            (self.velocity + engine * self.acceleration).clamp(self.min_speed, self.max_speed);

        // Steering works at any speed; reversing mirrors it
        let direction = if self.velocity < 0.0 { -1.0 } else { 1.0 };
        let heading = normalize_angle(self.pose.heading + steering * self.turn_speed * direction);

        let candidate = Pose::new(
            self.pose.x + self.velocity * heading.cos(),
            self.pose.y + self.velocity * heading.sin(),
            heading,
        );

        if self.collides(&candidate) {
            log::debug!(
                "Car collided at ({:.1}, {:.1}) with velocity {:.2}",
                candidate.x,
                candidate.y,
                self.velocity
            );
            self.velocity = 0.0;
            self.inactive_counter = self.inactive_steps_threshold;
            return StepOutcome::Collided;
        }

        self.distance += self.velocity;
        self.pose = candidate;
        StepOutcome::Moved
    }

    /// Kill all speed immediately
    pub fn stop(&mut self) {
        self.velocity = 0.0;
    }

    fn collides(&self, pose: &Pose) -> bool {
        pose.outline_samples(self.width, self.height)
            .iter()
            .any(|p| self.field.is_blocked_at(*p))
    }

    /// Fraction of the stall countdown remaining
    pub fn inactive_ratio(&self) -> f32 {
        if self.inactive_steps_threshold == 0 {
            return 0.0;
        }
        self.inactive_counter as f32 / self.inactive_steps_threshold as f32
    }

    pub fn is_inactive(&self) -> bool {
        self.inactive_counter > 0
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec2 {
        self.pose.position()
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn min_speed(&self) -> f32 {
        self.min_speed
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn field(&self) -> &CollisionField {
        &self.field
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn draw_info(&self, image: &str) -> CarDrawInfo {
        CarDrawInfo {
            image: image.to_string(),
            x: self.pose.x,
            y: self.pose.y,
            angle_radians: self.pose.heading,
            width: self.width,
            height: self.height,
            inactive_ratio: self.inactive_ratio(),
        }
    }
}

#[inline]
fn sanitize_intent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings() -> CarSettings {
        CarSettings {
            width: 2.0,
            height: 4.0,
            ..CarSettings::default()
        }
    }

    fn open_field() -> Arc<CollisionField> {
        Arc::new(CollisionField::open(400, 400).unwrap())
    }

    #[test]
    fn test_accelerates_along_heading() {
        let mut car = Car::new(&settings(), Pose::new(100.0, 100.0, 0.0), open_field()).unwrap();
        for _ in 0..3 {
            car.react(1.0, 0.0);
            assert_eq!(car.step(), StepOutcome::Moved);
        }
        assert!((car.velocity() - 0.3).abs() < 1e-5);
        // 0.1 + 0.2 + 0.3
        assert!((car.position().x - 100.6).abs() < 1e-4);
        assert!((car.position().y - 100.0).abs() < 1e-6);
        assert!((car.distance() - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut car = Car::new(&settings(), Pose::new(200.0, 200.0, 0.0), open_field()).unwrap();
        for _ in 0..20 {
            car.react(-1.0, 0.0);
            car.step();
        }
        assert!((car.velocity() - car.min_speed()).abs() < 1e-6);
    }

    #[test]
    fn test_steering_sign_follows_direction() {
        let mut forward = Car::new(&settings(), Pose::new(200.0, 200.0, 0.0), open_field()).unwrap();
        forward.react(1.0, 1.0);
        forward.step();
        assert!(forward.pose().heading > 0.0);

        let mut reverse = Car::new(&settings(), Pose::new(200.0, 200.0, 0.0), open_field()).unwrap();
        reverse.react(-1.0, 1.0);
        reverse.step();
        assert!(reverse.velocity() < 0.0);
        assert!(reverse.pose().heading < 0.0);
    }

    #[test]
    fn test_steering_works_at_standstill() {
        let mut car = Car::new(&settings(), Pose::new(200.0, 200.0, 0.0), open_field()).unwrap();
        car.react(0.0, -1.0);
        car.step();
        assert!((car.pose().heading + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_collision_stalls_for_threshold_ticks() {
        // Free strip x < 5, wall beyond
        let field = Arc::new(CollisionField::from_fn(20, 20, |col, _| col >= 5).unwrap());
        let car_settings = CarSettings {
            width: 1.0,
            height: 1.0,
            max_speed: 10.0,
            acceleration: 10.0,
            inactive_steps: 4,
            ..CarSettings::default()
        };
        let mut car = Car::new(&car_settings, Pose::new(1.0, 1.0, 0.0), field).unwrap();

        car.react(1.0, 0.0);
        assert_eq!(car.step(), StepOutcome::Collided);
        assert_eq!(car.velocity(), 0.0);
        assert_eq!(car.position(), Vec2::new(1.0, 1.0));
        assert!((car.inactive_ratio() - 1.0).abs() < 1e-6);

        let mut previous = car.inactive_ratio();
        for tick in 0..4 {
            car.react(1.0, 1.0);
            assert_eq!(car.step(), StepOutcome::Stalled, "tick {tick}");
            let ratio = car.inactive_ratio();
            assert!(ratio < previous);
            previous = ratio;
        }
        assert_eq!(car.inactive_ratio(), 0.0);
        // Intent during the stall was discarded
        assert_eq!(car.pose().heading, 0.0);
    }

    #[test]
    fn test_zero_threshold_never_stalls() {
        let field = Arc::new(CollisionField::from_fn(20, 20, |col, _| col >= 5).unwrap());
        let car_settings = CarSettings {
            width: 1.0,
            height: 1.0,
            max_speed: 10.0,
            acceleration: 10.0,
            inactive_steps: 0,
            ..CarSettings::default()
        };
        let mut car = Car::new(&car_settings, Pose::new(1.0, 1.0, 0.0), field).unwrap();
        car.react(1.0, 0.0);
        assert_eq!(car.step(), StepOutcome::Collided);
        assert_eq!(car.inactive_ratio(), 0.0);
        assert!(!car.is_inactive());
    }

    #[test]
    fn test_rejects_bad_spawn() {
        let field = Arc::new(CollisionField::from_fn(20, 20, |col, _| col >= 5).unwrap());
        assert!(matches!(
            Car::new(&settings(), Pose::new(10.0, 1.0, 0.0), field.clone()),
            Err(ConfigError::SpawnBlocked { .. })
        ));
        assert!(matches!(
            Car::new(&settings(), Pose::new(f32::NAN, 1.0, 0.0), field),
            Err(ConfigError::SpawnNotFinite { .. })
        ));
    }

    #[test]
    fn test_rejects_spawn_overlapping_wall() {
        // Centre free, rear of the body past the map edge
        let field = Arc::new(CollisionField::open(100, 100).unwrap());
        assert!(matches!(
            Car::new(&CarSettings::default(), Pose::new(2.0, 50.0, 0.0), field.clone()),
            Err(ConfigError::SpawnBlocked { .. })
        ));
        // Nose into a wall
        let walled = Arc::new(CollisionField::from_fn(100, 100, |col, _| col >= 58).unwrap());
        assert!(Car::new(&CarSettings::default(), Pose::new(50.0, 50.0, 0.0), walled).is_err());
        assert!(Car::new(&CarSettings::default(), Pose::new(50.0, 50.0, 0.0), field).is_ok());
    }

    #[test]
    fn test_heading_stays_wrapped() {
        let mut car = Car::new(&settings(), Pose::new(200.0, 200.0, 0.0), open_field()).unwrap();
        for _ in 0..200 {
            car.react(0.0, 1.0);
            car.step();
            let heading = car.pose().heading;
            assert!((-std::f32::consts::PI..std::f32::consts::PI).contains(&heading));
        }
    }

    #[test]
    fn test_draw_info_carries_image() {
        let car = Car::new(&settings(), Pose::new(200.0, 150.0, 0.5), open_field()).unwrap();
        let info = car.draw_info("images/car3.png");
        assert_eq!(info.image, "images/car3.png");
        assert_eq!((info.x, info.y, info.angle_radians), (200.0, 150.0, 0.5));
        assert_eq!((info.width, info.height), (2.0, 4.0));
        assert_eq!(info.inactive_ratio, 0.0);
    }

    #[test]
    fn test_nan_intent_is_ignored() {
        let mut car = Car::new(&settings(), Pose::new(200.0, 200.0, 0.0), open_field()).unwrap();
        car.react(f32::NAN, f32::NAN);
        car.step();
        assert_eq!(car.velocity(), 0.0);
        assert!(car.pose().is_finite());
    }

    proptest! {
        #[test]
        fn prop_velocity_stays_in_range(
            intents in proptest::collection::vec((-1.5f32..1.5, -1.5f32..1.5), 1..200)
        ) {
            let field = Arc::new(
                CollisionField::from_fn(120, 120, |col, row| col < 10 || row < 10 || col > 110 || row > 110)
                    .unwrap(),
            );
            let mut car = Car::new(&settings(), Pose::new(60.0, 60.0, 0.3), field).unwrap();
            for (engine, steering) in intents {
                car.react(engine, steering);
                car.step();
                prop_assert!(car.velocity() >= car.min_speed() && car.velocity() <= car.max_speed());
            }
        }
    }
}
