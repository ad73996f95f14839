//! Impetus - physics and collision core for a 2D space-exploration game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (motion models, bodies, collisions, world state)
//! - `tuning`: Data-driven game balance
//!
//! Units are pixels and frames. Screen coordinates: +y points down, and an
//! angle of 0 degrees faces up.

pub mod sim;
pub mod tuning;

pub use tuning::{LevelConfig, Tuning};

use glam::Vec2;

/// Fixed physics and gameplay constants
pub mod consts {
    /// Gravity is suppressed when |r|² is at or below this (singularity guard)
    pub const MIN_GRAVITY_DIST_SQ: f32 = 1.0;

    /// Buridan: multiplicative impetus decay per frame
    pub const BURIDAN_DECAY: f32 = 0.9999;
    /// Buridan: constant downward force per frame
    pub const BURIDAN_FALL: f32 = 0.1;

    /// Aristotelian: thrust acceleration is scaled into a velocity by this
    pub const ARISTOTLE_THRUST_SCALE: f32 = 25.0;
    /// Aristotelian: "natural" tendency scale (applied to a zero base vector)
    pub const ARISTOTLE_NATURAL_SCALE: f32 = 0.5;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 10.0;
    pub const SHIP_MASS: f32 = 100.0;
    pub const SHIP_THRUST_FORCE: f32 = 50.0;
    pub const SHIP_THRUST_MIN: f32 = 1.0;
    pub const SHIP_THRUST_MAX: f32 = 100.0;
    pub const SHIP_THRUST_STEP: f32 = 1.0;
    pub const SHIP_MAX_FUEL: f32 = 100.0;
    pub const SHIP_MAX_HULL: f32 = 100.0;
    pub const SHIP_MAX_OXYGEN: f32 = 100.0;
    pub const SHIP_START_CASH: f32 = 1000.0;
    /// Degrees turned per unit of rotate input (with / without fuel)
    pub const SHIP_TURN_RATE: f32 = 3.0;
    pub const SHIP_TURN_RATE_NO_FUEL: f32 = 1.0;
    /// Fuel burned per rotate call
    pub const SHIP_TURN_FUEL: f32 = 0.05;
    /// Fuel burned per frame per unit of thrust force
    pub const SHIP_THRUST_FUEL: f32 = 0.001;
    /// Frames between shots
    pub const SHIP_SHOOT_DELAY: u32 = 10;
    pub const SHIP_MIN_SHOOT_DELAY: u32 = 5;

    /// Enemy defaults
    pub const ENEMY_RADIUS: f32 = 10.0;
    pub const ENEMY_MASS: f32 = 200.0;
    pub const ENEMY_SPEED: f32 = 2.0;
    pub const ENEMY_ARISTOTLE_ACCEL: f32 = 0.2;
    pub const ENEMY_DETECTION_RADIUS: f32 = 500.0;
    pub const ENEMY_DAMPING: f32 = 0.98;
    pub const ENEMY_FUEL_BURN: f32 = 0.025;
    pub const ENEMY_MAX_FUEL: f32 = 100.0;
    pub const ENEMY_MAX_HULL: f32 = 100.0;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 3.0;
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_LIFETIME: u32 = 600;
    pub const PROJECTILE_DAMAGE: f32 = 25.0;

    /// Asteroids blend this much of their pre-step velocity back in
    pub const ASTEROID_INERTIA_RESISTANCE: f32 = 0.95;

    /// Mass multipliers applied to radius²
    pub const PLANET_MASS_FACTOR: f32 = 100.0;
    pub const GOAL_PLANET_MASS_FACTOR: f32 = 10.0;
    pub const ASTEROID_MASS_FACTOR: f32 = 1000.0;
}

/// Unit vector a body faces for the given angle in degrees
#[inline]
pub fn heading(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.sin(), -rad.cos())
}

/// Unit vector pointing out of the bottom (landing gear) of a directional body
#[inline]
pub fn bottom(angle_deg: f32) -> Vec2 {
    -heading(angle_deg)
}

/// Normalize `v`, or return `fallback` when `v` has no usable direction
#[inline]
pub fn direction_or(v: Vec2, fallback: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(fallback)
}

/// Scale `v` down to `max` length if it is longer (direction is preserved)
#[inline]
pub fn clamp_speed(v: Vec2, max: f32) -> Vec2 {
    v.clamp_length_max(max.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_zero_points_up() {
        let h = heading(0.0);
        assert!(h.x.abs() < 1e-6);
        assert!((h.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_heading_quarter_turns() {
        let right = heading(90.0);
        assert!((right.x - 1.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);

        let down = heading(180.0);
        assert!((down.y - 1.0).abs() < 1e-6);
        assert!((bottom(180.0).y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_direction_or_falls_back() {
        assert_eq!(direction_or(Vec2::ZERO, Vec2::X), Vec2::X);
        let d = direction_or(Vec2::new(0.0, 4.0), Vec2::X);
        assert!((d - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_clamp_speed_scales_to_length() {
        let v = clamp_speed(Vec2::new(30.0, 40.0), 5.0);
        assert!((v.length() - 5.0).abs() < 1e-5);
        // Direction preserved, not truncated per axis
        assert!((v.x - 3.0).abs() < 1e-5);
        assert!((v.y - 4.0).abs() < 1e-5);

        let slow = Vec2::new(1.0, 1.0);
        assert_eq!(clamp_speed(slow, 5.0), slow);
    }
}
