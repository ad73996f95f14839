//! Data-driven game balance
//!
//! Every value here can be overridden from JSON; missing fields keep their
//! defaults, so a tuning file only needs the values it changes.

use serde::{Deserialize, Serialize};

use crate::sim::MotionModel;

/// Level layout parameters used by the default generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub field_width: f32,
    pub field_height: f32,
    /// Regular planets; start and goal come on top, the shop is one of these
    pub num_planets: usize,
    /// Minimum gap between regular planet surfaces
    pub min_planet_distance: f32,
    pub planet_radius: (f32, f32),
    /// Radius of the start and goal planets
    pub start_planet_radius: f32,
    /// Distance of the start/goal planets from the field edge
    pub edge_margin: f32,
    pub num_asteroids: usize,
    pub asteroid_radius: (f32, f32),
    pub base_enemies: usize,
    /// Extra enemies per completed level
    pub enemies_per_level: usize,
    pub max_enemies: usize,
    /// Rejection-sampling budget for planet placement
    pub placement_attempts: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            field_width: 3000.0,
            field_height: 15000.0,
            num_planets: 10,
            min_planet_distance: 1500.0,
            planet_radius: (50.0, 150.0),
            start_planet_radius: 150.0,
            edge_margin: 200.0,
            num_asteroids: 35,
            asteroid_radius: (10.0, 30.0),
            base_enemies: 12,
            enemies_per_level: 2,
            max_enemies: 50,
            placement_attempts: 10_000,
        }
    }
}

/// Simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Gravitational constant (Newtonian model)
    pub gravity: f32,
    /// Global speed cap (raised by thrust upgrades)
    pub max_speed: f32,
    /// Motion model a fresh session starts with
    pub initial_model: MotionModel,

    // === Ship life support ===
    /// Real time the ship may sit at zero oxygen before the run ends
    pub oxygen_grace_ms: u64,
    /// Oxygen lost per frame while flying
    pub oxygen_depletion_rate: f32,
    /// Floor for oxygen efficiency upgrades
    pub min_oxygen_depletion_rate: f32,
    /// Units of each resource moved per frame while docked
    pub resource_transfer_rate: f32,

    // === Landing ===
    /// Speed imparted along the facing on take-off
    pub launch_speed: f32,
    /// Minimum dot(bottom, direction to planet) to touch down
    pub landing_alignment: f32,
    /// Maximum |gap| between hull and surface to touch down
    pub landing_tolerance: f32,

    // === Collisions ===
    /// Impulse scale for approaching bodies
    pub restitution: f32,
    /// Collision force a ship takes from any asteroid hit
    pub asteroid_impact: f32,
    /// Hull lost per unit of collision force
    pub damage_scale: f32,
    /// Inclusive range of random spin (rotate units) after an impact
    pub spin_range: (u32, u32),

    pub level: LevelConfig,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 6.674e-3,
            max_speed: 5.0,
            initial_model: MotionModel::Newtonian,

            oxygen_grace_ms: 5000,
            oxygen_depletion_rate: 0.05,
            min_oxygen_depletion_rate: 0.01,
            resource_transfer_rate: 1.0,

            launch_speed: 5.0,
            landing_alignment: 0.75,
            landing_tolerance: 10.0,

            restitution: 4.0,
            asteroid_impact: 1.0,
            damage_scale: 10.0,
            spin_range: (5, 15),

            level: LevelConfig::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Serialize to pretty JSON (for writing a starter tuning file)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp values that would break simulation invariants
    fn sanitized(mut self) -> Self {
        self.max_speed = self.max_speed.max(0.0);
        self.resource_transfer_rate = self.resource_transfer_rate.max(0.0);
        self.oxygen_depletion_rate = self.oxygen_depletion_rate.max(0.0);
        self.min_oxygen_depletion_rate = self.min_oxygen_depletion_rate.max(0.0);
        self.damage_scale = self.damage_scale.max(0.0);
        if self.spin_range.0 > self.spin_range.1 {
            self.spin_range = (self.spin_range.1, self.spin_range.0);
        }
        let (lo, hi) = self.level.planet_radius;
        self.level.planet_radius = (lo.min(hi).max(1.0), hi.max(lo).max(1.0));
        let (lo, hi) = self.level.asteroid_radius;
        self.level.asteroid_radius = (lo.min(hi).max(1.0), hi.max(lo).max(1.0));
        self
    }
}
