//! Player ship
//!
//! Ship data plus the control contract the input layer drives: rotate,
//! thrust, throttle, land, take off, shoot. Landing and take-off move the
//! ship between its two states:
//!
//! - Flying: motion models integrate the ship, oxygen drains
//! - Landed: integration is bypassed and resources flow in from the planet

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind, Planet};
use super::motion::Environment;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{direction_or, heading};

/// Upgrades sold at shop planets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    MaxFuel,
    MaxHull,
    Thrust,
    ShootDelay,
    OxygenEfficiency,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::MaxFuel,
        UpgradeKind::MaxHull,
        UpgradeKind::Thrust,
        UpgradeKind::ShootDelay,
        UpgradeKind::OxygenEfficiency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::MaxFuel => "max_fuel",
            UpgradeKind::MaxHull => "max_hull",
            UpgradeKind::Thrust => "thrust",
            UpgradeKind::ShootDelay => "shoot_delay",
            UpgradeKind::OxygenEfficiency => "oxygen_efficiency",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

/// Price and numeric effect of one upgrade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub cost: f32,
    pub amount: f32,
}

/// What every shop sells
pub fn shop_catalogue() -> BTreeMap<UpgradeKind, Upgrade> {
    BTreeMap::from([
        (UpgradeKind::MaxFuel, Upgrade { cost: 50.0, amount: 25.0 }),
        (UpgradeKind::MaxHull, Upgrade { cost: 75.0, amount: 25.0 }),
        (UpgradeKind::Thrust, Upgrade { cost: 100.0, amount: 25.0 }),
        (UpgradeKind::ShootDelay, Upgrade { cost: 150.0, amount: -2.0 }),
        (UpgradeKind::OxygenEfficiency, Upgrade { cost: 200.0, amount: 0.01 }),
    ])
}

/// Ship payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub fuel: f32,
    pub oxygen: f32,
    pub hull: f32,
    pub max_fuel: f32,
    pub max_hull: f32,
    pub thrust_force: f32,
    pub thrust_force_min: f32,
    pub thrust_force_max: f32,
    pub cash: f32,
    pub landed: bool,
    /// Planet being drained while landed
    pub current_planet: Option<BodyId>,
    /// Live shots, oldest first
    pub projectiles: Vec<Body>,
    /// Frames until the next shot
    pub shoot_cooldown: u32,
    pub shoot_delay: u32,
    pub oxygen_depletion_rate: f32,
    pub min_depletion_rate: f32,
    pub resource_transfer_rate: f32,
}

impl Default for Ship {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

impl Ship {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            fuel: SHIP_MAX_FUEL,
            oxygen: SHIP_MAX_OXYGEN,
            hull: SHIP_MAX_HULL,
            max_fuel: SHIP_MAX_FUEL,
            max_hull: SHIP_MAX_HULL,
            thrust_force: SHIP_THRUST_FORCE,
            thrust_force_min: SHIP_THRUST_MIN,
            thrust_force_max: SHIP_THRUST_MAX,
            cash: SHIP_START_CASH,
            landed: false,
            current_planet: None,
            projectiles: Vec::new(),
            shoot_cooldown: 0,
            shoot_delay: SHIP_SHOOT_DELAY,
            oxygen_depletion_rate: tuning.oxygen_depletion_rate,
            min_depletion_rate: tuning.min_oxygen_depletion_rate,
            resource_transfer_rate: tuning.resource_transfer_rate,
        }
    }

    /// Lose hull, never below zero
    pub fn take_damage(&mut self, amount: f32) {
        self.hull = (self.hull - amount.max(0.0)).max(0.0);
    }

    /// Debug refill: everything back to its maximum
    pub fn refill(&mut self) {
        self.fuel = self.max_fuel;
        self.oxygen = SHIP_MAX_OXYGEN;
        self.hull = self.max_hull;
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_cooldown == 0
    }

    /// Post-integration bookkeeping for one frame
    pub(crate) fn advance(&mut self, env: &Environment<'_>) {
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);

        for projectile in &mut self.projectiles {
            projectile.update(env);
        }
        self.projectiles
            .retain(|p| p.as_projectile().is_some_and(|shot| shot.lifetime > 0));

        if !self.landed && self.oxygen > 0.0 {
            self.oxygen = (self.oxygen - self.oxygen_depletion_rate).max(0.0);
        }
    }

    /// Draw one frame's worth of resources from a docked planet
    ///
    /// Ore repairs the hull first; ore left over once the hull is full is sold
    /// for cash. Returns true once the planet has nothing left to give.
    pub fn transfer_from(&mut self, planet: &mut Planet) -> bool {
        let rate = self.resource_transfer_rate.max(0.0);

        let ore = (self.max_hull - self.hull).max(0.0).min(rate).min(planet.ore).max(0.0);
        self.hull = (self.hull + ore).min(self.max_hull);
        planet.ore = (planet.ore - ore).max(0.0);

        if self.hull >= self.max_hull && planet.ore > 0.0 {
            let sold = planet.ore.min(rate);
            self.cash += sold;
            planet.ore = (planet.ore - sold).max(0.0);
        }

        let fuel = (self.max_fuel - self.fuel).max(0.0).min(rate).min(planet.fuel).max(0.0);
        self.fuel = (self.fuel + fuel).min(self.max_fuel);
        planet.fuel = (planet.fuel - fuel).max(0.0);

        let oxygen = (SHIP_MAX_OXYGEN - self.oxygen).max(0.0).min(rate).min(planet.oxygen).max(0.0);
        self.oxygen = (self.oxygen + oxygen).min(SHIP_MAX_OXYGEN);
        planet.oxygen = (planet.oxygen - oxygen).max(0.0);

        planet.is_exhausted()
    }

    /// Apply the ship-side effect of an upgrade
    pub fn apply_upgrade(&mut self, kind: UpgradeKind, amount: f32) {
        match kind {
            UpgradeKind::MaxFuel => {
                self.max_fuel += amount;
                self.fuel = self.fuel.min(self.max_fuel);
            }
            UpgradeKind::MaxHull => {
                self.max_hull += amount;
                self.hull = self.hull.min(self.max_hull);
            }
            UpgradeKind::Thrust => {
                self.thrust_force_max += amount;
            }
            UpgradeKind::ShootDelay => {
                let delay = (self.shoot_delay as f32 + amount).round();
                self.shoot_delay = delay.max(SHIP_MIN_SHOOT_DELAY as f32) as u32;
            }
            UpgradeKind::OxygenEfficiency => {
                self.oxygen_depletion_rate =
                    (self.oxygen_depletion_rate - amount).max(self.min_depletion_rate);
            }
        }
    }
}

/// Ship controls. Each is a no-op on bodies that are not ships.
impl Body {
    /// Turn by `direction` units (3°/unit with fuel, 1°/unit without)
    pub fn rotate(&mut self, direction: f32) {
        let BodyKind::Ship(ship) = &mut self.kind else {
            return;
        };
        if ship.landed {
            return;
        }
        if ship.fuel > 0.0 {
            self.angle += direction * SHIP_TURN_RATE;
            ship.fuel = (ship.fuel - SHIP_TURN_FUEL).max(0.0);
        } else {
            self.angle += direction * SHIP_TURN_RATE_NO_FUEL;
        }
    }

    pub fn apply_thrust(&mut self) {
        let BodyKind::Ship(ship) = &mut self.kind else {
            return;
        };
        if ship.landed || ship.fuel <= 0.0 {
            return;
        }
        self.accel = heading(self.angle) * ship.thrust_force / 100.0;
        self.thrusting = true;
        ship.fuel = (ship.fuel - ship.thrust_force * SHIP_THRUST_FUEL).max(0.0);
    }

    pub fn stop_thrust(&mut self) {
        self.accel = Vec2::ZERO;
        self.thrusting = false;
    }

    /// Step thrust force up or down, staying within the ship's range
    pub fn adjust_throttle(&mut self, steps: i32) {
        if let BodyKind::Ship(ship) = &mut self.kind {
            ship.thrust_force = (ship.thrust_force + steps as f32 * SHIP_THRUST_STEP)
                .clamp(ship.thrust_force_min, ship.thrust_force_max);
        }
    }

    /// Touch down on `planet`: freeze, snap to its surface, start docking
    pub fn land(&mut self, planet: &mut Body) -> bool {
        let BodyKind::Ship(ship) = &mut self.kind else {
            return false;
        };
        let BodyKind::Planet(target) = &mut planet.kind else {
            return false;
        };

        ship.landed = true;
        ship.current_planet = Some(planet.id);
        target.harvested = true;

        self.vel = Vec2::ZERO;
        self.accel = Vec2::ZERO;
        let up = direction_or(self.pos - planet.pos, Vec2::NEG_Y);
        self.pos = surface_point(planet.pos, up, planet.radius + self.radius);
        true
    }

    /// Leave the planet with `launch_speed` along the current facing
    pub fn take_off(&mut self, launch_speed: f32) -> bool {
        let BodyKind::Ship(ship) = &mut self.kind else {
            return false;
        };
        if !ship.landed {
            return false;
        }
        ship.landed = false;
        ship.current_planet = None;
        self.vel += heading(self.angle) * launch_speed;
        true
    }

    /// Fire from the nose if the cooldown allows; `id` names the new shot
    pub fn shoot(&mut self, id: BodyId) -> bool {
        let BodyKind::Ship(ship) = &mut self.kind else {
            return false;
        };
        if !ship.can_shoot() {
            return false;
        }
        let nose = self.pos + heading(self.angle) * self.radius;
        ship.projectiles
            .push(Body::projectile(id, nose, self.angle, self.model));
        ship.shoot_cooldown = ship.shoot_delay;
        true
    }
}

/// Point `reach` away from `center` along `up`, never closer than `reach`
///
/// Rounding can leave `center + up * reach` a hair inside the circle, which
/// would register as an overlap with the planet every frame.
pub(crate) fn surface_point(center: Vec2, up: Vec2, reach: f32) -> Vec2 {
    let mut pos = center + up * reach;
    let mut step = (center.abs().max_element() + reach) * f32::EPSILON;
    for _ in 0..16 {
        if pos.distance(center) >= reach {
            break;
        }
        pos += up * step;
        step *= 2.0;
    }
    pos
}
