//! Simulated bodies
//!
//! Every body shares the same kinematic record; what differs per kind (ship,
//! enemy, planet, asteroid, projectile) lives in [`BodyKind`].

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{Environment, MotionModel};
use super::ship::{Ship, Upgrade, UpgradeKind, shop_catalogue};
use crate::consts::*;
use crate::{clamp_speed, heading};

/// Stable handle to a body in the world arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Kind tag without the per-kind payload (for events and dispatch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyTag {
    Ship,
    Enemy,
    Planet,
    Asteroid,
    Projectile,
}

/// A planet: immovable, holds depletable resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub fuel: f32,
    pub oxygen: f32,
    pub ore: f32,
    /// Docked at, or fully depleted
    pub harvested: bool,
    pub is_shop: bool,
    /// The level's goal: exempt from collisions, never harvested
    pub goal: bool,
    pub color: [u8; 3],
    pub upgrades: BTreeMap<UpgradeKind, Upgrade>,
}

impl Planet {
    pub fn new(fuel: f32, oxygen: f32, ore: f32) -> Self {
        Self {
            fuel: fuel.max(0.0),
            oxygen: oxygen.max(0.0),
            ore: ore.max(0.0),
            harvested: false,
            is_shop: false,
            goal: false,
            color: [128, 128, 128],
            upgrades: BTreeMap::new(),
        }
    }

    /// A planet with nothing left to take (the starting planet)
    pub fn depleted() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Turn this planet into the level's shop
    pub fn setup_as_shop(&mut self) {
        self.is_shop = true;
        self.color = [218, 165, 32];
        self.fuel = 100.0;
        self.oxygen = 100.0;
        self.ore = 100.0;
        self.upgrades = shop_catalogue();
    }

    pub fn is_exhausted(&self) -> bool {
        self.fuel <= 0.0 && self.oxygen <= 0.0 && self.ore <= 0.0
    }

    /// Mark harvested once every resource is gone (goal planet exempt)
    pub fn refresh_harvested(&mut self) {
        if !self.goal && self.is_exhausted() {
            self.harvested = true;
        }
    }
}

/// Asteroid payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub color: [u8; 3],
    /// Weight of the pre-step velocity when blending after integration (0-1)
    pub inertia_resistance: f32,
}

/// Hostile ship that chases the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyShip {
    pub fuel: f32,
    pub hull: f32,
    pub detection_radius: f32,
    /// Player within detection radius as of the last update
    pub pursuing: bool,
}

impl Default for EnemyShip {
    fn default() -> Self {
        Self {
            fuel: ENEMY_MAX_FUEL,
            hull: ENEMY_MAX_HULL,
            detection_radius: ENEMY_DETECTION_RADIUS,
            pursuing: false,
        }
    }
}

impl EnemyShip {
    pub fn take_damage(&mut self, amount: f32) {
        self.hull = (self.hull - amount).max(0.0);
    }

    pub fn is_destroyed(&self) -> bool {
        self.hull <= 0.0
    }
}

/// Shot fired by the player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Frames remaining
    pub lifetime: u32,
    pub damage: f32,
}

/// Per-kind payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyKind {
    Ship(Ship),
    Enemy(EnemyShip),
    Planet(Planet),
    Asteroid(Asteroid),
    Projectile(Projectile),
}

impl BodyKind {
    pub fn tag(&self) -> BodyTag {
        match self {
            BodyKind::Ship(_) => BodyTag::Ship,
            BodyKind::Enemy(_) => BodyTag::Enemy,
            BodyKind::Planet(_) => BodyTag::Planet,
            BodyKind::Asteroid(_) => BodyTag::Asteroid,
            BodyKind::Projectile(_) => BodyTag::Projectile,
        }
    }
}

/// A simulated body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Own (thrust) acceleration
    pub accel: Vec2,
    /// Total acceleration applied last update (HUD readout)
    pub net_accel: Vec2,
    pub radius: f32,
    pub mass: f32,
    /// Facing in degrees (ships and enemies)
    pub angle: f32,
    pub model: MotionModel,
    pub thrusting: bool,
    /// Has a natural tendency to fall (Aristotelian model)
    pub natural: bool,
    /// Velocity remembered across an Aristotelian stretch
    pub impetus: Vec2,
    /// Cleared on destruction; dead bodies are dropped at the end of the tick
    pub alive: bool,
    pub kind: BodyKind,
}

impl Body {
    fn new(id: BodyId, pos: Vec2, radius: f32, kind: BodyKind) -> Self {
        let radius = radius.max(f32::EPSILON);
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            net_accel: Vec2::ZERO,
            radius,
            mass: radius * radius,
            angle: 0.0,
            model: MotionModel::default(),
            thrusting: false,
            natural: false,
            impetus: Vec2::ZERO,
            alive: true,
            kind,
        }
    }

    pub fn ship(id: BodyId, pos: Vec2, ship: Ship) -> Self {
        let mut body = Self::new(id, pos, SHIP_RADIUS, BodyKind::Ship(ship));
        body.mass = SHIP_MASS;
        body.natural = true;
        body
    }

    pub fn enemy(id: BodyId, pos: Vec2) -> Self {
        let mut body = Self::new(id, pos, ENEMY_RADIUS, BodyKind::Enemy(EnemyShip::default()));
        body.mass = ENEMY_MASS;
        body.thrusting = true;
        body.natural = true;
        body
    }

    pub fn planet(id: BodyId, pos: Vec2, radius: f32, planet: Planet) -> Self {
        let mut body = Self::new(id, pos, radius, BodyKind::Planet(planet));
        body.mass *= PLANET_MASS_FACTOR;
        body
    }

    /// The level goal: heavier, exempt from collisions and harvesting
    pub fn goal_planet(id: BodyId, pos: Vec2, radius: f32) -> Self {
        let mut planet = Planet::new(0.0, 0.0, 0.0).with_color([0, 255, 255]);
        planet.goal = true;
        let mut body = Self::planet(id, pos, radius, planet);
        body.mass *= GOAL_PLANET_MASS_FACTOR;
        body
    }

    pub fn asteroid(id: BodyId, pos: Vec2, radius: f32, vel: Vec2, color: [u8; 3]) -> Self {
        let asteroid = Asteroid {
            color,
            inertia_resistance: ASTEROID_INERTIA_RESISTANCE,
        };
        let mut body = Self::new(id, pos, radius, BodyKind::Asteroid(asteroid));
        body.mass *= ASTEROID_MASS_FACTOR;
        body.vel = vel;
        body
    }

    /// A projectile leaving `pos` along `angle`
    pub fn projectile(id: BodyId, pos: Vec2, angle: f32, model: MotionModel) -> Self {
        let projectile = Projectile {
            lifetime: PROJECTILE_LIFETIME,
            damage: PROJECTILE_DAMAGE,
        };
        let mut body = Self::new(id, pos, PROJECTILE_RADIUS, BodyKind::Projectile(projectile));
        body.angle = angle;
        body.model = model;
        body.vel = heading(angle) * PROJECTILE_SPEED;
        body
    }

    #[inline]
    pub fn tag(&self) -> BodyTag {
        self.kind.tag()
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_planet(&self) -> Option<&Planet> {
        match &self.kind {
            BodyKind::Planet(planet) => Some(planet),
            _ => None,
        }
    }

    pub fn as_planet_mut(&mut self) -> Option<&mut Planet> {
        match &mut self.kind {
            BodyKind::Planet(planet) => Some(planet),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyShip> {
        match &self.kind {
            BodyKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyShip> {
        match &mut self.kind {
            BodyKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.kind {
            BodyKind::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    pub fn as_projectile_mut(&mut self) -> Option<&mut Projectile> {
        match &mut self.kind {
            BodyKind::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    pub fn is_landed(&self) -> bool {
        self.as_ship().is_some_and(|ship| ship.landed)
    }

    pub fn is_goal_planet(&self) -> bool {
        self.as_planet().is_some_and(|planet| planet.goal)
    }

    /// Never moved by collision response: planets, and ships sitting on one
    pub fn is_immovable(&self) -> bool {
        self.tag() == BodyTag::Planet || self.is_landed()
    }

    /// Switch motion model, carrying velocity across via impetus
    ///
    /// Leaving Aristotelian stores the current velocity as impetus; entering
    /// it hands any stored impetus back to velocity once.
    pub fn set_model(&mut self, model: MotionModel) {
        if model != self.model {
            match (self.model, model) {
                (MotionModel::Aristotelian, _) => self.impetus = self.vel,
                (_, MotionModel::Aristotelian) => {
                    if self.impetus != Vec2::ZERO {
                        self.vel = self.impetus;
                        self.impetus = Vec2::ZERO;
                    }
                }
                _ => {}
            }
            self.model = model;
        }

        if let BodyKind::Ship(ship) = &mut self.kind {
            for projectile in &mut ship.projectiles {
                projectile.set_model(model);
            }
        }
    }

    /// Shared motion step: impetus bookkeeping, then the motion model
    pub fn integrate(&mut self, env: &Environment<'_>) {
        if self.is_landed() {
            return;
        }
        if self.model == MotionModel::Aristotelian {
            self.impetus = self.vel;
        } else if self.impetus != Vec2::ZERO {
            self.vel = self.impetus;
            self.impetus = Vec2::ZERO;
        }
        self.model.apply(self, env);
    }

    /// Per-frame update: motion plus kind-specific behaviour
    ///
    /// Docked resource transfer needs the planet as well and is driven by the
    /// world right after the ship's update.
    pub fn update(&mut self, env: &Environment<'_>) {
        match self.tag() {
            BodyTag::Planet => {
                if let BodyKind::Planet(planet) = &mut self.kind {
                    planet.refresh_harvested();
                }
            }
            BodyTag::Ship => {
                self.integrate(env);
                if let BodyKind::Ship(ship) = &mut self.kind {
                    ship.advance(env);
                }
            }
            BodyTag::Enemy => {
                self.pursue(env.player);
                self.integrate(env);
            }
            BodyTag::Asteroid => {
                let before = self.vel;
                self.integrate(env);
                if let BodyKind::Asteroid(asteroid) = &self.kind {
                    let keep = asteroid.inertia_resistance.clamp(0.0, 1.0);
                    self.vel = self.vel * (1.0 - keep) + before * keep;
                }
            }
            BodyTag::Projectile => {
                self.integrate(env);
                if let BodyKind::Projectile(projectile) = &mut self.kind {
                    projectile.lifetime = projectile.lifetime.saturating_sub(1);
                }
            }
        }
        self.vel = clamp_speed(self.vel, env.max_speed);
    }

    /// Enemy steering toward the player
    fn pursue(&mut self, player: Option<Vec2>) {
        let BodyKind::Enemy(enemy) = &mut self.kind else {
            return;
        };

        let offset = player.map(|target| target - self.pos);
        enemy.pursuing = offset.is_some_and(|o| o.length() <= enemy.detection_radius);

        if enemy.pursuing && enemy.fuel > 0.0 {
            if let Some(dir) = offset.and_then(Vec2::try_normalize) {
                self.angle = dir.x.atan2(-dir.y).to_degrees();
                if self.model == MotionModel::Aristotelian {
                    self.accel = dir * ENEMY_ARISTOTLE_ACCEL;
                    self.thrusting = true;
                } else {
                    self.vel = dir * ENEMY_SPEED;
                }
                enemy.fuel = (enemy.fuel - ENEMY_FUEL_BURN).max(0.0);
            }
        } else if self.model.has_inertia() {
            self.vel *= ENEMY_DAMPING;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::motion::Attractor;
    use proptest::prelude::*;

    const CAP: f32 = 5.0;

    fn env(attractors: &[Attractor]) -> Environment<'_> {
        Environment::new(attractors, 6.674e-3, CAP)
    }

    #[test]
    fn test_masses_by_kind() {
        let planet = Body::planet(BodyId(1), Vec2::ZERO, 50.0, Planet::depleted());
        assert_eq!(planet.mass, 50.0 * 50.0 * PLANET_MASS_FACTOR);

        let goal = Body::goal_planet(BodyId(2), Vec2::ZERO, 50.0);
        assert_eq!(goal.mass, planet.mass * GOAL_PLANET_MASS_FACTOR);
        assert!(goal.is_goal_planet());

        let rock = Body::asteroid(BodyId(3), Vec2::ZERO, 10.0, Vec2::ZERO, [1, 2, 3]);
        assert_eq!(rock.mass, 100.0 * ASTEROID_MASS_FACTOR);

        assert_eq!(Body::ship(BodyId(4), Vec2::ZERO, Ship::default()).mass, SHIP_MASS);
        assert_eq!(Body::enemy(BodyId(5), Vec2::ZERO).mass, ENEMY_MASS);
    }

    #[test]
    fn test_planet_update_marks_harvested() {
        let mut planet = Body::planet(BodyId(1), Vec2::ZERO, 80.0, Planet::new(0.0, 0.0, 1.0));
        planet.update(&env(&[]));
        assert!(!planet.as_planet().is_some_and(|p| p.harvested));

        if let Some(p) = planet.as_planet_mut() {
            p.ore = 0.0;
        }
        planet.update(&env(&[]));
        assert!(planet.as_planet().is_some_and(|p| p.harvested));
        assert_eq!(planet.pos, Vec2::ZERO);
    }

    #[test]
    fn test_goal_planet_never_harvested() {
        let mut goal = Body::goal_planet(BodyId(1), Vec2::ZERO, 150.0);
        goal.update(&env(&[]));
        assert!(!goal.as_planet().is_some_and(|p| p.harvested));
    }

    #[test]
    fn test_projectile_lifetime_counts_down() {
        let mut shot = Body::projectile(BodyId(1), Vec2::ZERO, 90.0, MotionModel::Newtonian);
        if let Some(p) = shot.as_projectile_mut() {
            p.lifetime = 2;
        }
        shot.update(&env(&[]));
        assert_eq!(shot.as_projectile().map(|p| p.lifetime), Some(1));
        // Launched at 8 px/frame, clamped to the cap after the first update
        assert!(shot.vel.length() <= CAP + 1e-5);
        assert!(shot.pos.x > 0.0);
    }

    #[test]
    fn test_asteroid_resists_model() {
        let mut rock = Body::asteroid(BodyId(1), Vec2::ZERO, 10.0, Vec2::new(0.0, 2.0), [0; 3]);
        rock.model = MotionModel::Aristotelian;
        rock.update(&env(&[]));
        // Aristotelian would stop it dead; inertia resistance keeps 95%
        assert!((rock.vel.y - 2.0 * ASTEROID_INERTIA_RESISTANCE).abs() < 1e-5);
    }

    #[test]
    fn test_asteroid_fast_start_is_clamped() {
        let mut rock = Body::asteroid(BodyId(1), Vec2::ZERO, 10.0, Vec2::new(0.0, 25.0), [0; 3]);
        rock.update(&env(&[]));
        assert!(rock.vel.length() <= CAP + 1e-5);
    }

    #[test]
    fn test_enemy_pursues_player_in_range() {
        let mut enemy = Body::enemy(BodyId(1), Vec2::ZERO);
        let e = env(&[]).with_player(Some(Vec2::new(100.0, 0.0)));
        enemy.update(&e);

        assert!(enemy.as_enemy().is_some_and(|en| en.pursuing));
        assert!((enemy.vel - Vec2::new(ENEMY_SPEED, 0.0)).length() < 1e-5);
        assert!((enemy.angle - 90.0).abs() < 1e-3);
        assert!(enemy.as_enemy().is_some_and(|en| en.fuel < ENEMY_MAX_FUEL));
    }

    #[test]
    fn test_enemy_idles_out_of_range() {
        let mut enemy = Body::enemy(BodyId(1), Vec2::ZERO);
        enemy.vel = Vec2::new(1.0, 0.0);
        let e = env(&[]).with_player(Some(Vec2::new(ENEMY_DETECTION_RADIUS + 1.0, 0.0)));
        enemy.update(&e);

        assert!(!enemy.as_enemy().is_some_and(|en| en.pursuing));
        assert!((enemy.vel.x - ENEMY_DAMPING).abs() < 1e-5);
    }

    #[test]
    fn test_enemy_aristotelian_pursuit_uses_thrust() {
        let mut enemy = Body::enemy(BodyId(1), Vec2::ZERO);
        enemy.model = MotionModel::Aristotelian;
        let e = env(&[]).with_player(Some(Vec2::new(0.0, -100.0)));
        enemy.update(&e);

        assert!(enemy.thrusting);
        assert!((enemy.accel - Vec2::new(0.0, -ENEMY_ARISTOTLE_ACCEL)).length() < 1e-5);
        let expected = enemy.accel * crate::consts::ARISTOTLE_THRUST_SCALE;
        assert!((enemy.vel - expected).length() < 1e-5);
    }

    #[test]
    fn test_enemy_without_fuel_drifts() {
        let mut enemy = Body::enemy(BodyId(1), Vec2::ZERO);
        if let Some(en) = enemy.as_enemy_mut() {
            en.fuel = 0.0;
        }
        enemy.vel = Vec2::new(0.0, 1.0);
        let e = env(&[]).with_player(Some(Vec2::new(10.0, 0.0)));
        enemy.update(&e);
        assert!((enemy.vel.y - ENEMY_DAMPING).abs() < 1e-5);
    }

    #[test]
    fn test_model_switch_preserves_velocity() {
        let mut body = Body::asteroid(BodyId(1), Vec2::ZERO, 10.0, Vec2::ZERO, [0; 3]);
        body.model = MotionModel::Aristotelian;
        body.vel = Vec2::new(1.5, -2.0);

        body.set_model(MotionModel::Newtonian);
        assert_eq!(body.vel, Vec2::new(1.5, -2.0));
        assert_eq!(body.impetus, Vec2::new(1.5, -2.0));

        // Impetus is consumed once by the next integration
        body.integrate(&env(&[]));
        assert_eq!(body.impetus, Vec2::ZERO);
        assert!((body.vel - Vec2::new(1.5, -2.0)).length() < 1e-6);
    }

    #[test]
    fn test_model_round_trip_is_continuous() {
        let mut body = Body::asteroid(BodyId(1), Vec2::ZERO, 10.0, Vec2::ZERO, [0; 3]);
        body.model = MotionModel::Aristotelian;
        body.vel = Vec2::new(0.0, 3.0);

        body.set_model(MotionModel::Buridan);
        let after_leave = body.vel;
        body.set_model(MotionModel::Aristotelian);
        assert_eq!(after_leave, Vec2::new(0.0, 3.0));
        assert_eq!(body.vel, Vec2::new(0.0, 3.0));
        assert_eq!(body.impetus, Vec2::ZERO);
    }

    #[test]
    fn test_set_model_reaches_projectiles() {
        let mut ship = Body::ship(BodyId(1), Vec2::ZERO, Ship::default());
        if let Some(data) = ship.as_ship_mut() {
            data.projectiles
                .push(Body::projectile(BodyId(2), Vec2::ZERO, 0.0, MotionModel::Newtonian));
        }
        ship.set_model(MotionModel::Buridan);
        let models: Vec<_> = ship
            .as_ship()
            .map(|s| s.projectiles.iter().map(|p| p.model).collect())
            .unwrap_or_default();
        assert_eq!(models, vec![MotionModel::Buridan]);
    }

    proptest! {
        #[test]
        fn prop_update_keeps_speed_capped(
            kind in 0usize..3,
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
            px in -150.0f32..150.0,
            py in -150.0f32..150.0,
            model_idx in 0usize..3,
        ) {
            let planet = Body::planet(BodyId(9), Vec2::new(120.0, 40.0), 100.0, Planet::depleted());
            let attractors = [Attractor::from(&planet)];
            let e = env(&attractors).with_player(Some(Vec2::new(px, py)));

            let mut body = match kind {
                0 => Body::enemy(BodyId(1), Vec2::ZERO),
                1 => Body::asteroid(BodyId(1), Vec2::ZERO, 12.0, Vec2::new(vx, vy), [9, 9, 9]),
                _ => Body::projectile(BodyId(1), Vec2::ZERO, 30.0, MotionModel::Newtonian),
            };
            body.set_model(MotionModel::ALL[model_idx]);
            body.vel = Vec2::new(vx, vy);

            for _ in 0..3 {
                body.update(&e);
                prop_assert!(body.vel.length() <= CAP + 1e-4, "{:?} at {}", body.tag(), body.vel.length());
            }
        }
    }
}
