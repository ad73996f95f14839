//! Seeded level generation
//!
//! Lays out a tall playing field: regular planets placed by rejection
//! sampling, a depleted starting planet and the goal planet at opposite
//! ends, falling asteroids, enemies scaling with progress, one shop, and
//! the ship landed on the starting planet.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::body::{Body, BodyId, Planet};
use super::ship::{Ship, surface_point};
use super::state::World;
use crate::tuning::Tuning;

/// Keep-out band along the field edges for random placement
const FIELD_MARGIN: f32 = 100.0;
const START_PLANET_COLOR: [u8; 3] = [150, 75, 0];
const ASTEROID_COLOR: [u8; 3] = [128, 128, 128];

impl World {
    /// First level of a new run
    pub fn generate(seed: u64, tuning: Tuning) -> Self {
        let mut world = World::new(seed, tuning);
        let ship = Ship::from_tuning(&world.tuning);
        world.populate(ship);
        world
    }

    /// Build the level after this one
    ///
    /// The layout is new; the ship keeps its upgrades and cash and is
    /// refilled, and the selected model and speed cap carry over.
    pub fn next_level(&self) -> Self {
        let levels_completed = self.levels_completed + 1;
        let seed = (levels_completed as u64)
            .wrapping_mul(2654435761)
            .wrapping_add(self.seed);

        let mut world = World::new(seed, self.tuning.clone());
        world.model = self.model;
        world.max_speed = self.max_speed;
        world.levels_completed = levels_completed;

        let mut ship = self
            .ship_data()
            .cloned()
            .unwrap_or_else(|| Ship::from_tuning(&self.tuning));
        ship.projectiles.clear();
        ship.shoot_cooldown = 0;
        ship.refill();
        world.populate(ship);
        world
    }

    fn populate(&mut self, mut ship: Ship) {
        let cfg = self.tuning.level.clone();
        let (width, height) = (cfg.field_width, cfg.field_height);

        let mut regular: Vec<BodyId> = Vec::with_capacity(cfg.num_planets);
        let mut placed: Vec<(Vec2, f32)> = Vec::with_capacity(cfg.num_planets);
        let mut attempts = 0;
        while placed.len() < cfg.num_planets {
            if attempts >= cfg.placement_attempts {
                log::warn!(
                    "Placed {} of {} planets after {} attempts",
                    placed.len(),
                    cfg.num_planets,
                    attempts
                );
                break;
            }
            attempts += 1;

            let pos = field_point(&mut self.rng, width, height);
            let radius = span(&mut self.rng, cfg.planet_radius);
            let clear = placed
                .iter()
                .all(|&(p, r)| pos.distance(p) > cfg.min_planet_distance + r + radius);
            if !clear {
                continue;
            }
            placed.push((pos, radius));

            let color = [
                self.rng.random_range(50..=255),
                self.rng.random_range(50..=255),
                self.rng.random_range(50..=255),
            ];
            let planet = Planet::new(
                self.rng.random_range(10..=50) as f32,
                self.rng.random_range(10..=50) as f32,
                self.rng.random_range(10..=50) as f32,
            )
            .with_color(color);
            let id = self.next_body_id();
            regular.push(self.spawn(Body::planet(id, pos, radius, planet)));
        }

        // After the first level the run may head up or down the field
        let flipped = self.levels_completed > 0 && self.rng.random_bool(0.5);
        let (near, far) = (cfg.edge_margin, height - cfg.edge_margin);
        let (start_y, goal_y) = if flipped { (near, far) } else { (far, near) };
        let start_radius = cfg.start_planet_radius;

        let start_pos = Vec2::new(width / 2.0, start_y);
        let id = self.next_body_id();
        let start = self.spawn(Body::planet(
            id,
            start_pos,
            start_radius,
            Planet::depleted().with_color(START_PLANET_COLOR),
        ));
        self.starting_planet = Some(start);

        let goal_x = span(&mut self.rng, (FIELD_MARGIN, width - FIELD_MARGIN));
        let id = self.next_body_id();
        self.spawn(Body::goal_planet(id, Vec2::new(goal_x, goal_y), start_radius));

        if !regular.is_empty() {
            let shop = regular[self.rng.random_range(0..regular.len())];
            if let Some(planet) = self.body_mut(shop).and_then(Body::as_planet_mut) {
                planet.setup_as_shop();
            }
        }

        for _ in 0..cfg.num_asteroids {
            let pos = field_point(&mut self.rng, width, height);
            let radius = span(&mut self.rng, cfg.asteroid_radius);
            let vel = Vec2::new(
                span(&mut self.rng, (-1.0, 1.0)),
                span(&mut self.rng, (1.0, 25.0)),
            );
            let id = self.next_body_id();
            self.spawn(Body::asteroid(id, pos, radius, vel, ASTEROID_COLOR));
        }

        let extra = cfg.enemies_per_level.saturating_mul(self.levels_completed as usize);
        let enemies = cfg.base_enemies.saturating_add(extra).min(cfg.max_enemies);
        for _ in 0..enemies {
            let pos = field_point(&mut self.rng, width, height);
            let id = self.next_body_id();
            self.spawn(Body::enemy(id, pos));
        }

        // Sitting on top of the start planet, nose away from it
        let offset = start_radius + crate::consts::SHIP_RADIUS;
        let (up, angle) = if flipped { (Vec2::Y, 180.0) } else { (Vec2::NEG_Y, 0.0) };
        let ship_pos = surface_point(start_pos, up, offset);
        ship.landed = true;
        ship.current_planet = Some(start);
        let id = self.next_body_id();
        let mut body = Body::ship(id, ship_pos, ship);
        body.angle = angle;
        self.spawn(body);

        log::info!(
            "Level {} ready: {} planets, {} asteroids, {} enemies ({})",
            self.levels_completed + 1,
            regular.len() + 2,
            cfg.num_asteroids,
            enemies,
            self.model.as_str()
        );
    }
}

/// Uniform sample from `lo..hi`, or `lo` when the range is empty
fn span(rng: &mut Pcg32, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

fn field_point(rng: &mut Pcg32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        span(rng, (FIELD_MARGIN, width - FIELD_MARGIN)),
        span(rng, (FIELD_MARGIN, height - FIELD_MARGIN)),
    )
}
