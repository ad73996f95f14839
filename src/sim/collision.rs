//! Collision detection and response between circular bodies
//!
//! Every unordered pair in the active set is tested once per frame. A few
//! pairings have gameplay rules that replace physical response entirely
//! (enemy rams, asteroid strikes, touchdown); everything else is pushed
//! apart and, under models with inertia, exchanges an impulse.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::body::{Body, BodyTag};
use super::state::{SimEvent, World, pair_mut};
use crate::{bottom, direction_or};

/// Geometry of one overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from `a` toward `b` (+X when the centers coincide)
    pub normal: Vec2,
    /// Center distance
    pub distance: f32,
    /// Overlap depth, positive when the circles intersect
    pub penetration: f32,
}

impl Contact {
    pub fn between(a: &Body, b: &Body) -> Self {
        let delta = b.pos - a.pos;
        let distance = delta.length();
        Self {
            normal: direction_or(delta, Vec2::X),
            distance,
            penetration: a.radius + b.radius - distance,
        }
    }
}

/// Circle overlap test; the goal planet never collides
pub fn overlaps(a: &Body, b: &Body) -> bool {
    if a.is_goal_planet() || b.is_goal_planet() {
        return false;
    }
    a.pos.distance(b.pos) < a.radius + b.radius
}

/// Whether `ship` is coming down feet-first onto `planet`'s surface
pub fn landing_aligned(ship: &Body, planet: &Body, alignment: f32, tolerance: f32) -> bool {
    let delta = planet.pos - ship.pos;
    let gap = delta.length() - (ship.radius + planet.radius);
    let facing = bottom(ship.angle).dot(direction_or(delta, Vec2::X));
    gap.abs() < tolerance && facing > alignment
}

/// Push an overlapping pair apart, half the overlap each
///
/// Immovable bodies (planets, landed ships) are not corrected.
pub fn separate(a: &mut Body, b: &mut Body, contact: &Contact) {
    if contact.penetration <= 0.0 {
        return;
    }
    let correction = contact.normal * (contact.penetration / 2.0);
    if !a.is_immovable() {
        a.pos -= correction;
    }
    if !b.is_immovable() {
        b.pos += correction;
    }
}

/// Mass-weighted velocity exchange for an approaching pair
///
/// Returns the approach speed along the normal, or `None` when the bodies
/// are already separating or neither of them can move.
pub fn exchange_impulse(a: &mut Body, b: &mut Body, contact: &Contact, restitution: f32) -> Option<f32> {
    if a.is_immovable() && b.is_immovable() {
        return None;
    }
    let vel_along_normal = (b.vel - a.vel).dot(contact.normal);
    if vel_along_normal > 0.0 {
        return None;
    }
    let total_mass = a.mass + b.mass;
    if total_mass <= 0.0 {
        return None;
    }

    let impulse = contact.normal * (restitution * vel_along_normal / total_mass);
    if !a.is_immovable() {
        a.vel += impulse * b.mass;
    }
    if !b.is_immovable() {
        b.vel -= impulse * a.mass;
    }
    Some(vel_along_normal.abs())
}

/// Resolve every overlapping pair in the active set
pub fn resolve_collisions(world: &mut World) {
    let n = world.bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            // Bodies destroyed earlier in the pass take no further pairs
            if !world.bodies[i].alive {
                break;
            }
            if !world.bodies[j].alive || !overlaps(&world.bodies[i], &world.bodies[j]) {
                continue;
            }
            resolve_pair(world, i, j);
        }
    }
}

fn resolve_pair(world: &mut World, i: usize, j: usize) {
    let (ta, tb) = (world.bodies[i].tag(), world.bodies[j].tag());

    match (ta, tb) {
        (BodyTag::Ship, BodyTag::Enemy) => return ram(world, i, j),
        (BodyTag::Enemy, BodyTag::Ship) => return ram(world, j, i),
        _ => {}
    }

    if ta == BodyTag::Asteroid || tb == BodyTag::Asteroid {
        return asteroid_strike(world, i, j);
    }

    let touchdown = match (ta, tb) {
        (BodyTag::Ship, BodyTag::Planet) => Some((i, j)),
        (BodyTag::Planet, BodyTag::Ship) => Some((j, i)),
        _ => None,
    };
    if let Some((ship, planet)) = touchdown {
        if try_land(world, ship, planet) {
            return;
        }
    }

    bounce(world, i, j);
}

/// Enemy hits the player: damage by enemy speed, enemy is lost
fn ram(world: &mut World, ship_idx: usize, enemy_idx: usize) {
    let amount = world.bodies[enemy_idx].vel.length() * world.tuning.damage_scale;
    damage_ship(world, ship_idx, amount);
    world.destroy(enemy_idx);
}

/// Asteroids shatter on any contact; ships take a flat hit
fn asteroid_strike(world: &mut World, i: usize, j: usize) {
    let amount = world.tuning.asteroid_impact * world.tuning.damage_scale;
    for idx in [i, j] {
        if world.bodies[idx].tag() == BodyTag::Ship {
            damage_ship(world, idx, amount);
        }
    }
    for idx in [i, j] {
        if world.bodies[idx].tag() == BodyTag::Asteroid {
            world.destroy(idx);
        }
    }
}

fn try_land(world: &mut World, ship_idx: usize, planet_idx: usize) -> bool {
    let (alignment, tolerance) = (world.tuning.landing_alignment, world.tuning.landing_tolerance);
    let Some((ship, planet)) = pair_mut(&mut world.bodies, ship_idx, planet_idx) else {
        return false;
    };
    if ship.is_landed() || !landing_aligned(ship, planet, alignment, tolerance) {
        return false;
    }
    if !ship.land(planet) {
        return false;
    }
    log::info!("Landed on {:?}", planet.id);
    world.events.push(SimEvent::Landed { planet: planet.id });
    true
}

/// Generic response: separation, then impulse, damage and spin
fn bounce(world: &mut World, i: usize, j: usize) {
    let restitution = world.tuning.restitution;
    let damage_scale = world.tuning.damage_scale;
    let spin_range = world.tuning.spin_range;
    let has_inertia = world.model.has_inertia();

    let Some((a, b)) = pair_mut(&mut world.bodies, i, j) else {
        return;
    };
    let contact = Contact::between(a, b);
    separate(a, b, &contact);

    // No inertia, nothing to exchange
    if !has_inertia {
        return;
    }
    let Some(force) = exchange_impulse(a, b, &contact, restitution) else {
        return;
    };

    for body in [a, b] {
        let Some(ship) = body.as_ship_mut() else {
            continue;
        };
        let amount = force * damage_scale;
        if amount > 0.0 {
            ship.take_damage(amount);
            world.events.push(SimEvent::ShipDamaged { amount });
        }
        body.rotate(spin(&mut world.rng, spin_range));
    }
}

fn damage_ship(world: &mut World, idx: usize, amount: f32) {
    if let Some(ship) = world.bodies[idx].as_ship_mut() {
        ship.take_damage(amount);
        log::debug!("Ship hit for {:.1}, hull {:.1}", amount, ship.hull);
        world.events.push(SimEvent::ShipDamaged { amount });
    }
}

/// Random impact spin in rotate units, either direction
fn spin(rng: &mut Pcg32, (lo, hi): (u32, u32)) -> f32 {
    let magnitude = rng.random_range(lo.min(hi)..=lo.max(hi)) as f32;
    if rng.random_bool(0.5) { magnitude } else { -magnitude }
}

/// Projectile impacts for the frame
///
/// Each live shot stops at the first body it touches. Enemies lose hull and
/// are destroyed at zero; anything else just absorbs the shot.
pub fn resolve_projectile_hits(world: &mut World) {
    let Some(ship_idx) = world.ship_index() else {
        return;
    };
    let Some(mut shots) = world.bodies[ship_idx]
        .as_ship_mut()
        .map(|ship| std::mem::take(&mut ship.projectiles))
    else {
        return;
    };

    for shot in &mut shots {
        let (pos, radius) = (shot.pos, shot.radius);
        let Some(projectile) = shot.as_projectile_mut().filter(|p| p.lifetime > 0) else {
            continue;
        };
        let hit = world.bodies.iter().enumerate().position(|(idx, body)| {
            idx != ship_idx && body.alive && pos.distance(body.pos) < radius + body.radius
        });
        let Some(target) = hit else {
            continue;
        };

        projectile.lifetime = 0;
        let damage = projectile.damage;
        let (id, kind) = (world.bodies[target].id, world.bodies[target].tag());
        world.events.push(SimEvent::ProjectileHit { target: id, kind });

        let killed = world.bodies[target].as_enemy_mut().is_some_and(|enemy| {
            enemy.take_damage(damage);
            enemy.is_destroyed()
        });
        if killed {
            world.destroy(target);
        }
    }

    shots.retain(|shot| shot.as_projectile().is_some_and(|p| p.lifetime > 0));
    if let Some(ship) = world.bodies[ship_idx].as_ship_mut() {
        ship.projectiles = shots;
    }
}
