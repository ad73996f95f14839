//! Per-frame simulation step
//!
//! Order within a frame is part of the contract: later stages read what
//! earlier stages wrote in the same frame.
//!
//! 1. Shop purchases and model selection, then ship controls
//! 2. Model sync (frozen while shopping)
//! 3. Body updates in set order
//! 4. Terminal checks (suffocation, hull breach, goal)
//! 5. Projectile impacts, then pairwise collisions
//! 6. Take-off, then removal of destroyed bodies

use std::time::Duration;

use super::collision::{resolve_collisions, resolve_projectile_hits};
use super::motion::MotionModel;
use super::ship::UpgradeKind;
use super::state::{GamePhase, SimEvent, World};

/// Player intents for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Turn input in rotate units (-1 left, +1 right)
    pub rotate: f32,
    /// Hold thrust
    pub thrust: bool,
    /// Throttle steps (+ up, - down)
    pub throttle: i32,
    pub fire: bool,
    pub take_off: bool,
    /// Switch the global motion model
    pub select_model: Option<MotionModel>,
    /// Buy at the docked shop
    pub buy: Option<UpgradeKind>,
    /// Debug refill of fuel, oxygen and hull
    pub refill: bool,
}

/// Advance the world by one frame
///
/// `now` is a monotonic host clock reading. Returns the phase after the
/// frame; a world that is not `Playing` is left untouched.
pub fn tick(world: &mut World, input: &TickInput, now: Duration) -> GamePhase {
    if world.phase != GamePhase::Playing {
        return world.phase;
    }
    world.events.clear();
    world.frame += 1;

    if let Some(kind) = input.buy {
        world.buy_upgrade(kind);
    }
    if let Some(model) = input.select_model {
        world.select_model(model);
    }
    steer(world, input);

    if !world.is_shopping() {
        world.sync_models();
    }

    world.update_bodies();

    if world.check_terminal(now) != GamePhase::Playing {
        world.compact();
        return world.phase;
    }

    // Force must be reapplied every frame under Aristotle
    if world.model == MotionModel::Aristotelian {
        world.release_thrust();
    }

    resolve_projectile_hits(world);
    resolve_collisions(world);

    if input.take_off {
        let launch_speed = world.tuning.launch_speed;
        if world.ship_mut().is_some_and(|ship| ship.take_off(launch_speed)) {
            log::info!("Took off");
            world.events.push(SimEvent::TookOff);
        }
    }

    world.compact();
    world.phase
}

fn steer(world: &mut World, input: &TickInput) {
    let shot_id = input.fire.then(|| world.next_body_id());
    let Some(ship) = world.ship_mut() else {
        return;
    };

    if input.rotate != 0.0 {
        ship.rotate(input.rotate);
    }
    if input.thrust {
        ship.apply_thrust();
    } else {
        ship.stop_thrust();
    }
    if input.throttle != 0 {
        ship.adjust_throttle(input.throttle);
    }
    if input.refill {
        if let Some(data) = ship.as_ship_mut() {
            data.refill();
        }
    }
    if let Some(id) = shot_id {
        ship.shoot(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{Body, BodyId, BodyTag, Planet};
    use crate::sim::ship::Ship;
    use crate::sim::state::{GameOverCause, pair_mut};
    use crate::tuning::Tuning;
    use glam::Vec2;

    const FRAME: Duration = Duration::from_millis(16);

    fn at(frame: u32) -> Duration {
        FRAME * frame
    }

    /// A lone ship at `pos`
    fn open_space(pos: Vec2) -> World {
        let mut world = World::new(3, Tuning::default());
        let id = world.next_body_id();
        world.spawn(Body::ship(id, pos, Ship::default()));
        world
    }

    fn landed_world() -> (World, BodyId) {
        let mut world = open_space(Vec2::new(0.0, -110.0));
        let planet = world.next_body_id();
        world.spawn(Body::planet(planet, Vec2::ZERO, 100.0, Planet::new(50.0, 50.0, 50.0)));
        let (ship_idx, planet_idx) = (0, 1);
        if let Some((ship, planet)) = pair_mut(&mut world.bodies, ship_idx, planet_idx) {
            ship.land(planet);
        }
        (world, planet)
    }

    #[test]
    fn test_landed_ship_stays_put() {
        let (mut world, _) = landed_world();
        let before = world.ship().map(|s| (s.pos, s.vel, s.accel)).expect("ship");

        let input = TickInput {
            rotate: 1.0,
            thrust: true,
            ..Default::default()
        };
        for frame in 0..120 {
            tick(&mut world, &input, at(frame));
        }
        assert_eq!(world.ship().map(|s| (s.pos, s.vel, s.accel)), Some(before));
        assert_eq!(world.ship().map(|s| s.angle), Some(0.0));
    }

    #[test]
    fn test_take_off_then_fly() {
        let (mut world, planet) = landed_world();
        let input = TickInput {
            take_off: true,
            ..Default::default()
        };
        tick(&mut world, &input, at(0));

        let ship = world.ship().expect("ship");
        assert!(!ship.is_landed());
        assert!(ship.vel.y < 0.0);
        assert!(world.events.contains(&SimEvent::TookOff));

        // Oxygen starts draining once airborne
        tick(&mut world, &TickInput::default(), at(1));
        let oxygen = world.ship_data().map(|s| s.oxygen).expect("ship");
        assert!(oxygen < 100.0);
        assert!(world.planet(planet).is_some_and(|p| p.harvested));
    }

    #[test]
    fn test_fire_spawns_projectile() {
        let mut world = open_space(Vec2::ZERO);
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &input, at(0));
        tick(&mut world, &input, at(1));

        let ship = world.ship_data().expect("ship");
        assert_eq!(ship.projectiles.len(), 1);
        assert_ne!(ship.projectiles[0].id, BodyId(1));
    }

    #[test]
    fn test_projectile_with_one_frame_left_expires() {
        let mut world = open_space(Vec2::ZERO);
        let id = world.next_body_id();
        if let Some(ship) = world.ship_mut().and_then(Body::as_ship_mut) {
            let mut shot = Body::projectile(id, Vec2::new(0.0, -50.0), 0.0, MotionModel::Newtonian);
            if let Some(p) = shot.as_projectile_mut() {
                p.lifetime = 1;
            }
            ship.projectiles.push(shot);
        }

        tick(&mut world, &TickInput::default(), at(0));
        assert_eq!(world.ship_data().map(|s| s.projectiles.len()), Some(0));
    }

    #[test]
    fn test_aristotelian_stops_without_force() {
        let mut world = open_space(Vec2::ZERO);
        world.select_model(MotionModel::Aristotelian);
        let rock = world.next_body_id();
        world.spawn(Body::asteroid(rock, Vec2::new(500.0, 0.0), 10.0, Vec2::ZERO, [128; 3]));
        if let Some(ship) = world.ship_mut() {
            ship.vel = Vec2::new(4.0, -3.0);
        }

        let thrust = TickInput {
            thrust: true,
            ..Default::default()
        };
        tick(&mut world, &thrust, at(0));
        let ship = world.ship().expect("ship");
        assert!(ship.vel.length() > 0.0);
        assert!(!ship.thrusting);
        assert_eq!(ship.accel, Vec2::ZERO);

        tick(&mut world, &TickInput::default(), at(1));
        assert_eq!(world.ship().map(|s| s.vel), Some(Vec2::ZERO));
    }

    #[test]
    fn test_model_switch_keeps_velocity() {
        let mut world = open_space(Vec2::ZERO);
        world.select_model(MotionModel::Aristotelian);
        tick(&mut world, &TickInput::default(), at(0));
        if let Some(ship) = world.ship_mut() {
            ship.vel = Vec2::new(1.0, 1.0);
        }

        let input = TickInput {
            select_model: Some(MotionModel::Buridan),
            ..Default::default()
        };
        tick(&mut world, &input, at(1));
        let ship = world.ship().expect("ship");
        assert_eq!(ship.model, MotionModel::Buridan);
        // Carried across, then one Buridan step
        assert!((ship.vel.x - crate::consts::BURIDAN_DECAY).abs() < 1e-5);
        assert!(world.events.contains(&SimEvent::ModelChanged { model: MotionModel::Buridan }));
    }

    #[test]
    fn test_enemy_ram_through_tick() {
        let mut world = open_space(Vec2::ZERO);
        let enemy = world.next_body_id();
        world.spawn(Body::enemy(enemy, Vec2::new(0.0, 30.0)));

        // Enemy chases at its pursuit speed and closes the 30px gap
        let mut phase = GamePhase::Playing;
        for frame in 0..20 {
            phase = tick(&mut world, &TickInput::default(), at(frame));
            if world.count(BodyTag::Enemy) == 0 {
                break;
            }
        }
        assert_eq!(phase, GamePhase::Playing);
        assert_eq!(world.count(BodyTag::Enemy), 0);
        assert!(world.enemies.is_empty());
        assert!(world.bodies.iter().all(|b| b.alive));
        assert!(world.ship_data().is_some_and(|s| s.hull < 100.0));
    }

    #[test]
    fn test_suffocation_ends_run() {
        let mut world = open_space(Vec2::ZERO);
        if let Some(ship) = world.ship_mut().and_then(Body::as_ship_mut) {
            ship.oxygen = 0.0;
        }

        let mut phase = GamePhase::Playing;
        for frame in 0..400 {
            phase = tick(&mut world, &TickInput::default(), at(frame));
            if phase != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(phase, GamePhase::GameOver { cause: GameOverCause::Suffocated });
        assert!(world.frame * 16 >= 5000);

        // Terminal: further ticks are no-ops
        let frame = world.frame;
        assert_eq!(tick(&mut world, &TickInput::default(), at(1000)), phase);
        assert_eq!(world.frame, frame);
    }

    #[test]
    fn test_reaching_goal_completes_level() {
        let mut world = open_space(Vec2::new(0.0, -165.0));
        let goal = world.next_body_id();
        world.spawn(Body::goal_planet(goal, Vec2::ZERO, 150.0));
        if let Some(ship) = world.ship_mut() {
            ship.vel = Vec2::new(0.0, 5.0);
        }

        let phase = tick(&mut world, &TickInput::default(), at(0));
        assert_eq!(phase, GamePhase::LevelComplete);
        assert!(world.events.contains(&SimEvent::GoalReached));
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut a = World::generate(4242, tuning.clone());
        let mut b = World::generate(4242, tuning);

        let inputs = [
            TickInput {
                take_off: true,
                ..Default::default()
            },
            TickInput {
                thrust: true,
                rotate: 1.0,
                fire: true,
                ..Default::default()
            },
            TickInput {
                select_model: Some(MotionModel::Buridan),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for frame in 0..240 {
            let input = &inputs[frame % inputs.len()];
            let now = at(frame as u32);
            tick(&mut a, input, now);
            tick(&mut b, input, now);
        }

        assert_eq!(a.frame, b.frame);
        assert_eq!(a.phase, b.phase);
        let snapshot = |w: &World| serde_json::to_string(&w.bodies).expect("serializable");
        assert_eq!(snapshot(&a), snapshot(&b));
    }
}
