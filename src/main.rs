//! Impetus headless driver
//!
//! Flies a scripted session without a window: loads tuning, lets a simple
//! autopilot play, logs what happens and prints a JSON summary.
//!
//! Usage: `impetus [tuning.json] [seed]`

use std::time::{Duration, Instant};

use impetus::Tuning;
use impetus::sim::{BodyTag, GamePhase, MotionModel, TickInput, UpgradeKind, World, tick};

/// Virtual clock step (60 Hz). The driver passes `FRAME * frame` as `now`,
/// so the oxygen grace period is counted in simulated frames, not wall time.
const FRAME: Duration = Duration::from_micros(16_667);
const MAX_FRAMES: u32 = 60 * 60;
/// Frames between automatic model switches
const MODEL_PERIOD: u32 = 600;
const FIRE_RANGE: f32 = 300.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tuning = args.next().map(|path| load_tuning(&path)).unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5EED);
    log::info!("Impetus (headless) starting, seed {}", seed);

    let started = Instant::now();
    let mut world = World::generate(seed, tuning);
    let mut frames = 0;

    for frame in 0..MAX_FRAMES {
        frames = frame + 1;
        let input = autopilot(&world, frame);
        let phase = tick(&mut world, &input, FRAME * frame);
        for event in &world.events {
            log::debug!("frame {}: {:?}", world.frame, event);
        }

        match phase {
            GamePhase::Playing => {}
            GamePhase::LevelComplete => world = world.next_level(),
            GamePhase::GameOver { cause } => {
                log::info!("Run ended by {:?} on frame {}", cause, frame);
                break;
            }
        }
    }
    log::info!("Simulated {} frames in {:?}", frames, started.elapsed());

    let ship = world.ship_data();
    let summary = serde_json::json!({
        "seed": seed,
        "frames": frames,
        "levels_completed": world.levels_completed,
        "phase": world.phase,
        "model": world.model,
        "enemies_left": world.count(BodyTag::Enemy),
        "ship": ship.map(|s| serde_json::json!({
            "fuel": s.fuel,
            "oxygen": s.oxygen,
            "hull": s.hull,
            "cash": s.cash,
            "landed": s.landed,
        })),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}

fn load_tuning(path: &str) -> Tuning {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Failed to load tuning from {}: {}, using defaults", path, e);
            Tuning::default()
        }
    }
}

/// Demo pilot: refuel, shop, then head for the goal shooting at anything close
fn autopilot(world: &World, frame: u32) -> TickInput {
    let mut input = TickInput {
        select_model: Some(MotionModel::ALL[(frame / MODEL_PERIOD) as usize % MotionModel::ALL.len()]),
        ..Default::default()
    };
    let (Some(body), Some(ship)) = (world.ship(), world.ship_data()) else {
        return input;
    };

    if ship.landed {
        if world.docked_shop().is_some() {
            input.buy = Some(UpgradeKind::ALL[frame as usize % UpgradeKind::ALL.len()]);
        }
        // Stay docked while the planet still has something to give
        input.take_off = ship.current_planet.is_none();
        return input;
    }

    if let Some(goal) = world.goal_planet.and_then(|id| world.body(id)) {
        let to_goal = goal.pos - body.pos;
        let desired = to_goal.x.atan2(-to_goal.y).to_degrees();
        let error = (desired - body.angle + 180.0).rem_euclid(360.0) - 180.0;
        if error.abs() > 3.0 {
            input.rotate = error.signum();
        }
        input.thrust = error.abs() < 30.0 && body.vel.length() < world.max_speed * 0.8;
    }

    input.fire = world
        .enemies
        .iter()
        .filter_map(|&id| world.body(id))
        .any(|enemy| enemy.pos.distance(body.pos) < FIRE_RANGE);

    input
}
