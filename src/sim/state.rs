//! World state
//!
//! The [`World`] owns the active body set and everything global to one level:
//! the selected motion model, the speed cap, phase, and the event log. A new
//! world is built for every level.

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyTag, Planet};
use super::motion::{Attractor, Environment, MotionModel};
use super::ship::{Ship, UpgradeKind};
use crate::tuning::Tuning;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    HullBreached,
    /// Oxygen stayed at zero past the grace period
    Suffocated,
}

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Ship reached the goal planet; the host builds the next level
    LevelComplete,
    /// Run ended (one-way)
    GameOver { cause: GameOverCause },
}

/// Something that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ModelChanged { model: MotionModel },
    Landed { planet: BodyId },
    TookOff,
    /// Docked planet ran dry and the ship let go of it
    Undocked { planet: BodyId },
    Destroyed { id: BodyId, kind: BodyTag },
    ProjectileHit { target: BodyId, kind: BodyTag },
    ShipDamaged { amount: f32 },
    UpgradeBought { kind: UpgradeKind },
    GoalReached,
    GameOver { cause: GameOverCause },
}

/// Simulation context for one level
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    /// Globally selected motion model
    pub model: MotionModel,
    /// Speed cap (starts at `tuning.max_speed`, raised by thrust upgrades)
    pub max_speed: f32,
    pub phase: GamePhase,
    /// Active body set, in update order
    pub bodies: Vec<Body>,
    /// Live enemy ships
    pub enemies: Vec<BodyId>,
    pub ship_id: Option<BodyId>,
    pub starting_planet: Option<BodyId>,
    pub goal_planet: Option<BodyId>,
    pub levels_completed: u32,
    /// Frames simulated this level
    pub frame: u64,
    /// Events from the most recent tick
    pub events: Vec<SimEvent>,
    pub seed: u64,
    /// Host clock reading when oxygen first hit zero
    oxygen_out_since: Option<Duration>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl World {
    /// An empty world; populate with [`World::spawn`] or use `World::generate`
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            model: tuning.initial_model,
            max_speed: tuning.max_speed,
            tuning,
            phase: GamePhase::Playing,
            bodies: Vec::new(),
            enemies: Vec::new(),
            ship_id: None,
            starting_planet: None,
            goal_planet: None,
            levels_completed: 0,
            frame: 0,
            events: Vec::new(),
            seed,
            oxygen_out_since: None,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new body ID
    pub fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a body to the end of the active set
    pub fn spawn(&mut self, mut body: Body) -> BodyId {
        let id = body.id;
        self.next_id = self.next_id.max(id.0 + 1);
        body.model = self.model;
        match body.tag() {
            BodyTag::Ship => self.ship_id = Some(id),
            BodyTag::Enemy => self.enemies.push(id),
            BodyTag::Planet if body.is_goal_planet() => self.goal_planet = Some(id),
            _ => {}
        }
        self.bodies.push(body);
        id
    }

    pub fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|b| b.id == id && b.alive)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let idx = self.index_of(id)?;
        Some(&mut self.bodies[idx])
    }

    pub fn ship_index(&self) -> Option<usize> {
        self.ship_id.and_then(|id| self.index_of(id))
    }

    pub fn ship(&self) -> Option<&Body> {
        self.ship_id.and_then(|id| self.body(id))
    }

    pub fn ship_mut(&mut self) -> Option<&mut Body> {
        let id = self.ship_id?;
        self.body_mut(id)
    }

    /// Ship payload (fuel, oxygen, hull, cash...) for HUDs
    pub fn ship_data(&self) -> Option<&Ship> {
        self.ship().and_then(Body::as_ship)
    }

    pub fn planets(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.alive && b.tag() == BodyTag::Planet)
    }

    pub fn count(&self, tag: BodyTag) -> usize {
        self.bodies.iter().filter(|b| b.alive && b.tag() == tag).count()
    }

    /// Planet the ship is docked at, if it is a shop
    pub fn docked_shop(&self) -> Option<BodyId> {
        let ship = self.ship_data()?;
        if !ship.landed {
            return None;
        }
        let planet_id = ship.current_planet?;
        self.body(planet_id)
            .and_then(Body::as_planet)
            .filter(|planet| planet.is_shop)
            .map(|_| planet_id)
    }

    /// Model switching is frozen while shopping
    pub fn is_shopping(&self) -> bool {
        self.docked_shop().is_some()
    }

    /// Select the global motion model; takes effect at the next sync
    pub fn select_model(&mut self, model: MotionModel) -> bool {
        if self.is_shopping() || model == self.model {
            return false;
        }
        log::info!("Physics: {} -> {}", self.model.as_str(), model.as_str());
        self.model = model;
        self.events.push(SimEvent::ModelChanged { model });
        true
    }

    /// Point every body (and projectile) at the global model
    pub fn sync_models(&mut self) {
        let model = self.model;
        for body in &mut self.bodies {
            body.set_model(model);
        }
    }

    /// Buy an upgrade at the docked shop
    ///
    /// Fails without side effects unless the ship is landed at a shop that
    /// sells `kind` and has the cash for it.
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> bool {
        let Some(shop_id) = self.docked_shop() else {
            log::debug!("Upgrade {} rejected: not docked at a shop", kind.as_str());
            return false;
        };
        let Some(offer) = self
            .body(shop_id)
            .and_then(Body::as_planet)
            .and_then(|planet| planet.upgrades.get(&kind).copied())
        else {
            log::debug!("Upgrade {} rejected: not sold here", kind.as_str());
            return false;
        };
        let Some(ship) = self.ship_mut().and_then(Body::as_ship_mut) else {
            return false;
        };
        if ship.cash < offer.cost {
            log::debug!("Upgrade {} rejected: {} < {}", kind.as_str(), ship.cash, offer.cost);
            return false;
        }

        ship.cash -= offer.cost;
        ship.apply_upgrade(kind, offer.amount);
        if kind == UpgradeKind::Thrust {
            self.max_speed += offer.amount / 10.0;
        }
        log::info!("Bought {} for {}", kind.as_str(), offer.cost);
        self.events.push(SimEvent::UpgradeBought { kind });
        true
    }

    /// Update every body in set order
    ///
    /// Gravity reads positions written earlier in the same pass: each body's
    /// new position is written back to the attractor list right after its
    /// update (Gauss-Seidel ordering).
    pub fn update_bodies(&mut self) {
        let mut attractors: Vec<Attractor> = self.bodies.iter().map(Attractor::from).collect();
        let ship_slot = self.ship_index();
        let gravity = self.tuning.gravity;
        let max_speed = self.max_speed;

        for i in 0..self.bodies.len() {
            if !self.bodies[i].alive {
                continue;
            }
            let player = ship_slot.map(|s| attractors[s].pos);
            let env = Environment::new(&attractors, gravity, max_speed).with_player(player);
            self.bodies[i].update(&env);
            attractors[i].pos = self.bodies[i].pos;

            if Some(i) == ship_slot {
                self.dock_transfer(i);
            }
        }
    }

    /// Docked resource exchange for the ship at `ship_idx`
    fn dock_transfer(&mut self, ship_idx: usize) {
        let Some(planet_id) = self.bodies[ship_idx]
            .as_ship()
            .filter(|ship| ship.landed)
            .and_then(|ship| ship.current_planet)
        else {
            return;
        };
        let Some(planet_idx) = self.index_of(planet_id) else {
            if let Some(ship) = self.bodies[ship_idx].as_ship_mut() {
                ship.current_planet = None;
            }
            return;
        };
        let Some((ship_body, planet_body)) = pair_mut(&mut self.bodies, ship_idx, planet_idx) else {
            return;
        };
        let (Some(ship), Some(planet)) = (ship_body.as_ship_mut(), planet_body.as_planet_mut()) else {
            return;
        };

        if ship.transfer_from(planet) {
            ship.current_planet = None;
            log::debug!("Planet {:?} exhausted, undocking", planet_id);
            self.events.push(SimEvent::Undocked { planet: planet_id });
        }
    }

    /// Flag a body as destroyed; it is dropped at the end of the tick
    pub fn destroy(&mut self, idx: usize) {
        let Some(body) = self.bodies.get_mut(idx) else {
            return;
        };
        if !body.alive {
            return;
        }
        body.alive = false;
        let (id, kind) = (body.id, body.tag());
        self.enemies.retain(|&e| e != id);
        log::debug!("Destroyed {:?} {:?}", kind, id);
        self.events.push(SimEvent::Destroyed { id, kind });
    }

    /// Drop destroyed bodies from the active set
    pub fn compact(&mut self) {
        self.bodies.retain(|b| b.alive);
    }

    /// Hull, oxygen and goal checks after the update pass
    ///
    /// `now` is a monotonic host clock reading; the oxygen grace period is
    /// measured against it, not against frame count.
    pub fn check_terminal(&mut self, now: Duration) -> GamePhase {
        let Some(ship_body) = self.ship() else {
            return self.phase;
        };
        let Some(ship) = ship_body.as_ship() else {
            return self.phase;
        };
        let (oxygen, hull, pos, radius) = (ship.oxygen, ship.hull, ship_body.pos, ship_body.radius);

        if oxygen <= 0.0 {
            match self.oxygen_out_since {
                None => self.oxygen_out_since = Some(now),
                Some(since) => {
                    let grace = Duration::from_millis(self.tuning.oxygen_grace_ms);
                    if now.saturating_sub(since) >= grace {
                        self.end_run(GameOverCause::Suffocated);
                        return self.phase;
                    }
                }
            }
        } else {
            self.oxygen_out_since = None;
        }

        if hull <= 0.0 {
            self.end_run(GameOverCause::HullBreached);
            return self.phase;
        }

        let reached = self
            .goal_planet
            .and_then(|id| self.body(id))
            .is_some_and(|goal| pos.distance(goal.pos) < goal.radius + radius);
        if reached {
            log::info!("Goal reached after {} frames", self.frame);
            self.phase = GamePhase::LevelComplete;
            self.events.push(SimEvent::GoalReached);
        }
        self.phase
    }

    fn end_run(&mut self, cause: GameOverCause) {
        log::info!("Game over: {:?}", cause);
        self.phase = GamePhase::GameOver { cause };
        self.events.push(SimEvent::GameOver { cause });
    }

    /// Under Aristotelian physics force must be reapplied every frame
    pub fn release_thrust(&mut self) {
        for body in &mut self.bodies {
            body.thrusting = false;
            body.accel = Vec2::ZERO;
        }
    }

    /// Planet lookup for renderers (resource labels, "Harvested" tag)
    pub fn planet(&self, id: BodyId) -> Option<&Planet> {
        self.body(id).and_then(Body::as_planet)
    }
}

/// Mutable access to two distinct bodies
pub(crate) fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> Option<(&mut Body, &mut Body)> {
    if i == j || i >= bodies.len() || j >= bodies.len() {
        return None;
    }
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}
