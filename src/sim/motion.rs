//! Motion models
//!
//! Three interchangeable laws of motion, selected globally at runtime:
//! - Newtonian: inverse-square gravity between all bodies, inertia kept
//! - Buridan: impressed force slowly dissipates, constant downward pull
//! - Aristotelian: no motion without a continuously applied force
//!
//! All models integrate with semi-implicit Euler (velocity first, then
//! position) and clamp the resulting speed to the global cap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use crate::clamp_speed;
use crate::consts::*;

/// The active law of motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MotionModel {
    #[default]
    Newtonian,
    Buridan,
    Aristotelian,
}

impl MotionModel {
    pub const ALL: [MotionModel; 3] = [
        MotionModel::Newtonian,
        MotionModel::Buridan,
        MotionModel::Aristotelian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionModel::Newtonian => "Newtonian",
            MotionModel::Buridan => "Buridan",
            MotionModel::Aristotelian => "Aristotelian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "newtonian" | "newton" => Some(MotionModel::Newtonian),
            "buridan" => Some(MotionModel::Buridan),
            "aristotelian" | "aristotle" => Some(MotionModel::Aristotelian),
            _ => None,
        }
    }

    /// Whether bodies keep moving without force (impulses and damping apply)
    pub fn has_inertia(&self) -> bool {
        !matches!(self, MotionModel::Aristotelian)
    }

    /// Advance one body by one frame
    ///
    /// Writes `vel`, `pos` and `net_accel`. Landed ships are left untouched.
    pub fn apply(self, body: &mut Body, env: &Environment<'_>) {
        if body.is_landed() {
            return;
        }
        body.net_accel = Vec2::ZERO;

        match self {
            MotionModel::Newtonian => {
                for other in env.attractors {
                    if other.id == body.id {
                        continue;
                    }
                    let r = other.pos - body.pos;
                    let r2 = r.length_squared();
                    if r2 > MIN_GRAVITY_DIST_SQ {
                        let acc = r.normalize() * (env.gravity * other.mass / r2);
                        body.net_accel += acc;
                        body.vel += acc;
                    }
                }
                body.vel += body.accel;
                body.net_accel += body.accel;
            }
            MotionModel::Buridan => {
                body.vel *= BURIDAN_DECAY;
                let fall = Vec2::Y * BURIDAN_FALL;
                body.net_accel += fall;
                body.vel += fall;
                body.vel += body.accel;
                body.net_accel += body.accel;
            }
            MotionModel::Aristotelian => {
                // Natural motion has no direction yet: the base vector is zero,
                // so this term is always zero.
                let natural = if body.natural {
                    Vec2::ZERO * (ARISTOTLE_NATURAL_SCALE * body.mass / 100.0)
                } else {
                    Vec2::ZERO
                };
                body.net_accel += natural;
                if body.thrusting {
                    body.vel = body.accel * ARISTOTLE_THRUST_SCALE + natural;
                } else {
                    body.vel += body.net_accel;
                    if natural.length_squared() == 0.0 {
                        body.vel = Vec2::ZERO;
                    }
                }
            }
        }

        body.pos += body.vel;
        body.vel = clamp_speed(body.vel, env.max_speed);
    }
}

/// A gravity source: the position and mass of one body in the active set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    pub id: BodyId,
    pub pos: Vec2,
    pub mass: f32,
}

impl From<&Body> for Attractor {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id,
            pos: body.pos,
            mass: body.mass,
        }
    }
}

/// Everything a body can see of the rest of the world during its update
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
    /// Gravity sources, positions as of the latest write-back this frame
    pub attractors: &'a [Attractor],
    /// Player ship position (enemies pursue it)
    pub player: Option<Vec2>,
    pub gravity: f32,
    pub max_speed: f32,
}

impl<'a> Environment<'a> {
    pub fn new(attractors: &'a [Attractor], gravity: f32, max_speed: f32) -> Self {
        Self {
            attractors,
            player: None,
            gravity,
            max_speed,
        }
    }

    pub fn with_player(mut self, player: Option<Vec2>) -> Self {
        self.player = player;
        self
    }
}
