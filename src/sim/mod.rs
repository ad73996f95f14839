//! Simulation module
//!
//! All physics and gameplay rules live here. The module is headless and
//! deterministic for a given seed and input sequence:
//! - One step per host frame, units of pixels and frames
//! - Seeded RNG only (impact spin, level layout)
//! - Stable update order (the order of the active body set)
//! - No rendering or platform dependencies
//!
//! The one wall-clock input is the `now` reading passed to [`tick`], used
//! only for the oxygen grace period.

pub mod body;
pub mod collision;
pub mod level;
pub mod motion;
pub mod ship;
pub mod state;
pub mod tick;

pub use body::{Asteroid, Body, BodyId, BodyKind, BodyTag, EnemyShip, Planet, Projectile};
pub use collision::{Contact, resolve_collisions, resolve_projectile_hits};
pub use motion::{Attractor, Environment, MotionModel};
pub use ship::{Ship, Upgrade, UpgradeKind, shop_catalogue};
pub use state::{GameOverCause, GamePhase, SimEvent, World};
pub use tick::{TickInput, tick};
