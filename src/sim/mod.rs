//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (slot One before slot Two, projectiles by id)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod grid;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;

pub use body::{BodyKind, KinematicBody};
pub use collision::{MoveOutcome, WallResponse, accepts, resolve_move};
pub use grid::{ArenaGrid, GridError, MIN_GRID_SIZE, Material};
pub use player::{ControlState, Player, PlayerSlot, RiderTuning, ThrottleModel};
pub use projectile::{CombatTuning, Impact, Projectile, ProjectileLaunch};
pub use state::{Cloud, CloudConfig, DuelState, GameEvent, SimConfig, SpawnPoint};
pub use tick::{TickInput, tick};
