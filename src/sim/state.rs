//! Duel state and simulation tuning
//!
//! Everything that changes from tick to tick lives in `DuelState`. The arena
//! grid is shared read-only for the whole session.

use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::ArenaGrid;
use super::player::{Player, PlayerSlot, RiderTuning};
use super::projectile::{CombatTuning, Impact, Projectile};
use crate::consts::CLOUD_FIELD_EXTENT;

/// Where a rider starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub z: f32,
    /// Radians
    pub heading: f32,
}

impl SpawnPoint {
    pub const fn new(x: f32, z: f32, heading: f32) -> Self {
        Self { x, z, heading }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

/// Drifting world-space clouds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub count: usize,
    /// World units per tick along +x
    pub drift: f32,
    pub altitude_min: f32,
    pub altitude_max: f32,
    pub seed: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            count: 15,
            drift: 0.04,
            altitude_min: 750.0,
            altitude_max: 1100.0,
            seed: 0x5eed_c10d,
        }
    }
}

/// Everything the tick needs besides state and input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rider: RiderTuning,
    /// `None` disables firing entirely
    pub combat: Option<CombatTuning>,
    pub spawns: [SpawnPoint; 2],
    pub clouds: CloudConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rider: RiderTuning::default(),
            combat: Some(CombatTuning::default()),
            spawns: [
                SpawnPoint::new(15.0, 15.0, 0.0),
                SpawnPoint::new(185.0, 185.0, 0.0),
            ],
            clouds: CloudConfig::default(),
        }
    }
}

/// A decorative cloud (not gameplay-affecting)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub altitude: f32,
}

impl Cloud {
    /// Drift along +x, wrapping at the field edge
    pub fn drift(&mut self, dx: f32) {
        self.pos.x += dx;
        if self.pos.x > CLOUD_FIELD_EXTENT {
            self.pos.x -= 2.0 * CLOUD_FIELD_EXTENT;
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired {
        shooter: PlayerSlot,
        projectile: u32,
    },
    /// A rider's move was rejected by the grid
    WallBump { player: PlayerSlot },
    Impact {
        shooter: PlayerSlot,
        projectile: u32,
        impact: Impact,
        pos: Vec2,
    },
}

/// Complete duel state (deterministic given grid, config and inputs)
#[derive(Debug, Clone)]
pub struct DuelState {
    pub grid: Arc<ArenaGrid>,
    pub players: [Player; 2],
    /// Live projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub clouds: Vec<Cloud>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events emitted by the last tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl DuelState {
    pub fn new(grid: Arc<ArenaGrid>, config: &SimConfig) -> Self {
        let players = PlayerSlot::BOTH.map(|slot| {
            let spawn = config.spawns[slot.index()];
            let pos = grid.clamp_to_interior(spawn.pos());
            if pos != spawn.pos() {
                log::warn!(
                    "Spawn for {:?} at ({}, {}) is outside the arena, moved to ({}, {})",
                    slot,
                    spawn.x,
                    spawn.z,
                    pos.x,
                    pos.y
                );
            }
            if grid.is_solid_at(pos) {
                log::warn!("Spawn for {:?} at ({}, {}) is inside a solid cell", slot, pos.x, pos.y);
            }
            Player::new(slot, pos, spawn.heading)
        });

        Self {
            grid,
            players,
            projectiles: Vec::new(),
            clouds: scatter_clouds(&config.clouds),
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    #[inline]
    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    /// Projectiles currently owned by `slot`
    pub fn in_flight(&self, slot: PlayerSlot) -> usize {
        self.projectiles.iter().filter(|p| p.owner == slot).count()
    }

    pub fn scores(&self) -> [u32; 2] {
        [self.players[0].score, self.players[1].score]
    }
}

fn scatter_clouds(config: &CloudConfig) -> Vec<Cloud> {
    let mut rng = Pcg32::seed_from_u64(config.seed);
    let (lo, hi) = if config.altitude_min <= config.altitude_max {
        (config.altitude_min, config.altitude_max)
    } else {
        (config.altitude_max, config.altitude_min)
    };

    (0..config.count)
        .map(|_| Cloud {
            pos: Vec2::new(
                rng.random_range(-CLOUD_FIELD_EXTENT..CLOUD_FIELD_EXTENT),
                rng.random_range(-CLOUD_FIELD_EXTENT..CLOUD_FIELD_EXTENT),
            ),
            altitude: if hi > lo { rng.random_range(lo..hi) } else { lo },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_places_players_at_spawns() {
        let grid = Arc::new(ArenaGrid::open(200).unwrap());
        let state = DuelState::new(grid, &SimConfig::default());
        assert_eq!(state.player(PlayerSlot::One).pos(), Vec2::new(15.0, 15.0));
        assert_eq!(state.player(PlayerSlot::Two).pos(), Vec2::new(185.0, 185.0));
        assert_eq!(state.scores(), [0, 0]);
        assert_eq!(state.clouds.len(), 15);
    }

    #[test]
    fn test_clouds_are_seeded() {
        let config = CloudConfig::default();
        assert_eq!(scatter_clouds(&config), scatter_clouds(&config));
        for cloud in scatter_clouds(&config) {
            assert!(cloud.pos.x.abs() <= CLOUD_FIELD_EXTENT);
            assert!((750.0..1100.0).contains(&cloud.altitude));
        }
    }

    #[test]
    fn test_cloud_wraps() {
        let mut cloud = Cloud {
            pos: Vec2::new(CLOUD_FIELD_EXTENT - 0.01, 0.0),
            altitude: 800.0,
        };
        cloud.drift(0.04);
        assert!((cloud.pos.x - (0.03 - CLOUD_FIELD_EXTENT)).abs() < 1e-2);
    }

    #[test]
    fn test_entity_ids_increase() {
        let grid = Arc::new(ArenaGrid::open(20).unwrap());
        let mut state = DuelState::new(grid, &SimConfig::default());
        assert_eq!(state.next_entity_id(), 1);
        assert_eq!(state.next_entity_id(), 2);
    }

    #[test]
    fn test_spawns_clamped_into_interior() {
        let grid = Arc::new(ArenaGrid::open(20).unwrap());
        let state = DuelState::new(Arc::clone(&grid), &SimConfig::default());
        assert_eq!(state.player(PlayerSlot::One).pos(), Vec2::new(15.0, 15.0));
        assert_eq!(state.player(PlayerSlot::Two).pos(), Vec2::new(18.5, 18.5));
        assert!(state.players.iter().all(|p| grid.in_interior(p.pos())));
    }
}
