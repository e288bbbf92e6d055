//! Rockets fired by riders in combat sessions
//!
//! A projectile flies at constant speed along its heading. Each tick the move is
//! split into substeps no longer than `max_substep` so it cannot tunnel through
//! a one-cell wall or past the target's proximity radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, KinematicBody};
use super::collision::{MoveOutcome, WallResponse, resolve_move};
use super::grid::ArenaGrid;
use super::player::{Player, PlayerSlot};

/// Slowest launch speed; a projectile that never moves would never be removed
pub const MIN_LAUNCH_SPEED: f32 = 0.1;

/// Launch speed policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectileLaunch {
    /// Always this many world units per tick
    Fixed { speed: f32 },
    /// Shooter's current speed plus `bonus`
    Inherited { bonus: f32 },
}

/// Combat tuning; absent in non-combat sessions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Ticks between shots
    pub cooldown_ticks: u32,
    /// Cap on a rider's simultaneous projectiles (None = unlimited)
    pub max_in_flight: Option<usize>,
    /// Spawn distance ahead of the shooter
    pub spawn_offset: f32,
    pub launch: ProjectileLaunch,
    /// A projectile closer than this to the opponent hits them
    pub proximity_radius: f32,
    /// Points credited to the shooter per hit
    pub hit_score: u32,
    /// Longest single substep when sweeping a projectile
    pub max_substep: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            cooldown_ticks: 20,
            max_in_flight: None,
            spawn_offset: 3.0,
            launch: ProjectileLaunch::Fixed { speed: 2.8 },
            proximity_radius: 3.5,
            hit_score: 1,
            max_substep: 0.5,
        }
    }
}

/// Why a projectile was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    HitWall,
    HitPlayer,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::HitWall => "hit_wall",
            Impact::HitPlayer => "hit_player",
        }
    }
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: PlayerSlot,
    pub body: KinematicBody,
}

impl Projectile {
    /// Advance one tick; `Some` means the projectile is spent
    pub fn advance(&mut self, grid: &ArenaGrid, target: Vec2, tuning: &CombatTuning) -> Option<Impact> {
        let full_speed = self.body.speed;
        let impact = sweep(&mut self.body, grid, Some((target, tuning.proximity_radius)), tuning.max_substep);
        self.body.speed = full_speed;
        impact
    }
}

/// Whether `player` may fire this tick
pub fn can_fire(player: &Player, in_flight: usize, tuning: &CombatTuning) -> bool {
    player.cooldown == 0 && tuning.max_in_flight.is_none_or(|cap| in_flight < cap)
}

/// Spawn a projectile ahead of `player`. The path from the rider to the spawn
/// point is swept first; a wall in between spends the shot immediately.
pub fn launch(player: &Player, id: u32, grid: &ArenaGrid, tuning: &CombatTuning) -> Result<Projectile, Impact> {
    let mut body = KinematicBody::new(
        BodyKind::Projectile,
        player.pos(),
        player.heading(),
        tuning.spawn_offset,
    );
    if let Some(impact) = sweep(&mut body, grid, None, tuning.max_substep) {
        return Err(impact);
    }

    body.speed = match tuning.launch {
        ProjectileLaunch::Fixed { speed } => speed,
        ProjectileLaunch::Inherited { bonus } => player.body.speed + bonus,
    }
    .max(MIN_LAUNCH_SPEED);

    Ok(Projectile {
        id,
        owner: player.slot,
        body,
    })
}

/// Move `body` by its speed in short substeps, stopping at the first wall or
/// proximity contact. Leaves `body.speed` set to the substep length.
fn sweep(
    body: &mut KinematicBody,
    grid: &ArenaGrid,
    target: Option<(Vec2, f32)>,
    max_substep: f32,
) -> Option<Impact> {
    let distance = body.speed;
    let steps = (distance.abs() / max_substep.max(f32::EPSILON)).ceil().max(1.0) as u32;
    body.speed = distance / steps as f32;

    for _ in 0..steps {
        if resolve_move(body, grid, WallResponse::Despawn) == MoveOutcome::HitWall {
            return Some(Impact::HitWall);
        }
        if let Some((pos, radius)) = target {
            if body.distance_to(pos) < radius {
                return Some(Impact::HitPlayer);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shooter_at(pos: Vec2, heading: f32) -> Player {
        Player::new(PlayerSlot::One, pos, heading)
    }

    #[test]
    fn test_wall_one_unit_away_is_hit_immediately() {
        // Solid column at x = 6
        let mut rows = vec![vec![0u8; 20]; 20];
        rows[6] = vec![4; 20];
        let grid = ArenaGrid::from_rows(rows).unwrap();
        let tuning = CombatTuning::default();
        let shooter = shooter_at(Vec2::new(5.0, 10.0), 0.0);

        assert_eq!(launch(&shooter, 1, &grid, &tuning), Err(Impact::HitWall));
    }

    #[test]
    fn test_projectile_reaches_wall_in_bounded_ticks() {
        let mut rows = vec![vec![0u8; 40]; 40];
        rows[30] = vec![5; 40];
        let grid = ArenaGrid::from_rows(rows).unwrap();
        let tuning = CombatTuning::default();
        let shooter = shooter_at(Vec2::new(5.0, 20.0), 0.0);
        let mut projectile = launch(&shooter, 1, &grid, &tuning).unwrap();
        let far_target = Vec2::new(5.0, 2.0);

        let mut outcome = None;
        for _ in 0..20 {
            outcome = projectile.advance(&grid, far_target, &tuning);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(Impact::HitWall));
        assert!(projectile.body.pos.x < 30.0);
    }

    #[test]
    fn test_thin_wall_is_not_tunneled() {
        let mut rows = vec![vec![0u8; 40]; 40];
        rows[12] = vec![4; 40];
        let grid = ArenaGrid::from_rows(rows).unwrap();
        let tuning = CombatTuning {
            launch: ProjectileLaunch::Fixed { speed: 5.0 },
            ..Default::default()
        };
        let shooter = shooter_at(Vec2::new(5.0, 20.0), 0.0);
        let mut projectile = launch(&shooter, 1, &grid, &tuning).unwrap();
        assert_eq!(
            projectile.advance(&grid, Vec2::new(30.0, 20.0), &tuning),
            Some(Impact::HitWall)
        );
    }

    #[test]
    fn test_proximity_hit() {
        let grid = ArenaGrid::open(60).unwrap();
        let tuning = CombatTuning::default();
        let shooter = shooter_at(Vec2::new(10.0, 30.0), 0.0);
        let mut projectile = launch(&shooter, 1, &grid, &tuning).unwrap();
        let target = Vec2::new(20.0, 31.0);

        let mut outcome = None;
        for _ in 0..10 {
            outcome = projectile.advance(&grid, target, &tuning);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(Impact::HitPlayer));
        assert!(projectile.body.distance_to(target) < tuning.proximity_radius);
    }

    #[test]
    fn test_advance_keeps_speed() {
        let grid = ArenaGrid::open(60).unwrap();
        let tuning = CombatTuning::default();
        let shooter = shooter_at(Vec2::new(10.0, 30.0), 0.0);
        let mut projectile = launch(&shooter, 1, &grid, &tuning).unwrap();
        let _ = projectile.advance(&grid, Vec2::new(50.0, 50.0), &tuning);
        assert!((projectile.body.speed - 2.8).abs() < 1e-6);
        assert!((projectile.body.pos.x - 15.8).abs() < 1e-3);
    }

    #[test]
    fn test_inherited_launch_speed() {
        let grid = ArenaGrid::open(60).unwrap();
        let tuning = CombatTuning {
            launch: ProjectileLaunch::Inherited { bonus: 0.96 },
            ..Default::default()
        };
        let mut shooter = shooter_at(Vec2::new(10.0, 30.0), 0.0);
        shooter.body.speed = 0.3;
        let projectile = launch(&shooter, 7, &grid, &tuning).unwrap();
        assert!((projectile.body.speed - 1.26).abs() < 1e-5);
        assert_eq!(projectile.id, 7);
    }

    #[test]
    fn test_reversing_shooter_still_launches_forward() {
        let grid = ArenaGrid::open(60).unwrap();
        let tuning = CombatTuning {
            launch: ProjectileLaunch::Inherited { bonus: 0.96 },
            ..Default::default()
        };
        let mut shooter = shooter_at(Vec2::new(10.0, 30.0), 0.0);
        shooter.body.speed = -2.0;
        let mut projectile = launch(&shooter, 1, &grid, &tuning).unwrap();
        assert_eq!(projectile.body.speed, MIN_LAUNCH_SPEED);

        let start = projectile.body.pos.x;
        assert_eq!(projectile.advance(&grid, Vec2::new(50.0, 50.0), &tuning), None);
        assert!(projectile.body.pos.x > start);
    }

    #[test]
    fn test_fire_admission() {
        let tuning = CombatTuning {
            max_in_flight: Some(3),
            ..Default::default()
        };
        let mut shooter = shooter_at(Vec2::new(10.0, 30.0), 0.0);
        assert!(can_fire(&shooter, 2, &tuning));
        assert!(!can_fire(&shooter, 3, &tuning));
        shooter.cooldown = 1;
        assert!(!can_fire(&shooter, 0, &tuning));
    }
}
