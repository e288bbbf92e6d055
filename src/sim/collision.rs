//! Grid collision resolution
//!
//! A body proposes `pos + forward * speed`. Riders must stay inside the
//! (1, N-1) band and off solid cells; projectiles only need to stay inside the
//! grid and off solid cells. What happens on rejection depends on the
//! `WallResponse` attached to the body's kind.

use serde::{Deserialize, Serialize};

use super::body::{BodyKind, KinematicBody};
use super::grid::ArenaGrid;

/// What a body does when its proposed move is rejected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WallResponse {
    /// Stay put, keep speed
    Stop,
    /// Stay put, multiply speed by `factor` (negative pushes back)
    Bounce { factor: f32 },
    /// Report a wall hit so the owner can remove the body
    Despawn,
}

/// Outcome of one resolved move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Stopped,
    Bounced,
    HitWall,
}

impl MoveOutcome {
    #[inline]
    pub fn blocked(self) -> bool {
        !matches!(self, MoveOutcome::Moved)
    }
}

/// Whether `body` may occupy its candidate position
pub fn accepts(body: &KinematicBody, grid: &ArenaGrid) -> bool {
    let next = body.candidate();
    if !next.is_finite() {
        return false;
    }
    let inside = match body.kind {
        BodyKind::Rider => grid.in_interior(next),
        BodyKind::Projectile => grid.in_bounds(next),
    };
    inside && !grid.is_solid_at(next)
}

/// Resolve one tick of movement against the grid
pub fn resolve_move(
    body: &mut KinematicBody,
    grid: &ArenaGrid,
    response: WallResponse,
) -> MoveOutcome {
    if accepts(body, grid) {
        body.pos = body.candidate();
        return MoveOutcome::Moved;
    }

    match response {
        WallResponse::Stop => MoveOutcome::Stopped,
        WallResponse::Bounce { factor } => {
            body.speed *= factor;
            MoveOutcome::Bounced
        }
        WallResponse::Despawn => MoveOutcome::HitWall,
    }
}
