//! Fixed timestep simulation tick
//!
//! Player One updates completely (steer, fire, cooldown, its projectiles)
//! before Player Two, so Two's projectiles test against One's new position.

use std::sync::Arc;

use super::player::{ControlState, PlayerSlot};
use super::projectile::{CombatTuning, Impact, can_fire, launch};
use super::state::{DuelState, GameEvent, SimConfig};
use crate::consts::DEFAULT_SENSITIVITY;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, PartialEq)]
pub struct TickInput {
    /// Per-slot controls, polled once per tick
    pub controls: [ControlState; 2],
    /// Per-slot sensor pulses drained for this tick
    pub pulses: [u32; 2],
    /// Sensor-fusion sensitivity
    pub sensitivity: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            controls: [ControlState::default(); 2],
            pulses: [0; 2],
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

/// Advance the duel by one fixed timestep
pub fn tick(state: &mut DuelState, input: &TickInput, config: &SimConfig) {
    state.events.clear();
    let grid = Arc::clone(&state.grid);

    for slot in PlayerSlot::BOTH {
        let i = slot.index();
        let outcome = state.players[i].steer(
            &input.controls[i],
            input.pulses[i],
            input.sensitivity,
            &config.rider,
            &grid,
        );
        if outcome.blocked() {
            state.events.push(GameEvent::WallBump { player: slot });
        }

        if let Some(combat) = &config.combat {
            update_combat(state, slot, input.controls[i].fire, combat);
        }
    }

    let drift = config.clouds.drift;
    for cloud in &mut state.clouds {
        cloud.drift(drift);
    }

    state.time_ticks += 1;
}

fn update_combat(state: &mut DuelState, slot: PlayerSlot, fire: bool, combat: &CombatTuning) {
    let grid = Arc::clone(&state.grid);

    if fire && can_fire(state.player(slot), state.in_flight(slot), combat) {
        let id = state.next_entity_id();
        let shooter = state.player_mut(slot);
        shooter.cooldown = combat.cooldown_ticks;
        let muzzle = shooter.pos();
        state.events.push(GameEvent::Fired {
            shooter: slot,
            projectile: id,
        });

        match launch(state.player(slot), id, &grid, combat) {
            Ok(projectile) => state.projectiles.push(projectile),
            Err(impact) => record_impact(state, slot, id, impact, muzzle, combat),
        }
    }

    let shooter = state.player_mut(slot);
    shooter.cooldown = shooter.cooldown.saturating_sub(1);

    let target = state.player(slot.opponent()).pos();
    let mut spent = Vec::new();
    state.projectiles.retain_mut(|p| {
        if p.owner != slot {
            return true;
        }
        match p.advance(&grid, target, combat) {
            Some(impact) => {
                spent.push((p.id, impact, p.body.pos));
                false
            }
            None => true,
        }
    });

    for (id, impact, pos) in spent {
        record_impact(state, slot, id, impact, pos, combat);
    }
}

fn record_impact(
    state: &mut DuelState,
    shooter: PlayerSlot,
    projectile: u32,
    impact: Impact,
    pos: glam::Vec2,
    combat: &CombatTuning,
) {
    if impact == Impact::HitPlayer {
        state.player_mut(shooter).score += combat.hit_score;
    }
    log::info!(
        "Projectile {} from {:?}: {} at ({:.1}, {:.1}), score {:?}",
        projectile,
        shooter,
        impact.as_str(),
        pos.x,
        pos.y,
        state.scores()
    );
    state.events.push(GameEvent::Impact {
        shooter,
        projectile,
        impact,
        pos,
    });
}
