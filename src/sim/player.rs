//! Riders: the two player-controlled bodies
//!
//! Per tick, in order: turn, throttle, then movement through the collision
//! resolver. Throttle is either discrete keyboard acceleration or the
//! sensor-fusion model `speed = speed * decay + (pulses + boost) * sensitivity`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, KinematicBody};
use super::collision::{MoveOutcome, WallResponse, resolve_move};
use super::grid::ArenaGrid;

/// Which side of the split screen a rider owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

/// Logical controls for one rider, sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub fire: bool,
}

/// How longitudinal input becomes speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThrottleModel {
    /// Accelerate/brake toward asymmetric bounds, decay toward zero when idle
    Keyboard {
        accel: f32,
        brake: f32,
        max_speed: f32,
        min_speed: f32,
        idle_decay: f32,
    },
    /// `speed * decay + (pulses + boost) * sensitivity * sensitivity_scale`
    Sensor {
        decay: f32,
        sensitivity_scale: f32,
        /// Pulses credited per tick while accelerate is held
        keyboard_boost: f32,
    },
}

impl ThrottleModel {
    /// New speed after one tick. `pulses` is the drained sensor count.
    pub fn apply(&self, speed: f32, controls: &ControlState, pulses: u32, sensitivity: f32) -> f32 {
        match *self {
            ThrottleModel::Keyboard {
                accel,
                brake,
                max_speed,
                min_speed,
                idle_decay,
            } => {
                if controls.accelerate {
                    (speed + accel).min(max_speed)
                } else if controls.brake {
                    (speed - brake).max(min_speed)
                } else {
                    speed * idle_decay
                }
            }
            ThrottleModel::Sensor {
                decay,
                sensitivity_scale,
                keyboard_boost,
            } => {
                let boost = if controls.accelerate { keyboard_boost } else { 0.0 };
                speed * decay + (pulses as f32 + boost) * sensitivity * sensitivity_scale
            }
        }
    }
}

/// Per-rider motion tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiderTuning {
    /// Radians per tick while a turn control is held
    pub turn_rate: f32,
    pub throttle: ThrottleModel,
    pub wall_response: WallResponse,
}

impl Default for RiderTuning {
    /// Sensor-driven riders that bounce off walls
    fn default() -> Self {
        Self {
            turn_rate: 0.08,
            throttle: ThrottleModel::Sensor {
                decay: 0.92,
                sensitivity_scale: 0.05 / 60.0,
                keyboard_boost: 4.0,
            },
            wall_response: WallResponse::Bounce { factor: -0.5 },
        }
    }
}

impl RiderTuning {
    /// Keyboard-only riders with asymmetric speed bounds
    pub fn keyboard() -> Self {
        Self {
            turn_rate: 0.09,
            throttle: ThrottleModel::Keyboard {
                accel: 0.02,
                brake: 0.02,
                max_speed: 0.45,
                min_speed: -0.15,
                idle_decay: 0.93,
            },
            wall_response: WallResponse::Bounce { factor: -0.5 },
        }
    }
}

/// A player-controlled rider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub slot: PlayerSlot,
    pub body: KinematicBody,
    /// Ticks until the next shot is allowed
    pub cooldown: u32,
    pub score: u32,
}

impl Player {
    pub fn new(slot: PlayerSlot, spawn: Vec2, heading: f32) -> Self {
        Self {
            slot,
            body: KinematicBody::new(BodyKind::Rider, spawn, heading, 0.0),
            cooldown: 0,
            score: 0,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn heading(&self) -> f32 {
        self.body.heading
    }

    /// Turn, throttle and move for one tick
    pub fn steer(
        &mut self,
        controls: &ControlState,
        pulses: u32,
        sensitivity: f32,
        tuning: &RiderTuning,
        grid: &ArenaGrid,
    ) -> MoveOutcome {
        if controls.turn_left {
            self.body.turn(-tuning.turn_rate);
        }
        if controls.turn_right {
            self.body.turn(tuning.turn_rate);
        }

        self.body.speed = tuning
            .throttle
            .apply(self.body.speed, controls, pulses, sensitivity);

        resolve_move(&mut self.body, grid, tuning.wall_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_tuning() -> RiderTuning {
        RiderTuning::keyboard()
    }

    #[test]
    fn test_sensor_fusion_speed() {
        let model = ThrottleModel::Sensor {
            decay: 0.9,
            sensitivity_scale: 0.1,
            keyboard_boost: 4.0,
        };
        let speed = model.apply(0.0, &ControlState::default(), 2, 60.0);
        assert!((speed - 12.0).abs() < 1e-4);

        let held = ControlState {
            accelerate: true,
            ..Default::default()
        };
        let speed = model.apply(10.0, &held, 0, 60.0);
        assert!((speed - (9.0 + 24.0)).abs() < 1e-4);
    }

    #[test]
    fn test_keyboard_bounds_and_decay() {
        let tuning = keyboard_tuning();
        let accel = ControlState {
            accelerate: true,
            ..Default::default()
        };
        let brake = ControlState {
            brake: true,
            ..Default::default()
        };

        let mut speed = 0.0;
        for _ in 0..100 {
            speed = tuning.throttle.apply(speed, &accel, 0, 0.0);
        }
        assert!((speed - 0.45).abs() < 1e-6);

        for _ in 0..100 {
            speed = tuning.throttle.apply(speed, &brake, 0, 0.0);
        }
        assert!((speed + 0.15).abs() < 1e-6);

        let idle = tuning.throttle.apply(0.4, &ControlState::default(), 0, 0.0);
        assert!((idle - 0.372).abs() < 1e-6);
    }

    #[test]
    fn test_steer_turns_then_moves() {
        let grid = ArenaGrid::open(20).unwrap();
        let mut player = Player::new(PlayerSlot::One, Vec2::new(10.0, 10.0), 0.0);
        let controls = ControlState {
            accelerate: true,
            turn_right: true,
            ..Default::default()
        };
        let outcome = player.steer(&controls, 0, 0.0, &keyboard_tuning(), &grid);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert!((player.heading() - 0.09).abs() < 1e-6);
        let expected = Vec2::new(10.0 + 0.09f32.cos() * 0.02, 10.0 + 0.09f32.sin() * 0.02);
        assert!(player.pos().distance(expected) < 1e-5);
    }

    #[test]
    fn test_slot_opponent() {
        assert_eq!(PlayerSlot::One.opponent(), PlayerSlot::Two);
        assert_eq!(PlayerSlot::Two.opponent().index(), 0);
    }
}
