//! Kinematic body shared by riders and projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{heading_vector, normalize_angle};

/// Closed set of entity kinds that move through the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Rider,
    Projectile,
}

/// Continuous position (x, z), heading and scalar speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    pub kind: BodyKind,
    /// World position; `y` holds the z coordinate
    pub pos: Vec2,
    /// Radians, kept in (-π, π]
    pub heading: f32,
    /// World units per tick along the heading (negative = reversing)
    pub speed: f32,
}

impl KinematicBody {
    pub fn new(kind: BodyKind, pos: Vec2, heading: f32, speed: f32) -> Self {
        Self {
            kind,
            pos,
            heading: normalize_angle(heading),
            speed,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading_vector(self.heading)
    }

    /// Where the body would be after one tick at its current speed
    #[inline]
    pub fn candidate(&self) -> Vec2 {
        self.pos + self.forward() * self.speed
    }

    /// Rotate by `delta` radians, wrapping the heading
    #[inline]
    pub fn turn(&mut self, delta: f32) {
        self.heading = normalize_angle(self.heading + delta);
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        self.pos.distance(other)
    }
}
