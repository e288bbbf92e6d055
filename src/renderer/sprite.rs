//! Billboard sprites: the opposing rider and projectiles
//!
//! Screen position comes from the relative bearing, scale from distance.
//! A sprite body is drawn only when it is nearer than the wall stored for its
//! column plus a tolerance; the tracking laser ignores the depth test.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::frame::{Frame, Rect, Rgb};
use super::raycast::DepthBuffer;
use crate::consts::DIST_EPSILON;
use crate::normalize_angle;
use crate::sim::{KinematicBody, PlayerSlot};

/// Display identity of one rider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStyle {
    pub name: String,
    pub body: Rgb,
    /// Tracking laser and projectile color
    pub laser: Rgb,
}

impl PlayerStyle {
    pub fn for_slot(slot: PlayerSlot) -> Self {
        match slot {
            PlayerSlot::One => Self {
                name: "Blue".to_string(),
                body: Rgb::new(0, 120, 255),
                laser: Rgb::new(0, 255, 255),
            },
            PlayerSlot::Two => Self {
                name: "Red".to_string(),
                body: Rgb::new(240, 30, 30),
                laser: Rgb::new(255, 0, 255),
            },
        }
    }
}

/// Sprite tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Depth slack for the rider body (world units)
    pub rider_tolerance: f32,
    /// Depth slack for projectiles (world units)
    pub projectile_tolerance: f32,
    pub laser: bool,
    pub laser_width: i32,
    /// Rider width relative to its projected height, at full broadside
    pub rider_width: f32,
    pub hand_right: Rgb,
    pub hand_left: Rgb,
    pub visor: Rgb,
    pub headlight: Rgb,
    pub tail_light: Rgb,
    pub shadow: Rgb,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            rider_tolerance: 2.0,
            projectile_tolerance: 0.5,
            laser: true,
            laser_width: 1,
            rider_width: 0.6,
            hand_right: Rgb::new(50, 255, 120),
            hand_left: Rgb::new(50, 120, 255),
            visor: Rgb::new(0, 0, 0),
            headlight: Rgb::new(255, 255, 200),
            tail_light: Rgb::new(220, 0, 0),
            shadow: Rgb::new(10, 25, 10),
        }
    }
}

/// A target projected into one viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Billboard {
    /// Relative bearing in (-π, π]
    pub bearing: f32,
    pub distance: f32,
    pub screen_x: f32,
    /// Perspective scale `view_h / (distance + ε)`, capped
    pub height: f32,
}

impl Billboard {
    /// Whether the target is nearer than the wall in its column
    pub fn visible_in(&self, depth: &DepthBuffer, fov: f32, tolerance: f32) -> bool {
        self.distance < depth.distance_at(self.bearing, fov) + tolerance
    }
}

/// Bearing of `target` from the observer, relative to its heading
#[inline]
pub fn relative_bearing(observer: &KinematicBody, target: Vec2) -> f32 {
    let d = target - observer.pos;
    normalize_angle(d.y.atan2(d.x) - observer.heading)
}

/// Map a relative bearing linearly across the viewport
#[inline]
pub fn bearing_to_screen_x(view: Rect, bearing: f32, fov: f32) -> f32 {
    view.x as f32 + (bearing / fov + 0.5) * view.w as f32
}

/// Project `target` for the observer; `None` when outside the half-FOV
pub fn project(observer: &KinematicBody, target: Vec2, view: Rect, fov: f32) -> Option<Billboard> {
    if !target.is_finite() || !observer.pos.is_finite() {
        return None;
    }
    let bearing = relative_bearing(observer, target);
    if bearing.abs() > fov / 2.0 {
        return None;
    }

    let distance = observer.pos.distance(target);
    let view_h = view.h as f32;
    Some(Billboard {
        bearing,
        distance,
        screen_x: bearing_to_screen_x(view, bearing, fov),
        height: (view_h / (distance + DIST_EPSILON)).min(view_h * 4.0),
    })
}

#[inline]
fn horizon(view: Rect) -> i32 {
    (view.y + view.h / 2) as i32
}

/// Tracking laser from the top of the viewport to the horizon
pub fn draw_laser(frame: &mut Frame, view: Rect, billboard: &Billboard, color: Rgb, config: &SpriteConfig) {
    if config.laser {
        frame.vline(
            billboard.screen_x as i32,
            view.y as i32,
            horizon(view),
            config.laser_width,
            color,
        );
    }
}

/// Rider body standing on the horizon, with hands, facing cue and shadow.
/// `sun_bearing` is the sun's bearing for this observer, if any.
#[allow(clippy::too_many_arguments)]
pub fn draw_rider(
    frame: &mut Frame,
    view: Rect,
    observer: &KinematicBody,
    target: &KinematicBody,
    billboard: &Billboard,
    style: &PlayerStyle,
    config: &SpriteConfig,
    sun_bearing: Option<f32>,
) {
    // Target heading relative to the line of sight from the observer
    let line_of_sight = {
        let d = target.pos - observer.pos;
        d.y.atan2(d.x)
    };
    let rel = normalize_angle(target.heading - line_of_sight);
    let broadside = rel.sin().abs();

    let sprite_h = billboard.height;
    let width = (sprite_h * config.rider_width * (0.5 + 0.5 * broadside)).max(2.0);
    let body_h = (sprite_h / 2.2).max(2.0);
    let bx = billboard.screen_x;
    let by = horizon(view) as f32;

    // Shadow falls away from the sun
    let shadow_shift = sun_bearing.map_or(0.0, |b| -b.sin() * width * 0.5);
    frame.fill_ellipse(
        (bx + shadow_shift) as i32,
        (by + body_h) as i32,
        (width / 2.0) as i32,
        (body_h / 8.0).max(1.0) as i32,
        config.shadow,
    );

    frame.fill_ellipse(
        bx as i32,
        (by + body_h / 2.0) as i32,
        (width / 2.0).max(1.0) as i32,
        (body_h / 2.0).max(1.0) as i32,
        style.body,
    );

    // Hands orbit the body center by the facing projection
    let radius = width / 1.4;
    let hand_size = (body_h / 6.0).max(1.0) as i32;
    let hand_y = by + body_h / 2.0;
    for (offset, color) in [(FRAC_PI_2, config.hand_right), (-FRAC_PI_2, config.hand_left)] {
        let a = rel + offset;
        frame.fill_circle(
            (bx + a.cos() * radius) as i32,
            (hand_y + a.sin() * radius / 4.0) as i32,
            hand_size,
            color,
        );
    }

    let cue_y = (by + body_h * 0.3) as i32;
    let cue_h = (body_h / 8.0).max(1.0) as i32;
    if rel.abs() > FRAC_PI_2 {
        // Facing the observer
        let visor_w = (width * 0.6) as i32;
        frame.fill_rect(bx as i32 - visor_w / 2, cue_y, visor_w.max(1), cue_h, config.visor);
        frame.fill_circle(bx as i32, cue_y + cue_h * 2, cue_h, config.headlight);
    } else {
        frame.fill_circle(bx as i32, cue_y + cue_h, cue_h, config.tail_light);
    }
}

/// Projectile disc on the horizon
pub fn draw_projectile(frame: &mut Frame, view: Rect, billboard: &Billboard, color: Rgb) {
    let r = (billboard.height / 4.0).max(1.0) as i32;
    frame.fill_circle(billboard.screen_x as i32, horizon(view), r, color);
}
