//! Sky, ground, sun and clouds behind the walls
//!
//! Pure decoration. Celestial objects use the same bearing-to-screen law as
//! sprites so they stay continuous as the observer turns.

use serde::{Deserialize, Serialize};

use super::frame::{Frame, Rect, Rgb};
use super::sprite::bearing_to_screen_x;
use crate::normalize_angle;
use crate::sim::{Cloud, KinematicBody};

/// Sun placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// World bearing of the sun (radians)
    pub azimuth: f32,
    /// Height above the horizon as a fraction of `view_h / 2.5`
    pub elevation: f32,
    pub color: Rgb,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            azimuth: 45f32.to_radians(),
            elevation: 0.55,
            color: Rgb::new(255, 255, 210),
        }
    }
}

/// Backdrop colors and decoration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub zenith: Rgb,
    pub horizon: Rgb,
    pub ground: Rgb,
    pub sun: Option<SunConfig>,
    pub cloud_color: Rgb,
    /// Clouds are drawn within this multiple of the FOV
    pub cloud_fov_factor: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            zenith: Rgb::new(25, 110, 210),
            horizon: Rgb::new(25, 210, 210),
            ground: Rgb::new(20, 85, 20),
            sun: Some(SunConfig::default()),
            cloud_color: Rgb::new(245, 245, 250),
            cloud_fov_factor: 1.5,
        }
    }
}

impl SkyConfig {
    /// Sun bearing relative to the observer, if there is a sun
    pub fn sun_bearing(&self, heading: f32) -> Option<f32> {
        self.sun.map(|sun| normalize_angle(sun.azimuth - heading))
    }
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    Rgb::new(
        lerp_channel(a.r, b.r, t),
        lerp_channel(a.g, b.g, t),
        lerp_channel(a.b, b.b, t),
    )
}

/// Vertical sky gradient above the horizon, flat ground below
pub fn paint_backdrop(frame: &mut Frame, view: Rect, config: &SkyConfig) {
    let horizon = view.h / 2;
    for row in 0..horizon {
        let t = row as f32 / horizon.max(1) as f32;
        let color = lerp(config.zenith, config.horizon, t);
        frame.fill_rect(view.x as i32, (view.y + row) as i32, view.w as i32, 1, color);
    }
    frame.fill_rect(
        view.x as i32,
        (view.y + horizon) as i32,
        view.w as i32,
        (view.h - horizon) as i32,
        config.ground,
    );
}

/// Sun disc, visible within one FOV of straight ahead
pub fn draw_sun(frame: &mut Frame, view: Rect, observer: &KinematicBody, config: &SkyConfig, fov: f32) {
    let (Some(sun), Some(bearing)) = (config.sun, config.sun_bearing(observer.heading)) else {
        return;
    };
    if bearing.abs() >= fov {
        return;
    }
    let h = view.h as f32;
    let sx = bearing_to_screen_x(view, bearing, fov);
    let sy = view.y as f32 + h / 2.0 - sun.elevation * (h / 2.5);
    frame.fill_circle(sx as i32, sy as i32, (h / 15.0).max(1.0) as i32, sun.color);
}

/// World-space clouds lifted by altitude over distance
pub fn draw_clouds(
    frame: &mut Frame,
    view: Rect,
    observer: &KinematicBody,
    clouds: &[Cloud],
    config: &SkyConfig,
    fov: f32,
) {
    let h = view.h as f32;
    // Altitude lift is tuned for a 600-pixel-tall view
    let lift_scale = h / 600.0;
    let rx = (view.w as f32 / 6.0).max(1.0) as i32;
    let ry = (h / 24.0).max(1.0) as i32;

    for cloud in clouds {
        let d = cloud.pos - observer.pos;
        let dist = d.length();
        let bearing = normalize_angle(d.y.atan2(d.x) - observer.heading);
        if bearing.abs() >= fov * config.cloud_fov_factor {
            continue;
        }
        let cx = bearing_to_screen_x(view, bearing, fov);
        let cy = view.y as f32 + h / 2.5 - cloud.altitude / (dist * 0.02 + 1.2) * lift_scale;
        if cx.is_finite() && cy.is_finite() {
            frame.fill_ellipse(cx as i32, cy as i32 + ry, rx, ry, config.cloud_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BodyKind;
    use glam::Vec2;

    fn observer(heading: f32) -> KinematicBody {
        KinematicBody::new(BodyKind::Rider, Vec2::new(100.0, 100.0), heading, 0.0)
    }

    #[test]
    fn test_backdrop_gradient_and_ground() {
        let mut frame = Frame::new(10, 20);
        let config = SkyConfig::default();
        let view = Rect::new(0, 0, 10, 20);
        paint_backdrop(&mut frame, view, &config);
        assert_eq!(frame.get(3, 0), Some(config.zenith));
        assert_eq!(frame.get(3, 10), Some(config.ground));
        assert_eq!(frame.get(3, 19), Some(config.ground));
        let mid = frame.get(3, 5).unwrap();
        assert!(mid.g > config.zenith.g && mid.g < config.horizon.g);
    }

    #[test]
    fn test_sun_visibility_follows_heading() {
        let config = SkyConfig::default();
        let view = Rect::new(0, 0, 120, 60);
        let sun = config.sun.unwrap();

        let mut frame = Frame::new(120, 60);
        draw_sun(&mut frame, view, &observer(sun.azimuth), &config, 1.0);
        assert!(frame.pixels().contains(&sun.color));

        let mut frame = Frame::new(120, 60);
        draw_sun(&mut frame, view, &observer(sun.azimuth + 3.0), &config, 1.0);
        assert!(!frame.pixels().contains(&sun.color));
    }

    #[test]
    fn test_cloud_ahead_is_drawn() {
        let config = SkyConfig::default();
        let view = Rect::new(0, 0, 120, 60);
        let clouds = [Cloud {
            pos: Vec2::new(600.0, 100.0),
            altitude: 900.0,
        }];
        let mut frame = Frame::new(120, 60);
        draw_clouds(&mut frame, view, &observer(0.0), &clouds, &config, 1.0);
        assert!(frame.pixels().contains(&config.cloud_color));

        let mut frame = Frame::new(120, 60);
        draw_clouds(&mut frame, view, &observer(std::f32::consts::PI), &clouds, &config, 1.0);
        assert!(!frame.pixels().contains(&config.cloud_color));
    }
}
