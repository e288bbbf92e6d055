//! Arena Duel - a two-player split-screen grid raycaster
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, bodies, collisions, projectiles)
//! - `renderer`: Software raycaster and viewport compositor
//! - `platform`: Terminal presentation and keyboard polling
//! - `sensor`: Pulse-counting external input channel
//! - `session`: Fixed-rate session loop gluing simulation and rendering
//! - `config`: Immutable engine configuration and presets
//! - `settings`: Persisted runtime tunables

pub mod config;
pub mod platform;
pub mod renderer;
pub mod sensor;
pub mod session;
pub mod settings;
pub mod sim;

pub use config::EngineConfig;
pub use session::Session;
pub use settings::Settings;

/// Fixed engine constants
pub mod consts {
    /// Simulation/render rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Cells with a value at or above this are solid
    pub const SOLID_THRESHOLD: u8 = 3;
    /// Material reported for samples outside the grid
    pub const BORDER_MATERIAL: u8 = 3;

    /// Added to distances before any division
    pub const DIST_EPSILON: f32 = 0.001;

    /// Cloud drift wraps around at +/- this many world units
    pub const CLOUD_FIELD_EXTENT: f32 = 1500.0;

    /// Sensor sensitivity bounds and default
    pub const SENSITIVITY_MIN: f32 = 20.0;
    pub const SENSITIVITY_MAX: f32 = 150.0;
    pub const DEFAULT_SENSITIVITY: f32 = 60.0;
}

/// Wrap an angle into (-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Unit direction vector for a heading (x = cos, z = sin)
#[inline]
pub fn heading_vector(heading: f32) -> glam::Vec2 {
    glam::Vec2::new(heading.cos(), heading.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((normalize_angle(-0.5 - 2.0 * PI) + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_angle_non_finite() {
        assert_eq!(normalize_angle(f32::NAN), 0.0);
        assert_eq!(normalize_angle(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_heading_vector() {
        let v = heading_vector(0.0);
        assert!((v.x - 1.0).abs() < 1e-6 && v.y.abs() < 1e-6);
        let v = heading_vector(PI / 2.0);
        assert!(v.x.abs() < 1e-6 && (v.y - 1.0).abs() < 1e-6);
    }
}
