//! Immutable engine configuration
//!
//! Built once at session start (from a preset, optionally overridden by a JSON
//! file) and passed by reference to every component that needs it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::renderer::{Palette, RenderConfig, Rgb, SkyConfig};
use crate::sim::{CloudConfig, ProjectileLaunch, RiderTuning, SimConfig, SpawnPoint};

/// Errors raised while loading or validating an engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Built-in engine variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Keyboard throttle, no weapons, plain sky
    Classic,
    /// Sensor throttle, rockets, sun and clouds
    #[default]
    Combat,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Combat => "combat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "race" => Some(Preset::Classic),
            "combat" | "duel" => Some(Preset::Combat),
            _ => None,
        }
    }

    pub fn config(&self) -> EngineConfig {
        match self {
            Preset::Classic => EngineConfig::classic(),
            Preset::Combat => EngineConfig::combat(),
        }
    }
}

/// One-time grid preparation before the session starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPrep {
    /// Recolor solid cells with random palette materials
    pub scatter_materials: bool,
    /// Half-size of the open box cleared around each spawn (0 = none)
    pub clear_half_extent: usize,
    pub seed: u64,
}

impl Default for GridPrep {
    fn default() -> Self {
        Self {
            scatter_materials: true,
            clear_half_extent: 12,
            seed: 0x00a1_2e7a,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sim: SimConfig,
    pub render: RenderConfig,
    pub grid_prep: GridPrep,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::combat()
    }
}

impl EngineConfig {
    /// Sensor-driven duel with rockets
    pub fn combat() -> Self {
        Self {
            sim: SimConfig::default(),
            render: RenderConfig::default(),
            grid_prep: GridPrep::default(),
        }
    }

    /// Keyboard racing without weapons
    pub fn classic() -> Self {
        let mut render = RenderConfig::default();
        render.raycast.num_rays = 200;
        render.raycast.step = 0.18;
        render.raycast.max_steps = 900;
        render.raycast.wall_scale = 2.0;
        render.raycast.fog_distance = 162.0;
        render.raycast.fog_floor = 0.0;
        render.sprites.rider_tolerance = 1.0;
        render.sky = SkyConfig {
            zenith: Rgb::new(15, 80, 180),
            horizon: Rgb::new(15, 140, 180),
            ground: Rgb::new(15, 75, 15),
            sun: None,
            ..SkyConfig::default()
        };
        render.palette = Palette::classic();
        render.players[0].body = Rgb::new(0, 140, 255);
        render.players[1].body = Rgb::new(255, 40, 40);

        Self {
            sim: SimConfig {
                rider: RiderTuning::keyboard(),
                combat: None,
                spawns: [
                    SpawnPoint::new(20.0, 20.0, 0.0),
                    SpawnPoint::new(180.0, 180.0, 0.0),
                ],
                clouds: CloudConfig {
                    count: 0,
                    ..CloudConfig::default()
                },
            },
            render,
            grid_prep: GridPrep {
                scatter_materials: false,
                clear_half_extent: 0,
                ..GridPrep::default()
            },
        }
    }

    /// Parse a JSON document; missing fields take the combat defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Reject values that would make the engine divide by zero or never terminate
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        let raycast = &self.render.raycast;

        if !(raycast.fov > 0.0 && raycast.fov < std::f32::consts::PI) {
            return invalid("render.raycast.fov", "must be in (0, π)");
        }
        if raycast.num_rays == 0 {
            return invalid("render.raycast.num_rays", "must be positive");
        }
        if !(raycast.step > 0.0) {
            return invalid("render.raycast.step", "must be positive");
        }
        if raycast.max_steps < 2 {
            return invalid("render.raycast.max_steps", "must be at least 2");
        }
        if !(raycast.min_distance > 0.0) {
            return invalid("render.raycast.min_distance", "must be positive");
        }
        if !(raycast.fog_distance > 0.0) {
            return invalid("render.raycast.fog_distance", "must be positive");
        }
        if !self.sim.rider.turn_rate.is_finite() {
            return invalid("sim.rider.turn_rate", "must be finite");
        }
        if let Some(combat) = &self.sim.combat {
            if !(combat.max_substep > 0.0) {
                return invalid("sim.combat.max_substep", "must be positive");
            }
            if !(combat.proximity_radius >= 0.0) {
                return invalid("sim.combat.proximity_radius", "must be non-negative");
            }
            match combat.launch {
                ProjectileLaunch::Fixed { speed } if !(speed > 0.0 && speed.is_finite()) => {
                    return invalid("sim.combat.launch.speed", "must be positive");
                }
                ProjectileLaunch::Inherited { bonus } if !(bonus > 0.0 && bonus.is_finite()) => {
                    return invalid("sim.combat.launch.bonus", "must be positive");
                }
                _ => {}
            }
            if combat.max_in_flight == Some(0) {
                return invalid("sim.combat.max_in_flight", "must be positive when set");
            }
        }
        if self
            .sim
            .spawns
            .iter()
            .any(|s| !(s.x.is_finite() && s.z.is_finite() && s.heading.is_finite()))
        {
            return invalid("sim.spawns", "must be finite");
        }
        Ok(())
    }
}
