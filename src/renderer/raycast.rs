//! Grid ray marcher
//!
//! One ray per screen column, stepped at a fixed length from the observer
//! until it leaves the grid or samples a solid cell. Distances are corrected
//! by the cosine of the angle off the observer's heading to remove fisheye.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DIST_EPSILON;
use crate::heading_vector;
use crate::sim::{ArenaGrid, Material};

/// Ray-cast tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    /// Horizontal field of view (radians)
    pub fov: f32,
    /// Columns per viewport
    pub num_rays: usize,
    /// March step length (world units)
    pub step: f32,
    /// Steps before a ray gives up (draw distance = step * max_steps)
    pub max_steps: usize,
    /// Floor applied to every corrected distance
    pub min_distance: f32,
    /// Wall height multiplier
    pub wall_scale: f32,
    /// Distance at which fog reaches `fog_floor`
    pub fog_distance: f32,
    /// Darkest fog factor
    pub fog_floor: f32,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            fov: std::f32::consts::FRAC_PI_3,
            num_rays: 240,
            step: 0.2,
            max_steps: 1000,
            min_distance: 0.1,
            wall_scale: 1.8,
            fog_distance: 180.0,
            fog_floor: 0.1,
        }
    }
}

impl RaycastConfig {
    /// Draw distance in world units
    pub fn max_distance(&self) -> f32 {
        self.step * self.max_steps as f32
    }

    /// Angle of column `i`
    #[inline]
    pub fn column_angle(&self, heading: f32, column: usize) -> f32 {
        heading - self.fov / 2.0 + column as f32 * (self.fov / self.num_rays as f32)
    }

    /// Linear fog factor in [fog_floor, 1]
    pub fn fog(&self, distance: f32) -> f32 {
        let floor = self.fog_floor.clamp(0.0, 1.0);
        let f = 1.0 - distance / self.fog_distance.max(DIST_EPSILON);
        if f.is_finite() { f.clamp(floor, 1.0) } else { floor }
    }

    /// On-screen wall height for a corrected distance
    pub fn wall_height(&self, distance: f32, view_height: f32) -> f32 {
        view_height / (distance.max(self.min_distance) + DIST_EPSILON) * self.wall_scale
    }
}

/// Result of marching one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Corrected perpendicular distance (never below `min_distance`)
    pub distance: f32,
    /// Material hit; `None` when the ray ran out of steps
    pub material: Option<Material>,
}

/// March a single ray at `ray_angle` from an observer facing `heading`
pub fn cast_ray(
    grid: &ArenaGrid,
    origin: Vec2,
    heading: f32,
    ray_angle: f32,
    config: &RaycastConfig,
) -> RayHit {
    if !origin.is_finite() || !grid.in_bounds(origin) {
        return RayHit {
            distance: config.min_distance,
            material: Some(Material::BORDER),
        };
    }

    let dir = heading_vector(ray_angle);
    // Never let the correction collapse a hit to zero distance
    let correction = (heading - ray_angle).cos().max(DIST_EPSILON);

    for d in 1..=config.max_steps {
        let raw = d as f32 * config.step;
        let material = grid.sample(origin + dir * raw);
        if material.is_solid() {
            return RayHit {
                distance: (raw * correction).max(config.min_distance),
                material: Some(material),
            };
        }
    }

    RayHit {
        distance: (config.max_distance() * correction).max(config.min_distance),
        material: None,
    }
}

/// March column `column` of `config.num_rays`
pub fn cast_column(
    grid: &ArenaGrid,
    origin: Vec2,
    heading: f32,
    column: usize,
    config: &RaycastConfig,
) -> RayHit {
    cast_ray(grid, origin, heading, config.column_angle(heading, column), config)
}

/// Per-column wall distances for one observer's frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthBuffer {
    hits: Vec<RayHit>,
}

impl DepthBuffer {
    /// March every column for one observer
    pub fn cast(grid: &ArenaGrid, origin: Vec2, heading: f32, config: &RaycastConfig) -> Self {
        let hits = (0..config.num_rays)
            .map(|i| cast_column(grid, origin, heading, i, config))
            .collect();
        Self { hits }
    }

    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Column under a relative bearing, clamped to the buffer
    pub fn column_for_bearing(&self, bearing: f32, fov: f32) -> Option<usize> {
        if self.hits.is_empty() || !bearing.is_finite() {
            return None;
        }
        let t = bearing / fov.max(DIST_EPSILON) + 0.5;
        let idx = (t * self.hits.len() as f32).floor();
        Some(idx.clamp(0.0, (self.hits.len() - 1) as f32) as usize)
    }

    /// Stored wall distance at the column under `bearing`
    pub fn distance_at(&self, bearing: f32, fov: f32) -> f32 {
        self.column_for_bearing(bearing, fov)
            .map_or(f32::INFINITY, |i| self.hits[i].distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_open_grid_hits_border_at_edge() {
        let grid = ArenaGrid::open(5).unwrap();
        let config = RaycastConfig {
            fov: 60f32.to_radians(),
            num_rays: 4,
            ..Default::default()
        };
        let origin = Vec2::new(2.5, 2.5);

        for column in [1, 2] {
            let hit = cast_column(&grid, origin, 0.0, column, &config);
            assert_eq!(hit.material, Some(Material::BORDER));
            assert!(hit.distance.is_finite());
            assert!(
                (hit.distance - 2.5).abs() <= config.step + 1e-4,
                "column {column}: {}",
                hit.distance
            );
        }
    }

    #[test]
    fn test_solid_cell_material_reported() {
        let mut rows = vec![vec![0u8; 10]; 10];
        rows[7][5] = 5;
        let grid = ArenaGrid::from_rows(rows).unwrap();
        let hit = cast_ray(&grid, Vec2::new(2.5, 5.5), 0.0, 0.0, &RaycastConfig::default());
        assert_eq!(hit.material, Some(Material(5)));
        assert!((hit.distance - 4.6).abs() < 1e-4);
    }

    #[test]
    fn test_observer_outside_grid() {
        let grid = ArenaGrid::open(10).unwrap();
        let config = RaycastConfig::default();
        let hit = cast_column(&grid, Vec2::new(-3.0, 4.0), 0.0, 0, &config);
        assert_eq!(hit.distance, config.min_distance);
        assert_eq!(hit.material, Some(Material::BORDER));
        let hit = cast_column(&grid, Vec2::new(f32::NAN, 4.0), 0.0, 0, &config);
        assert_eq!(hit.distance, config.min_distance);
    }

    #[test]
    fn test_ray_runs_out_of_steps() {
        let grid = ArenaGrid::open(100).unwrap();
        let config = RaycastConfig {
            max_steps: 10,
            ..Default::default()
        };
        let hit = cast_ray(&grid, Vec2::new(50.0, 50.0), 0.0, 0.0, &config);
        assert_eq!(hit.material, None);
        assert!((hit.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_wall_on_last_step_is_hit() {
        let mut rows = vec![vec![0u8; 100]; 100];
        rows[52] = vec![6; 100];
        let grid = ArenaGrid::from_rows(rows).unwrap();
        let config = RaycastConfig {
            max_steps: 10,
            ..Default::default()
        };
        let hit = cast_ray(&grid, Vec2::new(50.0, 50.0), 0.0, 0.0, &config);
        assert_eq!(hit.material, Some(Material(6)));
        assert!((hit.distance - config.max_distance()).abs() < 1e-5);
    }

    #[test]
    fn test_fog_and_wall_height() {
        let config = RaycastConfig::default();
        assert_eq!(config.fog(0.0), 1.0);
        assert!((config.fog(90.0) - 0.5).abs() < 1e-6);
        assert_eq!(config.fog(1000.0), 0.1);
        assert!(config.wall_height(0.0, 100.0).is_finite());
        assert!(config.wall_height(2.0, 100.0) > config.wall_height(4.0, 100.0));
    }

    #[test]
    fn test_column_for_bearing() {
        let buf = DepthBuffer {
            hits: vec![
                RayHit {
                    distance: 1.0,
                    material: None
                };
                10
            ],
        };
        assert_eq!(buf.column_for_bearing(0.0, 1.0), Some(5));
        assert_eq!(buf.column_for_bearing(-0.5, 1.0), Some(0));
        assert_eq!(buf.column_for_bearing(3.0, 1.0), Some(9));
        assert_eq!(buf.column_for_bearing(f32::NAN, 1.0), None);
    }

    fn wall_at(x: usize) -> ArenaGrid {
        let mut rows = vec![vec![0u8; 64]; 64];
        rows[x] = vec![4; 64];
        ArenaGrid::from_rows(rows).unwrap()
    }

    proptest! {
        #[test]
        fn prop_distance_increases_with_wall_distance(
            x in 2.0f32..10.0,
            z in 20.0f32..40.0,
            wall in 12usize..40,
            offset in -0.5f32..0.5,
        ) {
            let config = RaycastConfig::default();
            let origin = Vec2::new(x, z);
            let heading = offset * 0.3;
            let angle = heading + offset * config.fov * 0.5;
            let near = cast_ray(&wall_at(wall), origin, heading, angle, &config);
            let far = cast_ray(&wall_at(wall + 1), origin, heading, angle, &config);
            prop_assert!(near.distance.is_finite() && near.distance >= 0.0);
            prop_assert!(far.distance > near.distance);
        }

        #[test]
        fn prop_cast_is_deterministic(
            x in 1.5f32..62.0,
            z in 1.5f32..62.0,
            heading in -3.1f32..3.1,
        ) {
            let grid = wall_at(30);
            let config = RaycastConfig { num_rays: 32, ..Default::default() };
            let a = DepthBuffer::cast(&grid, Vec2::new(x, z), heading, &config);
            let b = DepthBuffer::cast(&grid, Vec2::new(x, z), heading, &config);
            prop_assert_eq!(a, b);
        }
    }
}
