//! Arena grid: an immutable square matrix of small integers
//!
//! Values at or above `SOLID_THRESHOLD` are solid; the value itself selects the
//! material used for rendering. The first index is x, the second is z.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Deserialize;
use thiserror::Error;

use crate::consts::{BORDER_MATERIAL, SOLID_THRESHOLD};

/// Smallest arena that still has an open interior
pub const MIN_GRID_SIZE: usize = 3;

/// Errors raised while loading an arena grid
#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to read grid file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed grid document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("grid matrix is empty")]
    Empty,
    #[error("grid row {row} has {len} cells, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("grid declares size {declared} but matrix is {actual}x{actual}")]
    SizeMismatch { declared: usize, actual: usize },
    #[error("grid size {0} is below the minimum of 3")]
    TooSmall(usize),
}

/// Cell value as a render material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Material(pub u8);

impl Material {
    pub const BORDER: Material = Material(BORDER_MATERIAL);

    #[inline]
    pub fn is_solid(self) -> bool {
        self.0 >= SOLID_THRESHOLD
    }
}

/// On-disk document shape
#[derive(Debug, Deserialize)]
struct GridDocument {
    grid: Vec<Vec<u8>>,
    #[serde(default)]
    size: Option<usize>,
}

/// Immutable N×N arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaGrid {
    size: usize,
    cells: Vec<u8>,
}

impl ArenaGrid {
    /// Build from rows indexed `rows[x][z]`
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }
        if size < MIN_GRID_SIZE {
            return Err(GridError::TooSmall(size));
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            cells.extend(values);
        }

        Ok(Self { size, cells })
    }

    /// A fully open grid (every cell 0)
    pub fn open(size: usize) -> Result<Self, GridError> {
        Self::from_rows(vec![vec![0; size]; size])
    }

    /// Parse a `{"grid": [[..]], "size": N}` document
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let doc: GridDocument = serde_json::from_str(json)?;
        let actual = doc.grid.len();
        if let Some(declared) = doc.size {
            if declared != actual {
                return Err(GridError::SizeMismatch { declared, actual });
            }
        }
        Self::from_rows(doc.grid)
    }

    /// Read and parse a grid file
    pub fn load(path: &Path) -> Result<Self, GridError> {
        let json = fs::read_to_string(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grid = Self::from_json(&json)?;
        log::info!(
            "Loaded {}x{} arena from {} ({} solid cells)",
            grid.size,
            grid.size,
            path.display(),
            grid.solid_count()
        );
        Ok(grid)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell value at integer coordinates
    #[inline]
    pub fn cell(&self, x: usize, z: usize) -> Option<u8> {
        if x < self.size && z < self.size {
            Some(self.cells[x * self.size + z])
        } else {
            None
        }
    }

    /// Whether a continuous coordinate lies strictly inside (0, N) on both axes
    #[inline]
    pub fn in_bounds(&self, p: Vec2) -> bool {
        let n = self.size as f32;
        p.x > 0.0 && p.x < n && p.y > 0.0 && p.y < n
    }

    /// Whether a continuous coordinate lies strictly inside the (1, N-1) band
    #[inline]
    pub fn in_interior(&self, p: Vec2) -> bool {
        let hi = (self.size - 1) as f32;
        p.x > 1.0 && p.x < hi && p.y > 1.0 && p.y < hi
    }

    /// Nearest point at least half a cell inside the (1, N-1) band.
    /// Non-finite coordinates land on the grid center.
    pub fn clamp_to_interior(&self, p: Vec2) -> Vec2 {
        let lo = 1.5;
        let hi = self.size as f32 - 1.5;
        let axis = |v: f32| {
            if v.is_finite() {
                v.clamp(lo, hi)
            } else {
                self.size as f32 / 2.0
            }
        };
        Vec2::new(axis(p.x), axis(p.y))
    }

    /// Material under a continuous coordinate; border material when outside
    #[inline]
    pub fn sample(&self, p: Vec2) -> Material {
        if !self.in_bounds(p) {
            return Material::BORDER;
        }
        // In-bounds coordinates are positive, so truncation is floor
        Material(self.cells[(p.x as usize) * self.size + p.y as usize])
    }

    /// Whether a continuous coordinate hits something solid (outside counts)
    #[inline]
    pub fn is_solid_at(&self, p: Vec2) -> bool {
        self.sample(p).is_solid()
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v >= SOLID_THRESHOLD).count()
    }

    /// One-time preparation before the session starts: recolor solid cells
    /// with a random material and clear open boxes around the spawn points.
    pub fn prepared(
        mut self,
        materials: &[u8],
        scatter: bool,
        clear_around: &[Vec2],
        half_extent: usize,
        seed: u64,
    ) -> Self {
        if scatter && !materials.is_empty() {
            let mut rng = Pcg32::seed_from_u64(seed);
            for v in self.cells.iter_mut().filter(|v| **v >= SOLID_THRESHOLD) {
                *v = materials[rng.random_range(0..materials.len())];
            }
        }

        if half_extent > 0 {
            let lo_limit = 1usize;
            let hi_limit = self.size - 2;
            let n = self.size as f32;
            let on_grid = |c: &&Vec2| c.x > 0.0 && c.x < n && c.y > 0.0 && c.y < n;
            for center in clear_around.iter().filter(on_grid) {
                let cx = center.x as usize;
                let cz = center.y as usize;
                let x0 = cx.saturating_sub(half_extent).max(lo_limit);
                let z0 = cz.saturating_sub(half_extent).max(lo_limit);
                let x1 = cx.saturating_add(half_extent).min(hi_limit);
                let z1 = cz.saturating_add(half_extent).min(hi_limit);
                for x in x0..=x1 {
                    for z in z0..=z1 {
                        self.cells[x * self.size + z] = 0;
                    }
                }
            }
        }

        self
    }
}
