//! Blue-noise point sampling
//!
//! Grid-accelerated dart throwing. The target rectangle is cut into square
//! cells of side `min_distance / cells_per_min_distance`. Each round picks a
//! random live cell, drops one point in it, then knocks out the cells around
//! it within a taxicab radius of `max_cell_dist`:
//!
//! ```text
//!             r
//!          r  x  r         x = removed
//!       r  x  O  x  r      r = kept, restricted to the half facing away from O
//!          r  x  r
//!             r
//! ```
//!
//! Cells exactly on the rim survive with a triangular restriction, which
//! recovers most of the density a diamond-shaped exclusion would lose. Every
//! acceptance costs a constant amount of work, independent of how many points
//! have been placed.
//!
//! The RNG is reseeded on every call, so a given `(rectangle, seed)` always
//! yields the same points in the same order.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{CELLS_PER_MIN_DISTANCE, MAX_CELL_DIST};

/// The half of a cell a point is still allowed to land in
///
/// Cells are split by one of their diagonals; the variant names the corner
/// the allowed triangle sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Half {
    /// Restriction for a rim cell at index offset (dx, dy) from the accepted cell
    fn facing_away(dx: i64, dy: i64) -> Self {
        if dx < 0 {
            if dy > 0 { Half::BottomLeft } else { Half::TopLeft }
        } else if dy > 0 {
            Half::BottomRight
        } else {
            Half::TopRight
        }
    }

    /// Whether a cell-local point lies in the allowed half (diagonal inclusive)
    fn contains(self, local: Vec2, cell_size: f32) -> bool {
        match self {
            Half::TopRight => local.x >= local.y,
            Half::BottomLeft => local.x <= local.y,
            Half::TopLeft => local.x + local.y <= cell_size,
            Half::BottomRight => local.x + local.y >= cell_size,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    /// Top-left corner relative to the sampled rectangle
    origin: Vec2,
    restriction: Option<Half>,
}

/// Grid bookkeeping: flat cell arena plus a swap-remove list of live cells
struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Flat indices of cells that can still receive a point
    available: Vec<usize>,
    /// Position of each cell inside `available`, `None` once removed
    slot_of: Vec<Option<usize>>,
}

impl Grid {
    fn new(width: usize, height: usize, cell_size: f32) -> Self {
        let count = width * height;
        let mut cells = Vec::with_capacity(count);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    origin: Vec2::new(x as f32 * cell_size, y as f32 * cell_size),
                    restriction: None,
                });
            }
        }
        Self {
            width,
            height,
            cells,
            available: (0..count).collect(),
            slot_of: (0..count).map(Some).collect(),
        }
    }

    #[inline]
    fn is_live(&self, flat: usize) -> bool {
        self.slot_of[flat].is_some()
    }

    /// O(1) removal: move the last live cell into the vacated slot
    fn remove(&mut self, flat: usize) {
        let Some(slot) = self.slot_of[flat].take() else {
            return;
        };
        let last = self.available.len() - 1;
        if slot < last {
            let moved = self.available[last];
            self.available[slot] = moved;
            self.slot_of[moved] = Some(slot);
        }
        self.available.pop();
    }
}

/// Blue-noise sampler with tunable grid density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlueNoiseSampler {
    /// Cells per `min_distance` along each axis (≥ 1)
    pub cells_per_min_distance: u32,
    /// Taxicab cell radius cleared around each accepted point (≥ 1)
    pub max_cell_dist: u32,
}

impl Default for BlueNoiseSampler {
    fn default() -> Self {
        Self {
            cells_per_min_distance: CELLS_PER_MIN_DISTANCE,
            max_cell_dist: MAX_CELL_DIST,
        }
    }
}

impl BlueNoiseSampler {
    pub fn new(cells_per_min_distance: u32, max_cell_dist: u32) -> Self {
        Self {
            cells_per_min_distance: cells_per_min_distance.max(1),
            max_cell_dist: max_cell_dist.max(1),
        }
    }

    /// Side length of one grid cell for the given spacing
    pub fn cell_size(&self, min_distance: f32) -> f32 {
        min_distance / self.cells_per_min_distance.max(1) as f32
    }

    /// Sample points inside `[0, width] x [0, height]`, shifted by `origin`
    ///
    /// Degenerate input (non-positive or non-finite sizes) yields no points.
    pub fn sample(
        &self,
        width: f32,
        height: f32,
        min_distance: f32,
        origin: Vec2,
        seed: u64,
    ) -> Vec<Vec2> {
        if !(width > 0.0 && height > 0.0 && min_distance > 0.0)
            || !width.is_finite()
            || !height.is_finite()
        {
            return Vec::new();
        }

        let cell_size = self.cell_size(min_distance);
        let half_cell = cell_size / 2.0;
        let grid_width = (width / cell_size) as usize + 1;
        let grid_height = (height / cell_size) as usize + 1;
        let reach = self.max_cell_dist.max(1) as i64;

        let mut grid = Grid::new(grid_width, grid_height, cell_size);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut points = Vec::new();

        while !grid.available.is_empty() {
            let selection = rng.random_range(0..grid.available.len());
            let flat = grid.available[selection];

            if grid.slot_of[flat] != Some(selection) {
                // Stale entry; drop it and draw again
                log::trace!("Sampler skipped stale cell {}", flat);
                let last = grid.available.len() - 1;
                grid.available.swap(selection, last);
                grid.available.pop();
                if let Some(&moved) = grid.available.get(selection) {
                    grid.slot_of[moved] = Some(selection);
                }
                continue;
            }

            let cell = grid.cells[flat];
            let mut point = cell.origin
                + Vec2::new(
                    rng.random::<f32>() * cell_size,
                    rng.random::<f32>() * cell_size,
                );

            // Fold a point from the forbidden half through the cell center
            if let Some(half) = cell.restriction {
                if !half.contains(point - cell.origin, cell_size) {
                    let center = cell.origin + Vec2::splat(half_cell);
                    point = center * 2.0 - point;
                }
            }

            if point.x <= width && point.y <= height {
                points.push(origin + point);
            }

            grid.remove(flat);

            let cell_x = (flat % grid.width) as i64;
            let cell_y = (flat / grid.width) as i64;
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let taxicab = dx.abs() + dy.abs();
                    if taxicab == 0 || taxicab > reach {
                        continue;
                    }
                    let (nx, ny) = (cell_x + dx, cell_y + dy);
                    if nx < 0 || ny < 0 || nx >= grid.width as i64 || ny >= grid.height as i64 {
                        continue;
                    }
                    let neighbor = ny as usize * grid.width + nx as usize;
                    if !grid.is_live(neighbor) {
                        continue;
                    }

                    if taxicab < reach {
                        grid.remove(neighbor);
                        continue;
                    }

                    // Rim cell: keep only the half facing away from this point.
                    // A cell already held to a different half by another point
                    // has no safe region left, so it goes.
                    let wanted = Half::facing_away(dx, dy);
                    match grid.cells[neighbor].restriction {
                        Some(existing) if existing != wanted => grid.remove(neighbor),
                        _ => grid.cells[neighbor].restriction = Some(wanted),
                    }
                }
            }
        }

        points
    }
}

/// Sample with the default grid density
pub fn sample(width: f32, height: f32, min_distance: f32, origin: Vec2, seed: u64) -> Vec<Vec2> {
    BlueNoiseSampler::default().sample(width, height, min_distance, origin, seed)
}
