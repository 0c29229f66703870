//! Caution inflation around flagged cells.
//!
//! A flagged cell (sparse support or a growing obstacle that has not been
//! confirmed yet) raises the cost of every cell within the inflation radius.
//! The raise is strongest at the flagged cell (cost 1) and falls off linearly
//! with distance; costs only ever go up. Missing costs are not filled in.

use glam::{IVec2, UVec2};

use crate::grid::{Disc, Grid2d, Layer, MAX_RADIUS_CELLS};
use crate::types::COST_MAX;

/// Convert an inflation radius in meters to a cell count.
///
/// Returns `ceil(radius / resolution)` (with a small tolerance for exact
/// multiples). A zero radius inflates only the flagged cell itself.
#[inline]
pub fn inflation_radius_to_cells(radius_m: f32, resolution: f32) -> u32 {
    if resolution <= 0.0 || radius_m <= 0.0 {
        return 0;
    }
    let cells = (radius_m / resolution - 1e-4).ceil().max(0.0);
    if cells >= MAX_RADIUS_CELLS as f32 {
        return MAX_RADIUS_CELLS;
    }
    cells as u32
}

/// Caution cost at `distance` cells from a flagged cell.
///
/// `1` at the flagged cell, reaching zero one cell beyond `radius_cells`.
#[inline]
pub fn caution_cost(distance: f32, radius_cells: u32) -> f32 {
    if distance <= 0.0 {
        return COST_MAX;
    }
    (COST_MAX - distance / (radius_cells as f32 + 1.0)).max(0.0)
}

/// Disc of offsets with their precomputed caution costs.
#[derive(Debug, Clone)]
pub struct CautionInflation {
    radius_cells: u32,
    stamp: Vec<(IVec2, f32)>,
}

impl CautionInflation {
    pub fn new(radius_cells: u32) -> Self {
        let disc = Disc::new(radius_cells);
        let stamp = disc
            .offsets()
            .iter()
            .map(|&off| (off, caution_cost(off.as_vec2().length(), radius_cells)))
            .collect();
        Self {
            radius_cells,
            stamp,
        }
    }

    pub fn from_meters(radius_m: f32, resolution: f32) -> Self {
        Self::new(inflation_radius_to_cells(radius_m, resolution))
    }

    pub fn radius_cells(&self) -> u32 {
        self.radius_cells
    }

    /// Raise `costs` around every seed. Returns the number of cells raised.
    pub fn apply(&self, costs: &mut Layer, seeds: &[UVec2]) -> usize {
        if seeds.is_empty() {
            return 0;
        }
        let width = costs.width() as i32;
        let height = costs.height() as i32;

        // Strongest caution per cell first, so overlapping seeds do not compound.
        let mut caution = Grid2d::filled(costs.info().clone(), 0.0f32);
        for seed in seeds {
            let c = seed.as_ivec2();
            for &(off, k) in &self.stamp {
                let p = c + off;
                if p.x < 0 || p.y < 0 || p.x >= width || p.y >= height {
                    continue;
                }
                let idx = (p.y * width + p.x) as usize;
                let slot = &mut caution.data_mut()[idx];
                if k > *slot {
                    *slot = k;
                }
            }
        }

        let mut raised = 0;
        for (cost, &k) in costs.data_mut().iter_mut().zip(caution.data()) {
            if let Some(c) = cost {
                if k > *c {
                    *c = k;
                    raised += 1;
                }
            }
        }
        raised
    }
}
