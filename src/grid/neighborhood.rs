//! Disc-shaped cell neighborhoods.

use glam::{IVec2, UVec2};

/// Largest disc radius in cells.
pub const MAX_RADIUS_CELLS: u32 = 1024;

/// Convert a neighborhood radius in meters to a cell count.
///
/// Returns `ceil(radius / resolution)` with a small tolerance so that radii that
/// are exact multiples of the resolution do not round up a whole cell. Clamped
/// to `1..=MAX_RADIUS_CELLS`.
#[inline]
pub fn radius_to_cells(radius_m: f32, resolution: f32) -> u32 {
    if resolution <= 0.0 || radius_m <= 0.0 {
        return 1;
    }
    let cells = (radius_m / resolution - 1e-4).ceil();
    if cells >= MAX_RADIUS_CELLS as f32 {
        return MAX_RADIUS_CELLS;
    }
    (cells as u32).max(1)
}

/// Precomputed offsets of every cell within `radius` cells of a center,
/// center included (`dx^2 + dy^2 <= radius^2`).
#[derive(Debug, Clone)]
pub struct Disc {
    radius: u32,
    offsets: Vec<IVec2>,
}

impl Disc {
    pub fn new(radius_cells: u32) -> Self {
        let r = radius_cells as i32;
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    offsets.push(IVec2::new(dx, dy));
                }
            }
        }
        Self {
            radius: radius_cells,
            offsets,
        }
    }

    /// Disc for a radius in meters, at least one cell.
    pub fn from_meters(radius_m: f32, resolution: f32) -> Self {
        Self::new(radius_to_cells(radius_m, resolution))
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Offsets including those that fall outside any particular grid.
    pub fn offsets(&self) -> &[IVec2] {
        &self.offsets
    }

    /// In-bounds cells of the disc around `center` on a `width` x `height` grid,
    /// paired with their offset from the center.
    pub fn cells_around(
        &self,
        center: UVec2,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (IVec2, UVec2)> + '_ {
        let c = center.as_ivec2();
        self.offsets.iter().filter_map(move |&off| {
            let p = c + off;
            if p.x < 0 || p.y < 0 || p.x >= width as i32 || p.y >= height as i32 {
                None
            } else {
                Some((off, p.as_uvec2()))
            }
        })
    }
}
