//! Map metadata.

use glam::{IVec2, UVec2, Vec2};

/// Grid geometry shared by every layer of a [`GridMap`](crate::grid::GridMap).
///
/// `width` is the number of columns, `height` the number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInfo {
    pub width: u32,
    pub height: u32,
    pub resolution: f32,
    /// Origin of cell (0, 0) in world coordinates (meters).
    pub origin: Vec2,
}

impl Default for MapInfo {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            resolution: 0.05,
            origin: Vec2::ZERO,
        }
    }
}

impl MapInfo {
    pub fn square(width: u32, resolution: f32) -> Self {
        Self {
            width,
            height: width,
            resolution,
            ..Default::default()
        }
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of the map in world units (meters).
    #[inline]
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.resolution
    }

    /// Height of the map in world units (meters).
    #[inline]
    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.resolution
    }

    /// World position of the center of `cell`.
    #[inline]
    pub fn cell_center(&self, cell: UVec2) -> Vec2 {
        self.origin + (cell.as_vec2() + Vec2::splat(0.5)) * self.resolution
    }

    /// True when dimensions and resolution agree. Origins may differ.
    pub fn same_shape(&self, other: &MapInfo) -> bool {
        self.width == other.width
            && self.height == other.height
            && (self.resolution - other.resolution).abs() <= f32::EPSILON * self.resolution.abs()
    }

    /// Whole-cell shift that brings the origin closest to `new_origin`.
    pub fn origin_shift(&self, new_origin: Vec2) -> IVec2 {
        if self.resolution <= 0.0 {
            return IVec2::ZERO;
        }
        ((new_origin - self.origin) / self.resolution)
            .round()
            .as_ivec2()
    }

    /// True when shape and origin agree (origins within a hundredth of a cell).
    pub fn same_geometry(&self, other: &MapInfo) -> bool {
        self.same_shape(other)
            && (self.origin - other.origin).abs().max_element() <= 0.01 * self.resolution.abs()
    }
}
