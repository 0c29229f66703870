use glam::{UVec2, Vec2};

use crate::types::{MapInfo, TraversabilityError};

/// Dense row-major 2D grid. Cell `(x, y)` is column `x`, row `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2d<T> {
    info: MapInfo,
    data: Vec<T>,
}

/// A named scalar field: one optional value per cell, `None` meaning missing.
pub type Layer = Grid2d<Option<f32>>;

impl<T> Grid2d<T> {
    pub fn new(info: MapInfo, data: Vec<T>) -> Result<Self, TraversabilityError> {
        let expected_len = info.len();
        if data.len() != expected_len {
            return Err(TraversabilityError::InvalidMetadata(format!(
                "data length {} does not match map size {}",
                data.len(),
                expected_len
            )));
        }

        Ok(Self { info, data })
    }

    /// Wrap data produced for `info` in row-major order. Length must match.
    pub(crate) fn from_parts(info: MapInfo, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), info.len());
        Self { info, data }
    }

    /// Grid with every cell set to `value`.
    pub fn filled(info: MapInfo, value: T) -> Self
    where
        T: Clone,
    {
        let data = vec![value; info.len()];
        Self { info, data }
    }

    /// Grid whose cells are produced by `f(cell)` in row-major order.
    pub fn from_fn(info: MapInfo, mut f: impl FnMut(UVec2) -> T) -> Self {
        let mut data = Vec::with_capacity(info.len());
        for y in 0..info.height {
            for x in 0..info.width {
                data.push(f(UVec2::new(x, y)));
            }
        }
        Self { info, data }
    }

    pub fn info(&self) -> &MapInfo {
        &self.info
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    #[inline]
    pub fn contains(&self, pos: UVec2) -> bool {
        pos.x < self.info.width && pos.y < self.info.height
    }

    pub fn get(&self, pos: UVec2) -> Option<&T> {
        if !self.contains(pos) {
            return None;
        }
        let idx = self.index(pos);
        Some(&self.data[idx])
    }

    pub fn get_mut(&mut self, pos: UVec2) -> Option<&mut T> {
        if !self.contains(pos) {
            return None;
        }
        let idx = self.index(pos);
        Some(&mut self.data[idx])
    }

    pub fn set(&mut self, pos: UVec2, value: T) -> Result<(), TraversabilityError> {
        if !self.contains(pos) {
            return Err(TraversabilityError::OutOfBounds(format!(
                "cell ({}, {}) out of bounds for map {}x{}",
                pos.x, pos.y, self.info.width, self.info.height
            )));
        }
        let idx = self.index(pos);
        self.data[idx] = value;
        Ok(())
    }

    #[inline]
    pub fn index(&self, pos: UVec2) -> usize {
        (pos.y as usize) * (self.info.width as usize) + (pos.x as usize)
    }

    /// Continuous map coordinates (cells) to world coordinates (meters).
    pub fn map_to_world(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            self.info.origin.x + pos.x * self.info.resolution,
            self.info.origin.y + pos.y * self.info.resolution,
        )
    }

    /// World coordinates (meters) to continuous map coordinates, `None` outside the map.
    pub fn world_to_map(&self, pos: Vec2) -> Option<Vec2> {
        let mx = (pos.x - self.info.origin.x) / self.info.resolution;
        let my = (pos.y - self.info.origin.y) / self.info.resolution;
        if mx < 0.0 || my < 0.0 || mx >= self.info.width as f32 || my >= self.info.height as f32 {
            return None;
        }
        Some(Vec2::new(mx, my))
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate `(cell, value)` pairs in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (UVec2, &T)> + '_ {
        let width = self.info.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (UVec2::new(i as u32 % width, i as u32 / width), v))
    }

    /// Apply `f` cell by cell, keeping the geometry.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid2d<U> {
        Grid2d {
            info: self.info.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Move the grid origin to `new_origin`, snapped to whole cells.
    ///
    /// Cells that stay inside the map keep their world position; cells scrolled
    /// in from outside are set to `fill`.
    pub fn update_origin(&mut self, new_origin: Vec2, fill: T)
    where
        T: Clone,
    {
        let shift = self.info.origin_shift(new_origin);
        let (sx, sy) = (shift.x as i64, shift.y as i64);
        if sx == 0 && sy == 0 {
            return;
        }

        let w = self.info.width as i64;
        let h = self.info.height as i64;
        let mut data = vec![fill; self.data.len()];
        for y in 0..h {
            let oy = y + sy;
            if oy < 0 || oy >= h {
                continue;
            }
            for x in 0..w {
                let ox = x + sx;
                if ox < 0 || ox >= w {
                    continue;
                }
                data[(y * w + x) as usize] = self.data[(oy * w + ox) as usize].clone();
            }
        }

        self.data = data;
        self.info.origin += shift.as_vec2() * self.info.resolution;
    }
}

impl Grid2d<Option<f32>> {
    /// Layer with every cell missing.
    pub fn missing(info: MapInfo) -> Self {
        Self::filled(info, None)
    }

    /// Layer built from plain values; non-finite values become missing.
    pub fn from_values(info: MapInfo, values: &[f32]) -> Result<Self, TraversabilityError> {
        let data = values
            .iter()
            .map(|v| if v.is_finite() { Some(*v) } else { None })
            .collect();
        Self::new(info, data)
    }

    /// Value at `pos`, `None` when missing or out of bounds.
    #[inline]
    pub fn value(&self, pos: UVec2) -> Option<f32> {
        self.get(pos).copied().flatten()
    }

    /// Number of non-missing cells.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }

    /// Minimum and maximum over non-missing cells.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
