//! Persistent per-cell reliability state.
//!
//! The state is an arena laid out like the input grid (one [`CellState`] per
//! cell), not a map keyed by cell. It follows the input map when its origin
//! moves and is reset when the map's shape changes.

use glam::UVec2;
use log::info;

use crate::grid::Grid2d;
use crate::types::MapInfo;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellState {
    /// Consecutive frames the cell was flagged (low support or obstacle growth).
    pub streak: u32,
    /// Long-term ground elevation estimate, `None` before the first observation.
    pub baseline: Option<f32>,
    /// Unflagged observations folded into the baseline (saturating).
    pub observations: u32,
}

impl CellState {
    /// Fold an unflagged raw elevation into the baseline.
    ///
    /// The first reading initializes it. Later readings, higher or lower, move
    /// it by `1 / window` of the difference, so a single outlier barely shifts it.
    pub fn observe(&mut self, elevation: f32, window: u32) {
        self.observations = self.observations.saturating_add(1);
        self.baseline = Some(match self.baseline {
            None => elevation,
            Some(b) => b + (elevation - b) / window.max(1) as f32,
        });
    }
}

/// How the state was brought in line with a new frame's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Unchanged,
    Shifted,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityState {
    cells: Grid2d<CellState>,
}

impl ReliabilityState {
    pub fn new(info: MapInfo) -> Self {
        Self {
            cells: Grid2d::filled(info, CellState::default()),
        }
    }

    pub fn info(&self) -> &MapInfo {
        self.cells.info()
    }

    pub fn cell(&self, pos: UVec2) -> Option<&CellState> {
        self.cells.get(pos)
    }

    pub fn cell_mut(&mut self, pos: UVec2) -> Option<&mut CellState> {
        self.cells.get_mut(pos)
    }

    /// Rejection streak at `pos` (0 outside the grid).
    pub fn streak(&self, pos: UVec2) -> u32 {
        self.cell(pos).map_or(0, |c| c.streak)
    }

    pub fn baseline(&self, pos: UVec2) -> Option<f32> {
        self.cell(pos).and_then(|c| c.baseline)
    }

    /// Forget every cell and adopt `info` as the geometry.
    pub fn reset(&mut self, info: MapInfo) {
        self.cells = Grid2d::filled(info, CellState::default());
    }

    /// Follow `info`: shift along with a moved origin, reset on a shape change.
    pub fn align_to(&mut self, info: &MapInfo) -> Alignment {
        if !self.info().same_shape(info) {
            info!(
                "reliability state reset: map changed from {}x{} @ {} m to {}x{} @ {} m",
                self.info().width,
                self.info().height,
                self.info().resolution,
                info.width,
                info.height,
                info.resolution
            );
            self.reset(info.clone());
            return Alignment::Reset;
        }
        if self.info().same_geometry(info) {
            return Alignment::Unchanged;
        }
        self.cells.update_origin(info.origin, CellState::default());
        Alignment::Shifted
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [CellState] {
        self.cells.data_mut()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;

    use super::*;

    #[test]
    fn first_observation_sets_baseline() {
        let mut cell = CellState::default();
        cell.observe(0.3, 200);
        assert_eq!(cell.baseline, Some(0.3));
        assert_eq!(cell.observations, 1);
    }

    #[test]
    fn one_low_reading_barely_moves_baseline() {
        let mut cell = CellState::default();
        cell.observe(1.0, 200);
        cell.observe(0.0, 200);
        assert_relative_eq!(cell.baseline.unwrap(), 0.995, epsilon = 1e-6);
    }

    #[test]
    fn readings_average_in_over_the_window() {
        let mut cell = CellState::default();
        cell.observe(0.0, 4);
        cell.observe(1.0, 4);
        assert_relative_eq!(cell.baseline.unwrap(), 0.25);
        for _ in 0..10 {
            cell.observe(1.0, 4);
        }
        // Each step closes a quarter of the gap.
        let b = cell.baseline.unwrap();
        assert!(b > 0.9 && b < 1.0);

        for _ in 0..40 {
            cell.observe(0.2, 4);
        }
        assert_relative_eq!(cell.baseline.unwrap(), 0.2, epsilon = 1e-3);
    }

    #[test]
    fn align_shifts_with_origin() {
        let info = MapInfo::square(3, 1.0);
        let mut state = ReliabilityState::new(info.clone());
        state.cell_mut(UVec2::new(2, 0)).unwrap().streak = 4;

        let mut moved = info.clone();
        moved.origin = Vec2::new(1.0, 0.0);
        assert_eq!(state.align_to(&moved), Alignment::Shifted);
        assert_eq!(state.streak(UVec2::new(1, 0)), 4);
        assert_eq!(state.streak(UVec2::new(2, 0)), 0);
        assert_eq!(state.align_to(&moved), Alignment::Unchanged);
    }

    #[test]
    fn align_resets_on_shape_change() {
        let mut state = ReliabilityState::new(MapInfo::square(3, 1.0));
        state.cell_mut(UVec2::new(0, 0)).unwrap().streak = 2;
        assert_eq!(state.align_to(&MapInfo::square(4, 1.0)), Alignment::Reset);
        assert_eq!(state.info().width, 4);
        assert_eq!(state.streak(UVec2::new(0, 0)), 0);
    }
}
