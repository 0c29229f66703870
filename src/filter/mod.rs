//! Temporal reliability filter.
//!
//! Per frame and per cell, two checks run against the raw (unfiltered)
//! elevation layer:
//!
//! - **support**: fraction of non-missing raw cells in a disc around the cell;
//!   below `support_ratio` the cell is flagged as low support.
//! - **obstacle growth**: raw elevation above `obstacle_threshold` that has
//!   risen past the cell's baseline by more than the growth factor.
//!
//! A flagged cell extends its rejection streak. While the streak is below
//! `rejection_limit_frames` the cell (and its surroundings) get caution
//! inflation; once it reaches the limit the cell's cost is removed (invalid).
//! An unflagged cell resets its streak and feeds its baseline.
//!
//! [`ReliabilityFilter::evaluate`] computes a frame without touching the
//! persisted state; [`ReliabilityFilter::commit`] installs the new state.

pub mod inflation;
pub mod state;

use glam::UVec2;

use crate::config::FilterSection;
use crate::grid::{Disc, Layer};
use crate::types::TraversabilityError;

pub use inflation::{CautionInflation, caution_cost, inflation_radius_to_cells};
pub use state::{Alignment, CellState, ReliabilityState};

/// Counts for one filtered frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub low_support: usize,
    pub obstacle_growth: usize,
    /// Flagged cells still inside their grace period (inflation seeds).
    pub cautioned: usize,
    /// Cells whose cost was raised by caution inflation.
    pub inflated: usize,
    /// Cells whose cost was removed.
    pub invalidated: usize,
}

/// A computed but not yet committed frame.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub costs: Layer,
    pub report: FilterReport,
    next_state: Option<ReliabilityState>,
}

/// True when `elevation` counts as a new or growing obstacle against `baseline`.
///
/// Needs an established baseline, an elevation above `obstacle_threshold`, and
/// a rise over the baseline larger than `(growth_threshold - 1) * |baseline|`.
pub fn is_obstacle_growth(
    elevation: f32,
    baseline: Option<f32>,
    obstacle_threshold: f32,
    growth_threshold: f32,
) -> bool {
    let Some(baseline) = baseline else {
        return false;
    };
    if elevation <= obstacle_threshold || elevation <= baseline {
        return false;
    }
    let margin = (growth_threshold - 1.0).max(0.0) * baseline.abs();
    elevation - baseline > margin
}

/// Fraction of in-bounds disc cells around `cell` whose raw elevation is present.
pub fn support_ratio(raw: &Layer, disc: &Disc, cell: UVec2) -> f32 {
    let mut total = 0usize;
    let mut valid = 0usize;
    for (_, p) in disc.cells_around(cell, raw.width(), raw.height()) {
        total += 1;
        if raw.value(p).is_some() {
            valid += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    valid as f32 / total as f32
}

pub struct ReliabilityFilter {
    config: FilterSection,
    state: Option<ReliabilityState>,
}

impl ReliabilityFilter {
    pub fn new(config: FilterSection) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &FilterSection {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Persisted state, `None` before the first committed frame.
    pub fn state(&self) -> Option<&ReliabilityState> {
        self.state.as_ref()
    }

    /// Drop all persisted state.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Filter one frame. `fused` and `raw` must share geometry.
    ///
    /// Persisted state is read but not modified.
    pub fn evaluate(&self, fused: &Layer, raw: &Layer) -> Result<FilterOutcome, TraversabilityError> {
        if !fused.info().same_geometry(raw.info()) {
            return Err(TraversabilityError::geometry(fused.info(), raw.info()));
        }
        if !self.config.enabled {
            return Ok(FilterOutcome {
                costs: fused.clone(),
                report: FilterReport::default(),
                next_state: self.state.clone(),
            });
        }

        let info = raw.info();
        let mut state = match &self.state {
            Some(current) => {
                let mut next = current.clone();
                next.align_to(info);
                next
            }
            None => ReliabilityState::new(info.clone()),
        };

        let cfg = &self.config;
        let support_disc = Disc::from_meters(cfg.support_radius_m, info.resolution);
        let inflation = CautionInflation::from_meters(cfg.inflation_radius_m, info.resolution);
        let width = info.width.max(1);

        let mut report = FilterReport::default();
        let mut seeds = Vec::new();
        let mut invalid = Vec::new();

        for (i, cell_state) in state.cells_mut().iter_mut().enumerate() {
            let cell = UVec2::new(i as u32 % width, i as u32 / width);
            let elevation = raw.value(cell);

            let low_support = support_ratio(raw, &support_disc, cell) < cfg.support_ratio;
            let growth = elevation.is_some_and(|h| {
                is_obstacle_growth(
                    h,
                    cell_state.baseline,
                    cfg.obstacle_threshold,
                    cfg.obstacle_growth_threshold,
                )
            });
            report.low_support += low_support as usize;
            report.obstacle_growth += growth as usize;

            if low_support || growth {
                cell_state.streak = cell_state.streak.saturating_add(1);
                if cell_state.streak < cfg.rejection_limit_frames {
                    seeds.push(cell);
                } else {
                    invalid.push(cell);
                }
            } else {
                cell_state.streak = 0;
                if let Some(h) = elevation {
                    cell_state.observe(h, cfg.min_obstacle_baseline);
                }
            }
        }

        let mut costs = fused.clone();
        report.cautioned = seeds.len();
        report.inflated = inflation.apply(&mut costs, &seeds);
        for cell in &invalid {
            if let Some(slot) = costs.get_mut(*cell) {
                *slot = None;
            }
        }
        report.invalidated = invalid.len();

        Ok(FilterOutcome {
            costs,
            report,
            next_state: Some(state),
        })
    }

    /// Install the state computed by [`evaluate`](Self::evaluate).
    pub fn commit(&mut self, outcome: FilterOutcome) -> (Layer, FilterReport) {
        self.state = outcome.next_state;
        (outcome.costs, outcome.report)
    }

    /// Evaluate and commit in one step.
    pub fn apply(
        &mut self,
        fused: &Layer,
        raw: &Layer,
    ) -> Result<(Layer, FilterReport), TraversabilityError> {
        let outcome = self.evaluate(fused, raw)?;
        Ok(self.commit(outcome))
    }
}
