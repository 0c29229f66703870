//! Compute engines for per-cell neighborhood kernels.
//!
//! The smoothing and metric stages are written as a pure function of one cell
//! (reading shared, immutable input layers). An engine decides how that
//! function is mapped over the grid. Engines never change results: every
//! engine returns the same values in the same row-major order.

use glam::UVec2;
use log::warn;

use crate::grid::{Grid2d, Layer};
use crate::types::MapInfo;

/// Per-cell kernel evaluated by an engine.
pub type CellFn<'a> = dyn Fn(UVec2) -> Option<f32> + Sync + 'a;

pub trait ComputeEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate `cell_fn` for every cell of `info`, row-major.
    fn evaluate(&self, info: &MapInfo, cell_fn: &CellFn<'_>) -> Vec<Option<f32>>;

    /// Evaluate `cell_fn` into a layer with geometry `info`.
    fn layer(&self, info: &MapInfo, cell_fn: &CellFn<'_>) -> Layer {
        Grid2d::from_parts(info.clone(), self.evaluate(info, cell_fn))
    }
}

/// Single-threaded row-major walk.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialEngine;

impl ComputeEngine for SerialEngine {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn evaluate(&self, info: &MapInfo, cell_fn: &CellFn<'_>) -> Vec<Option<f32>> {
        let mut out = Vec::with_capacity(info.len());
        for y in 0..info.height {
            for x in 0..info.width {
                out.push(cell_fn(UVec2::new(x, y)));
            }
        }
        out
    }
}

/// Data-parallel evaluation across rows (rayon). Falls back to a serial walk
/// when built without the `rayon` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelEngine;

impl ComputeEngine for ParallelEngine {
    fn name(&self) -> &'static str {
        "parallel"
    }

    #[cfg(feature = "rayon")]
    fn evaluate(&self, info: &MapInfo, cell_fn: &CellFn<'_>) -> Vec<Option<f32>> {
        use rayon::prelude::*;

        let width = info.width as usize;
        let mut out = vec![None; info.len()];
        if width == 0 {
            return out;
        }
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = cell_fn(UVec2::new(x as u32, y as u32));
                }
            });
        out
    }

    #[cfg(not(feature = "rayon"))]
    fn evaluate(&self, info: &MapInfo, cell_fn: &CellFn<'_>) -> Vec<Option<f32>> {
        SerialEngine.evaluate(info, cell_fn)
    }
}

/// Engine selected by the `use_cpu` option.
pub fn engine_for(use_cpu: bool) -> Box<dyn ComputeEngine> {
    if use_cpu {
        return Box::new(SerialEngine);
    }
    if !cfg!(feature = "rayon") {
        warn!("parallel engine requested but built without `rayon`; evaluating serially");
    }
    Box::new(ParallelEngine)
}
