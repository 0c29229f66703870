//! Gaussian pre-smoothing of an elevation layer.
//!
//! Missing cells are left out of the weighted average and the kernel weights
//! are renormalized over the cells that remain, so borders and holes do not
//! bias the result toward zero. A cell whose whole kernel support is missing
//! stays missing.

use glam::UVec2;

use crate::engine::ComputeEngine;
use crate::grid::Layer;

/// Precomputed square Gaussian kernel, truncated at three standard deviations.
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    half_width: i32,
    side: usize,
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Kernel for a standard deviation expressed in cells. `None` when the
    /// sigma is too small to have any effect.
    pub fn new(sigma_cells: f32) -> Option<Self> {
        if !sigma_cells.is_finite() || sigma_cells <= 0.0 {
            return None;
        }
        let half_width = (3.0 * sigma_cells).ceil() as i32;
        let side = (2 * half_width + 1) as usize;
        let denom = 2.0 * sigma_cells * sigma_cells;

        let mut weights = Vec::with_capacity(side * side);
        for dy in -half_width..=half_width {
            for dx in -half_width..=half_width {
                let d2 = (dx * dx + dy * dy) as f32;
                weights.push((-d2 / denom).exp());
            }
        }

        Some(Self {
            half_width,
            side,
            weights,
        })
    }

    /// Kernel for a sigma in meters on a grid of `resolution` meters per cell.
    pub fn from_meters(sigma_m: f32, resolution: f32) -> Option<Self> {
        if resolution <= 0.0 {
            return None;
        }
        Self::new(sigma_m / resolution)
    }

    #[inline]
    pub fn half_width(&self) -> i32 {
        self.half_width
    }

    #[inline]
    fn weight(&self, dx: i32, dy: i32) -> f32 {
        let ix = (dx + self.half_width) as usize;
        let iy = (dy + self.half_width) as usize;
        self.weights[iy * self.side + ix]
    }

    /// Renormalized weighted average around `center`, `None` if no support.
    pub fn apply_at(&self, layer: &Layer, center: UVec2) -> Option<f32> {
        let w = layer.width() as i32;
        let h = layer.height() as i32;
        let cx = center.x as i32;
        let cy = center.y as i32;

        let mut sum = 0.0f64;
        let mut weight_sum = 0.0f64;
        for dy in -self.half_width..=self.half_width {
            let y = cy + dy;
            if y < 0 || y >= h {
                continue;
            }
            for dx in -self.half_width..=self.half_width {
                let x = cx + dx;
                if x < 0 || x >= w {
                    continue;
                }
                if let Some(z) = layer.value(UVec2::new(x as u32, y as u32)) {
                    let k = self.weight(dx, dy) as f64;
                    sum += k * z as f64;
                    weight_sum += k;
                }
            }
        }

        if weight_sum > 0.0 {
            Some((sum / weight_sum) as f32)
        } else {
            None
        }
    }
}

/// Smooth `layer` with a Gaussian of `sigma_m` meters. Returns a new layer;
/// the input is left untouched. A non-positive sigma returns a copy.
pub fn smooth_gaussian(layer: &Layer, sigma_m: f32, engine: &dyn ComputeEngine) -> Layer {
    let Some(kernel) = GaussianKernel::from_meters(sigma_m, layer.info().resolution) else {
        return layer.clone();
    };
    engine.layer(layer.info(), &|cell| kernel.apply_at(layer, cell))
}
