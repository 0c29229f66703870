//! Weighted fusion of normalized metric costs.

use crate::grid::{Grid2d, Layer};
use crate::types::TraversabilityError;

/// Weighted mean over the costs that are present, with the weights
/// renormalized over that subset. `None` when every cost is missing or the
/// present weights sum to zero.
pub fn fuse_cell(costs: &[Option<f32>], weights: &[f32]) -> Option<f32> {
    let mut sum = 0.0f64;
    let mut weight_sum = 0.0f64;
    for (cost, &w) in costs.iter().zip(weights) {
        if let Some(c) = cost {
            sum += w as f64 * *c as f64;
            weight_sum += w as f64;
        }
    }
    if weight_sum > 0.0 {
        Some((sum / weight_sum) as f32)
    } else {
        None
    }
}

/// Fuse per-metric cost layers cell by cell. All layers must share geometry.
pub fn fuse_layers(costs: &[&Layer], weights: &[f32]) -> Result<Layer, TraversabilityError> {
    let Some(first) = costs.first() else {
        return Err(TraversabilityError::InvalidConfig(
            "fusion needs at least one cost layer".to_string(),
        ));
    };
    if costs.len() != weights.len() {
        return Err(TraversabilityError::InvalidConfig(format!(
            "{} cost layers but {} weights",
            costs.len(),
            weights.len()
        )));
    }
    let info = first.info();
    if let Some(other) = costs.iter().find(|l| !l.info().same_geometry(info)) {
        return Err(TraversabilityError::geometry(info, other.info()));
    }

    let mut cell_costs = vec![None; costs.len()];
    let data = (0..info.len())
        .map(|i| {
            for (slot, layer) in cell_costs.iter_mut().zip(costs) {
                *slot = layer.data()[i];
            }
            fuse_cell(&cell_costs, weights)
        })
        .collect();
    Grid2d::new(info.clone(), data)
}
