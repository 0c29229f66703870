//! Point-cloud view of a cost layer, one point per costed cell.

use glam::{UVec2, Vec3};

use crate::grid::Layer;
use crate::types::TraversabilityError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostPoint {
    /// Cell center in world coordinates, `z` from the elevation layer.
    pub position: Vec3,
    pub cost: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostCloud {
    points: Vec<CostPoint>,
}

impl CostCloud {
    /// One point per cell with a cost; cells without a cost are skipped.
    ///
    /// Elevation missing under a costed cell puts the point at `z = 0`.
    pub fn from_layers(cost: &Layer, elevation: &Layer) -> Result<Self, TraversabilityError> {
        if !cost.info().same_geometry(elevation.info()) {
            return Err(TraversabilityError::geometry(cost.info(), elevation.info()));
        }
        let info = cost.info();
        let points = cost
            .iter_cells()
            .filter_map(|(cell, c)| {
                let c = (*c)?;
                let xy = info.cell_center(cell);
                let z = elevation.value(cell).unwrap_or(0.0);
                Some(CostPoint {
                    position: xy.extend(z),
                    cost: c,
                })
            })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[CostPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points whose cost is at least `threshold`.
    pub fn above(&self, threshold: f32) -> impl Iterator<Item = &CostPoint> {
        self.points.iter().filter(move |p| p.cost >= threshold)
    }

    /// Cell under a world position, if the cloud came from a grid of this geometry.
    pub fn cell_of(layer: &Layer, point: &CostPoint) -> Option<UVec2> {
        let map = layer.world_to_map(point.position.truncate())?;
        Some(map.floor().as_uvec2())
    }
}

impl IntoIterator for CostCloud {
    type Item = CostPoint;
    type IntoIter = std::vec::IntoIter<CostPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
