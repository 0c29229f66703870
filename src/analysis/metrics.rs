//! Geometric terrain metrics over disc neighborhoods.
//!
//! Each metric reads the smoothed elevation layer and produces its own raw
//! layer (slope in degrees, step height and roughness in meters). A cell is
//! evaluated only when its own elevation is present; neighbor counts include
//! the center cell. Too few valid neighbors yields a missing value.

use glam::UVec2;

use crate::engine::ComputeEngine;
use crate::grid::{Disc, Layer};

use super::plane::fit_plane;

/// Minimum valid cells for a plane fit (slope, roughness).
pub const MIN_PLANE_SUPPORT: usize = 3;
/// Minimum valid cells for a step height.
pub const MIN_STEP_SUPPORT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Slope,
    StepHeight,
    Roughness,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Slope, Metric::StepHeight, Metric::Roughness];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Slope => "slope",
            Metric::StepHeight => "step_height",
            Metric::Roughness => "surface_roughness",
        }
    }
}

/// One metric bound to its neighborhood.
#[derive(Debug, Clone)]
pub struct MetricComputer {
    metric: Metric,
    disc: Disc,
}

impl MetricComputer {
    pub fn new(metric: Metric, radius_m: f32, resolution: f32) -> Self {
        Self {
            metric,
            disc: Disc::from_meters(radius_m, resolution),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn radius_cells(&self) -> u32 {
        self.disc.radius()
    }

    /// Raw metric value at one cell.
    pub fn compute_at(&self, elevation: &Layer, cell: UVec2) -> Option<f32> {
        match self.metric {
            Metric::Slope => slope_at(elevation, &self.disc, cell),
            Metric::StepHeight => step_height_at(elevation, &self.disc, cell),
            Metric::Roughness => roughness_at(elevation, &self.disc, cell),
        }
    }

    /// Raw metric layer over the whole grid.
    pub fn compute(&self, elevation: &Layer, engine: &dyn ComputeEngine) -> Layer {
        engine.layer(elevation.info(), &|cell| self.compute_at(elevation, cell))
    }
}

/// Valid `(x, y, z)` samples of the disc around `cell`, x and y in meters
/// relative to the center.
fn plane_samples(elevation: &Layer, disc: &Disc, cell: UVec2) -> Vec<(f64, f64, f64)> {
    let resolution = elevation.info().resolution as f64;
    disc.cells_around(cell, elevation.width(), elevation.height())
        .filter_map(|(off, p)| {
            elevation.value(p).map(|z| {
                (
                    off.x as f64 * resolution,
                    off.y as f64 * resolution,
                    z as f64,
                )
            })
        })
        .collect()
}

/// Inclination (degrees) of the least-squares plane through the neighborhood.
pub fn slope_at(elevation: &Layer, disc: &Disc, cell: UVec2) -> Option<f32> {
    elevation.value(cell)?;
    let samples = plane_samples(elevation, disc, cell);
    if samples.len() < MIN_PLANE_SUPPORT {
        return None;
    }
    fit_plane(&samples).map(|fit| fit.slope_deg() as f32)
}

/// Largest elevation difference within the neighborhood (meters).
pub fn step_height_at(elevation: &Layer, disc: &Disc, cell: UVec2) -> Option<f32> {
    elevation.value(cell)?;
    let mut count = 0usize;
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for (_, p) in disc.cells_around(cell, elevation.width(), elevation.height()) {
        if let Some(z) = elevation.value(p) {
            count += 1;
            lo = lo.min(z);
            hi = hi.max(z);
        }
    }
    if count < MIN_STEP_SUPPORT {
        return None;
    }
    Some(hi - lo)
}

/// RMS residual of the neighborhood about its local plane (meters).
pub fn roughness_at(elevation: &Layer, disc: &Disc, cell: UVec2) -> Option<f32> {
    elevation.value(cell)?;
    let samples = plane_samples(elevation, disc, cell);
    if samples.len() < MIN_PLANE_SUPPORT {
        return None;
    }
    fit_plane(&samples).map(|fit| fit.residual_rms as f32)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::engine::{ParallelEngine, SerialEngine};
    use crate::types::MapInfo;

    fn info(width: u32, height: u32, resolution: f32) -> MapInfo {
        MapInfo {
            width,
            height,
            resolution,
            ..Default::default()
        }
    }

    fn ramp(width: u32, height: u32, resolution: f32, rise_per_m: f32) -> Layer {
        Layer::from_fn(info(width, height, resolution), |c| {
            Some(c.x as f32 * resolution * rise_per_m)
        })
    }

    #[test]
    fn ramp_slope_everywhere() {
        let layer = ramp(7, 7, 0.1, 1.0);
        let slope = MetricComputer::new(Metric::Slope, 0.2, 0.1);
        let out = slope.compute(&layer, &SerialEngine);
        for v in out.data() {
            assert_relative_eq!(v.unwrap(), 45.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn ramp_is_smooth() {
        let layer = ramp(6, 6, 0.05, 0.3);
        let rough = MetricComputer::new(Metric::Roughness, 0.1, 0.05);
        for v in rough.compute(&layer, &SerialEngine).data() {
            assert_relative_eq!(v.unwrap(), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn step_height_sees_a_ledge() {
        let layer = Layer::from_fn(info(5, 5, 0.1), |c| Some(if c.x >= 3 { 0.3 } else { 0.0 }));
        let step = MetricComputer::new(Metric::StepHeight, 0.1, 0.1);
        assert_eq!(step.radius_cells(), 1);
        let out = step.compute(&layer, &SerialEngine);
        assert_relative_eq!(out.value(UVec2::new(2, 2)).unwrap(), 0.3, epsilon = 1e-6);
        assert_relative_eq!(out.value(UVec2::new(0, 2)).unwrap(), 0.0);
        assert_relative_eq!(out.value(UVec2::new(4, 2)).unwrap(), 0.0);
    }

    #[test]
    fn corners_of_three_by_three() {
        // z = x + 2y (cells), resolution 1 m.
        let layer = Layer::from_fn(info(3, 3, 1.0), |c| Some(c.x as f32 + 2.0 * c.y as f32));
        let disc = Disc::new(1);

        let expected_slope = (5.0f32).sqrt().atan().to_degrees();
        for corner in [
            UVec2::new(0, 0),
            UVec2::new(2, 0),
            UVec2::new(0, 2),
            UVec2::new(2, 2),
        ] {
            assert_relative_eq!(
                slope_at(&layer, &disc, corner).unwrap(),
                expected_slope,
                epsilon = 1e-4
            );
            assert_relative_eq!(roughness_at(&layer, &disc, corner).unwrap(), 0.0, epsilon = 1e-6);
        }
        // Corner (0,0) sees itself, (1,0) and (0,1): heights 0, 1, 2.
        assert_relative_eq!(step_height_at(&layer, &disc, UVec2::new(0, 0)).unwrap(), 2.0);
    }

    #[test]
    fn insufficient_neighbors_are_missing() {
        let mut values = vec![f32::NAN; 9];
        values[0] = 1.0;
        values[1] = 1.5;
        let layer = Layer::from_values(info(3, 3, 1.0), &values).unwrap();
        let disc = Disc::new(1);

        // Two valid cells: enough for a step, not for a plane.
        assert_eq!(step_height_at(&layer, &disc, UVec2::new(0, 0)), Some(0.5));
        assert_eq!(slope_at(&layer, &disc, UVec2::new(0, 0)), None);
        assert_eq!(roughness_at(&layer, &disc, UVec2::new(0, 0)), None);
        // Missing center is never evaluated.
        assert_eq!(step_height_at(&layer, &disc, UVec2::new(1, 1)), None);
    }

    #[test]
    fn single_isolated_cell_has_no_step() {
        let mut values = vec![f32::NAN; 9];
        values[4] = 0.2;
        let layer = Layer::from_values(info(3, 3, 1.0), &values).unwrap();
        assert_eq!(step_height_at(&layer, &Disc::new(1), UVec2::new(1, 1)), None);
    }

    #[test]
    fn engines_agree_on_every_metric() {
        let layer = Layer::from_fn(info(11, 9, 0.05), |c| {
            if (c.x * 7 + c.y) % 13 == 0 {
                None
            } else {
                Some((c.x as f32 * 0.7).sin() * 0.1 + c.y as f32 * 0.02)
            }
        });
        for metric in Metric::ALL {
            let computer = MetricComputer::new(metric, 0.15, 0.05);
            assert_eq!(
                computer.compute(&layer, &SerialEngine),
                computer.compute(&layer, &ParallelEngine),
                "{} differs between engines",
                metric.name()
            );
        }
    }
}
