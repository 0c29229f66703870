//! Frame orchestration: smoothing, metrics, normalization, fusion, reliability.
//!
//! A frame either completes and commits the reliability state, or fails and
//! leaves the pipeline exactly as it was before the call.

use std::time::Instant;

use log::{debug, warn};

use crate::analysis::{Metric, MetricComputer, fuse_layers, normalize_layer, smooth_gaussian};
use crate::config::TraversabilityConfig;
use crate::engine::{ComputeEngine, engine_for};
use crate::filter::{FilterReport, ReliabilityFilter};
use crate::grid::{GridMap, Layer};
use crate::types::TraversabilityError;

/// Raw metric layers of one frame, before normalization.
#[derive(Debug, Clone)]
pub struct MetricLayers {
    /// Degrees.
    pub slope: Layer,
    /// Meters.
    pub step_height: Layer,
    /// Meters.
    pub roughness: Layer,
}

impl MetricLayers {
    pub fn get(&self, metric: Metric) -> &Layer {
        match metric {
            Metric::Slope => &self.slope,
            Metric::StepHeight => &self.step_height,
            Metric::Roughness => &self.roughness,
        }
    }
}

/// Summary of one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// 1-based count of frames processed by this pipeline.
    pub frame: u64,
    pub valid_cells: usize,
    pub missing_cells: usize,
    pub mean_cost: Option<f32>,
    pub filter: FilterReport,
    pub elapsed_ms: f64,
}

pub struct TraversabilityPipeline {
    config: TraversabilityConfig,
    engine: Box<dyn ComputeEngine>,
    filter: ReliabilityFilter,
    frames: u64,
    last_report: Option<FrameReport>,
}

impl TraversabilityPipeline {
    /// Pipeline with the engine chosen by `config.use_cpu`.
    pub fn new(config: TraversabilityConfig) -> Result<Self, TraversabilityError> {
        let engine = engine_for(config.use_cpu);
        Self::with_engine(config, engine)
    }

    pub fn with_engine(
        config: TraversabilityConfig,
        engine: Box<dyn ComputeEngine>,
    ) -> Result<Self, TraversabilityError> {
        config.validate()?;
        let filter = ReliabilityFilter::new(config.filter.clone());
        Ok(Self {
            config,
            engine,
            filter,
            frames: 0,
            last_report: None,
        })
    }

    pub fn config(&self) -> &TraversabilityConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn filter(&self) -> &ReliabilityFilter {
        &self.filter
    }

    pub fn last_report(&self) -> Option<&FrameReport> {
        self.last_report.as_ref()
    }

    /// Forget the reliability history.
    pub fn reset(&mut self) {
        self.filter.reset();
    }

    /// Gaussian pre-smoothing of the input elevation layer.
    pub fn smooth(&self, elevation: &Layer) -> Layer {
        smooth_gaussian(
            elevation,
            self.config.preprocessing.smoothing_sigma_m,
            self.engine.as_ref(),
        )
    }

    /// Raw slope, step height and roughness over the smoothed layer.
    pub fn compute_metrics(&self, smoothed: &Layer) -> MetricLayers {
        let resolution = smoothed.info().resolution;
        let radii = &self.config.neighborhood;
        let compute = |metric, radius_m| {
            MetricComputer::new(metric, radius_m, resolution)
                .compute(smoothed, self.engine.as_ref())
        };
        MetricLayers {
            slope: compute(Metric::Slope, radii.slope_window_radius_m),
            step_height: compute(Metric::StepHeight, radii.step_window_radius_m),
            roughness: compute(Metric::Roughness, radii.roughness_window_radius_m),
        }
    }

    /// Normalize each metric and fuse them with the configured weights.
    pub fn fuse(&self, metrics: &MetricLayers) -> Result<Layer, TraversabilityError> {
        let norm = &self.config.normalization;
        let slope = normalize_layer(&metrics.slope, norm.max_slope_deg);
        let step = normalize_layer(&metrics.step_height, norm.max_step_height_m);
        let rough = normalize_layer(&metrics.roughness, norm.max_roughness_m);
        fuse_layers(&[&slope, &step, &rough], &self.config.weights.as_array())
    }

    /// Process one input map into a map holding the single output cost layer.
    ///
    /// On error the frame is dropped and no state changes.
    pub fn process(&mut self, input: &GridMap) -> Result<GridMap, TraversabilityError> {
        self.run_frame(input).inspect_err(|e| warn!("frame dropped: {e}"))
    }

    fn run_frame(&mut self, input: &GridMap) -> Result<GridMap, TraversabilityError> {
        let started = Instant::now();
        let elevation = input.layer(&self.config.traversability_input_layer)?;
        let raw = if self.filter.is_enabled() {
            let raw = input.layer(&self.config.filter.raw_elevation_layer)?;
            if !raw.info().same_geometry(elevation.info()) {
                return Err(TraversabilityError::geometry(elevation.info(), raw.info()));
            }
            Some(raw)
        } else {
            None
        };

        let smoothed = self.smooth(elevation);
        let metrics = self.compute_metrics(&smoothed);
        let fused = self.fuse(&metrics)?;
        let metrics_ms = started.elapsed().as_secs_f64() * 1e3;

        let outcome = match raw {
            Some(raw) => Some(self.filter.evaluate(&fused, raw)?),
            None => None,
        };
        let costs = outcome.as_ref().map_or(&fused, |o| &o.costs);

        let mut output = GridMap::new(elevation.info().clone());
        output.add_layer(self.config.output_layer.clone(), costs.clone())?;

        let filter_report = match outcome {
            Some(outcome) => self.filter.commit(outcome).1,
            None => FilterReport::default(),
        };

        self.frames += 1;
        let report = frame_report(
            self.frames,
            output.layer(&self.config.output_layer).ok(),
            filter_report,
            started,
        );
        if self.config.verbose {
            debug!(
                "frame {}: {} engine, metrics {:.2} ms, total {:.2} ms, {} valid / {} missing, mean cost {:?}, filter {:?}",
                report.frame,
                self.engine.name(),
                metrics_ms,
                report.elapsed_ms,
                report.valid_cells,
                report.missing_cells,
                report.mean_cost,
                report.filter
            );
        }
        self.last_report = Some(report);

        Ok(output)
    }
}

fn frame_report(
    frame: u64,
    costs: Option<&Layer>,
    filter: FilterReport,
    started: Instant,
) -> FrameReport {
    let (mut valid, mut missing, mut sum) = (0usize, 0usize, 0.0f64);
    if let Some(costs) = costs {
        for v in costs.data() {
            match v {
                Some(c) => {
                    valid += 1;
                    sum += *c as f64;
                }
                None => missing += 1,
            }
        }
    }
    FrameReport {
        frame,
        valid_cells: valid,
        missing_cells: missing,
        mean_cost: (valid > 0).then(|| (sum / valid as f64) as f32),
        filter,
        elapsed_ms: started.elapsed().as_secs_f64() * 1e3,
    }
}
