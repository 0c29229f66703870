//! Traversability analysis stages: smoothing, metrics, normalization, fusion.

pub mod fusion;
pub mod metrics;
pub mod normalize;
pub mod plane;
pub mod smoothing;

pub use fusion::{fuse_cell, fuse_layers};
pub use metrics::{Metric, MetricComputer};
pub use normalize::{normalize_layer, normalized_cost};
pub use plane::{PlaneFit, fit_plane};
pub use smoothing::{GaussianKernel, smooth_gaussian};
