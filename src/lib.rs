pub mod analysis;
pub mod cloud;
pub mod config;
pub mod engine;
pub mod filter;
pub mod grid;
pub mod loaders;
pub mod pipeline;
pub mod types;
pub mod visualization;

pub use cloud::{CostCloud, CostPoint};
pub use config::TraversabilityConfig;
pub use engine::{ComputeEngine, ParallelEngine, SerialEngine};
pub use grid::{Grid2d, GridMap, Layer};
pub use loaders::load_elevation_map;
pub use pipeline::{FrameReport, TraversabilityPipeline};
pub use types::{MapInfo, TraversabilityError};
