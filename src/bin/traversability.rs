//! Offline traversability run over an elevation map stored as YAML + images.
//!
//! ```bash
//! traversability --map site/map.yaml --config params.yaml --frames 5 --output cost.png
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use terrain_costmap::visualization::cost_layer_to_image;
use terrain_costmap::{
    CostCloud, TraversabilityConfig, TraversabilityPipeline, load_elevation_map,
};

#[derive(Parser, Debug)]
#[command(name = "traversability")]
#[command(about = "Geometric traversability cost from an elevation map", long_about = None)]
struct Args {
    /// Elevation map description (YAML with one image per layer)
    #[arg(short, long)]
    map: PathBuf,

    /// Pipeline parameters (YAML); defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run over the same map
    #[arg(short, long, default_value_t = 1)]
    frames: u32,

    /// Write the final cost layer as a grayscale PNG
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging and per-frame reports
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => TraversabilityConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TraversabilityConfig::default(),
    };
    config.verbose |= args.verbose;

    let map = load_elevation_map(&args.map)
        .with_context(|| format!("loading map {}", args.map.display()))?;
    let mut pipeline = TraversabilityPipeline::new(config)?;
    info!("running {} frame(s) on the {} engine", args.frames, pipeline.engine_name());

    let mut output = None;
    for _ in 0..args.frames.max(1) {
        output = Some(pipeline.process(&map)?);
        if let Some(report) = pipeline.last_report() {
            info!(
                "frame {}: {} valid, {} missing, mean cost {:?}, {} low support, {} growth, {} invalidated ({:.1} ms)",
                report.frame,
                report.valid_cells,
                report.missing_cells,
                report.mean_cost,
                report.filter.low_support,
                report.filter.obstacle_growth,
                report.filter.invalidated,
                report.elapsed_ms
            );
        }
    }

    let Some(output) = output else {
        return Ok(());
    };
    let cost = output.layer(&pipeline.config().output_layer)?;
    let elevation = map.layer(&pipeline.config().traversability_input_layer)?;
    let cloud = CostCloud::from_layers(cost, elevation)?;
    info!(
        "{} costed points, {} at or above 0.5",
        cloud.len(),
        cloud.above(0.5).count()
    );

    if let Some(path) = &args.output {
        cost_layer_to_image(cost)
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
