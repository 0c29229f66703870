use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Vec2;
use image::GenericImageView;
use log::{info, warn};
use serde::Deserialize;

use crate::grid::{GridMap, Layer};
use crate::types::{MapInfo, TraversabilityError};

#[derive(Debug, Deserialize)]
struct ElevationMapMetadata {
    resolution: f32,
    origin: [f32; 3],
    min_height: f32,
    max_height: f32,
    #[serde(default = "default_negate")]
    negate: Negate,
    layers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Negate {
    Bool(bool),
    Int(i32),
}

impl Negate {
    fn is_negated(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
        }
    }
}

fn default_negate() -> Negate {
    Negate::Bool(false)
}

/// Height encoding shared by every layer image of one map.
#[derive(Debug, Clone, Copy)]
struct HeightScale {
    min: f32,
    max: f32,
    negate: bool,
}

impl HeightScale {
    /// Height of an RGBA pixel, `None` for fully transparent pixels.
    fn decode(&self, [r, g, b, a]: [u8; 4]) -> Option<f32> {
        if a == 0 {
            return None;
        }
        let mut lightness = (r as f32 + g as f32 + b as f32) / (3.0 * 255.0);
        if self.negate {
            lightness = 1.0 - lightness;
        }
        Some(self.min + lightness * (self.max - self.min))
    }
}

/// Load a multi-layer elevation map from a YAML description and one image per layer.
///
/// ```yaml
/// resolution: 0.05
/// origin: [-2.5, -2.5, 0.0]
/// min_height: -0.5
/// max_height: 1.5
/// layers:
///   elevation: elevation.png
///   inpaint: inpaint.png
/// ```
///
/// Image paths are resolved relative to the YAML file. Image row 0 is the top
/// of the map, so rows are flipped into grid order (row 0 at `origin.y`).
pub fn load_elevation_map(yaml_path: impl AsRef<Path>) -> Result<GridMap, TraversabilityError> {
    let yaml_path = yaml_path.as_ref();
    let yaml_str = std::fs::read_to_string(yaml_path)?;
    let metadata: ElevationMapMetadata = serde_yaml::from_str(&yaml_str)?;

    if !(metadata.resolution.is_finite() && metadata.resolution > 0.0) {
        return Err(TraversabilityError::InvalidMetadata(
            "resolution must be positive".to_string(),
        ));
    }
    if metadata.max_height <= metadata.min_height {
        return Err(TraversabilityError::InvalidMetadata(
            "max_height must be greater than min_height".to_string(),
        ));
    }
    if metadata.layers.is_empty() {
        return Err(TraversabilityError::InvalidMetadata(
            "elevation map lists no layers".to_string(),
        ));
    }
    if metadata.origin[2] != 0.0 {
        warn!(
            "{}: origin yaw {} ignored, grids are axis-aligned",
            yaml_path.display(),
            metadata.origin[2]
        );
    }

    let scale = HeightScale {
        min: metadata.min_height,
        max: metadata.max_height,
        negate: metadata.negate.is_negated(),
    };
    let origin = Vec2::new(metadata.origin[0], metadata.origin[1]);

    let mut layers = Vec::with_capacity(metadata.layers.len());
    for (name, image_ref) in &metadata.layers {
        let image_path = resolve_image_path(yaml_path, image_ref);
        let layer = load_layer_image(&image_path, metadata.resolution, origin, scale)?;
        layers.push((name.clone(), layer));
    }

    let map = GridMap::from_layers(layers)?;
    let geometry = map.info();
    info!(
        "loaded {}: {}x{} cells @ {} m ({:.2} x {:.2} m), layers {:?}",
        yaml_path.display(),
        geometry.width,
        geometry.height,
        geometry.resolution,
        geometry.world_width(),
        geometry.world_height(),
        map.layer_names().collect::<Vec<_>>()
    );
    Ok(map)
}

fn load_layer_image(
    path: &Path,
    resolution: f32,
    origin: Vec2,
    scale: HeightScale,
) -> Result<Layer, TraversabilityError> {
    let image = image::open(path)?;
    let (width, height) = image.dimensions();
    let rgba = image.to_rgba8();

    let info = MapInfo {
        width,
        height,
        resolution,
        origin,
    };
    let mut data = vec![None; info.len()];
    for y in 0..height {
        let grid_y = height - y - 1;
        for x in 0..width {
            let idx = (grid_y as usize) * (width as usize) + (x as usize);
            data[idx] = scale.decode(rgba.get_pixel(x, y).0);
        }
    }

    Layer::new(info, data)
}

fn resolve_image_path(yaml_path: &Path, image_ref: &str) -> PathBuf {
    let image_path = PathBuf::from(image_ref);
    if image_path.is_absolute() {
        return image_path;
    }

    match yaml_path.parent() {
        Some(parent) => parent.join(image_path),
        None => image_path,
    }
}
