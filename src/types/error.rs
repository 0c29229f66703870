use thiserror::Error;

use crate::types::MapInfo;

#[derive(Debug, Error)]
pub enum TraversabilityError {
    #[error(
        "geometry mismatch: expected {}x{} @ {} m, found {}x{} @ {} m",
        .expected.width, .expected.height, .expected.resolution,
        .found.width, .found.height, .found.resolution
    )]
    GeometryMismatch {
        expected: Box<MapInfo>,
        found: Box<MapInfo>,
    },
    #[error("missing layer: {0}")]
    MissingLayer(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl TraversabilityError {
    pub(crate) fn geometry(expected: &MapInfo, found: &MapInfo) -> Self {
        Self::GeometryMismatch {
            expected: Box::new(expected.clone()),
            found: Box::new(found.clone()),
        }
    }
}
