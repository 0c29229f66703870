//! Pipeline configuration.
//!
//! Loaded from a single YAML document whose sections mirror the option names
//! (`weights.slope`, `filter.support_ratio`, ...). Every field has a default,
//! so an empty document is a valid configuration.

mod defaults;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::TraversabilityError;

/// Upper bound for every neighborhood and inflation radius (meters).
pub const MAX_RADIUS_M: f32 = 10.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraversabilityConfig {
    /// Transport endpoint the elevation map arrives on (not used by the core).
    #[serde(default = "defaults::input_topic")]
    pub input_topic: String,

    /// Transport endpoint the cost output is published on (not used by the core).
    #[serde(default = "defaults::output_topic")]
    pub output_topic: String,

    /// Elevation layer that feeds smoothing and the metrics.
    #[serde(default = "defaults::input_layer")]
    pub traversability_input_layer: String,

    /// Name of the single cost layer in the output map.
    #[serde(default = "defaults::output_layer")]
    pub output_layer: String,

    /// Serial engine when true, data-parallel engine otherwise. No numeric effect.
    #[serde(default)]
    pub use_cpu: bool,

    /// Per-frame diagnostic logging.
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub weights: WeightsSection,

    #[serde(default)]
    pub preprocessing: PreprocessingSection,

    #[serde(default)]
    pub normalization: NormalizationSection,

    #[serde(default)]
    pub neighborhood: NeighborhoodSection,

    #[serde(default)]
    pub filter: FilterSection,
}

/// Fusion weights. Conventionally sum to 1.0; not enforced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightsSection {
    #[serde(default = "defaults::slope_weight")]
    pub slope: f32,

    #[serde(default = "defaults::step_height_weight")]
    pub step_height: f32,

    #[serde(default = "defaults::surface_roughness_weight")]
    pub surface_roughness: f32,
}

impl WeightsSection {
    /// Weights in metric order: slope, step height, roughness.
    pub fn as_array(&self) -> [f32; 3] {
        [self.slope, self.step_height, self.surface_roughness]
    }
}

impl Default for WeightsSection {
    fn default() -> Self {
        Self {
            slope: defaults::slope_weight(),
            step_height: defaults::step_height_weight(),
            surface_roughness: defaults::surface_roughness_weight(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreprocessingSection {
    /// Gaussian standard deviation in meters; zero disables smoothing.
    #[serde(default = "defaults::smoothing_sigma_m")]
    pub smoothing_sigma_m: f32,
}

impl Default for PreprocessingSection {
    fn default() -> Self {
        Self {
            smoothing_sigma_m: defaults::smoothing_sigma_m(),
        }
    }
}

/// Raw metric values at or above these saturate to cost 1.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NormalizationSection {
    #[serde(default = "defaults::max_slope_deg")]
    pub max_slope_deg: f32,

    #[serde(default = "defaults::max_step_height_m")]
    pub max_step_height_m: f32,

    #[serde(default = "defaults::max_roughness_m")]
    pub max_roughness_m: f32,
}

impl Default for NormalizationSection {
    fn default() -> Self {
        Self {
            max_slope_deg: defaults::max_slope_deg(),
            max_step_height_m: defaults::max_step_height_m(),
            max_roughness_m: defaults::max_roughness_m(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NeighborhoodSection {
    #[serde(default = "defaults::slope_window_radius_m")]
    pub slope_window_radius_m: f32,

    #[serde(default = "defaults::step_window_radius_m")]
    pub step_window_radius_m: f32,

    #[serde(default = "defaults::roughness_window_radius_m")]
    pub roughness_window_radius_m: f32,
}

impl Default for NeighborhoodSection {
    fn default() -> Self {
        Self {
            slope_window_radius_m: defaults::slope_window_radius_m(),
            step_window_radius_m: defaults::step_window_radius_m(),
            roughness_window_radius_m: defaults::roughness_window_radius_m(),
        }
    }
}

/// Reliability filter settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterSection {
    /// When false, fused costs pass through unchanged.
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Unfiltered elevation layer used for the support and growth checks.
    #[serde(default = "defaults::raw_layer")]
    pub raw_elevation_layer: String,

    /// Radius of the support disc (meters).
    #[serde(default = "defaults::support_radius_m")]
    pub support_radius_m: f32,

    /// Required fraction of non-missing raw cells in the support disc.
    #[serde(
        default = "defaults::support_ratio",
        deserialize_with = "deserialize_ratio"
    )]
    pub support_ratio: f32,

    /// Spread of the caution inflation around flagged cells (meters).
    #[serde(default = "defaults::inflation_radius_m")]
    pub inflation_radius_m: f32,

    /// Raw elevation (meters) above which a rising cell can count as a new obstacle.
    #[serde(default = "defaults::obstacle_threshold")]
    pub obstacle_threshold: f32,

    /// Growth factor over the baseline that counts as obstacle growth.
    #[serde(default = "defaults::obstacle_growth_threshold")]
    pub obstacle_growth_threshold: f32,

    /// Consecutive flagged frames after which a cell is marked invalid.
    #[serde(default = "defaults::rejection_limit_frames")]
    pub rejection_limit_frames: u32,

    /// Observation window (frames) of the baseline average.
    #[serde(default = "defaults::min_obstacle_baseline")]
    pub min_obstacle_baseline: u32,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            raw_elevation_layer: defaults::raw_layer(),
            support_radius_m: defaults::support_radius_m(),
            support_ratio: defaults::support_ratio(),
            inflation_radius_m: defaults::inflation_radius_m(),
            obstacle_threshold: defaults::obstacle_threshold(),
            obstacle_growth_threshold: defaults::obstacle_growth_threshold(),
            rejection_limit_frames: defaults::rejection_limit_frames(),
            min_obstacle_baseline: defaults::min_obstacle_baseline(),
        }
    }
}

impl Default for TraversabilityConfig {
    fn default() -> Self {
        Self {
            input_topic: defaults::input_topic(),
            output_topic: defaults::output_topic(),
            traversability_input_layer: defaults::input_layer(),
            output_layer: defaults::output_layer(),
            use_cpu: false,
            verbose: false,
            weights: WeightsSection::default(),
            preprocessing: PreprocessingSection::default(),
            normalization: NormalizationSection::default(),
            neighborhood: NeighborhoodSection::default(),
            filter: FilterSection::default(),
        }
    }
}

fn deserialize_ratio<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f32::deserialize(deserializer)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(
            "support_ratio must be in the range [0.0, 1.0]",
        ))
    }
}

fn invalid(msg: impl Into<String>) -> TraversabilityError {
    TraversabilityError::InvalidConfig(msg.into())
}

impl TraversabilityConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TraversabilityError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, TraversabilityError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, TraversabilityError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every numeric option against its domain.
    pub fn validate(&self) -> Result<(), TraversabilityError> {
        if self.traversability_input_layer.is_empty() {
            return Err(invalid("traversability_input_layer must not be empty"));
        }
        if self.output_layer.is_empty() {
            return Err(invalid("output_layer must not be empty"));
        }

        let weights = self.weights.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid(format!(
                "weights must be finite and non-negative, got {:?}",
                weights
            )));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(invalid("at least one weight must be positive"));
        }

        let sigma = self.preprocessing.smoothing_sigma_m;
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(invalid(format!(
                "preprocessing.smoothing_sigma_m must be >= 0, got {}",
                sigma
            )));
        }

        for (name, value) in [
            ("normalization.max_slope_deg", self.normalization.max_slope_deg),
            (
                "normalization.max_step_height_m",
                self.normalization.max_step_height_m,
            ),
            (
                "normalization.max_roughness_m",
                self.normalization.max_roughness_m,
            ),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{} must be > 0, got {}", name, value)));
            }
        }

        for (name, value) in [
            (
                "neighborhood.slope_window_radius_m",
                self.neighborhood.slope_window_radius_m,
            ),
            (
                "neighborhood.step_window_radius_m",
                self.neighborhood.step_window_radius_m,
            ),
            (
                "neighborhood.roughness_window_radius_m",
                self.neighborhood.roughness_window_radius_m,
            ),
            ("filter.support_radius_m", self.filter.support_radius_m),
            ("filter.inflation_radius_m", self.filter.inflation_radius_m),
        ] {
            if !value.is_finite() || !(0.0..=MAX_RADIUS_M).contains(&value) {
                return Err(invalid(format!(
                    "{} must be in [0, {}] m, got {}",
                    name, MAX_RADIUS_M, value
                )));
            }
        }

        let filter = &self.filter;
        if filter.raw_elevation_layer.is_empty() {
            return Err(invalid("filter.raw_elevation_layer must not be empty"));
        }
        if !(0.0..=1.0).contains(&filter.support_ratio) {
            return Err(invalid(format!(
                "filter.support_ratio must be in [0, 1], got {}",
                filter.support_ratio
            )));
        }
        if !filter.obstacle_threshold.is_finite() {
            return Err(invalid("filter.obstacle_threshold must be finite"));
        }
        if !filter.obstacle_growth_threshold.is_finite() || filter.obstacle_growth_threshold <= 0.0
        {
            return Err(invalid(format!(
                "filter.obstacle_growth_threshold must be > 0, got {}",
                filter.obstacle_growth_threshold
            )));
        }
        if filter.rejection_limit_frames == 0 {
            return Err(invalid("filter.rejection_limit_frames must be >= 1"));
        }
        if filter.min_obstacle_baseline == 0 {
            return Err(invalid("filter.min_obstacle_baseline must be >= 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = TraversabilityConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.traversability_input_layer, "inpaint");
        assert_eq!(config.filter.raw_elevation_layer, "elevation");
        assert_eq!(config.weights.as_array(), [0.2, 0.2, 0.6]);
        assert_eq!(config.normalization.max_slope_deg, 70.0);
        assert_eq!(config.filter.rejection_limit_frames, 5);
        assert_eq!(config.filter.min_obstacle_baseline, 200);
        assert!(config.filter.enabled);
        assert!(!config.use_cpu);
    }

    #[test]
    fn nested_sections_override() {
        let yaml = r#"
traversability_input_layer: smooth
use_cpu: true
weights:
  slope: 0.5
  step_height: 0.5
  surface_roughness: 0.0
filter:
  enabled: false
  rejection_limit_frames: 3
"#;
        let config = TraversabilityConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.traversability_input_layer, "smooth");
        assert!(config.use_cpu);
        assert_eq!(config.weights.as_array(), [0.5, 0.5, 0.0]);
        assert!(!config.filter.enabled);
        assert_eq!(config.filter.rejection_limit_frames, 3);
        assert_eq!(config.filter.support_ratio, 0.75);
    }

    #[test]
    fn support_ratio_out_of_range_is_rejected_at_parse() {
        let err = TraversabilityConfig::from_yaml_str("filter:\n  support_ratio: 1.5\n").unwrap_err();
        assert!(matches!(err, TraversabilityError::Yaml(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = TraversabilityConfig::default();
        config.normalization.max_step_height_m = 0.0;
        assert!(matches!(
            config.validate(),
            Err(TraversabilityError::InvalidConfig(_))
        ));

        let mut config = TraversabilityConfig::default();
        config.weights.slope = -0.1;
        assert!(config.validate().is_err());

        let mut config = TraversabilityConfig::default();
        config.weights = WeightsSection {
            slope: 0.0,
            step_height: 0.0,
            surface_roughness: 0.0,
        };
        assert!(config.validate().is_err());

        let mut config = TraversabilityConfig::default();
        config.filter.rejection_limit_frames = 0;
        assert!(config.validate().is_err());

        let mut config = TraversabilityConfig::default();
        config.neighborhood.step_window_radius_m = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_radii() {
        let err = TraversabilityConfig::from_yaml_str("neighborhood:\n  step_window_radius_m: 1.0e9\n")
            .unwrap_err();
        assert!(matches!(err, TraversabilityError::InvalidConfig(msg) if msg.contains("step_window_radius_m")));

        let mut config = TraversabilityConfig::default();
        config.filter.inflation_radius_m = MAX_RADIUS_M;
        assert!(config.validate().is_ok());
        config.filter.inflation_radius_m = MAX_RADIUS_M + 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn yaml_round_trip_keeps_values() {
        let mut config = TraversabilityConfig::default();
        config.filter.inflation_radius_m = 0.4;
        let yaml = config.to_yaml_string().unwrap();
        let back = TraversabilityConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back.filter.inflation_radius_m, 0.4);
    }
}
