//! Default value functions for serde deserialization.

use crate::types::{DEFAULT_INPUT_LAYER, DEFAULT_OUTPUT_LAYER, DEFAULT_RAW_LAYER};

pub fn input_topic() -> String {
    "/elevation_mapping_node/elevation_map_filter".to_string()
}

pub fn output_topic() -> String {
    "/geometric_traversability_cloud".to_string()
}

pub fn input_layer() -> String {
    DEFAULT_INPUT_LAYER.to_string()
}

pub fn raw_layer() -> String {
    DEFAULT_RAW_LAYER.to_string()
}

pub fn output_layer() -> String {
    DEFAULT_OUTPUT_LAYER.to_string()
}

pub fn enabled() -> bool {
    true
}

pub fn slope_weight() -> f32 {
    0.2
}

pub fn step_height_weight() -> f32 {
    0.2
}

pub fn surface_roughness_weight() -> f32 {
    0.6
}

pub fn smoothing_sigma_m() -> f32 {
    0.03
}

pub fn max_slope_deg() -> f32 {
    70.0
}

pub fn max_step_height_m() -> f32 {
    0.55
}

pub fn max_roughness_m() -> f32 {
    0.25
}

pub fn slope_window_radius_m() -> f32 {
    0.1
}

pub fn step_window_radius_m() -> f32 {
    0.15
}

pub fn roughness_window_radius_m() -> f32 {
    0.3
}

pub fn support_radius_m() -> f32 {
    0.1
}

pub fn support_ratio() -> f32 {
    0.75
}

pub fn inflation_radius_m() -> f32 {
    0.8
}

pub fn obstacle_threshold() -> f32 {
    0.7
}

pub fn obstacle_growth_threshold() -> f32 {
    1.3
}

pub fn rejection_limit_frames() -> u32 {
    5
}

pub fn min_obstacle_baseline() -> u32 {
    200
}
