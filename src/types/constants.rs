/// Lowest traversability cost (flat, smooth terrain).
pub const COST_MIN: f32 = 0.0;
/// Highest traversability cost (saturated slope, step or roughness).
pub const COST_MAX: f32 = 1.0;

pub const DEFAULT_INPUT_LAYER: &str = "inpaint";
pub const DEFAULT_RAW_LAYER: &str = "elevation";
pub const DEFAULT_OUTPUT_LAYER: &str = "traversability";

/// Gray level used for missing cells in image previews.
pub const PREVIEW_MISSING_GRAY: u8 = 205;
