use image::{GrayImage, Luma};

use crate::grid::Layer;
use crate::types::{COST_MAX, COST_MIN, PREVIEW_MISSING_GRAY};

/// Convert a cost layer to a grayscale image preview.
///
/// - cost **0** (free) becomes white-ish.
/// - cost **1** (untraversable) becomes black.
/// - **missing** becomes mid-gray.
///
/// The output image is oriented like typical map images: the grid's \(y=0\) row
/// (lowest in map coordinates) is written to the **bottom** of the image.
pub fn cost_layer_to_image(layer: &Layer) -> GrayImage {
    render(layer, cost_to_gray)
}

/// Convert an elevation layer to a grayscale image, low is dark and high is light.
///
/// Heights are stretched over the layer's own min/max; a flat layer renders
/// mid-scale. Missing cells use the same gray as [`cost_layer_to_image`].
pub fn elevation_layer_to_image(layer: &Layer) -> GrayImage {
    let (lo, hi) = layer.min_max().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    render(layer, |h| match h {
        None => PREVIEW_MISSING_GRAY,
        Some(_) if span <= f32::EPSILON => 127,
        Some(h) => (((h - lo) / span).clamp(0.0, 1.0) * 254.0).round() as u8,
    })
}

fn render(layer: &Layer, gray: impl Fn(Option<f32>) -> u8) -> GrayImage {
    let width = layer.width();
    let height = layer.height();
    let mut img = GrayImage::new(width, height);

    for y_img in 0..height {
        // Flip vertically to match the loader's map coordinate convention.
        let y_grid = height - 1 - y_img;
        for x in 0..width {
            let value = layer.value(glam::UVec2::new(x, y_grid));
            img.put_pixel(x, y_img, Luma([gray(value)]));
        }
    }

    img
}

fn cost_to_gray(value: Option<f32>) -> u8 {
    let Some(cost) = value else {
        return PREVIEW_MISSING_GRAY;
    };
    // 0 (free) -> 254, 1 (untraversable) -> 0
    let c = cost.clamp(COST_MIN, COST_MAX);
    (254.0 - c * 254.0).round() as u8
}
