//! Raw metric to bounded cost.

use crate::grid::Layer;
use crate::types::{COST_MAX, COST_MIN};

/// `clamp(raw / threshold, 0, 1)`. Non-finite input or a non-positive
/// threshold gives `None`.
#[inline]
pub fn normalized_cost(raw: f32, threshold: f32) -> Option<f32> {
    if !raw.is_finite() || threshold.is_nan() || threshold <= 0.0 {
        return None;
    }
    Some((raw / threshold).clamp(COST_MIN, COST_MAX))
}

/// Normalize a whole metric layer. Missing raw values stay missing.
pub fn normalize_layer(raw: &Layer, threshold: f32) -> Layer {
    raw.map(|v| v.and_then(|r| normalized_cost(r, threshold)))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::types::MapInfo;

    #[test]
    fn zero_and_saturation() {
        assert_eq!(normalized_cost(0.0, 0.55), Some(0.0));
        assert_eq!(normalized_cost(0.55, 0.55), Some(1.0));
        assert_eq!(normalized_cost(3.0, 0.55), Some(1.0));
        assert_eq!(normalized_cost(-1.0, 0.55), Some(0.0));
        assert_relative_eq!(normalized_cost(35.0, 70.0).unwrap(), 0.5);
    }

    #[test]
    fn monotone_in_raw() {
        let mut last = 0.0;
        for i in 0..200 {
            let c = normalized_cost(i as f32 * 0.01, 0.25).unwrap();
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn invalid_inputs() {
        assert_eq!(normalized_cost(f32::NAN, 1.0), None);
        assert_eq!(normalized_cost(1.0, 0.0), None);
        assert_eq!(normalized_cost(1.0, f32::NAN), None);
    }

    #[test]
    fn missing_propagates() {
        let info = MapInfo::square(2, 0.1);
        let raw = Layer::from_values(info, &[0.1, f32::NAN, 0.5, 0.0]).unwrap();
        let cost = normalize_layer(&raw, 0.25);
        assert_eq!(cost.data()[1], None);
        assert_relative_eq!(cost.data()[0].unwrap(), 0.4);
        assert_eq!(cost.data()[2], Some(1.0));
        assert_eq!(cost.data()[3], Some(0.0));
    }
}
