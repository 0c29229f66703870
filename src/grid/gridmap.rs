//! Named layers over a common grid geometry.
//!
//! Every layer of a [`GridMap`] shares the map's [`MapInfo`]. Inserting or
//! merging a layer with different dimensions, resolution or origin fails with
//! [`TraversabilityError::GeometryMismatch`]; nothing is resized silently.

use std::collections::BTreeMap;

use glam::{UVec2, Vec2};

use crate::grid::Layer;
use crate::types::{MapInfo, TraversabilityError};

#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    info: MapInfo,
    layers: BTreeMap<String, Layer>,
}

impl GridMap {
    /// Empty map (no layers) with the given geometry.
    pub fn new(info: MapInfo) -> Self {
        Self {
            info,
            layers: BTreeMap::new(),
        }
    }

    /// Build a map from `(name, layer)` pairs. The first layer fixes the geometry.
    pub fn from_layers<I, S>(layers: I) -> Result<Self, TraversabilityError>
    where
        I: IntoIterator<Item = (S, Layer)>,
        S: Into<String>,
    {
        let mut iter = layers.into_iter();
        let Some((name, first)) = iter.next() else {
            return Err(TraversabilityError::InvalidMetadata(
                "grid map needs at least one layer".to_string(),
            ));
        };
        let mut map = Self::new(first.info().clone());
        map.add_layer(name, first)?;
        for (name, layer) in iter {
            map.add_layer(name, layer)?;
        }
        Ok(map)
    }

    pub fn info(&self) -> &MapInfo {
        &self.info
    }

    /// `(rows, cols)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.info.height, self.info.width)
    }

    pub fn resolution(&self) -> f32 {
        self.info.resolution
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Insert or replace a layer.
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        layer: Layer,
    ) -> Result<(), TraversabilityError> {
        if !self.info.same_geometry(layer.info()) {
            return Err(TraversabilityError::geometry(&self.info, layer.info()));
        }
        self.layers.insert(name.into(), layer);
        Ok(())
    }

    /// Insert an all-missing layer, replacing any existing layer of that name.
    pub fn add_missing_layer(&mut self, name: impl Into<String>) {
        self.layers
            .insert(name.into(), Layer::missing(self.info.clone()));
    }

    pub fn layer(&self, name: &str) -> Result<&Layer, TraversabilityError> {
        self.layers
            .get(name)
            .ok_or_else(|| TraversabilityError::MissingLayer(name.to_string()))
    }

    /// Crate-internal; public callers edit cells through [`set`](Self::set).
    pub(crate) fn layer_mut(&mut self, name: &str) -> Result<&mut Layer, TraversabilityError> {
        self.layers
            .get_mut(name)
            .ok_or_else(|| TraversabilityError::MissingLayer(name.to_string()))
    }

    /// Value of `layer` at `(row, col)`; `Ok(None)` when the cell is missing.
    pub fn get(&self, layer: &str, row: u32, col: u32) -> Result<Option<f32>, TraversabilityError> {
        let grid = self.layer(layer)?;
        match grid.get(UVec2::new(col, row)) {
            Some(v) => Ok(*v),
            None => Err(TraversabilityError::OutOfBounds(format!(
                "cell (row {}, col {}) out of bounds for map {}x{}",
                row, col, self.info.height, self.info.width
            ))),
        }
    }

    pub fn set(
        &mut self,
        layer: &str,
        row: u32,
        col: u32,
        value: Option<f32>,
    ) -> Result<(), TraversabilityError> {
        self.layer_mut(layer)?.set(UVec2::new(col, row), value)
    }

    /// Copy every layer of `other` into this map, replacing same-named layers.
    ///
    /// Fails before touching any layer if the geometries differ.
    pub fn merge(&mut self, other: &GridMap) -> Result<(), TraversabilityError> {
        if !self.info.same_geometry(&other.info) {
            return Err(TraversabilityError::geometry(&self.info, &other.info));
        }
        for (name, layer) in &other.layers {
            self.layers.insert(name.clone(), layer.clone());
        }
        Ok(())
    }

    /// Move every layer to a new origin (rolling window); scrolled-in cells are missing.
    pub fn update_origin(&mut self, new_origin: Vec2) {
        for layer in self.layers.values_mut() {
            layer.update_origin(new_origin, None);
        }
        let shift = self.info.origin_shift(new_origin);
        self.info.origin += shift.as_vec2() * self.info.resolution;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: u32, height: u32) -> MapInfo {
        MapInfo {
            width,
            height,
            resolution: 0.1,
            ..Default::default()
        }
    }

    #[test]
    fn get_and_set_by_row_col() {
        let mut map = GridMap::new(info(4, 3));
        map.add_missing_layer("elevation");
        assert_eq!(map.dimensions(), (3, 4));
        assert_eq!(map.get("elevation", 2, 3).unwrap(), None);

        map.set("elevation", 2, 3, Some(1.5)).unwrap();
        assert_eq!(map.get("elevation", 2, 3).unwrap(), Some(1.5));
        assert_eq!(
            map.layer("elevation").unwrap().value(UVec2::new(3, 2)),
            Some(1.5)
        );
    }

    #[test]
    fn get_out_of_bounds_and_missing_layer() {
        let mut map = GridMap::new(info(2, 2));
        map.add_missing_layer("elevation");
        assert!(matches!(
            map.get("elevation", 2, 0),
            Err(TraversabilityError::OutOfBounds(_))
        ));
        assert!(matches!(
            map.get("inpaint", 0, 0),
            Err(TraversabilityError::MissingLayer(name)) if name == "inpaint"
        ));
    }

    #[test]
    fn add_layer_rejects_mismatched_geometry() {
        let mut map = GridMap::new(info(5, 5));
        let err = map.add_layer("raw", Layer::missing(info(4, 5))).unwrap_err();
        assert!(matches!(err, TraversabilityError::GeometryMismatch { .. }));
        assert!(!map.has_layer("raw"));

        let mut shifted = info(5, 5);
        shifted.origin = Vec2::new(1.0, 0.0);
        assert!(map.add_layer("raw", Layer::missing(shifted)).is_err());
    }

    #[test]
    fn merge_checks_geometry_first() {
        let mut a = GridMap::new(info(3, 3));
        a.add_missing_layer("elevation");
        let mut b = GridMap::new(info(3, 4));
        b.add_missing_layer("inpaint");
        assert!(a.merge(&b).is_err());
        assert!(!a.has_layer("inpaint"));

        let mut c = GridMap::new(info(3, 3));
        c.add_missing_layer("inpaint");
        a.merge(&c).unwrap();
        assert_eq!(a.layer_names().collect::<Vec<_>>(), vec!["elevation", "inpaint"]);
    }

    #[test]
    fn from_layers_requires_a_layer() {
        let empty: Vec<(String, Layer)> = Vec::new();
        assert!(GridMap::from_layers(empty).is_err());
        let map = GridMap::from_layers([("a", Layer::missing(info(2, 2)))]).unwrap();
        assert!(map.has_layer("a"));
    }

    #[test]
    fn update_origin_moves_all_layers() {
        let mut map = GridMap::new(info(3, 1));
        map.add_layer(
            "elevation",
            Layer::from_values(info(3, 1), &[1.0, 2.0, 3.0]).unwrap(),
        )
        .unwrap();
        map.update_origin(Vec2::new(0.1, 0.0));
        assert!((map.info().origin.x - 0.1).abs() < 1e-6);
        assert_eq!(map.get("elevation", 0, 0).unwrap(), Some(2.0));
        assert_eq!(map.get("elevation", 0, 2).unwrap(), None);
    }
}
