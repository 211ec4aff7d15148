//! Tile-map data source consumed by the core.
//!
//! The core never owns terrain; it asks a [`TileMapSource`] for layer sizes,
//! per-cell properties and authored objects. [`TileMap`] is the in-memory
//! implementation used by headless hosts and tests, loadable from JSON.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use bevy::math::{UVec2, Vec2};
use serde::Deserialize;
use thiserror::Error;

/// A tile property value as authored in the map editor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
    Number(f64),
}

impl PropertyValue {
    /// Booleans read as-is, text is true only for a case-insensitive `"true"`.
    pub fn as_flag(&self) -> bool {
        match self {
            PropertyValue::Bool(value) => *value,
            PropertyValue::Text(value) => value.eq_ignore_ascii_case("true"),
            PropertyValue::Number(_) => false,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

/// Shape of an authored map object, in world units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectShape {
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Point {
        x: f32,
        y: f32,
    },
}

impl ObjectShape {
    pub fn origin(&self) -> Vec2 {
        match self {
            ObjectShape::Rectangle { x, y, .. } | ObjectShape::Point { x, y } => Vec2::new(*x, *y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapObject {
    #[serde(default)]
    pub name: Option<String>,
    pub shape: ObjectShape,
}

impl MapObject {
    pub fn rectangle(name: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            name: Some(name.to_string()),
            shape: ObjectShape::Rectangle {
                x,
                y,
                width,
                height,
            },
        }
    }
}

/// Read-only view over a layered tile map.
pub trait TileMapSource: Send + Sync {
    /// Size in tiles of the base (first) layer.
    fn dimensions(&self) -> UVec2;

    fn layer_count(&self) -> usize;

    fn layer_size(&self, layer: usize) -> UVec2;

    /// `None` when the layer has no cell at `tile` or the cell's tile carries
    /// no property named `key`. Callers bounds-check against [`layer_size`].
    ///
    /// [`layer_size`]: TileMapSource::layer_size
    fn cell_property(&self, layer: usize, tile: UVec2, key: &str) -> Option<&PropertyValue>;

    /// Objects of the named object layer; empty when the layer is absent.
    fn objects(&self, layer: &str) -> &[MapObject];
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileDefinition {
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// One tile layer. `data` is row-major with the row index equal to tile y,
/// so row 0 is the bottom of the map. `None` marks an empty cell.
#[derive(Debug, Clone, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    data: Vec<Option<u32>>,
}

impl TileLayer {
    pub fn filled(name: &str, width: u32, height: u32, tile: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            data: vec![tile; width as usize * height as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).and_then(|idx| self.data.get(idx).copied().flatten())
    }

    /// Returns false when `(x, y)` lies outside the layer.
    pub fn set(&mut self, x: u32, y: u32, tile: Option<u32>) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.data[idx] = tile;
                true
            }
            None => false,
        }
    }

    /// Builder-style variant of [`TileLayer::set`].
    pub fn with(mut self, x: u32, y: u32, tile: Option<u32>) -> Self {
        self.set(x, y, tile);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to parse tile map: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tile map from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("layer {layer:?} holds {actual} cells, expected {expected}")]
    LayerSizeMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
    #[error("layer {layer:?} of {width}x{height} cells is too large to address")]
    LayerTooLarge {
        layer: String,
        width: u32,
        height: u32,
    },
}

/// In-memory layered tile map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileMap {
    #[serde(default)]
    tiles: HashMap<u32, TileDefinition>,
    #[serde(default)]
    layers: Vec<TileLayer>,
    #[serde(default)]
    object_layers: Vec<ObjectLayer>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, MapLoadError> {
        let map: TileMap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    pub fn from_file(path: &Path) -> Result<Self, MapLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| MapLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let map = TileMap::from_json_str(&contents)?;
        tracing::info!(
            target: "despot::map",
            path = %path.display(),
            layers = map.layers.len(),
            width = map.dimensions().x,
            height = map.dimensions().y,
            "tile_map.loaded"
        );
        Ok(map)
    }

    fn validate(&self) -> Result<(), MapLoadError> {
        for layer in &self.layers {
            let expected = (layer.width as usize)
                .checked_mul(layer.height as usize)
                .ok_or_else(|| MapLoadError::LayerTooLarge {
                    layer: layer.name.clone(),
                    width: layer.width,
                    height: layer.height,
                })?;
            if layer.data.len() != expected {
                return Err(MapLoadError::LayerSizeMismatch {
                    layer: layer.name.clone(),
                    expected,
                    actual: layer.data.len(),
                });
            }
        }
        Ok(())
    }

    /// Registers (or replaces) a tile definition with the given properties.
    pub fn define_tile<I, K, V>(mut self, id: u32, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let properties = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.tiles.insert(id, TileDefinition { properties });
        self
    }

    pub fn push_layer(mut self, layer: TileLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push_objects(mut self, name: &str, objects: Vec<MapObject>) -> Self {
        self.object_layers.push(ObjectLayer {
            name: name.to_string(),
            objects,
        });
        self
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut TileLayer> {
        self.layers.get_mut(index)
    }

    /// Single-layer map where every cell is the same tile with `walkable` set
    /// to the given value.
    pub fn uniform(width: u32, height: u32, walkable: bool) -> Self {
        TileMap::new()
            .define_tile(1, [("walkable", walkable)])
            .push_layer(TileLayer::filled("ground", width, height, Some(1)))
    }
}

impl TileMapSource for TileMap {
    fn dimensions(&self) -> UVec2 {
        self.layers.first().map(TileLayer::size).unwrap_or(UVec2::ZERO)
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn layer_size(&self, layer: usize) -> UVec2 {
        self.layers.get(layer).map(TileLayer::size).unwrap_or(UVec2::ZERO)
    }

    fn cell_property(&self, layer: usize, tile: UVec2, key: &str) -> Option<&PropertyValue> {
        let id = self.layers.get(layer)?.get(tile.x, tile.y)?;
        self.tiles.get(&id)?.properties.get(key)
    }

    fn objects(&self, layer: &str) -> &[MapObject] {
        self.object_layers
            .iter()
            .find(|candidate| candidate.name == layer)
            .map(|found| found.objects.as_slice())
            .unwrap_or(&[])
    }
}
