//! Game configuration.
//!
//! Loaded from `game_config.json` with support for an environment variable
//! override, falling back to the copy embedded in the crate.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::math::Vec2;
use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

use crate::grid::GridGeometry;
use crate::visibility::FogPalette;

pub const BUILTIN_GAME_CONFIG: &str = include_str!("data/game_config.json");

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "DESPOT_CONFIG_PATH";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid: GridConfig,
    pub vision: VisionConfig,
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    pub fog: FogConfig,
    pub minimap: MiniMapConfig,
    pub spawn: SpawnConfig,
}

impl GameConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_GAME_CONFIG).expect("builtin game config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, GameConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| GameConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        GameConfig::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), GameConfigError> {
        if self.grid.tile_size == 0 {
            return Err(GameConfigError::Invalid("grid.tile_size must be positive".into()));
        }
        if self.vision.radius == 0 {
            return Err(GameConfigError::Invalid("vision.radius must be positive".into()));
        }
        if !(self.movement.cooldown_secs >= 0.0) {
            return Err(GameConfigError::Invalid(
                "movement.cooldown_secs must not be negative".into(),
            ));
        }
        let camera = &self.camera;
        if !(camera.min_zoom > 0.0) || camera.min_zoom > camera.max_zoom {
            return Err(GameConfigError::Invalid(format!(
                "camera zoom bounds [{}, {}] are invalid",
                camera.min_zoom, camera.max_zoom
            )));
        }
        if !(camera.zoom_step > 0.0) {
            return Err(GameConfigError::Invalid("camera.zoom_step must be positive".into()));
        }
        if self.minimap.buffer_size == 0 {
            return Err(GameConfigError::Invalid("minimap.buffer_size must be positive".into()));
        }
        Ok(())
    }

    pub fn grid_geometry(&self) -> GridGeometry {
        GridGeometry::new(self.grid.tile_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub tile_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { tile_size: 32 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Vision radius in tiles.
    pub radius: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self { radius: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub cooldown_secs: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 0.15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom change per scroll unit.
    pub zoom_step: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl CameraConfig {
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 2.0,
            zoom_step: 0.1,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

/// Fog palettes per presentation. Fields left out of either section keep that
/// presentation's own defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "FogConfigFile")]
pub struct FogConfig {
    pub main_view: FogPalette,
    pub minimap: FogPalette,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct FogPaletteFile {
    unseen_alpha: Option<f32>,
    remembered_alpha: Option<f32>,
    visible_max_alpha: Option<f32>,
}

impl FogPaletteFile {
    fn over(self, base: FogPalette) -> FogPalette {
        base.with_overrides(
            self.unseen_alpha,
            self.remembered_alpha,
            self.visible_max_alpha,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FogConfigFile {
    main_view: FogPaletteFile,
    minimap: FogPaletteFile,
}

impl From<FogConfigFile> for FogConfig {
    fn from(file: FogConfigFile) -> Self {
        Self {
            main_view: file.main_view.over(FogPalette::MAIN_VIEW),
            minimap: file.minimap.over(FogPalette::MINIMAP),
        }
    }
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            main_view: FogPalette::MAIN_VIEW,
            minimap: FogPalette::MINIMAP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MiniMapConfig {
    /// Side of the square offscreen buffer, in pixels.
    pub buffer_size: u32,
    pub display_width: f32,
    pub display_height: f32,
    /// Marker side as a multiple of one tile's buffer size.
    pub marker_scale: f32,
}

impl MiniMapConfig {
    pub fn display_size(&self) -> Vec2 {
        Vec2::new(self.display_width, self.display_height)
    }
}

impl Default for MiniMapConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            display_width: 256.0,
            display_height: 256.0,
            marker_scale: 1.5,
        }
    }
}

/// Where the initial unit comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub objects_layer: String,
    pub marker_name: String,
    pub unit_kind: String,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            objects_layer: "Objects".to_string(),
            marker_name: "Settler".to_string(),
            unit_kind: "settler".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GameConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid game config: {0}")]
    Invalid(String),
}

/// Handle for accessing the game configuration.
#[derive(Resource, Debug, Clone)]
pub struct GameConfigHandle(pub Arc<GameConfig>);

impl GameConfigHandle {
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self(config)
    }

    pub fn get(&self) -> Arc<GameConfig> {
        Arc::clone(&self.0)
    }
}

/// Metadata about where the configuration came from.
#[derive(Resource, Debug, Clone)]
pub struct GameConfigMetadata {
    path: Option<PathBuf>,
}

impl GameConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// `None` when the builtin copy is in use.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load configuration from the environment override or the default path.
pub fn load_game_config_from_env() -> (Arc<GameConfig>, GameConfigMetadata) {
    let override_path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let default_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/data/game_config.json");

    let candidates: Vec<PathBuf> = match override_path {
        Some(ref path) => vec![path.clone()],
        None => vec![default_path],
    };

    for path in candidates {
        match GameConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "despot::config",
                    path = %path.display(),
                    "game_config.loaded=file"
                );
                return (Arc::new(config), GameConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "despot::config",
                    path = %path.display(),
                    error = %err,
                    "game_config.load_failed"
                );
            }
        }
    }

    let config = GameConfig::builtin();
    tracing::info!(target: "despot::config", "game_config.loaded=builtin");
    (config, GameConfigMetadata::new(None))
}
