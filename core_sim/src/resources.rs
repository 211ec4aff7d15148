use std::fmt;
use std::sync::Arc;

use bevy::{math::UVec2, prelude::*};

use crate::{entities::UnitId, minimap::MiniMapBuffer, render::DrawList, tilemap::TileMapSource};

/// Shared handle to the tile map the session plays on.
#[derive(Resource, Clone)]
pub struct GameMap(pub Arc<dyn TileMapSource>);

impl GameMap {
    pub fn new(map: Arc<dyn TileMapSource>) -> Self {
        Self(map)
    }

    pub fn source(&self) -> &dyn TileMapSource {
        self.0.as_ref()
    }

    pub fn dimensions(&self) -> UVec2 {
        self.0.dimensions()
    }
}

impl fmt::Debug for GameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameMap")
            .field("dimensions", &self.dimensions())
            .field("layers", &self.0.layer_count())
            .finish()
    }
}

/// Seconds elapsed since the previous frame, written by the host.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta(pub f32);

/// Unit that receives movement input and drives vision, the minimap marker
/// and camera follow.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveUnit(pub Option<UnitId>);

#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseState {
    paused: bool,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

/// Latest composed main view.
#[derive(Resource, Default, Debug, Clone)]
pub struct MainViewFrame(pub DrawList);

/// Latest minimap repaint; empty until the first frame runs.
#[derive(Resource, Default, Debug, Clone)]
pub struct MiniMapFrame(pub Option<MiniMapBuffer>);
