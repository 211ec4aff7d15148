//! Core of the Despot turn-based strategy prototype.
//!
//! Units and settlements on a tile grid, terrain walkability, fog of war, the
//! main-view camera and the minimap overview. [`build_headless_app`] wires
//! everything into a Bevy [`App`]; each [`run_frame`] call resolves one frame
//! (input, movement, exploration, camera, draw-list composition).

pub mod camera;
pub mod config;
pub mod entities;
pub mod grid;
pub mod input;
pub mod metrics;
pub mod minimap;
pub mod render;
mod resources;
mod systems;
pub mod tilemap;
pub mod turn;
pub mod visibility;
pub mod walkability;

use std::sync::Arc;

use bevy::prelude::*;

pub use camera::CameraController;
pub use config::{
    load_game_config_from_env, GameConfig, GameConfigError, GameConfigHandle, GameConfigMetadata,
};
pub use entities::{
    Capabilities, EntityRegistry, Facing, RegistryError, Settlement, SettlementId, Unit, UnitId,
    UnitKind,
};
pub use grid::GridGeometry;
pub use input::{
    EndTurnRequested, MiniMapWidget, MoveCooldown, MovementInput, PointerAction, PointerButton,
    PointerEvent, PointerRouter, SelectionChanged, SettlementFounded, TogglePause, TurnAdvanced,
    UnitCommand, UnitInfo, ViewportResized,
};
pub use metrics::SessionMetrics;
pub use minimap::{MiniMapBuffer, MiniMapProjector};
pub use render::{
    CommandRecorder, DrawCommand, DrawList, DrawQuad, MainViewScene, RenderBackend, Rgba,
    TextureKey,
};
pub use resources::{ActiveUnit, FrameDelta, GameMap, MainViewFrame, MiniMapFrame, PauseState};
pub use tilemap::{
    MapLoadError, MapObject, ObjectShape, PropertyValue, TileLayer, TileMap, TileMapSource,
};
pub use turn::{MoveOutcome, TurnManager, TurnSummary};
pub use visibility::{ExploredGrid, FogBand, FogPalette, VisibilityEngine};
pub use walkability::WalkabilityOracle;

/// Construct a Bevy [`App`] for `map`, configured from the environment.
pub fn build_headless_app(map: Arc<dyn TileMapSource>) -> App {
    let (config, metadata) = load_game_config_from_env();
    let mut app = build_app_with_config(map, config);
    app.insert_resource(metadata);
    app
}

/// Construct a Bevy [`App`] for `map` with an explicit configuration.
pub fn build_app_with_config(map: Arc<dyn TileMapSource>, config: Arc<GameConfig>) -> App {
    let mut app = App::new();

    let grid = config.grid_geometry();
    let dimensions = map.dimensions();
    let world_size = grid.world_extent(dimensions);
    let camera = CameraController::new(world_size, config.camera.viewport(), &config.camera);
    let minimap = MiniMapProjector::new(world_size, grid, &config.minimap, config.fog.minimap);
    let widget = MiniMapWidget::top_right(config.camera.viewport(), config.minimap.display_size());

    app.insert_resource(GameConfigHandle::new(Arc::clone(&config)))
        .insert_resource(GameConfigMetadata::new(None))
        .insert_resource(GameMap::new(map))
        .insert_resource(TurnManager::new(grid))
        .insert_resource(VisibilityEngine::new(dimensions, config.vision.radius))
        .insert_resource(camera)
        .insert_resource(minimap)
        .insert_resource(widget)
        .insert_resource(PointerRouter::default())
        .insert_resource(MovementInput::default())
        .insert_resource(MoveCooldown::new(config.movement.cooldown_secs))
        .insert_resource(FrameDelta::default())
        .insert_resource(ActiveUnit::default())
        .insert_resource(PauseState::default())
        .insert_resource(MainViewFrame::default())
        .insert_resource(MiniMapFrame::default())
        .insert_resource(SessionMetrics::default())
        .add_event::<PointerEvent>()
        .add_event::<SelectionChanged>()
        .add_event::<UnitCommand>()
        .add_event::<SettlementFounded>()
        .add_event::<EndTurnRequested>()
        .add_event::<TurnAdvanced>()
        .add_event::<TogglePause>()
        .add_event::<ViewportResized>()
        .add_plugins(MinimalPlugins)
        .add_systems(Startup, systems::spawn_initial_units)
        .add_systems(
            Update,
            (
                systems::toggle_pause,
                systems::handle_viewport_resize,
                (
                    systems::handle_pointer_input,
                    systems::apply_unit_commands,
                    systems::handle_turn_requests,
                    systems::move_active_unit,
                )
                    .chain()
                    .run_if(systems::not_paused),
                systems::update_exploration,
                systems::follow_active_unit,
                systems::compose_main_view,
                systems::render_minimap,
                metrics::collect_metrics,
            )
                .chain(),
        );

    tracing::info!(
        target: "despot::config",
        width = dimensions.x,
        height = dimensions.y,
        tile_size = grid.tile_size(),
        "app.built"
    );
    app
}

/// Execute a single frame after `delta_seconds` of elapsed time.
///
/// Runs the chained systems configured in [`build_app_with_config`]
/// (pause → resize → pointer → commands → turn requests → movement →
/// exploration → camera follow → main view → minimap → metrics). The first
/// call also runs the startup spawn.
pub fn run_frame(app: &mut App, delta_seconds: f32) {
    app.world.resource_mut::<FrameDelta>().0 = delta_seconds;
    app.update();
}

/// Queue a viewport resize; applied on the next frame.
pub fn resize_viewport(app: &mut App, width: f32, height: f32) {
    app.world.send_event(ViewportResized { width, height });
}

/// End the current turn outside the frame loop.
pub fn end_turn(app: &mut App) -> TurnSummary {
    app.world.resource_mut::<TurnManager>().end_turn()
}
