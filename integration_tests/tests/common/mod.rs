#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Once};

use bevy::{math::Vec2, prelude::*};
use despot_core::{
    build_headless_app, run_frame, CameraController, PointerButton, PointerEvent, TileMap,
    TileMapSource,
};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();
static TRACING: Once = Once::new();

/// Frame time used by tests that do not care about the movement cooldown.
pub const FRAME: f32 = 1.0 / 60.0;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixture_path("test_game_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test game config at {}",
            config_path.display()
        );

        std::env::set_var("DESPOT_CONFIG_PATH", &config_path);
    });
    init_tracing();
}

/// Installs a subscriber honouring `RUST_LOG`; output goes through the test
/// harness so it only shows for failing tests.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn fixture_map() -> anyhow::Result<Arc<dyn TileMapSource>> {
    Ok(Arc::new(TileMap::from_file(&fixture_path("test_map.json"))?))
}

/// App on the 20x20 fixture map with the startup frame already run.
pub fn started_app() -> anyhow::Result<App> {
    ensure_test_config();
    let mut app = build_headless_app(fixture_map()?);
    run_frame(&mut app, FRAME);
    Ok(app)
}

/// Screen position (top-left origin, y down) of a world point under the
/// current camera.
pub fn world_to_screen(app: &App, world: Vec2) -> Vec2 {
    let camera = app.world.resource::<CameraController>();
    let offset = (world - camera.position()) / camera.zoom_factor();
    let viewport = camera.viewport();
    Vec2::new(viewport.x * 0.5 + offset.x, viewport.y * 0.5 - offset.y)
}

pub fn click(app: &mut App, screen: Vec2, button: PointerButton) {
    app.world.send_event(PointerEvent::Down { screen, button });
    app.world.send_event(PointerEvent::Up { button });
}

/// Every retained event of type `E`, oldest first.
pub fn drain_events<E: Event + Clone>(app: &App) -> Vec<E> {
    let events = app.world.resource::<Events<E>>();
    let mut reader = events.get_reader();
    reader.read(events).cloned().collect()
}
