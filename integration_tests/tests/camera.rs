mod common;

use std::sync::Arc;

use bevy::{app::App, math::Vec2};
use despot_core::{
    build_headless_app, resize_viewport, run_frame, CameraController, MiniMapWidget, PointerButton,
    PointerEvent, TileMap,
};

/// 100x100 tiles (3200 px square) without a spawn marker: the settler spawns
/// at the centre and is not selected, so the camera is free to move.
fn open_field() -> App {
    common::ensure_test_config();
    let mut app = build_headless_app(Arc::new(TileMap::uniform(100, 100, true)));
    run_frame(&mut app, common::FRAME);
    app
}

fn camera(app: &App) -> &CameraController {
    app.world.resource::<CameraController>()
}

#[test]
fn camera_starts_on_spawned_unit() {
    let app = open_field();
    assert_eq!(camera(&app).position(), Vec2::new(1616.0, 1616.0));
    assert_eq!(camera(&app).zoom_factor(), 1.0);
}

#[test]
fn right_drag_pans() {
    let mut app = open_field();
    app.world.send_event(PointerEvent::Down {
        screen: Vec2::new(100.0, 400.0),
        button: PointerButton::Right,
    });
    app.world.send_event(PointerEvent::Dragged {
        screen: Vec2::new(110.0, 420.0),
    });
    app.world.send_event(PointerEvent::Up {
        button: PointerButton::Right,
    });
    run_frame(&mut app, common::FRAME);

    assert_eq!(camera(&app).position(), Vec2::new(1606.0, 1636.0));
}

#[test]
fn scrolling_zooms_within_bounds() {
    let mut app = open_field();
    app.world.send_event(PointerEvent::Scrolled { amount: 5.0 });
    run_frame(&mut app, common::FRAME);
    assert!((camera(&app).zoom_factor() - 1.5).abs() < 1e-5);

    app.world.send_event(PointerEvent::Scrolled { amount: -50.0 });
    run_frame(&mut app, common::FRAME);
    assert_eq!(camera(&app).zoom_factor(), 0.5);
}

#[test]
fn minimap_click_travels_camera() {
    let mut app = open_field();
    let widget = *app.world.resource::<MiniMapWidget>();
    let rect = widget.rect();

    // Quarter of the way in from the widget's left edge, three quarters up.
    let screen = Vec2::new(
        rect.min.x + rect.width() * 0.25,
        rect.max.y - rect.height() * 0.75,
    );
    common::click(&mut app, screen, PointerButton::Left);
    run_frame(&mut app, common::FRAME);

    assert_eq!(camera(&app).position(), Vec2::new(800.0, 2400.0));
}

#[test]
fn minimap_click_near_edge_is_clamped() {
    let mut app = open_field();
    let rect = app.world.resource::<MiniMapWidget>().rect();

    common::click(&mut app, rect.min, PointerButton::Left);
    run_frame(&mut app, common::FRAME);

    // Top-left corner of the minimap is world (0, 3200); the camera keeps its
    // 800x600 footprint inside the map.
    assert_eq!(camera(&app).position(), Vec2::new(400.0, 2900.0));
}

#[test]
fn resize_reanchors_minimap_widget() {
    let mut app = open_field();
    assert_eq!(
        app.world.resource::<MiniMapWidget>().rect().min,
        Vec2::new(524.0, 20.0)
    );

    resize_viewport(&mut app, 1600.0, 900.0);
    run_frame(&mut app, common::FRAME);

    let rect = app.world.resource::<MiniMapWidget>().rect();
    assert_eq!(rect.min, Vec2::new(1324.0, 20.0));
    assert_eq!(rect.size(), Vec2::new(256.0, 256.0));
    assert_eq!(camera(&app).viewport(), Vec2::new(1600.0, 900.0));

    // Clicks land on the re-anchored widget.
    common::click(&mut app, rect.center(), PointerButton::Left);
    run_frame(&mut app, common::FRAME);
    assert_eq!(camera(&app).position(), Vec2::new(1600.0, 1600.0));
}
