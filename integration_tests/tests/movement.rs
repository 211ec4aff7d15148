mod common;

use bevy::{app::App, math::Vec2};
use despot_core::{
    end_turn, run_frame, ActiveUnit, Facing, MovementInput, PointerButton, SelectionChanged,
    TurnManager, Unit, UnitKind,
};

fn select_settler(app: &mut App) {
    let screen = common::world_to_screen(app, Vec2::new(336.0, 336.0));
    common::click(app, screen, PointerButton::Left);
    run_frame(app, common::FRAME);
}

fn active_unit(app: &App) -> Unit {
    let id = app.world.resource::<ActiveUnit>().0.expect("active unit");
    app.world
        .resource::<TurnManager>()
        .unit(id)
        .cloned()
        .expect("active unit registered")
}

fn hold(app: &mut App, facing: Option<Facing>) {
    app.world.resource_mut::<MovementInput>().held = facing;
}

#[test]
fn clicking_the_settler_selects_it() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    select_settler(&mut app);

    let unit = active_unit(&app);
    assert!(unit.is_selected());

    let changes = common::drain_events::<SelectionChanged>(&app);
    let last = changes.last().expect("selection event");
    assert_eq!(last.unit, Some(unit.id()));
    let info = last.info.as_ref().expect("unit info");
    assert_eq!(info.name, "Settler");
    assert_eq!(info.kind, UnitKind::Settler);
    assert_eq!(info.position, Vec2::new(320.0, 320.0));
    assert_eq!(info.moves_left, 3);
    Ok(())
}

#[test]
fn clicking_empty_ground_deselects() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    select_settler(&mut app);

    let screen = common::world_to_screen(&app, Vec2::new(100.0, 300.0));
    common::click(&mut app, screen, PointerButton::Left);
    run_frame(&mut app, common::FRAME);

    assert!(!active_unit(&app).is_selected());
    let changes = common::drain_events::<SelectionChanged>(&app);
    assert_eq!(
        changes.last(),
        Some(&SelectionChanged {
            unit: None,
            info: None
        })
    );
    Ok(())
}

#[test]
fn unselected_unit_ignores_movement_keys() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    hold(&mut app, Some(Facing::Up));
    run_frame(&mut app, 0.2);

    assert_eq!(active_unit(&app).position(), Vec2::new(320.0, 320.0));
    Ok(())
}

#[test]
fn cooldown_spaces_out_steps() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    select_settler(&mut app);
    hold(&mut app, Some(Facing::Up));

    run_frame(&mut app, common::FRAME);
    assert_eq!(active_unit(&app).position(), Vec2::new(320.0, 352.0));

    // Cooldown is 0.1 s in the fixture config.
    run_frame(&mut app, 0.05);
    assert_eq!(active_unit(&app).position(), Vec2::new(320.0, 352.0));

    run_frame(&mut app, 0.06);
    let unit = active_unit(&app);
    assert_eq!(unit.position(), Vec2::new(320.0, 384.0));
    assert_eq!(unit.facing(), Facing::Up);
    assert_eq!(
        unit.sprite_key(),
        "characters/settler/settler_standing_back"
    );
    Ok(())
}

#[test]
fn forest_blocks_without_spending_moves() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    select_settler(&mut app);
    hold(&mut app, Some(Facing::Right));

    for _ in 0..3 {
        run_frame(&mut app, 0.2);
    }

    // (11, 10) is grass, (12, 10) carries a forest on the decor layer.
    let unit = active_unit(&app);
    assert_eq!(unit.position(), Vec2::new(352.0, 320.0));
    assert_eq!(unit.moves_left(), 2);
    assert_eq!(unit.facing(), Facing::Right);
    Ok(())
}

#[test]
fn moves_run_out_until_turn_ends() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    select_settler(&mut app);
    hold(&mut app, Some(Facing::Left));

    for _ in 0..5 {
        run_frame(&mut app, 0.2);
    }
    let unit = active_unit(&app);
    assert_eq!(unit.position(), Vec2::new(224.0, 320.0));
    assert_eq!(unit.moves_left(), 0);

    let summary = end_turn(&mut app);
    assert_eq!(summary.turn, 2);
    assert_eq!(summary.units_restored, 1);

    run_frame(&mut app, 0.2);
    let unit = active_unit(&app);
    assert_eq!(unit.position(), Vec2::new(192.0, 320.0));
    assert_eq!(unit.moves_left(), 2);
    Ok(())
}

#[test]
fn camera_follows_selected_unit() -> anyhow::Result<()> {
    let mut app = common::started_app()?;
    select_settler(&mut app);
    hold(&mut app, Some(Facing::Down));
    run_frame(&mut app, 0.2);

    // 640 px wide map under an 800 px viewport stays pinned on x.
    let camera = app.world.resource::<despot_core::CameraController>();
    assert_eq!(camera.position(), Vec2::new(320.0, 304.0));
    Ok(())
}
