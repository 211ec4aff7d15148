use bevy::{ecs::system::SystemParam, math::Vec2, prelude::*};

use crate::{
    camera::CameraController,
    config::GameConfigHandle,
    entities::UnitId,
    input::{
        EndTurnRequested, MiniMapWidget, MoveCooldown, MovementInput, PointerAction, PointerEvent,
        PointerRouter, SelectionChanged, SettlementFounded, TogglePause, TurnAdvanced, UnitCommand,
        UnitInfo, ViewportResized,
    },
    minimap::MiniMapProjector,
    render::MainViewScene,
    resources::{ActiveUnit, FrameDelta, GameMap, MainViewFrame, MiniMapFrame, PauseState},
    tilemap::ObjectShape,
    turn::{MoveOutcome, TurnManager},
    visibility::VisibilityEngine,
    walkability::WalkabilityOracle,
};

#[derive(SystemParam)]
pub struct PointerParams<'w, 's> {
    pub events: EventReader<'w, 's, PointerEvent>,
    pub router: ResMut<'w, PointerRouter>,
    pub widget: Res<'w, MiniMapWidget>,
    pub minimap: Res<'w, MiniMapProjector>,
    pub camera: ResMut<'w, CameraController>,
    pub turns: ResMut<'w, TurnManager>,
    pub active: ResMut<'w, ActiveUnit>,
    pub selection: EventWriter<'w, SelectionChanged>,
}

#[derive(SystemParam)]
pub struct MovementParams<'w> {
    pub delta: Res<'w, FrameDelta>,
    pub input: Res<'w, MovementInput>,
    pub cooldown: ResMut<'w, MoveCooldown>,
    pub active: Res<'w, ActiveUnit>,
    pub map: Res<'w, GameMap>,
    pub turns: ResMut<'w, TurnManager>,
}

/// Seeds the first unit from the map's spawn marker, or the map centre.
pub fn spawn_initial_units(
    map: Res<GameMap>,
    config: Res<GameConfigHandle>,
    mut turns: ResMut<TurnManager>,
    mut active: ResMut<ActiveUnit>,
    mut camera: ResMut<CameraController>,
) {
    let spawn = &config.0.spawn;
    let grid = turns.grid();
    let marker = map
        .source()
        .objects(&spawn.objects_layer)
        .iter()
        .find(|object| {
            object.name.as_deref() == Some(spawn.marker_name.as_str())
                && matches!(object.shape, ObjectShape::Rectangle { .. })
        })
        .map(|object| object.shape.origin());

    let position = match marker {
        Some(origin) => origin,
        None => {
            tracing::warn!(
                target: "despot::spawn",
                layer = %spawn.objects_layer,
                marker = %spawn.marker_name,
                "spawn.marker_missing; using map centre"
            );
            grid.snap(grid.world_extent(map.dimensions()) * 0.5)
        }
    };

    match turns.spawn(&spawn.unit_kind, position) {
        Ok(unit) => {
            active.0 = Some(unit);
            if let Some(spawned) = turns.unit(unit) {
                camera.follow(grid.tile_center(spawned.tile(&grid)));
            }
            tracing::info!(
                target: "despot::spawn",
                %unit,
                from_marker = marker.is_some(),
                "spawn.initial_unit"
            );
        }
        Err(err) => {
            tracing::warn!(target: "despot::spawn", error = %err, "spawn.failed");
        }
    }
}

pub fn not_paused(pause: Res<PauseState>) -> bool {
    !pause.is_paused()
}

pub fn toggle_pause(mut events: EventReader<TogglePause>, mut pause: ResMut<PauseState>) {
    for _ in events.read() {
        let paused = pause.toggle();
        tracing::info!(target: "despot::input", paused, "pause.toggled");
    }
}

/// Resizes the camera viewport and re-anchors the minimap widget.
pub fn handle_viewport_resize(
    mut events: EventReader<ViewportResized>,
    mut camera: ResMut<CameraController>,
    mut widget: ResMut<MiniMapWidget>,
) {
    for resized in events.read() {
        camera.resize(resized.width, resized.height);
        *widget = MiniMapWidget::top_right(resized.viewport(), widget.size());
        tracing::info!(
            target: "despot::camera",
            width = resized.width,
            height = resized.height,
            "viewport.resized"
        );
    }
}

/// Routes pointer events into camera moves, minimap travel and selection.
pub fn handle_pointer_input(mut params: PointerParams) {
    let events: Vec<PointerEvent> = params.events.read().copied().collect();
    for event in events {
        let Some(action) = params
            .router
            .route(event, &params.widget, &params.minimap)
        else {
            continue;
        };

        match action {
            PointerAction::TravelTo(world) => {
                params.camera.follow(world);
                tracing::debug!(
                    target: "despot::input",
                    x = world.x,
                    y = world.y,
                    "minimap.travel"
                );
            }
            PointerAction::BeginDrag | PointerAction::EndDrag => {}
            PointerAction::Pan(delta) => params.camera.pan(delta),
            PointerAction::Zoom(amount) => params.camera.zoom(amount),
            PointerAction::Select(screen) => {
                let world = params.camera.screen_to_world(screen);
                select_at(&mut params, world);
            }
        }
    }
}

fn select_at(params: &mut PointerParams, world: Vec2) {
    let grid = params.turns.grid();
    let hit = params.turns.registry().unit_at(world, &grid);
    params.turns.registry_mut().select_only(hit);
    if hit.is_some() {
        params.active.0 = hit;
    }

    let info = hit
        .and_then(|id| params.turns.unit(id))
        .map(UnitInfo::from);
    tracing::info!(
        target: "despot::input",
        unit = ?hit,
        x = world.x,
        y = world.y,
        "selection.changed"
    );
    params.selection.send(SelectionChanged { unit: hit, info });
}

pub fn apply_unit_commands(
    mut commands: EventReader<UnitCommand>,
    mut turns: ResMut<TurnManager>,
    mut active: ResMut<ActiveUnit>,
    mut founded: EventWriter<SettlementFounded>,
    mut selection: EventWriter<SelectionChanged>,
) {
    for command in commands.read() {
        match command {
            UnitCommand::FoundSettlement { unit, name } => {
                match turns.found_settlement(name.clone(), *unit) {
                    Ok(settlement) => {
                        if active.0 == Some(*unit) {
                            active.0 = None;
                        }
                        let position = turns
                            .registry()
                            .settlement(settlement)
                            .map(|city| city.position())
                            .unwrap_or_default();
                        founded.send(SettlementFounded {
                            settlement,
                            name: name.clone(),
                            position,
                        });
                        selection.send(SelectionChanged {
                            unit: None,
                            info: None,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "despot::turn",
                            %unit,
                            error = %err,
                            "settlement.found_rejected"
                        );
                    }
                }
            }
            UnitCommand::Explore { unit } => log_acknowledged(*unit, "explore"),
            UnitCommand::Wait { unit } => log_acknowledged(*unit, "wait"),
        }
    }
}

fn log_acknowledged(unit: UnitId, command: &'static str) {
    tracing::info!(target: "despot::turn", %unit, command, "unit.command_acknowledged");
}

pub fn handle_turn_requests(
    mut requests: EventReader<EndTurnRequested>,
    mut turns: ResMut<TurnManager>,
    mut advanced: EventWriter<TurnAdvanced>,
) {
    for _ in requests.read() {
        let summary = turns.end_turn();
        advanced.send(TurnAdvanced { turn: summary.turn });
    }
}

/// Applies the held direction to the selected active unit once the cooldown
/// has elapsed.
pub fn move_active_unit(mut params: MovementParams) {
    let delta = params.delta.0;
    params.cooldown.tick(delta);

    let (Some(facing), Some(unit)) = (params.input.held, params.active.0) else {
        return;
    };
    if !params.cooldown.ready() {
        return;
    }
    if !params
        .turns
        .unit(unit)
        .is_some_and(|found| found.is_selected())
    {
        return;
    }

    let oracle = WalkabilityOracle::new(params.map.source(), params.turns.grid());
    match params.turns.move_unit(unit, facing, &oracle) {
        Ok(MoveOutcome::Moved { .. }) => params.cooldown.trigger(),
        Ok(outcome) => {
            tracing::trace!(
                target: "despot::movement",
                %unit,
                ?facing,
                ?outcome,
                "unit.move_refused"
            );
        }
        Err(err) => {
            tracing::warn!(target: "despot::movement", %unit, error = %err, "unit.move_failed");
        }
    }
}

/// Reveals the vision disc around the active unit. Safe to run every frame.
pub fn update_exploration(
    active: Res<ActiveUnit>,
    turns: Res<TurnManager>,
    mut visibility: ResMut<VisibilityEngine>,
) {
    let grid = turns.grid();
    if let Some(unit) = active.0.and_then(|id| turns.unit(id)) {
        visibility.update_exploration(unit.tile(&grid));
    }
}

/// Keeps the camera on the active unit's tile while that unit is selected.
pub fn follow_active_unit(
    active: Res<ActiveUnit>,
    turns: Res<TurnManager>,
    mut camera: ResMut<CameraController>,
) {
    let grid = turns.grid();
    let Some(unit) = active.0.and_then(|id| turns.unit(id)) else {
        return;
    };
    if unit.is_selected() {
        camera.follow(grid.tile_center(unit.tile(&grid)));
    }
}

pub fn compose_main_view(
    camera: Res<CameraController>,
    visibility: Res<VisibilityEngine>,
    turns: Res<TurnManager>,
    active: Res<ActiveUnit>,
    config: Res<GameConfigHandle>,
    mut frame: ResMut<MainViewFrame>,
) {
    let scene = MainViewScene {
        camera: &camera,
        visibility: &visibility,
        registry: turns.registry(),
        grid: turns.grid(),
        palette: config.0.fog.main_view,
        viewer: active.0,
    };
    frame.0 = scene.compose();
}

pub fn render_minimap(
    minimap: Res<MiniMapProjector>,
    visibility: Res<VisibilityEngine>,
    turns: Res<TurnManager>,
    active: Res<ActiveUnit>,
    mut frame: ResMut<MiniMapFrame>,
) {
    let grid = turns.grid();
    let tracked = active
        .0
        .and_then(|id| turns.unit(id))
        .map(|unit| unit.tile(&grid));
    frame.0 = Some(minimap.render(&visibility, tracked));
}
