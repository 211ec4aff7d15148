//! Pointer and keyboard input plus the signals exchanged with the widget tree.

use bevy::math::{Rect, Vec2};
use bevy::prelude::{Event, Resource};

use crate::{
    entities::{Facing, SettlementId, Unit, UnitId, UnitKind},
    minimap::MiniMapProjector,
};

/// Gap between the minimap widget and the top-right corner of the screen.
pub const MINIMAP_MARGIN: f32 = 20.0;

/// Direction key held this frame. The host writes it; movement reads it.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementInput {
    pub held: Option<Facing>,
}

impl MovementInput {
    /// WASD, case-insensitive.
    pub fn facing_for_key(key: char) -> Option<Facing> {
        match key.to_ascii_lowercase() {
            'w' => Some(Facing::Up),
            's' => Some(Facing::Down),
            'a' => Some(Facing::Left),
            'd' => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Rate limit turning held direction keys into discrete grid steps.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MoveCooldown {
    duration: f32,
    remaining: f32,
}

impl MoveCooldown {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            remaining: 0.0,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        self.remaining = (self.remaining - delta_seconds.max(0.0)).max(0.0);
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn trigger(&mut self) {
        self.remaining = self.duration;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Raw pointer input in screen pixels (top-left origin, y down).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { screen: Vec2, button: PointerButton },
    Dragged { screen: Vec2 },
    Up { button: PointerButton },
    /// Positive zooms out.
    Scrolled { amount: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    TravelTo(Vec2),
    BeginDrag,
    /// Screen-space delta since the previous drag position.
    Pan(Vec2),
    EndDrag,
    Select(Vec2),
    Zoom(f32),
}

/// Screen placement of the displayed minimap.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MiniMapWidget {
    rect: Rect,
}

impl MiniMapWidget {
    pub fn new(top_left: Vec2, size: Vec2) -> Self {
        Self {
            rect: Rect::from_corners(top_left, top_left + size),
        }
    }

    /// Anchored to the top-right corner of a viewport.
    pub fn top_right(viewport: Vec2, size: Vec2) -> Self {
        Self::new(
            Vec2::new(viewport.x - size.x - MINIMAP_MARGIN, MINIMAP_MARGIN),
            size,
        )
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn size(&self) -> Vec2 {
        self.rect.size()
    }

    /// Widget-local position (bottom-left origin, y up), or `None` when the
    /// screen point is outside the widget.
    pub fn to_local(&self, screen: Vec2) -> Option<Vec2> {
        if !self.rect.contains(screen) {
            return None;
        }
        Some(Vec2::new(
            screen.x - self.rect.min.x,
            self.rect.max.y - screen.y,
        ))
    }
}

/// Turns pointer events into camera, selection and travel actions.
#[derive(Resource, Debug, Default, Clone)]
pub struct PointerRouter {
    drag_from: Option<Vec2>,
}

impl PointerRouter {
    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    pub fn route(
        &mut self,
        event: PointerEvent,
        widget: &MiniMapWidget,
        minimap: &MiniMapProjector,
    ) -> Option<PointerAction> {
        match event {
            PointerEvent::Down { screen, button } => {
                if let Some(local) = widget.to_local(screen) {
                    return minimap.screen_to_world(local).map(PointerAction::TravelTo);
                }
                match button {
                    PointerButton::Right => {
                        self.drag_from = Some(screen);
                        Some(PointerAction::BeginDrag)
                    }
                    PointerButton::Left => Some(PointerAction::Select(screen)),
                    PointerButton::Middle => None,
                }
            }
            PointerEvent::Dragged { screen } => {
                let from = self.drag_from.replace(screen)?;
                Some(PointerAction::Pan(screen - from))
            }
            PointerEvent::Up { button } => {
                if button == PointerButton::Right && self.drag_from.take().is_some() {
                    Some(PointerAction::EndDrag)
                } else {
                    None
                }
            }
            PointerEvent::Scrolled { amount } => Some(PointerAction::Zoom(amount)),
        }
    }
}

/// Snapshot of a unit for the external info panel.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInfo {
    pub name: String,
    pub kind: UnitKind,
    pub position: Vec2,
    pub moves_left: u32,
}

impl From<&Unit> for UnitInfo {
    fn from(unit: &Unit) -> Self {
        Self {
            name: unit.kind().display_name().to_string(),
            kind: unit.kind(),
            position: unit.position(),
            moves_left: unit.moves_left(),
        }
    }
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct SelectionChanged {
    pub unit: Option<UnitId>,
    pub info: Option<UnitInfo>,
}

/// Action-menu commands.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum UnitCommand {
    FoundSettlement { unit: UnitId, name: String },
    Explore { unit: UnitId },
    Wait { unit: UnitId },
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct SettlementFounded {
    pub settlement: SettlementId,
    pub name: String,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndTurnRequested;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvanced {
    pub turn: u64,
}

#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TogglePause;

/// The host window changed size; carries the new viewport in pixels.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ViewportResized {
    pub width: f32,
    pub height: f32,
}

impl ViewportResized {
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}
