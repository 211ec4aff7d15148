//! Units, settlements and the registry that owns them.

use std::collections::BTreeMap;
use std::fmt;

use bevy::math::{IVec2, Vec2};
use bitflags::bitflags;
use thiserror::Error;

use crate::grid::GridGeometry;

/// Stable handle for a registered unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Stable handle for a founded settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettlementId(pub u32);

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "settlement#{}", self.0)
    }
}

bitflags! {
    /// What a unit kind is allowed to do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const FOUND_SETTLEMENT = 1 << 0;
    }
}

/// Closed set of unit kinds. Every kind can move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Settler,
    /// Basic combat unit.
    Warrior,
}

impl UnitKind {
    pub const ALL: [UnitKind; 2] = [UnitKind::Settler, UnitKind::Warrior];

    /// Resolves a kind key such as `"settler"` (case-insensitive).
    pub fn parse(key: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| RegistryError::UnknownEntityKind(key.to_string()))
    }

    pub fn key(self) -> &'static str {
        match self {
            UnitKind::Settler => "settler",
            UnitKind::Warrior => "warrior",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UnitKind::Settler => "Settler",
            UnitKind::Warrior => "Warrior",
        }
    }

    pub fn max_moves(self) -> u32 {
        match self {
            UnitKind::Settler | UnitKind::Warrior => 3,
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            UnitKind::Settler => Capabilities::FOUND_SETTLEMENT,
            UnitKind::Warrior => Capabilities::empty(),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Direction a unit faces; picks the directional sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit step in tile space (y grows upward).
    pub fn offset(self) -> IVec2 {
        match self {
            Facing::Up => IVec2::new(0, 1),
            Facing::Down => IVec2::new(0, -1),
            Facing::Left => IVec2::new(-1, 0),
            Facing::Right => IVec2::new(1, 0),
        }
    }

    pub fn sprite_suffix(self) -> &'static str {
        match self {
            Facing::Up => "back",
            Facing::Down => "front",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: UnitId,
    kind: UnitKind,
    position: Vec2,
    facing: Facing,
    selected: bool,
    moves_left: u32,
}

impl Unit {
    fn new(id: UnitId, kind: UnitKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            facing: Facing::default(),
            selected: false,
            moves_left: kind.max_moves(),
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Grid-aligned world position of the unit's lower-left corner.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn tile(&self, grid: &GridGeometry) -> IVec2 {
        grid.world_to_tile(self.position)
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn max_moves(&self) -> u32 {
        self.kind.max_moves()
    }

    pub fn can_found(&self) -> bool {
        self.kind
            .capabilities()
            .contains(Capabilities::FOUND_SETTLEMENT)
    }

    pub fn restore_moves(&mut self) {
        self.moves_left = self.kind.max_moves();
    }

    /// Moves to an already validated, grid-aligned position and spends one move.
    pub(crate) fn step_to(&mut self, position: Vec2, facing: Facing) {
        self.position = position;
        self.facing = facing;
        self.moves_left = self.moves_left.saturating_sub(1);
    }

    /// Asset key of the directional sprite matching the current facing.
    pub fn sprite_key(&self) -> String {
        let kind = self.kind.key();
        format!(
            "characters/{kind}/{kind}_standing_{}",
            self.facing.sprite_suffix()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    id: SettlementId,
    name: String,
    position: Vec2,
}

impl Settlement {
    pub fn id(&self) -> SettlementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub const SPRITE_KEY: &'static str = "buildings/city";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown entity kind {0:?}")]
    UnknownEntityKind(String),
    #[error("{unit} ({kind}) cannot found a settlement")]
    InvalidFounder { unit: UnitId, kind: UnitKind },
    #[error("{0} is not registered")]
    UnknownUnit(UnitId),
    #[error("{0} is not registered")]
    UnknownSettlement(SettlementId),
}

/// Owns every live unit and settlement. Iteration order follows handle order.
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    units: BTreeMap<UnitId, Unit>,
    settlements: BTreeMap<SettlementId, Settlement>,
    next_unit: u32,
    next_settlement: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_unit(&mut self, kind: UnitKind, position: Vec2) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit = self.next_unit.wrapping_add(1);
        self.units.insert(id, Unit::new(id, kind, position));
        id
    }

    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    pub(crate) fn insert_settlement(&mut self, name: String, position: Vec2) -> SettlementId {
        let id = SettlementId(self.next_settlement);
        self.next_settlement = self.next_settlement.wrapping_add(1);
        self.settlements.insert(
            id,
            Settlement {
                id,
                name,
                position,
            },
        );
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn contains_unit(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(&id)
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    pub fn settlement_count(&self) -> usize {
        self.settlements.len()
    }

    /// First unit whose tile square contains the world point.
    pub fn unit_at(&self, world: Vec2, grid: &GridGeometry) -> Option<UnitId> {
        let tile = grid.world_to_tile(world);
        self.units
            .values()
            .find(|unit| unit.tile(grid) == tile)
            .map(Unit::id)
    }

    /// Clears the selection flag on every unit except `keep`.
    pub fn select_only(&mut self, keep: Option<UnitId>) {
        for unit in self.units.values_mut() {
            unit.selected = Some(unit.id) == keep;
        }
    }
}
