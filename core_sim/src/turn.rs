use bevy::math::Vec2;
use bevy::prelude::Resource;

use crate::{
    entities::{
        EntityRegistry, Facing, RegistryError, SettlementId, Unit, UnitId, UnitKind,
    },
    grid::GridGeometry,
    walkability::WalkabilityOracle,
};

/// Result of asking a unit to step one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Moved { from: Vec2, to: Vec2 },
    Blocked,
    Exhausted,
}

/// What [`TurnManager::end_turn`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSummary {
    pub turn: u64,
    pub units_restored: usize,
}

/// Owns the entity registry and the turn counter.
#[derive(Resource, Debug, Clone)]
pub struct TurnManager {
    registry: EntityRegistry,
    grid: GridGeometry,
    turn: u64,
}

impl TurnManager {
    pub fn new(grid: GridGeometry) -> Self {
        Self {
            registry: EntityRegistry::new(),
            grid,
            turn: 1,
        }
    }

    pub fn current_turn(&self) -> u64 {
        self.turn
    }

    pub fn grid(&self) -> GridGeometry {
        self.grid
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.registry.unit(id)
    }

    /// Registers a unit of `kind` on the grid cell nearest to `world`.
    pub fn spawn(&mut self, kind: &str, world: Vec2) -> Result<UnitId, RegistryError> {
        let kind = UnitKind::parse(kind)?;
        let position = self.grid.snap(world);
        let id = self.registry.insert_unit(kind, position);
        tracing::info!(
            target: "despot::turn",
            unit = %id,
            kind = kind.key(),
            x = position.x,
            y = position.y,
            "unit.spawned"
        );
        Ok(id)
    }

    /// Registers a unit standing on the settlement's tile.
    pub fn produce_at(
        &mut self,
        kind: &str,
        settlement: SettlementId,
    ) -> Result<UnitId, RegistryError> {
        let kind = UnitKind::parse(kind)?;
        let position = self
            .registry
            .settlement(settlement)
            .map(|found| found.position())
            .ok_or(RegistryError::UnknownSettlement(settlement))?;
        let id = self.registry.insert_unit(kind, position);
        tracing::info!(
            target: "despot::turn",
            unit = %id,
            %settlement,
            kind = kind.key(),
            "unit.produced"
        );
        Ok(id)
    }

    /// Converts a founder into a settlement on its tile. The unit is
    /// deselected and removed; on error nothing changes.
    pub fn found_settlement(
        &mut self,
        name: impl Into<String>,
        unit: UnitId,
    ) -> Result<SettlementId, RegistryError> {
        let founder = self
            .registry
            .unit(unit)
            .ok_or(RegistryError::UnknownUnit(unit))?;
        if !founder.can_found() {
            return Err(RegistryError::InvalidFounder {
                unit,
                kind: founder.kind(),
            });
        }

        let position = founder.position();
        let name = name.into();
        if let Some(mut removed) = self.registry.remove_unit(unit) {
            removed.set_selected(false);
        }
        let settlement = self.registry.insert_settlement(name.clone(), position);

        tracing::info!(
            target: "despot::turn",
            %unit,
            %settlement,
            name = %name,
            x = position.x,
            y = position.y,
            "settlement.founded"
        );
        Ok(settlement)
    }

    /// Steps the unit one tile towards `facing` if the target is walkable and
    /// the unit has moves left. Facing only changes on a successful step.
    pub fn move_unit(
        &mut self,
        unit: UnitId,
        facing: Facing,
        oracle: &WalkabilityOracle<'_>,
    ) -> Result<MoveOutcome, RegistryError> {
        let grid = self.grid;
        let mover = self
            .registry
            .unit_mut(unit)
            .ok_or(RegistryError::UnknownUnit(unit))?;

        if mover.moves_left() == 0 {
            return Ok(MoveOutcome::Exhausted);
        }

        let from = mover.position();
        let to = from + facing.offset().as_vec2() * grid.tile_size();
        if !oracle.is_walkable(to) {
            return Ok(MoveOutcome::Blocked);
        }

        mover.step_to(to, facing);
        tracing::debug!(
            target: "despot::movement",
            %unit,
            from_x = from.x,
            from_y = from.y,
            to_x = to.x,
            to_y = to.y,
            moves_left = mover.moves_left(),
            "unit.moved"
        );
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Restores every unit's moves and advances the turn counter by one.
    pub fn end_turn(&mut self) -> TurnSummary {
        let mut units_restored = 0;
        for unit in self.registry.units_mut() {
            unit.restore_moves();
            units_restored += 1;
        }
        self.turn += 1;

        tracing::info!(
            target: "despot::turn",
            turn = self.turn,
            units_restored,
            "turn.advanced"
        );
        TurnSummary {
            turn: self.turn,
            units_restored,
        }
    }
}

impl Default for TurnManager {
    fn default() -> Self {
        Self::new(GridGeometry::default())
    }
}
