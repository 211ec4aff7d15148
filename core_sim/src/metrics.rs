use bevy::prelude::*;

use crate::{turn::TurnManager, visibility::VisibilityEngine};

#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct SessionMetrics {
    pub frames: u64,
    pub turn: u64,
    pub explored_tiles: usize,
    pub total_tiles: usize,
    pub units: usize,
    pub settlements: usize,
}

impl SessionMetrics {
    /// Share of the map explored so far, in `[0, 1]`.
    pub fn explored_ratio(&self) -> f32 {
        if self.total_tiles == 0 {
            0.0
        } else {
            self.explored_tiles as f32 / self.total_tiles as f32
        }
    }
}

pub fn collect_metrics(
    turns: Res<TurnManager>,
    visibility: Res<VisibilityEngine>,
    mut metrics: ResMut<SessionMetrics>,
) {
    metrics.frames += 1;
    metrics.turn = turns.current_turn();
    metrics.explored_tiles = visibility.explored().explored_count();
    metrics.total_tiles = visibility.explored().tile_count();
    metrics.units = turns.registry().unit_count();
    metrics.settlements = turns.registry().settlement_count();
}
