use bevy::math::{IVec2, Vec2};

use crate::{grid::GridGeometry, tilemap::TileMapSource};

/// Tile property consulted for passability.
pub const WALKABLE_PROPERTY: &str = "walkable";

/// Passability queries against the tile-map source.
///
/// A position is walkable only when at least one layer explicitly marks its
/// tile walkable and no layer vetoes it. Layers without a cell or without the
/// property are skipped; a tile outside any layer's bounds is never walkable.
#[derive(Clone, Copy)]
pub struct WalkabilityOracle<'a> {
    map: &'a dyn TileMapSource,
    grid: GridGeometry,
}

impl<'a> WalkabilityOracle<'a> {
    pub fn new(map: &'a dyn TileMapSource, grid: GridGeometry) -> Self {
        Self { map, grid }
    }

    pub fn is_walkable(&self, world: Vec2) -> bool {
        self.is_tile_walkable(self.grid.world_to_tile(world))
    }

    pub fn is_tile_walkable(&self, tile: IVec2) -> bool {
        let mut affirmed = false;

        for layer in 0..self.map.layer_count() {
            let size = self.map.layer_size(layer).as_ivec2();
            if tile.x < 0 || tile.y < 0 || tile.x >= size.x || tile.y >= size.y {
                return false;
            }

            let Some(value) = self
                .map
                .cell_property(layer, tile.as_uvec2(), WALKABLE_PROPERTY)
            else {
                continue;
            };

            if !value.as_flag() {
                tracing::trace!(
                    target: "despot::movement",
                    tile_x = tile.x,
                    tile_y = tile.y,
                    layer,
                    "walkability.vetoed"
                );
                return false;
            }
            affirmed = true;
        }

        affirmed
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::UVec2;
    use proptest::prelude::*;

    use super::*;
    use crate::tilemap::{TileLayer, TileMap};

    fn two_layer_map() -> TileMap {
        // Tile 1 walkable, tile 2 explicitly blocked, tile 3 decorative only.
        TileMap::new()
            .define_tile(1, [("walkable", true)])
            .define_tile(2, [("walkable", "false")])
            .define_tile(3, [("decor", "tree")])
            .push_layer(
                TileLayer::filled("ground", 6, 6, Some(1))
                    .with(0, 0, None)
                    .with(5, 5, Some(3)),
            )
            .push_layer(
                TileLayer::filled("overlay", 6, 6, None)
                    .with(2, 2, Some(2))
                    .with(3, 3, Some(1))
                    .with(5, 5, Some(3)),
            )
    }

    #[test]
    fn walkable_when_affirmed_and_not_vetoed() {
        let map = two_layer_map();
        let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
        assert!(oracle.is_walkable(Vec2::new(32.0, 32.0)));
        assert!(oracle.is_walkable(Vec2::new(3.0 * 32.0 + 5.0, 3.0 * 32.0 + 31.0)));
    }

    #[test]
    fn veto_on_any_layer_blocks() {
        let map = two_layer_map();
        let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
        assert!(!oracle.is_tile_walkable(IVec2::new(2, 2)));
    }

    #[test]
    fn missing_data_blocks() {
        let map = two_layer_map();
        let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
        // No cell on either layer.
        assert!(!oracle.is_tile_walkable(IVec2::new(0, 0)));
        // Cells present but neither carries the property.
        assert!(!oracle.is_tile_walkable(IVec2::new(5, 5)));
    }

    #[test]
    fn out_of_bounds_fails_closed() {
        let map = two_layer_map();
        let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
        assert!(!oracle.is_walkable(Vec2::new(-1.0, 10.0)));
        assert!(!oracle.is_tile_walkable(IVec2::new(6, 0)));
        assert!(!oracle.is_tile_walkable(IVec2::new(0, 6)));
    }

    #[test]
    fn smaller_upper_layer_bounds_the_map() {
        let map = TileMap::new()
            .define_tile(1, [("walkable", true)])
            .push_layer(TileLayer::filled("ground", 8, 8, Some(1)))
            .push_layer(TileLayer::filled("roof", 4, 4, None));
        let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
        assert!(oracle.is_tile_walkable(IVec2::new(3, 3)));
        assert!(!oracle.is_tile_walkable(IVec2::new(4, 4)));
    }

    #[test]
    fn map_without_layers_is_never_walkable() {
        let map = TileMap::new();
        let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
        assert!(!oracle.is_tile_walkable(IVec2::ZERO));
    }

    proptest! {
        #[test]
        fn prop_undecorated_tiles_block(x in 0u32..12, y in 0u32..12) {
            let map = TileMap::new()
                .define_tile(1, [("walkable", true)])
                .push_layer(TileLayer::filled("ground", 12, 12, None))
                .push_layer(TileLayer::filled("decor", 12, 12, None));
            let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
            prop_assert!(!oracle.is_tile_walkable(UVec2::new(x, y).as_ivec2()));
        }

        #[test]
        fn prop_affirmed_everywhere_is_walkable(
            x in 0.0f32..(12.0 * 32.0),
            y in 0.0f32..(12.0 * 32.0),
        ) {
            let map = TileMap::new()
                .define_tile(1, [("walkable", "True")])
                .push_layer(TileLayer::filled("ground", 12, 12, Some(1)))
                .push_layer(TileLayer::filled("detail", 12, 12, Some(1)));
            let oracle = WalkabilityOracle::new(&map, GridGeometry::new(32));
            prop_assert!(oracle.is_walkable(Vec2::new(x, y)));
        }
    }
}
