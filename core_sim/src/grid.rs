//! Conversions between world space and the tile grid.
//!
//! World coordinates grow right (x) and up (y). A tile `(tx, ty)` covers the
//! half-open world square `[tx * size, (tx + 1) * size) x [ty * size, (ty + 1) * size)`.

use bevy::math::{IVec2, UVec2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    tile_size: f32,
}

impl GridGeometry {
    /// A zero size is bumped to one so the geometry never divides by zero;
    /// configuration validation rejects it before it gets here.
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1) as f32,
        }
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Floor-divides a world position into the tile containing it.
    #[inline]
    pub fn world_to_tile(&self, world: Vec2) -> IVec2 {
        (world / self.tile_size).floor().as_ivec2()
    }

    /// World position of the tile's lower-left corner.
    #[inline]
    pub fn tile_origin(&self, tile: IVec2) -> Vec2 {
        tile.as_vec2() * self.tile_size
    }

    #[inline]
    pub fn tile_center(&self, tile: IVec2) -> Vec2 {
        self.tile_origin(tile) + Vec2::splat(self.tile_size * 0.5)
    }

    /// Snaps to the nearest grid-aligned position.
    pub fn snap(&self, world: Vec2) -> Vec2 {
        (world / self.tile_size).round() * self.tile_size
    }

    pub fn is_aligned(&self, world: Vec2) -> bool {
        let rem = Vec2::new(
            world.x.rem_euclid(self.tile_size),
            world.y.rem_euclid(self.tile_size),
        );
        rem == Vec2::ZERO
    }

    /// Full world extent of a grid measuring `tiles` tiles.
    pub fn world_extent(&self, tiles: UVec2) -> Vec2 {
        tiles.as_vec2() * self.tile_size
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(32)
    }
}
