//! Overview map rendered into a square offscreen buffer.
//!
//! The mini view is a square world rectangle centred on the map whose side is
//! the map's longer extent, so the whole map fits the buffer with its aspect
//! preserved. Terrain, fog, the tracked-unit marker and click inversion all go
//! through that one projection.
//!
//! Buffer and widget-local coordinates have their origin at the bottom-left
//! corner with y growing upward, like world space.

use bevy::math::{IVec2, Rect, Vec2};
use bevy::prelude::Resource;

use crate::{
    config::MiniMapConfig,
    grid::GridGeometry,
    render::{DrawList, DrawQuad, Rgba, TextureKey},
    visibility::{FogPalette, VisibilityEngine},
};

/// One fully repainted minimap frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniMapBuffer {
    /// Side of the square buffer in pixels.
    pub size: u32,
    /// World rectangle the buffer shows.
    pub view: Rect,
    /// Commands in buffer-local pixels, except the terrain pass which takes
    /// `view`.
    pub commands: DrawList,
}

#[derive(Resource, Debug, Clone)]
pub struct MiniMapProjector {
    buffer_size: u32,
    display_size: Vec2,
    world_size: Vec2,
    grid: GridGeometry,
    marker_scale: f32,
    palette: FogPalette,
}

impl MiniMapProjector {
    pub fn new(
        world_size: Vec2,
        grid: GridGeometry,
        config: &MiniMapConfig,
        palette: FogPalette,
    ) -> Self {
        Self {
            buffer_size: config.buffer_size,
            display_size: config.display_size(),
            world_size,
            grid,
            marker_scale: config.marker_scale,
            palette,
        }
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    pub fn set_display_size(&mut self, size: Vec2) {
        self.display_size = size;
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn view(&self) -> Rect {
        let side = self.world_size.max_element();
        Rect::from_center_half_size(self.world_size * 0.5, Vec2::splat(side * 0.5))
    }

    /// Buffer pixels per world unit; zero for an empty map.
    fn scale(&self) -> f32 {
        let side = self.world_size.max_element();
        if side > 0.0 {
            self.buffer_size as f32 / side
        } else {
            0.0
        }
    }

    pub fn world_to_buffer(&self, world: Vec2) -> Vec2 {
        (world - self.view().min) * self.scale()
    }

    /// Position inside the displayed widget for a world point.
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        self.world_to_buffer(world) / self.buffer_size as f32 * self.display_size
    }

    /// World extent covered by one buffer pixel.
    pub fn pixel_world_size(&self) -> f32 {
        self.world_size.max_element() / self.buffer_size as f32
    }

    /// Inverts a widget-local position. Positions outside the widget miss;
    /// positions in the letterbox margin of a non-square map are clamped onto
    /// the nearest map edge.
    pub fn screen_to_world(&self, local: Vec2) -> Option<Vec2> {
        let display = self.display_size;
        if display.x <= 0.0 || display.y <= 0.0 {
            return None;
        }
        if local.x < 0.0 || local.y < 0.0 || local.x > display.x || local.y > display.y {
            tracing::trace!(
                target: "despot::minimap",
                x = local.x,
                y = local.y,
                "minimap.click_missed"
            );
            return None;
        }
        let view = self.view();
        let world = view.min + local / display * view.size();
        Some(world.clamp(Vec2::ZERO, self.world_size))
    }

    /// Repaints the whole buffer: terrain, one fog quad per tile using the
    /// minimap palette, then the marker over `tracked`.
    pub fn render(&self, visibility: &VisibilityEngine, tracked: Option<IVec2>) -> MiniMapBuffer {
        let dims = visibility.explored().dimensions();
        let view = self.view();
        let tile = Vec2::splat(self.grid.tile_size() * self.scale());

        let mut commands = DrawList::with_capacity(2 + dims.x as usize * dims.y as usize);
        commands.push_tile_map(view);

        for (cell, band) in visibility.fog_field(tracked) {
            let origin = self.world_to_buffer(self.grid.tile_origin(cell.as_ivec2()));
            commands.push_quad(DrawQuad::new(
                TextureKey::FogPixel,
                origin,
                tile,
                Rgba::black(self.palette.alpha(band)),
            ));
        }

        if let Some(tile_coord) = tracked {
            let center = self.world_to_buffer(self.grid.tile_center(tile_coord));
            let marker = tile * self.marker_scale;
            commands.push_quad(DrawQuad::new(
                TextureKey::MarkerPixel,
                center - marker * 0.5,
                marker,
                Rgba::MARKER_RED,
            ));
        }

        tracing::trace!(
            target: "despot::minimap",
            commands = commands.len(),
            tracked = tracked.is_some(),
            "minimap.rendered"
        );

        MiniMapBuffer {
            size: self.buffer_size,
            view,
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::UVec2;
    use proptest::prelude::*;

    use super::*;
    use crate::render::DrawCommand;

    fn projector(tiles: UVec2) -> MiniMapProjector {
        let grid = GridGeometry::new(32);
        MiniMapProjector::new(
            grid.world_extent(tiles),
            grid,
            &MiniMapConfig::default(),
            FogPalette::MINIMAP,
        )
    }

    #[test]
    fn square_map_fills_buffer() {
        let mini = projector(UVec2::new(20, 20));
        assert_eq!(mini.view(), Rect::new(0.0, 0.0, 640.0, 640.0));
        assert_eq!(mini.world_to_buffer(Vec2::new(640.0, 320.0)), Vec2::new(256.0, 128.0));
        assert_eq!(
            mini.screen_to_world(Vec2::new(128.0, 64.0)),
            Some(Vec2::new(320.0, 160.0))
        );
    }

    #[test]
    fn wide_map_is_letterboxed() {
        let mini = projector(UVec2::new(40, 20));
        let view = mini.view();
        assert_eq!(view.min, Vec2::new(0.0, -320.0));
        assert_eq!(view.max, Vec2::new(1280.0, 960.0));

        assert_eq!(
            mini.screen_to_world(Vec2::new(128.0, 128.0)),
            Some(Vec2::new(640.0, 320.0))
        );
        // Bottom margin clamps onto the map edge.
        assert_eq!(
            mini.screen_to_world(Vec2::new(128.0, 10.0)),
            Some(Vec2::new(640.0, 0.0))
        );
    }

    #[test]
    fn clicks_outside_widget_miss() {
        let mini = projector(UVec2::new(20, 20));
        assert_eq!(mini.screen_to_world(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(mini.screen_to_world(Vec2::new(10.0, 256.5)), None);
        assert!(mini.screen_to_world(Vec2::new(256.0, 256.0)).is_some());
    }

    #[test]
    fn display_size_rescales_clicks() {
        let mut mini = projector(UVec2::new(20, 20));
        mini.set_display_size(Vec2::new(128.0, 128.0));
        assert_eq!(
            mini.screen_to_world(Vec2::new(64.0, 64.0)),
            Some(Vec2::new(320.0, 320.0))
        );
        assert_eq!(mini.screen_to_world(Vec2::new(200.0, 64.0)), None);
    }

    #[test]
    fn render_draws_terrain_fog_and_marker() {
        let mini = projector(UVec2::new(20, 20));
        let mut visibility = VisibilityEngine::new(UVec2::new(20, 20), 5);
        let tracked = IVec2::new(10, 10);
        visibility.update_exploration(tracked);

        let buffer = mini.render(&visibility, Some(tracked));
        assert_eq!(buffer.size, 256);
        assert_eq!(buffer.commands.len(), 1 + 400 + 1);
        assert_eq!(
            buffer.commands.commands()[0],
            DrawCommand::TileMap { view: buffer.view }
        );

        let quads: Vec<_> = buffer.commands.quads().collect();
        // Tile (10, 15) sits on the vision boundary.
        let edge = quads[15 * 20 + 10];
        assert_eq!(edge.rect.min, Vec2::new(128.0, 192.0));
        assert!((edge.tint.a - 0.2).abs() < 1e-6);
        assert_eq!(quads[0].tint.a, 0.95);

        let marker = quads.last().expect("marker quad");
        assert_eq!(marker.texture, TextureKey::MarkerPixel);
        assert_eq!(marker.tint, Rgba::MARKER_RED);
        let side = 12.8 * 1.5;
        assert!((marker.rect.width() - side).abs() < 1e-4);
        assert!((marker.rect.center() - Vec2::new(134.4, 134.4)).length() < 1e-4);
    }

    #[test]
    fn render_without_tracked_unit_has_no_marker() {
        let mini = projector(UVec2::new(4, 4));
        let visibility = VisibilityEngine::new(UVec2::new(4, 4), 5);
        let buffer = mini.render(&visibility, None);
        assert_eq!(buffer.commands.len(), 1 + 16);
        assert!(buffer
            .commands
            .quads()
            .all(|quad| quad.texture == TextureKey::FogPixel));
    }

    proptest! {
        #[test]
        fn prop_click_round_trips(
            width in 1u32..60,
            height in 1u32..60,
            fx in 0.0f32..=1.0,
            fy in 0.0f32..=1.0,
        ) {
            let mini = projector(UVec2::new(width, height));
            let world = mini.world_size() * Vec2::new(fx, fy);
            let local = mini.world_to_local(world);
            let back = mini.screen_to_world(local);
            prop_assert!(back.is_some());
            let back = back.unwrap_or_default();
            prop_assert!((back - world).abs().max_element() <= mini.pixel_world_size());
        }
    }
}
