//! Draw-command boundary to the external render backend.
//!
//! The core never talks to a GPU. It composes [`DrawList`]s of textured
//! rectangles that a backend replays: the main view in world coordinates,
//! the minimap in buffer-local pixels.

use bevy::math::{IVec2, Rect, Vec2};

use crate::{
    camera::CameraController,
    entities::{EntityRegistry, Settlement, UnitId},
    grid::GridGeometry,
    visibility::{FogPalette, VisibilityEngine},
};

/// Offset of the selection highlight relative to the unit sprite.
const SELECTION_OFFSET: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const MARKER_RED: Rgba = Rgba::new(1.0, 0.2, 0.2, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black(alpha: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, alpha)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// 1x1 white texel tinted per quad.
    FogPixel,
    MarkerPixel,
    Selection,
    Sprite(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawQuad {
    pub texture: TextureKey,
    pub rect: Rect,
    pub tint: Rgba,
}

impl DrawQuad {
    pub fn new(texture: TextureKey, origin: Vec2, size: Vec2, tint: Rgba) -> Self {
        Self {
            texture,
            rect: Rect::from_corners(origin, origin + size),
            tint,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Draw the tile map as seen through an orthographic view of `view`.
    TileMap { view: Rect },
    Quad(DrawQuad),
}

/// Consumer of composed frames.
pub trait RenderBackend {
    fn draw_tile_map(&mut self, view: Rect);
    fn draw_quad(&mut self, quad: &DrawQuad);
}

/// Ordered draw commands for one frame; later commands draw on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn push_tile_map(&mut self, view: Rect) {
        self.commands.push(DrawCommand::TileMap { view });
    }

    pub fn push_quad(&mut self, quad: DrawQuad) {
        self.commands.push(DrawCommand::Quad(quad));
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn quads(&self) -> impl Iterator<Item = &DrawQuad> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Quad(quad) => Some(quad),
            DrawCommand::TileMap { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn submit(&self, backend: &mut dyn RenderBackend) {
        for command in &self.commands {
            match command {
                DrawCommand::TileMap { view } => backend.draw_tile_map(*view),
                DrawCommand::Quad(quad) => backend.draw_quad(quad),
            }
        }
    }
}

/// Backend that records what it was asked to draw.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    pub recorded: Vec<DrawCommand>,
}

impl RenderBackend for CommandRecorder {
    fn draw_tile_map(&mut self, view: Rect) {
        self.recorded.push(DrawCommand::TileMap { view });
    }

    fn draw_quad(&mut self, quad: &DrawQuad) {
        self.recorded.push(DrawCommand::Quad(quad.clone()));
    }
}

/// Everything the main view needs for one frame.
pub struct MainViewScene<'a> {
    pub camera: &'a CameraController,
    pub visibility: &'a VisibilityEngine,
    pub registry: &'a EntityRegistry,
    pub grid: GridGeometry,
    pub palette: FogPalette,
    pub viewer: Option<UnitId>,
}

impl MainViewScene<'_> {
    /// Terrain, then one fog quad per tile, then settlements, then units.
    pub fn compose(&self) -> DrawList {
        let dims = self.visibility.explored().dimensions();
        let tile = Vec2::splat(self.grid.tile_size());
        let viewer_tile: Option<IVec2> = self
            .viewer
            .and_then(|id| self.registry.unit(id))
            .map(|unit| unit.tile(&self.grid));

        let mut list = DrawList::with_capacity(
            1 + dims.x as usize * dims.y as usize
                + self.registry.settlement_count()
                + 2 * self.registry.unit_count(),
        );
        list.push_tile_map(self.camera.visible_bounds());

        for (cell, band) in self.visibility.fog_field(viewer_tile) {
            let origin = self.grid.tile_origin(cell.as_ivec2());
            list.push_quad(DrawQuad::new(
                TextureKey::FogPixel,
                origin,
                tile,
                Rgba::black(self.palette.alpha(band)),
            ));
        }

        for settlement in self.registry.settlements() {
            list.push_quad(DrawQuad::new(
                TextureKey::Sprite(Settlement::SPRITE_KEY.to_string()),
                settlement.position(),
                tile,
                Rgba::WHITE,
            ));
        }

        for unit in self.registry.units() {
            if unit.is_selected() {
                list.push_quad(DrawQuad::new(
                    TextureKey::Selection,
                    unit.position() - Vec2::splat(SELECTION_OFFSET),
                    tile,
                    Rgba::WHITE,
                ));
            }
            list.push_quad(DrawQuad::new(
                TextureKey::Sprite(unit.sprite_key()),
                unit.position(),
                tile,
                Rgba::WHITE,
            ));
        }

        list
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::UVec2;

    use super::*;
    use crate::config::CameraConfig;
    use crate::entities::UnitKind;

    #[test]
    fn main_view_layers_in_order() {
        let grid = GridGeometry::new(32);
        let mut registry = EntityRegistry::new();
        let unit = registry.insert_unit(UnitKind::Settler, Vec2::new(64.0, 64.0));
        registry.select_only(Some(unit));

        let mut visibility = VisibilityEngine::new(UVec2::new(4, 4), 1);
        visibility.update_exploration(IVec2::new(2, 2));
        let camera = CameraController::new(
            Vec2::new(128.0, 128.0),
            Vec2::new(800.0, 600.0),
            &CameraConfig::default(),
        );

        let scene = MainViewScene {
            camera: &camera,
            visibility: &visibility,
            registry: &registry,
            grid,
            palette: FogPalette::MAIN_VIEW,
            viewer: Some(unit),
        };
        let list = scene.compose();

        assert_eq!(list.len(), 1 + 16 + 2);
        assert!(matches!(list.commands()[0], DrawCommand::TileMap { .. }));

        let quads: Vec<_> = list.quads().collect();
        // Viewer tile is fully clear, far corner is unseen.
        let center = quads
            .iter()
            .find(|quad| {
                quad.rect.min == Vec2::new(64.0, 64.0) && quad.texture == TextureKey::FogPixel
            })
            .expect("fog quad over the viewer");
        assert_eq!(center.tint.a, 0.0);
        let corner = quads
            .iter()
            .find(|quad| quad.rect.min == Vec2::ZERO)
            .expect("fog quad at origin");
        assert_eq!(corner.tint.a, 0.95);

        assert_eq!(quads[16].texture, TextureKey::Selection);
        assert_eq!(quads[16].rect.min, Vec2::new(56.0, 56.0));
        assert_eq!(
            quads[17].texture,
            TextureKey::Sprite("characters/settler/settler_standing_front".into())
        );
    }

    #[test]
    fn submit_replays_in_order() {
        let mut list = DrawList::new();
        list.push_tile_map(Rect::new(0.0, 0.0, 10.0, 10.0));
        list.push_quad(DrawQuad::new(
            TextureKey::MarkerPixel,
            Vec2::ZERO,
            Vec2::ONE,
            Rgba::MARKER_RED,
        ));

        let mut recorder = CommandRecorder::default();
        list.submit(&mut recorder);
        assert_eq!(recorder.recorded, list.commands());
    }
}
