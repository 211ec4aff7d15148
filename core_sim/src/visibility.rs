//! Fog of War.
//!
//! The player's knowledge of the map is an explored grid that only ever
//! grows. Each frame, every tile is classified into one of three bands
//! relative to the tracked unit:
//! - Unseen: never explored
//! - Remembered: explored, currently outside the vision radius
//! - Visible: explored and within the vision radius
//!
//! The main view and the minimap both draw from [`VisibilityEngine::classify`]
//! and differ only in the [`FogPalette`] they apply.

use bevy::math::{IVec2, UVec2};
use bevy::prelude::Resource;

/// Persistent per-tile exploration memory, row-major with row = tile y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploredGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl ExploredGrid {
    /// Create a grid with every tile unexplored.
    pub fn new(dimensions: UVec2) -> Self {
        Self {
            width: dimensions.x,
            height: dimensions.y,
            cells: vec![false; dimensions.x as usize * dimensions.y as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    #[inline]
    fn index(&self, tile: IVec2) -> Option<usize> {
        let (x, y) = (u32::try_from(tile.x).ok()?, u32::try_from(tile.y).ok()?);
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn contains(&self, tile: IVec2) -> bool {
        self.index(tile).is_some()
    }

    /// Out-of-grid tiles read as unexplored.
    pub fn is_explored(&self, tile: IVec2) -> bool {
        self.index(tile)
            .and_then(|idx| self.cells.get(idx).copied())
            .unwrap_or(false)
    }

    /// Marks a tile explored. Returns true if it was not explored before.
    /// There is deliberately no way to unmark.
    pub fn mark(&mut self, tile: IVec2) -> bool {
        match self.index(tile) {
            Some(idx) => !std::mem::replace(&mut self.cells[idx], true),
            None => false,
        }
    }

    pub fn explored_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    pub fn tile_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over all tiles with their coordinates.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (UVec2, bool)> + '_ {
        self.cells.iter().enumerate().map(move |(idx, explored)| {
            let x = (idx as u32) % self.width;
            let y = (idx as u32) / self.width;
            (UVec2::new(x, y), *explored)
        })
    }
}

/// Visibility band for a single tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FogBand {
    Unseen,
    Remembered,
    /// `intensity` is distance / radius, 0 at the viewer and 1 at the edge.
    Visible { intensity: f32 },
}

impl FogBand {
    pub fn is_explored(self) -> bool {
        !matches!(self, FogBand::Unseen)
    }
}

/// Fog opacity per band for one presentation of the fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogPalette {
    pub unseen_alpha: f32,
    pub remembered_alpha: f32,
    pub visible_max_alpha: f32,
}

impl FogPalette {
    pub const MAIN_VIEW: FogPalette = FogPalette {
        unseen_alpha: 0.95,
        remembered_alpha: 0.55,
        visible_max_alpha: 0.4,
    };

    /// The minimap keeps visible tiles lighter than the main view does.
    pub const MINIMAP: FogPalette = FogPalette {
        unseen_alpha: 0.95,
        remembered_alpha: 0.55,
        visible_max_alpha: 0.2,
    };

    /// Copy of this palette with any present fields replaced.
    pub fn with_overrides(
        self,
        unseen_alpha: Option<f32>,
        remembered_alpha: Option<f32>,
        visible_max_alpha: Option<f32>,
    ) -> FogPalette {
        FogPalette {
            unseen_alpha: unseen_alpha.unwrap_or(self.unseen_alpha),
            remembered_alpha: remembered_alpha.unwrap_or(self.remembered_alpha),
            visible_max_alpha: visible_max_alpha.unwrap_or(self.visible_max_alpha),
        }
    }

    pub fn alpha(&self, band: FogBand) -> f32 {
        match band {
            FogBand::Unseen => self.unseen_alpha,
            FogBand::Remembered => self.remembered_alpha,
            FogBand::Visible { intensity } => intensity * self.visible_max_alpha,
        }
    }
}

/// Owns the explored grid and the vision radius.
#[derive(Resource, Debug, Clone)]
pub struct VisibilityEngine {
    explored: ExploredGrid,
    radius: u32,
}

impl VisibilityEngine {
    pub fn new(dimensions: UVec2, radius: u32) -> Self {
        Self {
            explored: ExploredGrid::new(dimensions),
            radius,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn explored(&self) -> &ExploredGrid {
        &self.explored
    }

    /// Inclusive circular test on squared distance.
    #[inline]
    pub fn in_vision(&self, tile: IVec2, center: IVec2) -> bool {
        let dx = i64::from(tile.x) - i64::from(center.x);
        let dy = i64::from(tile.y) - i64::from(center.y);
        let radius = i64::from(self.radius);
        dx * dx + dy * dy <= radius * radius
    }

    /// Marks every in-grid tile within the radius of `center` explored and
    /// returns how many were newly revealed. Redundant calls are harmless.
    pub fn update_exploration(&mut self, center: IVec2) -> usize {
        let r = self.radius as i32;
        let mut revealed = 0;
        for y in (center.y - r)..=(center.y + r) {
            for x in (center.x - r)..=(center.x + r) {
                let tile = IVec2::new(x, y);
                if self.in_vision(tile, center) && self.explored.mark(tile) {
                    revealed += 1;
                }
            }
        }

        if revealed > 0 {
            tracing::debug!(
                target: "despot::visibility",
                center_x = center.x,
                center_y = center.y,
                radius = self.radius,
                revealed,
                explored = self.explored.explored_count(),
                "visibility.exploration_updated"
            );
        }
        revealed
    }

    pub fn classify(&self, tile: IVec2, center: IVec2) -> FogBand {
        if !self.explored.is_explored(tile) {
            return FogBand::Unseen;
        }
        if !self.in_vision(tile, center) {
            return FogBand::Remembered;
        }
        let distance = (tile - center).as_vec2().length();
        FogBand::Visible {
            intensity: if self.radius == 0 {
                0.0
            } else {
                distance / self.radius as f32
            },
        }
    }

    /// Classification with an optional viewer; without one nothing is
    /// currently observed.
    pub fn band_at(&self, tile: IVec2, viewer: Option<IVec2>) -> FogBand {
        match viewer {
            Some(center) => self.classify(tile, center),
            None if self.explored.is_explored(tile) => FogBand::Remembered,
            None => FogBand::Unseen,
        }
    }

    /// Full-grid classification, recomputed on every call.
    pub fn fog_field(&self, viewer: Option<IVec2>) -> impl Iterator<Item = (UVec2, FogBand)> + '_ {
        self.explored
            .iter_tiles()
            .map(move |(tile, _)| (tile, self.band_at(tile.as_ivec2(), viewer)))
    }

    /// Counts tiles per band as (unseen, remembered, visible).
    pub fn count_by_band(&self, viewer: Option<IVec2>) -> (usize, usize, usize) {
        let mut unseen = 0;
        let mut remembered = 0;
        let mut visible = 0;
        for (_, band) in self.fog_field(viewer) {
            match band {
                FogBand::Unseen => unseen += 1,
                FogBand::Remembered => remembered += 1,
                FogBand::Visible { .. } => visible += 1,
            }
        }
        (unseen, remembered, visible)
    }
}
