use bevy::math::{Rect, Vec2};
use bevy::prelude::Resource;

use crate::config::CameraConfig;

/// Orthographic camera for the main view.
///
/// `position` is the world-space focal point at the centre of the viewport.
/// The visible footprint is `viewport * zoom`, so zooming in means a smaller
/// zoom factor.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraController {
    position: Vec2,
    zoom: f32,
    viewport: Vec2,
    world_size: Vec2,
    min_zoom: f32,
    max_zoom: f32,
    zoom_step: f32,
}

impl CameraController {
    /// Starts centred on the world at zoom 1 (clamped into the zoom bounds).
    pub fn new(world_size: Vec2, viewport: Vec2, config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: world_size * 0.5,
            zoom: 1.0_f32.clamp(config.min_zoom, config.max_zoom),
            viewport,
            world_size,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_step: config.zoom_step,
        };
        camera.clamp_to_world();
        camera
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn zoom_factor(&self) -> f32 {
        self.zoom
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Half of the visible world footprint on each axis.
    pub fn half_extent(&self) -> Vec2 {
        self.viewport * self.zoom * 0.5
    }

    /// World rectangle currently on screen.
    pub fn visible_bounds(&self) -> Rect {
        Rect::from_center_half_size(self.position, self.half_extent())
    }

    /// Drag in screen pixels. Screen y grows downward, world y upward, and
    /// dragging moves the world under the pointer, hence the sign flips.
    pub fn pan(&mut self, delta_screen: Vec2) {
        self.position += Vec2::new(-delta_screen.x, delta_screen.y) * self.zoom;
        self.clamp_to_world();
    }

    /// Scroll units; positive zooms out.
    pub fn zoom(&mut self, delta_scroll: f32) {
        self.zoom = (self.zoom + delta_scroll * self.zoom_step).clamp(self.min_zoom, self.max_zoom);
        self.clamp_to_world();
        tracing::trace!(target: "despot::camera", zoom = self.zoom, "camera.zoomed");
    }

    pub fn follow(&mut self, target: Vec2) {
        self.position = target;
        self.clamp_to_world();
    }

    /// Keeps the visible footprint inside `[0, world]` on both axes; an axis
    /// the footprint cannot fit on is pinned to the world centre.
    pub fn clamp_to_world(&mut self) {
        let half = self.half_extent();
        self.position = Vec2::new(
            clamp_axis(self.position.x, half.x, self.world_size.x),
            clamp_axis(self.position.y, half.y, self.world_size.y),
        );
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.clamp_to_world();
    }

    pub fn set_world_size(&mut self, world_size: Vec2) {
        self.world_size = world_size;
        self.clamp_to_world();
    }

    /// Unprojects a screen position (top-left origin, y down) into world space.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let from_center = Vec2::new(
            screen.x - self.viewport.x * 0.5,
            self.viewport.y * 0.5 - screen.y,
        );
        self.position + from_center * self.zoom
    }
}

fn clamp_axis(position: f32, half: f32, world: f32) -> f32 {
    if half * 2.0 >= world {
        world * 0.5
    } else {
        position.clamp(half, world - half)
    }
}
