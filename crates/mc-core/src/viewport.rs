//! Screen ↔ world transform of the canvas viewport.
//!
//! `screen = world * zoom + (x, y)`. Pan/zoom mechanics live in the host;
//! the engine only needs the current transform to place cards created from
//! pointer coordinates.

use crate::model::Position;
use serde::{Deserialize, Serialize};

/// Canvas viewport: pan offset, zoom, and the visible area in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            width,
            height,
        }
    }

    /// Zoom with a floor so a degenerate transform never divides by zero.
    fn scale(&self) -> f32 {
        if self.zoom > f32::EPSILON { self.zoom } else { 1.0 }
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Position {
        let k = self.scale();
        Position::new((sx - self.x) / k, (sy - self.y) / k)
    }

    pub fn world_to_screen(&self, p: Position) -> (f32, f32) {
        let k = self.scale();
        (p.x * k + self.x, p.y * k + self.y)
    }

    /// World point under the center of the visible area.
    pub fn center_world(&self) -> Position {
        self.screen_to_world(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
