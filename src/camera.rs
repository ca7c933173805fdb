use macroquad::prelude::*;

/// Viewport that follows a target: the offset is recomputed from scratch
/// every frame (no easing) and clamped so the view never leaves the map.
pub struct Camera {
    viewport: Vec2,
    map_size: Vec2,
    offset: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2, map_size: Vec2) -> Self {
        Self {
            viewport,
            map_size,
            offset: Vec2::ZERO,
        }
    }

    pub fn update(&mut self, target_center: Vec2) {
        let max = (self.map_size - self.viewport).max(Vec2::ZERO);
        self.offset = (target_center - self.viewport * 0.5).clamp(Vec2::ZERO, max);
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn view_rect(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.viewport.x, self.viewport.y)
    }

    /// World position to screen position under the current offset.
    pub fn apply(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }
}
