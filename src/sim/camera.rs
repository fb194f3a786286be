//! Camera offset
//!
//! The player stays put on screen; the world is drawn shifted by the
//! opposite of everything the player has moved.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    offset: Vec2,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translation to apply to world-space drawing
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn follow(&mut self, movement: Vec2) {
        self.offset -= movement;
    }

    pub fn restart(&mut self) {
        self.offset = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_follows_opposite_of_movement() {
        let mut camera = Camera::new();
        camera.follow(Vec2::new(0.0, -5.0));
        camera.follow(Vec2::new(2.0, -5.0));
        assert_eq!(camera.offset(), Vec2::new(-2.0, 10.0));

        camera.restart();
        assert_eq!(camera.offset(), Vec2::ZERO);
    }
}
