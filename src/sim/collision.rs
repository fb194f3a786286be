//! Collision detection against the active chunk
//!
//! The detector holds a flat list of world-space rectangles: one square per
//! obstacle of the active chunk followed by the two corridor walls. The list
//! is rebuilt wholesale whenever the active chunk changes and is only ever
//! read in between, so a rebuild can be done on a worker thread and swapped
//! in afterwards.
//!
//! Response is binary: the first rectangle the player touches ends the run.

use std::sync::Arc;

use glam::Vec2;

use super::chunk::{ChunkLayout, ObstaclePointSet};
use super::shape::{PlayerShape, Rectangle};

/// Everything needed to turn an obstacle point set into rectangles
///
/// Cheap to clone and `Send`, so a rebuild can be shipped to a worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleBuilder {
    square_size: f32,
    /// Chunk-local corridor walls
    walls: [Rectangle; 2],
}

impl RectangleBuilder {
    pub fn new(square_size: f32, walls: [Rectangle; 2]) -> Self {
        Self { square_size, walls }
    }

    /// World-space rectangles for a point set, obstacles first then walls
    pub fn build(&self, points: &ObstaclePointSet) -> Arc<[Rectangle]> {
        let offset = points.offset;
        points
            .points
            .iter()
            .map(|&p| Rectangle::square(p + offset, self.square_size))
            .chain(self.walls.iter().map(|wall| wall.translated(offset)))
            .collect()
    }
}

/// Player-versus-obstacle collision
#[derive(Debug)]
pub struct CollisionDetector {
    builder: RectangleBuilder,
    rects: Arc<[Rectangle]>,
    epoch: u64,
}

impl CollisionDetector {
    pub fn new(layout: &ChunkLayout) -> Self {
        Self {
            builder: RectangleBuilder::new(layout.square_size(), layout.walls()),
            rects: Arc::from(Vec::new()),
            epoch: 0,
        }
    }

    #[inline]
    pub fn builder(&self) -> RectangleBuilder {
        self.builder
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current rectangle list
    pub fn rectangles(&self) -> Arc<[Rectangle]> {
        Arc::clone(&self.rects)
    }

    /// Replace the rectangle list from a point set, in place
    pub fn rebuild(&mut self, points: &ObstaclePointSet) {
        let rects = self.builder.build(points);
        self.install(self.epoch, rects);
    }

    /// Swap in a rectangle list built elsewhere
    ///
    /// Returns false, leaving the current list alone, if `epoch` predates the
    /// last restart.
    pub fn install(&mut self, epoch: u64, rects: Arc<[Rectangle]>) -> bool {
        if epoch != self.epoch {
            log::warn!(
                "Discarding collision rebuild from epoch {} (now {})",
                epoch,
                self.epoch
            );
            return false;
        }
        log::debug!("Collision rectangles rebuilt: {}", rects.len());
        self.rects = rects;
        true
    }

    /// Top-left corner of the first rectangle the player overlaps
    pub fn test(&self, shape: &PlayerShape) -> Option<Vec2> {
        self.rects
            .iter()
            .find(|rect| shape.intersects(rect))
            .map(Rectangle::top_left)
    }

    /// Forget every rectangle and invalidate in-flight rebuilds
    pub fn restart(&mut self) {
        self.rects = Arc::from(Vec::new());
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::shape::Circle;

    fn detector() -> CollisionDetector {
        CollisionDetector::new(&ChunkLayout::new(&GameConfig::default(), 1000.0))
    }

    fn point_set(points: Vec<Vec2>, offset: Vec2) -> ObstaclePointSet {
        ObstaclePointSet {
            points: points.into(),
            offset,
        }
    }

    fn circle(x: f32, y: f32) -> PlayerShape {
        PlayerShape::Circle(Circle::new(Vec2::new(x, y), 16.0))
    }

    #[test]
    fn test_empty_detector_reports_nothing() {
        let detector = detector();
        assert!(detector.rectangles().is_empty());
        assert_eq!(detector.test(&circle(0.0, 0.0)), None);
    }

    #[test]
    fn test_obstacle_scenario() {
        let mut detector = detector();
        detector.rebuild(&point_set(vec![Vec2::new(90.0, 90.0)], Vec2::ZERO));

        // Obstacle plus both walls
        assert_eq!(detector.rectangles().len(), 3);
        assert_eq!(detector.test(&circle(100.0, 100.0)), Some(Vec2::new(90.0, 90.0)));
        assert_eq!(detector.test(&circle(1000.0, 1000.0)), None);
    }

    #[test]
    fn test_rectangles_translated_by_offset() {
        let mut detector = detector();
        let offset = Vec2::new(-1710.0, -2000.0);
        detector.rebuild(&point_set(vec![Vec2::new(200.0, 300.0)], offset));

        let rects = detector.rectangles();
        assert_eq!(rects[0], Rectangle::new(-1510.0, -1700.0, 64.0, 64.0));
        // Walls come last
        assert_eq!(rects[1], Rectangle::new(-1710.0, -2000.0, 128.0, 2000.0));
        assert_eq!(rects[2], Rectangle::new(2918.0, -2000.0, 128.0, 2000.0));
    }

    #[test]
    fn test_walls_hit_without_obstacles() {
        let mut detector = detector();
        detector.rebuild(&ObstaclePointSet {
            points: Arc::from(Vec::new()),
            offset: Vec2::new(-1710.0, 0.0),
        });

        assert_eq!(detector.test(&circle(-1590.0, 500.0)), Some(Vec2::new(-1710.0, 0.0)));
        assert_eq!(detector.test(&circle(2905.0, 500.0)), Some(Vec2::new(2918.0, 0.0)));
        assert_eq!(detector.test(&circle(540.0, 500.0)), None);
    }

    #[test]
    fn test_first_match_is_obstacle_before_wall() {
        let mut detector = detector();
        // Square tucked against the left wall
        detector.rebuild(&point_set(vec![Vec2::new(128.0, 100.0)], Vec2::ZERO));
        assert_eq!(detector.test(&circle(128.0, 110.0)), Some(Vec2::new(128.0, 100.0)));
    }

    #[test]
    fn test_rect_player_shape() {
        let mut detector = detector();
        detector.rebuild(&point_set(vec![Vec2::new(500.0, 500.0)], Vec2::ZERO));
        let inside = PlayerShape::Rect(Rectangle::new(550.0, 550.0, 32.0, 32.0));
        let touching = PlayerShape::Rect(Rectangle::new(564.0, 500.0, 32.0, 32.0));
        assert_eq!(detector.test(&inside), Some(Vec2::new(500.0, 500.0)));
        assert_eq!(detector.test(&touching), None);
    }

    #[test]
    fn test_restart_clears_and_rejects_stale_install() {
        let mut detector = detector();
        let points = point_set(vec![Vec2::new(90.0, 90.0)], Vec2::ZERO);
        detector.rebuild(&points);

        let stale_epoch = detector.epoch();
        let stale = detector.builder().build(&points);
        detector.restart();

        assert!(detector.rectangles().is_empty());
        assert!(!detector.install(stale_epoch, stale));
        assert_eq!(detector.test(&circle(100.0, 100.0)), None);

        let fresh = detector.builder().build(&points);
        assert!(detector.install(detector.epoch(), fresh));
        assert!(detector.test(&circle(100.0, 100.0)).is_some());
    }
}
