//! Axis-aligned rectangles and circles
//!
//! Obstacles and corridor walls are rectangles. The player is a circle (or,
//! for the simpler square player, a rectangle).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box, immutable once built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl Rectangle {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Square of side `size` anchored at its top-left corner
    pub fn square(top_left: Vec2, size: f32) -> Self {
        Self::new(top_left.x, top_left.y, size, size)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.left
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.top
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    /// Same rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(
            self.left + offset.x,
            self.top + offset.y,
            self.width,
            self.height,
        )
    }

    /// Separating-axis overlap test; touching edges do not count
    pub fn intersects(&self, other: &Rectangle) -> bool {
        // One is above or below the other
        if self.top >= other.bottom() || self.bottom() <= other.top {
            return false;
        }
        // One is left or right of the other
        if self.left >= other.right() || self.right() <= other.left {
            return false;
        }
        true
    }

    /// Point of this rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left, self.right()),
            p.y.clamp(self.top, self.bottom()),
        )
    }
}

/// A circle, used as the player's collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Inclusive containment: a point on the rim is inside
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Clamp the center into the rectangle and compare squared distances
    pub fn intersects_rect(&self, rect: &Rectangle) -> bool {
        self.contains(rect.closest_point(self.center))
    }
}

/// Whatever shape the player currently collides as
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerShape {
    Circle(Circle),
    Rect(Rectangle),
}

impl PlayerShape {
    pub fn intersects(&self, rect: &Rectangle) -> bool {
        match self {
            PlayerShape::Circle(circle) => circle.intersects_rect(rect),
            PlayerShape::Rect(own) => own.intersects(rect),
        }
    }
}
