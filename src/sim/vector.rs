//! Pure 2D vector helpers
//!
//! Value-returning functions over `glam::Vec2`. Screen space is y-down, so a
//! positive angle turns clockwise on screen.

use glam::Vec2;

#[inline]
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

#[inline]
pub fn subtract(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

#[inline]
pub fn scale(v: Vec2, factor: f32) -> Vec2 {
    v * factor
}

/// Unit vector in the direction of `v` (zero for a zero-length input)
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Rotate `v` by `radians`
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Signed angle that rotates `from` onto `to`, in (-π, π]
///
/// Neither input needs to be unit length.
pub fn signed_angle_to(from: Vec2, to: Vec2) -> f32 {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.x * to.x + from.y * to.y;
    cross.atan2(dot)
}

/// Perpendicular pointing to the left of `v` when facing along it on screen
#[inline]
pub fn ccw_perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}
