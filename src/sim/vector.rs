//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam already provides add/sub/scale/dot/length. This module adds the few
//! operations the collision code needs with the exact semantics it relies on.

use glam::Vec2;

/// 2D cross product (z component of the 3D cross)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Unit vector in the direction of `v`, or zero when `v` has no length
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Rotate `v` counter-clockwise (in y-up terms) by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
///
/// `normal` must already be unit length; it is not renormalized here.
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
