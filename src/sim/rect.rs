//! Rotated rectangle geometry and circle overlap
//!
//! Obstacles are rectangles rotated about their center. Ball contact is
//! resolved with the Separating Axis Theorem: the rectangle's edge normals
//! plus one extra axis from the circle center to the nearest corner. Without
//! that extra axis SAT reports false hits when the ball sits diagonally off a
//! corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vector::{cross, normalize, rotate};
use crate::consts::AXIS_PARALLEL_TOLERANCE;

/// A rectangle rotated about its center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Vec2,
    /// Half width / half height before rotation
    pub half_extents: Vec2,
    /// Rotation in radians
    pub angle: f32,
}

/// Closed projection interval on an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Length of the shared part of two intervals (negative when disjoint)
    #[inline]
    pub fn overlap(&self, other: &Interval) -> f32 {
        self.max.min(other.max) - self.min.max(other.min)
    }
}

/// Minimum translation needed to separate a circle from a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Penetration depth along `normal`
    pub depth: f32,
    /// Unit axis pointing from the rectangle toward the circle
    pub normal: Vec2,
}

impl RotatedRect {
    pub fn new(center: Vec2, size: Vec2, angle: f32) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
            angle,
        }
    }

    /// Build from an unrotated top-left corner and size
    pub fn from_top_left(top_left: Vec2, size: Vec2, angle: f32) -> Self {
        Self::new(top_left + size * 0.5, size, angle)
    }

    /// World-space corners: top-left, top-right, bottom-right, bottom-left
    pub fn vertices(&self) -> [Vec2; 4] {
        let h = self.half_extents;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|offset| self.center + rotate(offset, self.angle))
    }

    /// Point-in-rectangle test done in the rectangle's local frame
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = rotate(point - self.center, -self.angle);
        local.x.abs() <= self.half_extents.x && local.y.abs() <= self.half_extents.y
    }
}

/// Outward edge normals of a convex polygon, parallel duplicates removed
pub fn separating_axes(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    let mut axes: Vec<Vec2> = Vec::with_capacity(n + 1);
    if n < 2 {
        return axes;
    }
    // Twice the signed area; its sign tells which side of each edge is out
    let winding: f32 = (0..n)
        .map(|i| cross(vertices[i], vertices[(i + 1) % n]))
        .sum();
    let flip = if winding < 0.0 { -1.0 } else { 1.0 };

    for i in 0..n {
        let edge = vertices[(i + 1) % n] - vertices[i];
        let normal = normalize(Vec2::new(edge.y, -edge.x)) * flip;
        if normal == Vec2::ZERO {
            continue; // Degenerate edge
        }
        push_unique_axis(&mut axes, normal);
    }
    axes
}

/// Add `axis` unless an existing axis is already parallel to it
fn push_unique_axis(axes: &mut Vec<Vec2>, axis: Vec2) -> bool {
    if axes
        .iter()
        .any(|a| a.dot(axis).abs() > AXIS_PARALLEL_TOLERANCE)
    {
        return false;
    }
    axes.push(axis);
    true
}

/// Project a point set onto an axis
pub fn project(points: &[Vec2], axis: Vec2) -> Interval {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for p in points {
        let d = p.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    Interval { min, max }
}

/// Project a circle onto an axis (axis must be unit length)
#[inline]
pub fn project_circle(center: Vec2, radius: f32, axis: Vec2) -> Interval {
    let c = center.dot(axis);
    Interval {
        min: c - radius,
        max: c + radius,
    }
}

/// Resolve circle-vs-rotated-rectangle overlap
///
/// Returns `None` when any axis separates the shapes, otherwise the axis of
/// smallest overlap, oriented to push the circle out of the rectangle.
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &RotatedRect) -> Option<Overlap> {
    let vertices = rect.vertices();
    let mut axes = separating_axes(&vertices);

    // Corner axis: catches the diagonal gap that edge normals miss
    let nearest = vertices
        .iter()
        .copied()
        .min_by(|a, b| {
            a.distance_squared(center)
                .partial_cmp(&b.distance_squared(center))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(rect.center);
    let corner_axis = normalize(nearest - center);
    if corner_axis != Vec2::ZERO {
        push_unique_axis(&mut axes, corner_axis);
    }

    let mut best: Option<Overlap> = None;
    for axis in axes {
        let overlap = project(&vertices, axis).overlap(&project_circle(center, radius, axis));
        if overlap <= 0.0 {
            return None;
        }
        if best.is_none_or(|b| overlap < b.depth) {
            best = Some(Overlap {
                depth: overlap,
                normal: axis,
            });
        }
    }

    best.map(|mut o| {
        if o.normal.dot(center - rect.center) < 0.0 {
            o.normal = -o.normal;
        }
        o
    })
}
