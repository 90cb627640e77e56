//! Stateless 2D collision tests.
//!
//! Primitives: circle, axis-aligned box (center + size) and capsule (a line
//! segment with thickness). All tests compare squared distances, so no
//! square roots are taken. A zero-length capsule degrades to a circle.

use bevy::math::Vec2;

/// Circle hurtbox / point hitbox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Axis-aligned box described by its center and full size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents()
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents()
    }

    /// Box grown by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            center: self.center,
            size: self.size + Vec2::splat(amount * 2.0),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

/// Line segment with thickness (weapon blades)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub start: Vec2,
    pub end: Vec2,
    pub thickness: f32,
}

impl Capsule {
    pub fn new(start: Vec2, end: Vec2, thickness: f32) -> Self {
        Self {
            start,
            end,
            thickness,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start.distance_squared(self.end) <= f32::EPSILON
    }
}

pub fn circle_circle(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) <= reach * reach
}

pub fn circle_box(circle: &Circle, aabb: &Aabb) -> bool {
    let closest = aabb.closest_point(circle.center);
    closest.distance_squared(circle.center) <= circle.radius * circle.radius
}

/// Closest point to `point` on segment `a..b` (t clamped to [0, 1])
pub fn closest_point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

pub fn capsule_circle(capsule: &Capsule, circle: &Circle) -> bool {
    if capsule.is_degenerate() {
        return circle_circle(&Circle::new(capsule.start, capsule.thickness), circle);
    }
    let closest = closest_point_on_segment(circle.center, capsule.start, capsule.end);
    let reach = capsule.thickness + circle.radius;
    closest.distance_squared(circle.center) <= reach * reach
}

pub fn capsule_box(capsule: &Capsule, aabb: &Aabb) -> bool {
    if capsule.is_degenerate() {
        return circle_box(&Circle::new(capsule.start, capsule.thickness), aabb);
    }

    let grown = aabb.expanded(capsule.thickness);
    if grown.contains(capsule.start) || grown.contains(capsule.end) {
        return true;
    }

    let (min, max) = (grown.min(), grown.max());
    let corners = [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, max.y),
    ];
    for i in 0..4 {
        let (c0, c1) = (corners[i], corners[(i + 1) % 4]);
        if segments_intersect(capsule.start, capsule.end, c0, c1) {
            return true;
        }
    }

    let closest = closest_point_on_segment(grown.center, capsule.start, capsule.end);
    grown.contains(closest)
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Proper or touching intersection of segments `p1..p2` and `q1..q2`
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(p1, q1, q2))
        || (d2 == 0.0 && on_segment(p2, q1, q2))
        || (d3 == 0.0 && on_segment(q1, p1, p2))
        || (d4 == 0.0 && on_segment(q2, p1, p2))
}
