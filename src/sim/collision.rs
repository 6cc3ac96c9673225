//! Collision detection and response against straight boundary edges
//!
//! The ball tests its next position against each candidate edge in order;
//! the first edge within one radius wins, the velocity is reflected about that
//! edge's normal and the ball is separated from it. At most one collision is
//! resolved per step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hex::Axial;
use super::polygon::PolygonId;
use super::state::Ball;
use crate::config::Separation;
use crate::perp;

/// Identifies which piece of geometry an edge belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeTag {
    /// Edge `edge` (0..5) of a hex cell
    Cell { coord: Axial, edge: usize },
    /// Edge `edge` of the polygon at `index` in the scene list
    Polygon {
        id: PolygonId,
        index: usize,
        edge: usize,
    },
    /// One of the four viewport walls
    Wall(WallSide),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// A candidate boundary segment in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: Vec2,
    pub b: Vec2,
    pub tag: EdgeTag,
}

/// Result of testing one circle against one segment
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the segment
    pub point: Vec2,
    /// Unit edge normal, oriented toward the circle center
    pub normal: Vec2,
    /// Distance from the circle center to `point`
    pub distance: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            distance: f32::INFINITY,
        }
    }
}

/// One resolved collision, handed to the host's sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    /// Velocity after reflection
    pub velocity: Vec2,
    /// Unit normal of the touched edge, pointing toward the ball
    pub normal: Vec2,
    /// Closest point on the touched edge
    pub point: Vec2,
    /// Owner and index of the touched edge
    pub tag: EdgeTag,
}

impl CollisionRecord {
    /// Speed after the bounce (reflection preserves it)
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Closest point to `p` on segment `ab`.
/// Degenerate segments collapse to `a`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Unit perpendicular of `b - a`, i.e. `(-dy, dx)` normalized.
/// Zero for a degenerate edge.
#[inline]
pub fn edge_normal(a: Vec2, b: Vec2) -> Vec2 {
    perp(b - a).normalize_or_zero()
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check a circle at `pos` against segment `ab`
pub fn ball_edge_collision(pos: Vec2, radius: f32, a: Vec2, b: Vec2) -> CollisionResult {
    let mut normal = edge_normal(a, b);
    if normal == Vec2::ZERO {
        return CollisionResult::miss(); // Degenerate segment
    }

    let closest = closest_point_on_segment(pos, a, b);
    let dist_sq = pos.distance_squared(closest);
    if dist_sq > radius * radius {
        return CollisionResult::miss();
    }

    // Winding decides which side (-dy, dx) faces; flip it to face the ball
    if (pos - closest).dot(normal) < 0.0 {
        normal = -normal;
    }

    CollisionResult {
        hit: true,
        point: closest,
        normal,
        distance: dist_sq.sqrt(),
    }
}

/// Test `ball.pos + ball.vel * dt` against `edges` in order and resolve the
/// first hit.
///
/// On a hit the velocity is reflected, the ball is separated from the edge and
/// a record is returned. Otherwise the ball moves to that position.
pub fn resolve_collision<I>(
    ball: &mut Ball,
    edges: I,
    dt: f32,
    separation: Separation,
) -> Option<CollisionRecord>
where
    I: IntoIterator<Item = Edge>,
{
    let future = ball.pos + ball.vel * dt;

    for edge in edges {
        let result = ball_edge_collision(future, ball.radius, edge.a, edge.b);
        if !result.hit {
            continue;
        }

        ball.vel = reflect_velocity(ball.vel, result.normal);
        ball.pos = match separation {
            Separation::Penetration => {
                // Move along the contact direction so the closest point stays `point`
                let away = if result.distance > 1e-6 {
                    (future - result.point) / result.distance
                } else {
                    result.normal
                };
                result.point + away * ball.radius
            }
            Separation::Nudge(epsilon) => future + result.normal * epsilon,
        };

        return Some(CollisionRecord {
            velocity: ball.vel,
            normal: result.normal,
            point: result.point,
            tag: edge.tag,
        });
    }

    ball.pos = future;
    None
}

/// Keep the ball inside an axis-aligned viewport centered on the origin.
///
/// Clamps position and negates the velocity component on every wall touched;
/// the first wall touched (left, right, top, bottom) is reported.
pub fn bounce_off_walls(ball: &mut Ball, half_extents: Vec2) -> Option<CollisionRecord> {
    let mut first: Option<(WallSide, Vec2, Vec2)> = None;
    let r = ball.radius;

    let walls = [
        (WallSide::Left, Vec2::X),
        (WallSide::Right, Vec2::NEG_X),
        (WallSide::Top, Vec2::Y),
        (WallSide::Bottom, Vec2::NEG_Y),
    ];

    for (side, normal) in walls {
        let touched = match side {
            WallSide::Left => ball.pos.x - r < -half_extents.x,
            WallSide::Right => ball.pos.x + r > half_extents.x,
            WallSide::Top => ball.pos.y - r < -half_extents.y,
            WallSide::Bottom => ball.pos.y + r > half_extents.y,
        };
        if !touched {
            continue;
        }

        match side {
            WallSide::Left => ball.pos.x = -half_extents.x + r,
            WallSide::Right => ball.pos.x = half_extents.x - r,
            WallSide::Top => ball.pos.y = -half_extents.y + r,
            WallSide::Bottom => ball.pos.y = half_extents.y - r,
        }
        if normal.x != 0.0 {
            ball.vel.x = -ball.vel.x;
        } else {
            ball.vel.y = -ball.vel.y;
        }

        if first.is_none() {
            let contact = ball.pos - normal * r;
            first = Some((side, normal, contact));
        }
    }

    first.map(|(side, normal, point)| CollisionRecord {
        velocity: ball.vel,
        normal,
        point,
        tag: EdgeTag::Wall(side),
    })
}
