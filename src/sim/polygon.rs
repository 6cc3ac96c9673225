//! Closed polygons: hit testing, edges and shared-edge merging
//!
//! Base vertices are never moved by dragging; `offset` is applied whenever a
//! polygon is drawn, hit-tested or collided against.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::{Edge, EdgeTag};
use crate::approx_eq;

/// Stable identity of a polygon within a scene
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PolygonId(pub u32);

impl std::fmt::Display for PolygonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by polygon construction and merging
#[derive(Debug, Error, PartialEq)]
pub enum PolygonError {
    #[error("no polygon {0}")]
    UnknownPolygon(PolygonId),
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("edge {edge} out of range for polygon with {len} edges")]
    EdgeOutOfRange { edge: usize, len: usize },
    #[error("edge {this_edge} and edge {other_edge} do not share endpoints in reversed order")]
    EdgesDoNotCoincide { this_edge: usize, other_edge: usize },
}

/// Feedback intensity in [0, 1], reset to 1 on collision
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Glow {
    pub intensity: f32,
}

impl Glow {
    /// Fade linearly toward zero
    pub fn decay(&mut self, dt: f32, rate: f32) {
        if self.intensity > 0.0 {
            self.intensity = (self.intensity - dt * rate).max(0.0);
        }
    }

    pub fn trigger(&mut self) {
        self.intensity = 1.0;
    }

    pub fn is_glowing(&self) -> bool {
        self.intensity > 0.0
    }
}

/// An ordered vertex loop; vertex `i` connects to vertex `(i + 1) % n`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonRepr")]
pub struct Polygon {
    pub id: PolygonId,
    vertices: Vec<Vec2>,
    pub offset: Vec2,
    pub draggable: bool,
    #[serde(skip)]
    pub glow: Glow,
}

/// Serialized form; checked by [`Polygon::new`] on the way in
#[derive(Deserialize)]
struct PolygonRepr {
    id: PolygonId,
    vertices: Vec<Vec2>,
    #[serde(default)]
    offset: Vec2,
    #[serde(default = "draggable_default")]
    draggable: bool,
}

fn draggable_default() -> bool {
    true
}

impl TryFrom<PolygonRepr> for Polygon {
    type Error = PolygonError;

    fn try_from(repr: PolygonRepr) -> Result<Self, Self::Error> {
        let mut polygon = Polygon::new(repr.id, repr.vertices)?;
        polygon.offset = repr.offset;
        polygon.draggable = repr.draggable;
        Ok(polygon)
    }
}

impl Polygon {
    pub fn new(id: PolygonId, vertices: Vec<Vec2>) -> Result<Self, PolygonError> {
        if vertices.len() < 3 {
            return Err(PolygonError::TooFewVertices(vertices.len()));
        }
        Ok(Self {
            id,
            vertices,
            offset: Vec2::ZERO,
            draggable: true,
            glow: Glow::default(),
        })
    }

    /// Regular hexagon with corner 0 at angle `rotation`, corners in
    /// increasing angle order
    pub fn regular_hexagon(id: PolygonId, center: Vec2, radius: f32, rotation: f32) -> Self {
        let vertices = (0..6)
            .map(|k| {
                let angle = rotation + k as f32 * std::f32::consts::FRAC_PI_3;
                center + Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();
        Self {
            id,
            vertices,
            offset: Vec2::ZERO,
            draggable: true,
            glow: Glow::default(),
        }
    }

    /// Untranslated vertices
    pub fn base_vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex `i` with the offset applied
    #[inline]
    pub fn vertex(&self, i: usize) -> Vec2 {
        self.vertices[i % self.vertices.len()] + self.offset
    }

    pub fn world_vertices(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.vertices.iter().map(move |v| *v + self.offset)
    }

    /// World-space endpoints of edge `i`
    pub fn edge(&self, i: usize) -> Result<(Vec2, Vec2), PolygonError> {
        if i >= self.len() {
            return Err(PolygonError::EdgeOutOfRange {
                edge: i,
                len: self.len(),
            });
        }
        Ok((self.vertex(i), self.vertex(i + 1)))
    }

    /// All edges in world space, tagged with this polygon's list `index`
    pub fn edges(&self, index: usize) -> impl Iterator<Item = Edge> + '_ {
        (0..self.len()).map(move |i| Edge {
            a: self.vertex(i),
            b: self.vertex(i + 1),
            tag: EdgeTag::Polygon {
                id: self.id,
                index,
                edge: i,
            },
        })
    }

    /// Vertex average in world space
    pub fn centroid(&self) -> Vec2 {
        let sum: Vec2 = self.vertices.iter().copied().sum();
        sum / self.len() as f32 + self.offset
    }

    /// Shoelace area; positive for counter-clockwise loops (y up)
    pub fn signed_area(&self) -> f32 {
        let n = self.len();
        (0..n)
            .map(|i| self.vertices[i].perp_dot(self.vertices[(i + 1) % n]))
            .sum::<f32>()
            * 0.5
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Even-odd ray casting over the translated loop
    pub fn contains_point(&self, p: Vec2) -> bool {
        let n = self.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertex(i);
            let vj = self.vertex(j);
            if (vi.y > p.y) != (vj.y > p.y) {
                let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Edge closest to `p` and its distance
    pub fn nearest_edge(&self, p: Vec2) -> Option<(usize, f32)> {
        self.edges(0)
            .enumerate()
            .map(|(i, e)| {
                let c = super::collision::closest_point_on_segment(p, e.a, e.b);
                (i, p.distance(c))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Stitch `other` onto this polygon along a shared edge.
    ///
    /// Edge `edge_this` (A→B) must coincide with edge `edge_other` (P→Q) as
    /// A≈Q and B≈P. The result walks this loop up to A, then `other` from just
    /// past Q around to just before P, then the rest of this loop from B. The
    /// merged polygon has both offsets baked into its vertices.
    pub fn merge_with_polygon_on_shared_edge(
        &self,
        other: &Polygon,
        edge_this: usize,
        edge_other: usize,
        tolerance: f32,
        merged_id: PolygonId,
    ) -> Result<Polygon, PolygonError> {
        let (a, b) = self.edge(edge_this)?;
        let (p, q) = other.edge(edge_other)?;
        if !(approx_eq(a, q, tolerance) && approx_eq(b, p, tolerance)) {
            return Err(PolygonError::EdgesDoNotCoincide {
                this_edge: edge_this,
                other_edge: edge_other,
            });
        }

        let n = self.len();
        let m = other.len();
        let mut vertices = Vec::with_capacity(n + m - 2);
        vertices.extend((0..=edge_this).map(|i| self.vertex(i)));
        vertices.extend((2..m).map(|k| other.vertex(edge_other + k)));
        vertices.extend((edge_this + 1..n).map(|i| self.vertex(i)));

        Ok(Polygon {
            id: merged_id,
            vertices,
            offset: Vec2::ZERO,
            draggable: self.draggable,
            glow: Glow::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(id: u32, origin: Vec2, size: f32) -> Polygon {
        Polygon::new(
            PolygonId(id),
            vec![
                origin,
                origin + Vec2::new(size, 0.0),
                origin + Vec2::new(size, size),
                origin + Vec2::new(0.0, size),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_too_few_vertices() {
        let err = Polygon::new(PolygonId(1), vec![Vec2::ZERO, Vec2::X]).unwrap_err();
        assert_eq!(err, PolygonError::TooFewVertices(2));
    }

    #[test]
    fn test_deserialize_checks_vertex_count() {
        let json = r#"{ "id": 1, "vertices": [[0.0, 0.0], [1.0, 0.0]], "offset": [0.0, 0.0], "draggable": true }"#;
        let err = serde_json::from_str::<Polygon>(json).unwrap_err();
        assert!(err.to_string().contains("at least 3 vertices"), "{err}");
        assert!(serde_json::from_str::<Polygon>(r#"{ "id": 1, "vertices": [] }"#).is_err());
    }

    #[test]
    fn test_deserialize_keeps_offset_and_flags() {
        let mut square = square(4, Vec2::ZERO, 10.0);
        square.offset = Vec2::new(3.0, -2.0);
        square.draggable = false;
        let json = serde_json::to_string(&square).unwrap();
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square);

        let minimal: Polygon =
            serde_json::from_str(r#"{ "id": 2, "vertices": [[0, 0], [4, 0], [0, 4]] }"#).unwrap();
        assert_eq!(minimal.offset, Vec2::ZERO);
        assert!(minimal.draggable);
        assert!(minimal.contains_point(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_contains_point_respects_offset() {
        let mut sq = square(1, Vec2::ZERO, 10.0);
        assert!(sq.contains_point(Vec2::new(5.0, 5.0)));
        assert!(!sq.contains_point(Vec2::new(15.0, 5.0)));

        sq.translate(Vec2::new(10.0, 0.0));
        assert!(sq.contains_point(Vec2::new(15.0, 5.0)));
        assert!(!sq.contains_point(Vec2::new(5.0, 5.0)));
        // Base vertices untouched
        assert_eq!(sq.base_vertices()[0], Vec2::ZERO);
    }

    #[test]
    fn test_glow_decays_and_triggers() {
        let mut glow = Glow::default();
        assert!(!glow.is_glowing());
        glow.trigger();
        glow.decay(0.25, 1.0);
        assert!((glow.intensity - 0.75).abs() < 1e-6);
        glow.decay(5.0, 1.0);
        assert_eq!(glow.intensity, 0.0);
    }

    #[test]
    fn test_merge_two_squares() {
        // Both counter-clockwise; left's edge 1 (10,0)->(10,10) meets right's edge 3 (10,10)->(10,0)
        let left = square(1, Vec2::ZERO, 10.0);
        let right = square(2, Vec2::new(10.0, 0.0), 10.0);
        let merged = left
            .merge_with_polygon_on_shared_edge(&right, 1, 3, 0.01, PolygonId(3))
            .unwrap();

        assert_eq!(merged.len(), 6);
        let expected = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert_eq!(merged.base_vertices(), &expected);
        assert!(merged.contains_point(Vec2::new(15.0, 5.0)));
        assert!(merged.contains_point(Vec2::new(5.0, 5.0)));
        assert!((merged.signed_area() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_merge_rejects_non_adjacent_edges() {
        let left = square(1, Vec2::ZERO, 10.0);
        let far = square(2, Vec2::new(50.0, 0.0), 10.0);
        let err = left
            .merge_with_polygon_on_shared_edge(&far, 1, 3, 2.0, PolygonId(3))
            .unwrap_err();
        assert_eq!(
            err,
            PolygonError::EdgesDoNotCoincide {
                this_edge: 1,
                other_edge: 3
            }
        );
    }

    #[test]
    fn test_merge_rejects_same_order_edges() {
        // Same endpoints but same direction means the windings disagree
        let left = square(1, Vec2::ZERO, 10.0);
        let mirrored = Polygon::new(
            PolygonId(2),
            vec![
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(20.0, 10.0),
                Vec2::new(20.0, 0.0),
            ],
        )
        .unwrap();
        assert!(
            left.merge_with_polygon_on_shared_edge(&mirrored, 1, 0, 0.01, PolygonId(3))
                .is_err()
        );
    }

    #[test]
    fn test_merge_edge_out_of_range() {
        let left = square(1, Vec2::ZERO, 10.0);
        let right = square(2, Vec2::new(10.0, 0.0), 10.0);
        assert_eq!(
            left.merge_with_polygon_on_shared_edge(&right, 7, 3, 0.01, PolygonId(3)),
            Err(PolygonError::EdgeOutOfRange { edge: 7, len: 4 })
        );
    }

    #[test]
    fn test_nearest_edge() {
        let sq = square(1, Vec2::ZERO, 10.0);
        let (edge, dist) = sq.nearest_edge(Vec2::new(5.0, -2.0)).unwrap();
        assert_eq!(edge, 0);
        assert!((dist - 2.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_merge_hexagon_pair(edge in 0usize..6, rotation in 0.0f32..1.0) {
            // Neighboring regular hexagons share edge `edge` of the first
            let r = 40.0;
            let base = Polygon::regular_hexagon(PolygonId(1), Vec2::ZERO, r, rotation);
            let mid_angle = rotation + (edge as f32 + 0.5) * std::f32::consts::FRAC_PI_3;
            let apothem = r * 3.0_f32.sqrt() / 2.0;
            let center = Vec2::new(mid_angle.cos(), mid_angle.sin()) * 2.0 * apothem;
            let other = Polygon::regular_hexagon(PolygonId(2), center, r, rotation);
            let other_edge = (edge + 3) % 6;

            let merged = base
                .merge_with_polygon_on_shared_edge(&other, edge, other_edge, 0.01, PolygonId(3))
                .unwrap();
            prop_assert_eq!(merged.len(), 6 + 6 - 2);

            // Every vertex except the duplicated shared pair appears exactly once
            let originals: Vec<Vec2> = base.world_vertices().chain(other.world_vertices()).collect();
            for v in &originals {
                let count = merged.world_vertices().filter(|m| m.distance(*v) < 0.01).count();
                prop_assert_eq!(count, 1);
            }
        }
    }
}
