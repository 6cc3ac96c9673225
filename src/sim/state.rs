//! Scene state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Edge;
use super::polygon::{Glow, Polygon, PolygonId};
use crate::consts::BALL_RADIUS;

/// The moving circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Displacement per frame
    pub vel: Vec2,
    pub radius: f32,
    #[serde(skip)]
    pub glow: Glow,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO, BALL_RADIUS)
    }
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            glow: Glow::default(),
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Polygon scene: the ball plus an ordered list of polygons
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub ball: Ball,
    pub polygons: Vec<Polygon>,
    /// Next polygon ID
    next_id: u32,
}

impl Scene {
    pub fn new(ball: Ball) -> Self {
        log::info!("New scene: ball at {:?}, radius {}", ball.pos, ball.radius);
        Self {
            ball,
            polygons: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new polygon ID
    pub fn next_polygon_id(&mut self) -> PolygonId {
        let id = PolygonId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Append a polygon outside of any edit history (scene setup)
    pub fn push_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.id == id)
    }

    pub fn polygon_mut(&mut self, id: PolygonId) -> Option<&mut Polygon> {
        self.polygons.iter_mut().find(|p| p.id == id)
    }

    pub fn polygon_index(&self, id: PolygonId) -> Option<usize> {
        self.polygons.iter().position(|p| p.id == id)
    }

    /// Remove a polygon, returning it with its former list index
    pub fn remove_polygon(&mut self, id: PolygonId) -> Option<(usize, Polygon)> {
        let index = self.polygon_index(id)?;
        Some((index, self.polygons.remove(index)))
    }

    /// Every polygon edge, polygons in list order
    pub fn boundary_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        polygon_edges(&self.polygons)
    }
}

/// Every edge of `polygons`, in list order
pub fn polygon_edges(polygons: &[Polygon]) -> impl Iterator<Item = Edge> + '_ {
    polygons
        .iter()
        .enumerate()
        .flat_map(|(index, polygon)| polygon.edges(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut scene = Scene::new(Ball::default());
        let a = scene.next_polygon_id();
        let b = scene.next_polygon_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_polygon_reports_index() {
        let mut scene = Scene::new(Ball::default());
        for i in 0..3 {
            let id = scene.next_polygon_id();
            scene.push_polygon(Polygon::regular_hexagon(id, Vec2::new(i as f32 * 100.0, 0.0), 40.0, 0.0));
        }
        let (index, removed) = scene.remove_polygon(PolygonId(2)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.id, PolygonId(2));
        assert_eq!(scene.polygons.len(), 2);
        assert!(scene.remove_polygon(PolygonId(2)).is_none());
    }

    #[test]
    fn test_boundary_edges_in_list_order() {
        let mut scene = Scene::new(Ball::default());
        let a = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(a, Vec2::ZERO, 40.0, 0.0));
        let b = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(b, Vec2::new(200.0, 0.0), 40.0, 0.0));

        let edges: Vec<Edge> = scene.boundary_edges().collect();
        assert_eq!(edges.len(), 12);
        assert!(matches!(
            edges[6].tag,
            super::super::collision::EdgeTag::Polygon { index: 1, edge: 0, .. }
        ));
    }
}
