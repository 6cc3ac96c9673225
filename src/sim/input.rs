//! Pointer interactions: cell toggling, edge picking and polygon dragging
//!
//! The host serializes these calls with the simulation step; none of them
//! run concurrently with a tick.

use glam::Vec2;

use super::grid::HexGrid;
use super::hex::pixel_to_hex;
use super::history::{ChangeHistory, TranslatePolygon};
use super::polygon::{Polygon, PolygonId};
use super::state::Scene;

/// Toggle the cell under a pixel. Returns the new activation state, or `None`
/// when the pixel falls outside the grid.
pub fn click_cell(grid: &mut HexGrid, p: Vec2) -> Option<bool> {
    let coord = pixel_to_hex(p, grid.hex_radius());
    let active = grid.toggle(coord);
    log::debug!("Click at ({:.1}, {:.1}) -> cell {:?}: {:?}", p.x, p.y, coord, active);
    active
}

/// Polygon edge nearest to a pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePick {
    pub polygon: PolygonId,
    /// Position of the polygon in the scene list
    pub index: usize,
    pub edge: usize,
    pub distance: f32,
}

/// Nearest polygon edge within `max_distance` of `point`
pub fn pick_edge(polygons: &[Polygon], point: Vec2, max_distance: f32) -> Option<EdgePick> {
    polygons
        .iter()
        .enumerate()
        .filter_map(|(index, polygon)| {
            polygon.nearest_edge(point).map(|(edge, distance)| EdgePick {
                polygon: polygon.id,
                index,
                edge,
                distance,
            })
        })
        .filter(|pick| pick.distance <= max_distance)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveDrag {
    id: PolygonId,
    start_offset: Vec2,
    /// Pointer position minus polygon offset at grab time
    grab: Vec2,
}

/// Drags one polygon at a time, carrying the ball along with it.
///
/// While a drag is active the ball sits at the polygon's centroid with zero
/// velocity. Releasing restores the default velocity and records the move.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn dragged(&self) -> Option<PolygonId> {
        self.active.map(|d| d.id)
    }

    /// Grab the topmost draggable polygon under `point`
    pub fn begin(&mut self, scene: &mut Scene, point: Vec2) -> Option<PolygonId> {
        let polygon = scene
            .polygons
            .iter()
            .rev()
            .find(|p| p.draggable && p.contains_point(point))?;

        let drag = ActiveDrag {
            id: polygon.id,
            start_offset: polygon.offset,
            grab: point - polygon.offset,
        };
        let centroid = polygon.centroid();

        scene.ball.vel = Vec2::ZERO;
        scene.ball.pos = centroid;
        self.active = Some(drag);
        log::debug!("Drag start on polygon {}", drag.id);
        Some(drag.id)
    }

    /// Move the grabbed polygon so the grab point follows the pointer
    pub fn drag_to(&mut self, scene: &mut Scene, point: Vec2) {
        let Some(drag) = self.active else {
            return;
        };
        let Some(polygon) = scene.polygon_mut(drag.id) else {
            // Removed mid-drag (e.g. by an undo)
            self.active = None;
            return;
        };
        polygon.offset = point - drag.grab;
        let centroid = polygon.centroid();
        scene.ball.pos = centroid;
    }

    /// Release the polygon. A move that changed the offset is recorded in
    /// `history`; returns whether one was recorded.
    pub fn end(
        &mut self,
        scene: &mut Scene,
        history: &mut ChangeHistory,
        default_velocity: Vec2,
    ) -> bool {
        let Some(drag) = self.active.take() else {
            return false;
        };
        scene.ball.vel = default_velocity;

        let Some(to) = scene.polygon(drag.id).map(|p| p.offset) else {
            return false;
        };
        if to == drag.start_offset {
            return false;
        }
        log::debug!(
            "Drag end on polygon {}: ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            drag.id,
            drag.start_offset.x,
            drag.start_offset.y,
            to.x,
            to.y
        );
        history.add_change(
            Box::new(TranslatePolygon::new(drag.id, drag.start_offset, to)),
            scene,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hex::{Axial, center};
    use crate::sim::state::Ball;
    use crate::sim::style::StyleRegistry;

    fn two_hexagons() -> Scene {
        let mut scene = Scene::new(Ball::new(Vec2::new(500.0, 500.0), Vec2::ONE, 8.0));
        let a = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(a, Vec2::ZERO, 40.0, 0.0));
        let b = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(b, Vec2::new(20.0, 0.0), 40.0, 0.0));
        scene
    }

    #[test]
    fn test_click_cell_toggles() {
        let mut grid = HexGrid::new(3, 3, 40.0, StyleRegistry::new());
        let p = center(Axial::new(1, -1), 40.0) + Vec2::new(3.0, -2.0);

        assert_eq!(click_cell(&mut grid, p), Some(true));
        assert!(grid.get_cell(Axial::new(1, -1)).is_some_and(|c| c.active));
        assert_eq!(click_cell(&mut grid, p), Some(false));
        assert_eq!(click_cell(&mut grid, Vec2::new(5000.0, 0.0)), None);
    }

    #[test]
    fn test_pick_edge() {
        let mut scene = Scene::new(Ball::default());
        let id = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(id, Vec2::ZERO, 40.0, 0.0));

        // Just above the flat top edge (edge 1)
        let pick = pick_edge(&scene.polygons, Vec2::new(0.0, 37.0), 5.0).unwrap();
        assert_eq!(pick.polygon, id);
        assert_eq!(pick.index, 0);
        assert_eq!(pick.edge, 1);
        assert!(pick.distance < 5.0);

        assert!(pick_edge(&scene.polygons, Vec2::ZERO, 5.0).is_none());
        assert!(pick_edge(&[], Vec2::ZERO, 100.0).is_none());
    }

    #[test]
    fn test_drag_picks_topmost_and_homes_ball() {
        let mut scene = two_hexagons();
        let mut drag = DragController::new();

        // Both hexagons contain (10, 0); the later one is on top
        let id = drag.begin(&mut scene, Vec2::new(10.0, 0.0)).unwrap();
        assert_eq!(id, scene.polygons[1].id);
        assert_eq!(scene.ball.vel, Vec2::ZERO);
        assert!((scene.ball.pos - scene.polygons[1].centroid()).length() < 1e-4);

        drag.drag_to(&mut scene, Vec2::new(40.0, 30.0));
        assert_eq!(scene.polygons[1].offset, Vec2::new(30.0, 30.0));
        assert!((scene.ball.pos - Vec2::new(50.0, 30.0)).length() < 1e-3);
    }

    #[test]
    fn test_drag_end_records_undoable_move() {
        let mut scene = two_hexagons();
        let mut history = ChangeHistory::new();
        let mut drag = DragController::new();

        drag.begin(&mut scene, Vec2::new(-30.0, 0.0)).unwrap();
        assert_eq!(drag.dragged(), Some(scene.polygons[0].id));
        drag.drag_to(&mut scene, Vec2::new(-30.0, 50.0));
        assert!(drag.end(&mut scene, &mut history, Vec2::new(1.0, 1.0)));

        assert!(!drag.is_dragging());
        assert_eq!(scene.ball.vel, Vec2::new(1.0, 1.0));
        assert_eq!(scene.polygons[0].offset, Vec2::new(0.0, 50.0));

        history.undo(&mut scene);
        assert_eq!(scene.polygons[0].offset, Vec2::ZERO);
        history.redo(&mut scene);
        assert_eq!(scene.polygons[0].offset, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_drag_ignores_non_draggable_and_empty_space() {
        let mut scene = two_hexagons();
        scene.polygons[1].draggable = false;
        let mut drag = DragController::new();

        assert_eq!(drag.begin(&mut scene, Vec2::new(10.0, 0.0)), Some(scene.polygons[0].id));
        let mut history = ChangeHistory::new();
        // No movement: nothing recorded
        assert!(!drag.end(&mut scene, &mut history, Vec2::ONE));
        assert!(history.is_empty());

        assert_eq!(drag.begin(&mut scene, Vec2::new(300.0, 300.0)), None);
        assert!(!drag.is_dragging());
    }
}
