//! Growing polygons by attaching hexagons to their edges

use glam::Vec2;

use super::collision::edge_normal;
use super::history::{AddPolygon, ChangeHistory, MergePolygons};
use super::polygon::{Polygon, PolygonError, PolygonId};
use super::state::Scene;
use crate::{approx_eq, direction_or};

/// What happened to the hexagon placed by [`add_hexagon_at_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeExtension {
    /// The hexagon was stitched into the base polygon
    Merged {
        hexagon: PolygonId,
        merged: PolygonId,
    },
    /// No hexagon edge lined up with the clicked edge; the hexagon was added
    /// as a separate polygon
    Unmerged { hexagon: PolygonId },
}

/// Regular hexagon lying outside `edge` of `base`, with one of its edges on
/// top of the clicked edge. Its winding matches the base polygon's.
pub fn hexagon_outside_edge(
    base: &Polygon,
    edge: usize,
    hex_radius: f32,
    id: PolygonId,
) -> Result<Polygon, PolygonError> {
    let (a, b) = base.edge(edge)?;
    let mid = (a + b) / 2.0;

    // Outward: the edge normal on the far side from the centroid
    let away = direction_or(base.centroid(), mid, Vec2::X);
    let mut outward = edge_normal(a, b);
    if outward == Vec2::ZERO {
        outward = away;
    } else if outward.dot(away) < 0.0 {
        outward = -outward;
    }

    let apothem = hex_radius * 3.0_f32.sqrt() / 2.0;
    let center = mid + outward * apothem;

    // Put the midpoint of the hexagon's edge 0 on the clicked edge
    let facing = (-outward).to_angle();
    let rotation = facing - std::f32::consts::FRAC_PI_6;
    let hexagon = Polygon::regular_hexagon(id, center, hex_radius, rotation);

    if base.signed_area() < 0.0 {
        let reversed: Vec<Vec2> = hexagon.base_vertices().iter().rev().copied().collect();
        return Polygon::new(id, reversed);
    }
    Ok(hexagon)
}

/// Index of the edge of `other` running B→A when `a`→`b` is the reference edge
pub fn find_reversed_edge(other: &Polygon, a: Vec2, b: Vec2, tolerance: f32) -> Option<usize> {
    (0..other.len()).find(|&k| {
        approx_eq(other.vertex(k), b, tolerance) && approx_eq(other.vertex(k + 1), a, tolerance)
    })
}

/// Attach a new hexagon to edge `edge` of the polygon `base` and record it in
/// `history`.
///
/// When a hexagon edge coincides with the clicked edge (reversed, within
/// `tolerance`) the two polygons are merged into one. Otherwise the hexagon
/// is added on its own and a warning is logged.
pub fn add_hexagon_at_edge(
    scene: &mut Scene,
    history: &mut ChangeHistory,
    base: PolygonId,
    edge: usize,
    hex_radius: f32,
    tolerance: f32,
) -> Result<EdgeExtension, PolygonError> {
    let Some(base_polygon) = scene.polygon(base).cloned() else {
        return Err(PolygonError::UnknownPolygon(base));
    };

    let hex_id = scene.next_polygon_id();
    let hexagon = hexagon_outside_edge(&base_polygon, edge, hex_radius, hex_id)?;
    let (a, b) = base_polygon.edge(edge)?;

    match find_reversed_edge(&hexagon, a, b, tolerance) {
        Some(hex_edge) => {
            let merged_id = scene.next_polygon_id();
            let merged = base_polygon.merge_with_polygon_on_shared_edge(
                &hexagon, edge, hex_edge, tolerance, merged_id,
            )?;
            history.add_change(
                Box::new(MergePolygons::new(base, hex_id, merged)),
                scene,
            );
            Ok(EdgeExtension::Merged {
                hexagon: hex_id,
                merged: merged_id,
            })
        }
        None => {
            log::warn!(
                "No hexagon edge within {} of polygon {} edge {} (length {:.1}, hexagon side {:.1}); adding unmerged",
                tolerance,
                base,
                edge,
                a.distance(b),
                hex_radius
            );
            history.add_change(Box::new(AddPolygon::new(hexagon)), scene);
            Ok(EdgeExtension::Unmerged { hexagon: hex_id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Ball;

    const R: f32 = 40.0;

    fn scene_with_hexagon(rotation: f32) -> (Scene, PolygonId) {
        let mut scene = Scene::new(Ball::default());
        let id = scene.next_polygon_id();
        scene.push_polygon(Polygon::regular_hexagon(id, Vec2::ZERO, R, rotation));
        (scene, id)
    }

    #[test]
    fn test_hexagon_outside_edge_lines_up() {
        let (scene, id) = scene_with_hexagon(0.0);
        let base = scene.polygon(id).unwrap();
        for edge in 0..6 {
            let hex = hexagon_outside_edge(base, edge, R, PolygonId(99)).unwrap();
            let (a, b) = base.edge(edge).unwrap();
            assert!(find_reversed_edge(&hex, a, b, 2.0).is_some(), "edge {edge}");
            // The new hexagon lies outside the base
            assert!(!base.contains_point(hex.centroid()));
        }
    }

    #[test]
    fn test_add_hexagon_merges() {
        let (mut scene, base) = scene_with_hexagon(0.3);
        let mut history = ChangeHistory::new();

        let result = add_hexagon_at_edge(&mut scene, &mut history, base, 2, R, 2.0).unwrap();
        let EdgeExtension::Merged { merged, .. } = result else {
            panic!("expected a merge, got {result:?}");
        };
        assert_eq!(scene.polygons.len(), 1);
        assert_eq!(scene.polygons[0].id, merged);
        assert_eq!(scene.polygons[0].len(), 10);

        history.undo(&mut scene);
        assert_eq!(scene.polygons.len(), 1);
        assert_eq!(scene.polygons[0].id, base);
        assert_eq!(scene.polygons[0].len(), 6);

        history.redo(&mut scene);
        assert_eq!(scene.polygons[0].id, merged);
    }

    #[test]
    fn test_merge_chain_grows() {
        let (mut scene, base) = scene_with_hexagon(0.0);
        let mut history = ChangeHistory::new();

        let first = add_hexagon_at_edge(&mut scene, &mut history, base, 0, R, 2.0).unwrap();
        let EdgeExtension::Merged { merged, .. } = first else {
            panic!("expected a merge");
        };
        // Edge 9 of the merged loop is edge 5 of the original hexagon
        let second = add_hexagon_at_edge(&mut scene, &mut history, merged, 9, R, 2.0).unwrap();
        assert!(matches!(second, EdgeExtension::Merged { .. }));
        assert_eq!(scene.polygons.len(), 1);
        assert_eq!(scene.polygons[0].len(), 14);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_clockwise_base_still_merges() {
        let mut scene = Scene::new(Ball::default());
        let id = scene.next_polygon_id();
        let ccw = Polygon::regular_hexagon(id, Vec2::ZERO, R, 0.0);
        let cw: Vec<Vec2> = ccw.base_vertices().iter().rev().copied().collect();
        scene.push_polygon(Polygon::new(id, cw).unwrap());
        let mut history = ChangeHistory::new();

        let result = add_hexagon_at_edge(&mut scene, &mut history, id, 1, R, 2.0).unwrap();
        assert!(matches!(result, EdgeExtension::Merged { .. }));
        assert!(scene.polygons[0].signed_area() < 0.0);
    }

    #[test]
    fn test_mismatched_edge_length_falls_back_to_unmerged() {
        // Hexagon side 40 cannot line up with a 100-unit square edge
        let mut scene = Scene::new(Ball::default());
        let id = scene.next_polygon_id();
        let square = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
        ];
        scene.push_polygon(Polygon::new(id, square).unwrap());
        let mut history = ChangeHistory::new();

        let result = add_hexagon_at_edge(&mut scene, &mut history, id, 1, R, 2.0).unwrap();
        let EdgeExtension::Unmerged { hexagon } = result else {
            panic!("expected unmerged fallback");
        };
        assert_eq!(scene.polygons.len(), 2);
        assert!(scene.polygon(hexagon).is_some());

        history.undo(&mut scene);
        assert_eq!(scene.polygons.len(), 1);
    }

    #[test]
    fn test_unknown_polygon() {
        let (mut scene, _) = scene_with_hexagon(0.0);
        let mut history = ChangeHistory::new();
        assert_eq!(
            add_hexagon_at_edge(&mut scene, &mut history, PolygonId(42), 0, R, 2.0),
            Err(PolygonError::UnknownPolygon(PolygonId(42)))
        );
        assert!(history.is_empty());
    }
}
