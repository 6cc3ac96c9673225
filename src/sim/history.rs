//! Linear undo/redo history of reversible scene edits
//!
//! Pushing a change after undoing discards the redo tail; there is never more
//! than one future.

use glam::Vec2;

use super::polygon::{Polygon, PolygonId};
use super::state::Scene;

/// A reversible scene mutation.
///
/// `rollback` must restore exactly the scene `apply` was given, so an
/// undo followed by a redo is a no-op.
pub trait SceneChange {
    fn description(&self) -> &str;
    fn apply(&mut self, scene: &mut Scene);
    fn rollback(&mut self, scene: &mut Scene);
}

/// Undo/redo stack with a cursor on the last applied change
#[derive(Default)]
pub struct ChangeHistory {
    changes: Vec<Box<dyn SceneChange>>,
    /// Index of the last applied change; `None` before the first
    cursor: Option<usize>,
}

impl std::fmt::Debug for ChangeHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHistory")
            .field(
                "changes",
                &self.changes.iter().map(|c| c.description()).collect::<Vec<_>>(),
            )
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl ChangeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.next_index() < self.changes.len()
    }

    /// Description of the change `undo` would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.cursor.map(|i| self.changes[i].description())
    }

    /// Description of the change `redo` would reapply
    pub fn redo_description(&self) -> Option<&str> {
        self.changes.get(self.next_index()).map(|c| c.description())
    }

    /// Drop any redo tail, record `change` and apply it
    pub fn add_change(&mut self, mut change: Box<dyn SceneChange>, scene: &mut Scene) {
        let keep = self.next_index();
        if keep < self.changes.len() {
            log::debug!("Discarding {} redo entries", self.changes.len() - keep);
            self.changes.truncate(keep);
        }
        change.apply(scene);
        log::debug!("Applied: {}", change.description());
        self.changes.push(change);
        self.cursor = Some(self.changes.len() - 1);
    }

    /// Roll back the change under the cursor. Returns its description.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<&str> {
        let Some(index) = self.cursor else {
            log::debug!("Nothing to undo");
            return None;
        };
        self.changes[index].rollback(scene);
        self.cursor = index.checked_sub(1);
        Some(self.changes[index].description())
    }

    /// Reapply the next undone change. Returns its description.
    pub fn redo(&mut self, scene: &mut Scene) -> Option<&str> {
        let index = self.next_index();
        if index >= self.changes.len() {
            log::debug!("Nothing to redo");
            return None;
        }
        self.changes[index].apply(scene);
        self.cursor = Some(index);
        Some(self.changes[index].description())
    }

    fn next_index(&self) -> usize {
        self.cursor.map_or(0, |i| i + 1)
    }
}

/// Replace two polygons with the single polygon stitched from them.
///
/// Holds the merged instance built when the change was recorded, and the
/// removed originals with their list positions once applied.
#[derive(Debug, Clone)]
pub struct MergePolygons {
    description: String,
    replaced: [PolygonId; 2],
    merged: Polygon,
    removed: Vec<(usize, Polygon)>,
}

impl MergePolygons {
    pub fn new(base: PolygonId, other: PolygonId, merged: Polygon) -> Self {
        Self {
            description: format!("merge polygons {base} and {other} into {}", merged.id),
            replaced: [base, other],
            merged,
            removed: Vec::new(),
        }
    }

    pub fn merged(&self) -> &Polygon {
        &self.merged
    }
}

impl SceneChange for MergePolygons {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&mut self, scene: &mut Scene) {
        self.removed = self
            .replaced
            .iter()
            .filter_map(|id| scene.remove_polygon(*id))
            .collect();
        // Indices were taken while removing; map them back to original positions
        restore_original_indices(&mut self.removed);

        let at = self
            .removed
            .iter()
            .map(|(i, _)| *i)
            .min()
            .unwrap_or(scene.polygons.len())
            .min(scene.polygons.len());
        scene.polygons.insert(at, self.merged.clone());
    }

    fn rollback(&mut self, scene: &mut Scene) {
        scene.remove_polygon(self.merged.id);
        for (index, polygon) in self.removed.drain(..) {
            let at = index.min(scene.polygons.len());
            scene.polygons.insert(at, polygon);
        }
    }
}

/// Sequential removals report indices into an already-shrunk list. Convert
/// them to positions in the list as it was before any removal, sorted ascending.
fn restore_original_indices(removed: &mut [(usize, Polygon)]) {
    for k in 0..removed.len() {
        let mut index = removed[k].0;
        // Every earlier removal at or before this slot shifted it left by one
        for (earlier, _) in removed[..k].iter() {
            if *earlier <= index {
                index += 1;
            }
        }
        removed[k].0 = index;
    }
    removed.sort_by_key(|(i, _)| *i);
}

/// Add one polygon at the end of the list
#[derive(Debug, Clone)]
pub struct AddPolygon {
    description: String,
    polygon: Polygon,
}

impl AddPolygon {
    pub fn new(polygon: Polygon) -> Self {
        Self {
            description: format!("add polygon {}", polygon.id),
            polygon,
        }
    }
}

impl SceneChange for AddPolygon {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&mut self, scene: &mut Scene) {
        scene.polygons.push(self.polygon.clone());
    }

    fn rollback(&mut self, scene: &mut Scene) {
        if let Some((_, polygon)) = scene.remove_polygon(self.polygon.id) {
            self.polygon = polygon;
        }
    }
}

/// Move a polygon's offset between two recorded positions
#[derive(Debug, Clone)]
pub struct TranslatePolygon {
    description: String,
    id: PolygonId,
    from: Vec2,
    to: Vec2,
}

impl TranslatePolygon {
    pub fn new(id: PolygonId, from: Vec2, to: Vec2) -> Self {
        Self {
            description: format!("move polygon {id}"),
            id,
            from,
            to,
        }
    }
}

impl SceneChange for TranslatePolygon {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&mut self, scene: &mut Scene) {
        if let Some(polygon) = scene.polygon_mut(self.id) {
            polygon.offset = self.to;
        }
    }

    fn rollback(&mut self, scene: &mut Scene) {
        if let Some(polygon) = scene.polygon_mut(self.id) {
            polygon.offset = self.from;
        }
    }
}
