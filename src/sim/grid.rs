//! Hex tile grid with per-cell activation
//!
//! Only active cells contribute boundary edges, and an edge shared by two
//! active cells is never a boundary. Activating contiguous cells carves out a
//! "room" whose outline is what the ball bounces off.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Edge, EdgeTag};
use super::hex::{self, Axial};
use super::style::{DEFAULT_STYLE_ID, HexStyle, StyleRegistry};
use crate::consts::GRID_MARGIN;

/// A single tile. Its coordinate never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    coord: Axial,
    pub active: bool,
    pub type_id: String,
}

impl HexCell {
    pub fn new(coord: Axial) -> Self {
        Self {
            coord,
            active: false,
            type_id: DEFAULT_STYLE_ID.to_string(),
        }
    }

    #[inline]
    pub fn coord(&self) -> Axial {
        self.coord
    }
}

/// Bounded set of cells, keyed and iterated by axial coordinate
#[derive(Debug, Clone)]
pub struct HexGrid {
    cells: BTreeMap<Axial, HexCell>,
    hex_radius: f32,
    styles: StyleRegistry,
}

impl HexGrid {
    /// Build every cell with `|q| <= q_range` and `|r| <= r_range`
    pub fn new(q_range: i32, r_range: i32, hex_radius: f32, styles: StyleRegistry) -> Self {
        let mut cells = BTreeMap::new();
        for q in -q_range..=q_range {
            for r in -r_range..=r_range {
                let coord = Axial::new(q, r);
                cells.insert(coord, HexCell::new(coord));
            }
        }
        log::info!(
            "Built hex grid: q=±{}, r=±{}, {} cells",
            q_range,
            r_range,
            cells.len()
        );
        Self {
            cells,
            hex_radius,
            styles,
        }
    }

    /// Grid large enough that any click inside a `width`×`height` viewport
    /// centered on the origin lands on a real cell
    pub fn for_viewport(width: f32, height: f32, hex_radius: f32, styles: StyleRegistry) -> Self {
        let q_range = (width / (hex_radius * 1.5)).ceil() as i32 + GRID_MARGIN;
        let r_range = (height / (hex_radius * 3.0_f32.sqrt())).ceil() as i32 + GRID_MARGIN;
        Self::new(q_range, r_range, hex_radius, styles)
    }

    #[inline]
    pub fn hex_radius(&self) -> f32 {
        self.hex_radius
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get_cell(&self, coord: Axial) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values()
    }

    pub fn active_cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values().filter(|c| c.active)
    }

    /// Flip a cell's activation. Returns the new state, or `None` off-grid.
    pub fn toggle(&mut self, coord: Axial) -> Option<bool> {
        let cell = self.cells.get_mut(&coord)?;
        cell.active = !cell.active;
        Some(cell.active)
    }

    /// Returns false when the coordinate has no backing cell
    pub fn set_active(&mut self, coord: Axial, active: bool) -> bool {
        match self.cells.get_mut(&coord) {
            Some(cell) => {
                cell.active = active;
                true
            }
            None => false,
        }
    }

    /// Returns false when the coordinate has no backing cell
    pub fn set_type(&mut self, coord: Axial, type_id: impl Into<String>) -> bool {
        match self.cells.get_mut(&coord) {
            Some(cell) => {
                cell.type_id = type_id.into();
                true
            }
            None => false,
        }
    }

    /// Activate every existing cell within `radius` steps of the origin
    pub fn activate_hexagon(&mut self, radius: i32) {
        for q in -radius..=radius {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            for r in r1..=r2 {
                self.set_active(Axial::new(q, r), true);
            }
        }
    }

    /// Style used to draw a cell, falling back to `"default"`
    pub fn style_of(&self, coord: Axial) -> &HexStyle {
        let id = self
            .cells
            .get(&coord)
            .map(|c| c.type_id.as_str())
            .unwrap_or(DEFAULT_STYLE_ID);
        self.styles.get(id)
    }

    /// Whether edge `i` of the cell at `coord` borders open space.
    /// A missing neighbor counts as open.
    pub fn is_boundary_edge(&self, coord: Axial, i: usize) -> bool {
        !self
            .cells
            .get(&coord.neighbor(i))
            .is_some_and(|n| n.active)
    }

    /// Boundary edge indices of one cell
    pub fn boundary_edge_indices(&self, coord: Axial) -> impl Iterator<Item = usize> + '_ {
        (0..6).filter(move |&i| self.is_boundary_edge(coord, i))
    }

    /// Boundary edges of every active cell, in axial key order
    pub fn boundary_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.active_cells().flat_map(move |cell| {
            let coord = cell.coord;
            self.boundary_edge_indices(coord).map(move |i| {
                let (a, b) = hex::edge_endpoints(coord, self.hex_radius, i);
                Edge {
                    a,
                    b,
                    tag: EdgeTag::Cell { coord, edge: i },
                }
            })
        })
    }

    /// Pixel center of a cell
    pub fn center_of(&self, coord: Axial) -> Vec2 {
        hex::center(coord, self.hex_radius)
    }

    /// Cell under a pixel position, if it exists
    pub fn cell_at(&self, p: Vec2) -> Option<&HexCell> {
        self.get_cell(hex::pixel_to_hex(p, self.hex_radius))
    }
}
