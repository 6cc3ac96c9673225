//! Deterministic simulation module
//!
//! All collision and editing logic lives here. This module must be pure and deterministic:
//! - Externally supplied timestep only
//! - Stable iteration order (cells by axial key, polygons by list order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod edit;
pub mod grid;
pub mod hex;
pub mod history;
pub mod input;
pub mod polygon;
pub mod state;
pub mod style;
pub mod tick;

pub use collision::{
    CollisionRecord, CollisionResult, Edge, EdgeTag, WallSide, bounce_off_walls,
    closest_point_on_segment, edge_normal, reflect_velocity, resolve_collision,
};
pub use edit::{EdgeExtension, add_hexagon_at_edge, find_reversed_edge, hexagon_outside_edge};
pub use grid::{HexCell, HexGrid};
pub use hex::{Axial, NEIGHBOR_DIRS, center, cube_distance, hex_corner, hex_round, pixel_to_hex};
pub use history::{
    AddPolygon, ChangeHistory, MergePolygons, SceneChange, TranslatePolygon,
};
pub use input::{DragController, EdgePick, click_cell, pick_edge};
pub use polygon::{Glow, Polygon, PolygonError, PolygonId};
pub use state::{Ball, Scene};
pub use style::{HexStyle, Rgb, StyleRegistry};
pub use tick::{step_grid, step_polygons};
