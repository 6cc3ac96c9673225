//! Per-frame simulation step
//!
//! One call advances the ball by `dt` frames and resolves at most one
//! collision, which is handed to the caller's sink. Movement is measured in
//! frames; glow fades in real seconds (`dt * config.frame_seconds`).

use super::collision::{CollisionRecord, EdgeTag, bounce_off_walls, resolve_collision};
use super::grid::HexGrid;
use super::state::{Ball, Scene, polygon_edges};
use crate::config::SimConfig;

/// Advance the ball inside the active rooms of a hex grid
pub fn step_grid<F>(
    ball: &mut Ball,
    grid: &HexGrid,
    config: &SimConfig,
    dt: f32,
    sink: &mut F,
) -> Option<CollisionRecord>
where
    F: FnMut(&CollisionRecord),
{
    ball.glow.decay(dt * config.frame_seconds, config.glow_decay_rate);

    let mut record = resolve_collision(ball, grid.boundary_edges(), dt, config.separation);
    if record.is_none() && config.viewport_walls {
        record = bounce_off_walls(ball, config.half_extents());
    }

    if let Some(record) = &record {
        ball.glow.trigger();
        sink(record);
    }
    record
}

/// Advance the ball among the scene's polygons
pub fn step_polygons<F>(
    scene: &mut Scene,
    config: &SimConfig,
    dt: f32,
    sink: &mut F,
) -> Option<CollisionRecord>
where
    F: FnMut(&CollisionRecord),
{
    let Scene { ball, polygons, .. } = scene;

    let seconds = dt * config.frame_seconds;
    ball.glow.decay(seconds, config.glow_decay_rate);
    for polygon in polygons.iter_mut() {
        polygon.glow.decay(seconds, config.glow_decay_rate);
    }

    let mut record = resolve_collision(ball, polygon_edges(polygons), dt, config.separation);
    if record.is_none() && config.viewport_walls {
        record = bounce_off_walls(ball, config.half_extents());
    }

    if let Some(record) = &record {
        if let EdgeTag::Polygon { index, .. } = record.tag {
            if let Some(polygon) = polygons.get_mut(index) {
                polygon.glow.trigger();
            }
        }
        ball.glow.trigger();
        sink(record);
    }
    record
}
