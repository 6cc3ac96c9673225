//! Hexbounce - a ball bouncing inside hex rooms and editable polygons
//!
//! Core modules:
//! - `sim`: Deterministic simulation (hex grid, polygons, collisions, edit history)
//! - `config`: Data-driven simulation parameters
//! - `events`: Per-simulation event bus
//! - `midi`: Host-side mapping of bounces to MIDI messages

pub mod config;
pub mod events;
pub mod midi;
pub mod sim;

pub use config::{ConfigError, Separation, SimConfig};
pub use events::{EventBus, HistoryEvent, SubscriptionId, Topic};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Frame step in simulation units (velocities are expressed per frame)
    pub const FRAME_DT: f32 = 1.0;
    /// Real time covered by one frame at 60 fps
    pub const FRAME_SECONDS: f32 = 1.0 / 60.0;

    /// Hex cell circumradius in pixels
    pub const HEX_RADIUS: f32 = 40.0;
    /// Extra rings of cells built around the viewport
    pub const GRID_MARGIN: i32 = 2;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_DEFAULT_VELOCITY: (f32, f32) = (1.0, 1.0);

    /// Fixed push-out used by the nudge separation mode
    pub const NUDGE_EPSILON: f32 = 0.5;

    /// Endpoint coincidence tolerance when merging polygons
    pub const MERGE_TOLERANCE: f32 = 2.0;

    /// Glow intensity lost per second
    pub const GLOW_DECAY_RATE: f32 = 1.0;

    /// Viewport defaults
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;
}

/// Perpendicular of a direction, rotated 90 degrees: `(-y, x)`
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Whether two points coincide within `tolerance`
#[inline]
pub fn approx_eq(a: Vec2, b: Vec2, tolerance: f32) -> bool {
    a.distance_squared(b) <= tolerance * tolerance
}

/// Unit direction from `from` to `to`, or `fallback` when the points coincide
#[inline]
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let d = to - from;
    if d.length_squared() < 1e-12 {
        fallback
    } else {
        d.normalize()
    }
}
