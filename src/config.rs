//! Simulation parameters
//!
//! Loaded from JSON; any field left out takes its default.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How the ball is separated from an edge after a bounce.
///
/// Reads `"penetration"`, `"nudge"` (default push) or `{ "nudge": eps }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "SeparationRepr")]
pub enum Separation {
    /// Place the ball exactly one radius from the touched edge
    #[default]
    Penetration,
    /// Push the ball a fixed distance along the edge normal
    Nudge(f32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeparationRepr {
    Name(SeparationName),
    Nudge { nudge: f32 },
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum SeparationName {
    Penetration,
    Nudge,
}

impl From<SeparationRepr> for Separation {
    fn from(repr: SeparationRepr) -> Self {
        match repr {
            SeparationRepr::Name(SeparationName::Penetration) => Separation::Penetration,
            SeparationRepr::Name(SeparationName::Nudge) => Separation::Nudge(NUDGE_EPSILON),
            SeparationRepr::Nudge { nudge } => Separation::Nudge(nudge),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Parse(String),
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be non-negative and finite, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Hex cell circumradius
    pub hex_radius: f32,
    /// Ball radius
    pub ball_radius: f32,
    /// Viewport size; the origin sits at its center
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Velocity restored to the ball when a drag ends
    pub default_velocity: Vec2,
    pub separation: Separation,
    /// Endpoint coincidence tolerance for merges
    pub merge_tolerance: f32,
    /// Glow intensity lost per second of real time
    pub glow_decay_rate: f32,
    /// Real seconds covered by one frame (`dt` of 1.0)
    pub frame_seconds: f32,
    /// Bounce off the viewport edges when nothing else is hit
    pub viewport_walls: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            hex_radius: HEX_RADIUS,
            ball_radius: BALL_RADIUS,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            default_velocity: Vec2::new(BALL_DEFAULT_VELOCITY.0, BALL_DEFAULT_VELOCITY.1),
            separation: Separation::Penetration,
            merge_tolerance: MERGE_TOLERANCE,
            glow_decay_rate: GLOW_DECAY_RATE,
            frame_seconds: FRAME_SECONDS,
            viewport_walls: false,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded simulation config");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("hex_radius", self.hex_radius),
            ("ball_radius", self.ball_radius),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("merge_tolerance", self.merge_tolerance),
            ("frame_seconds", self.frame_seconds),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !self.glow_decay_rate.is_finite() || self.glow_decay_rate < 0.0 {
            return Err(ConfigError::Negative {
                field: "glow_decay_rate",
                value: self.glow_decay_rate,
            });
        }
        if !self.default_velocity.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "default_velocity",
            });
        }
        if let Separation::Nudge(eps) = self.separation {
            if !eps.is_finite() || eps < 0.0 {
                return Err(ConfigError::Negative {
                    field: "separation",
                    value: eps,
                });
            }
        }
        Ok(())
    }

    /// Half the viewport size
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height) / 2.0
    }
}
