//! Physics settings
//!
//! Data-driven policy knobs for the step function and solver. Loaded from a
//! JSON file when one is given; anything missing falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::*;

/// How to pick one obstacle when several non-lethal ones overlap in a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Obstacle the ball meets first along its direction of travel
    #[default]
    Nearest,
    /// Last overlapping obstacle in list order
    LastInOrder,
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::Nearest => "nearest",
            TieBreak::LastInOrder => "last_in_order",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" | "closest" => Some(TieBreak::Nearest),
            "last" | "last_in_order" => Some(TieBreak::LastInOrder),
            _ => None,
        }
    }
}

/// Physics tuning shared by real-time play and the solver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Launch speed magnitude (pixels/s)
    pub launch_speed: f32,
    /// Goal tolerance factor k (0..1)
    pub goal_tolerance: f32,
    /// Push-out multiplier on bounce (slightly above 1)
    pub push_factor: f32,
    /// Multi-hit resolution policy
    pub tie_break: TieBreak,
    /// Touching the launcher body after launch ends the attempt
    pub launcher_is_lethal: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            launch_speed: LAUNCH_SPEED,
            goal_tolerance: GOAL_TOLERANCE,
            push_factor: PUSH_FACTOR,
            tie_break: TieBreak::Nearest,
            launcher_is_lethal: true,
        }
    }
}

impl PhysicsSettings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded physics settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings file {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        // Plain data, serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Clamp values into their meaningful ranges
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.launch_speed.is_finite() && self.launch_speed > 0.0) {
            self.launch_speed = defaults.launch_speed;
        }
        if !(self.goal_tolerance > 0.0 && self.goal_tolerance < 1.0) {
            self.goal_tolerance = defaults.goal_tolerance;
        }
        if !(self.push_factor.is_finite() && self.push_factor >= 1.0) {
            self.push_factor = defaults.push_factor;
        }
        self
    }
}
