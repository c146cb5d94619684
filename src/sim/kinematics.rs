//! Obstacle kinematics
//!
//! Moving obstacles oscillate around their anchor. Position is a pure
//! function of simulation time so any moment can be replayed exactly,
//! which is what lets the solver start a shot at an arbitrary phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Which axes an obstacle travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAxis {
    #[default]
    Horizontal,
    Vertical,
    /// Figure-eight path: y runs at twice the rate and half the amplitude of x
    Both,
}

/// Shape of the oscillation over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Smooth sine travel
    #[default]
    Continuous,
    /// Jumps between the two extremes
    Stepped,
}

/// Movement descriptor for an oscillating obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(default)]
    pub axis: MoveAxis,
    #[serde(default)]
    pub kind: MoveKind,
    /// Peak displacement from the anchor (pixels, >= 0)
    pub amplitude: f32,
    /// Radians per second
    pub angular_rate: f32,
    /// Seconds added to simulation time before evaluation
    #[serde(default)]
    pub phase_offset: f32,
}

impl Movement {
    /// Displacement from the anchor at `time` seconds
    pub fn offset_at(&self, time: f32) -> Vec2 {
        let theta = (time + self.phase_offset) * self.angular_rate;
        let a = self.amplitude;
        match self.axis {
            MoveAxis::Horizontal => Vec2::new(a * self.wave(theta), 0.0),
            MoveAxis::Vertical => Vec2::new(0.0, a * self.wave(theta)),
            MoveAxis::Both => Vec2::new(a * self.wave(theta), 0.5 * a * self.wave(2.0 * theta)),
        }
    }

    /// Time for one full cycle, `None` for a stationary descriptor
    pub fn period(&self) -> Option<f32> {
        if self.angular_rate == 0.0 || !self.angular_rate.is_finite() {
            None
        } else {
            Some(TAU / self.angular_rate.abs())
        }
    }

    fn wave(&self, theta: f32) -> f32 {
        let s = theta.sin();
        match self.kind {
            MoveKind::Continuous => s,
            MoveKind::Stepped => sign(s),
        }
    }
}

/// Sign with `sign(0) == 0` (`f32::signum` maps +0 to 1)
#[inline]
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Displaced position of an obstacle anchor at `time` seconds
#[inline]
pub fn displaced_position(anchor: Vec2, movement: Option<&Movement>, time: f32) -> Vec2 {
    match movement {
        Some(m) => anchor + m.offset_at(time),
        None => anchor,
    }
}
