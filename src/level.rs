//! Level records: JSON loading, validation and normalization
//!
//! The simulation core trusts its input. Callers run `validate` on anything
//! that came from outside (editor, files) before handing it to the core.

use std::fmt;
use std::path::Path;

use crate::consts::MIN_OBSTACLE_DIMENSION;
use crate::normalize_angle;
use crate::sim::Level;

/// Why a level record was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// Arena width/height not positive
    ArenaSize { width: f32, height: f32 },
    /// Ball radius not positive
    BallRadius { radius: f32 },
    /// Goal radius cannot contain a ball center with the home tolerance
    GoalRadius { radius: f32 },
    GoalOutsideArena,
    LauncherOutsideArena,
    /// Obstacle smaller than the minimum dimension
    ObstacleTooSmall { index: usize, width: f32, height: f32 },
    /// Movement with negative or non-finite amplitude/rate
    BadMovement { index: usize },
    /// A coordinate is NaN or infinite
    NonFinite { what: &'static str },
    /// Record could not be parsed
    Parse(String),
    /// File could not be read or written
    Io(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArenaSize { width, height } => {
                write!(f, "arena size must be positive, got {width}x{height}")
            }
            Self::BallRadius { radius } => write!(f, "ball radius must be positive, got {radius}"),
            Self::GoalRadius { radius } => {
                write!(f, "goal radius {radius} is too small for the ball")
            }
            Self::GoalOutsideArena => write!(f, "goal center lies outside the arena"),
            Self::LauncherOutsideArena => write!(f, "launcher lies outside the arena"),
            Self::ObstacleTooSmall {
                index,
                width,
                height,
            } => write!(
                f,
                "obstacle {index} is {width}x{height}, minimum is {MIN_OBSTACLE_DIMENSION}"
            ),
            Self::BadMovement { index } => {
                write!(f, "obstacle {index} has an invalid movement descriptor")
            }
            Self::NonFinite { what } => write!(f, "{what} is not a finite number"),
            Self::Parse(msg) => write!(f, "level parse error: {msg}"),
            Self::Io(msg) => write!(f, "level io error: {msg}"),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl Level {
    /// Parse and validate a level
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read and validate a level file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Check the record against the simulation's input contract
    pub fn validate(&self) -> Result<(), LevelError> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(LevelError::NonFinite { what: "arena size" });
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LevelError::ArenaSize {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.ball_radius.is_finite() && self.ball_radius > 0.0) {
            return Err(LevelError::BallRadius {
                radius: self.ball_radius,
            });
        }

        if !self.goal.center.is_finite() {
            return Err(LevelError::NonFinite { what: "goal center" });
        }
        if !self.in_bounds(self.goal.center) {
            return Err(LevelError::GoalOutsideArena);
        }
        // Home radius must be positive or the goal can never be reached
        if !(self.goal.radius - crate::consts::GOAL_TOLERANCE * self.ball_radius > 0.0) {
            return Err(LevelError::GoalRadius {
                radius: self.goal.radius,
            });
        }

        let launcher = &self.launcher;
        if !(launcher.position.is_finite()
            && launcher.width.is_finite()
            && launcher.height.is_finite())
        {
            return Err(LevelError::NonFinite { what: "launcher" });
        }
        if !self.in_bounds(launcher.position) || !self.in_bounds(launcher.head(self.ball_radius)) {
            return Err(LevelError::LauncherOutsideArena);
        }

        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if !(obstacle.anchor.is_finite() && obstacle.angle.is_finite()) {
                return Err(LevelError::NonFinite { what: "obstacle" });
            }
            if !(obstacle.width >= MIN_OBSTACLE_DIMENSION
                && obstacle.height >= MIN_OBSTACLE_DIMENSION)
            {
                return Err(LevelError::ObstacleTooSmall {
                    index,
                    width: obstacle.width,
                    height: obstacle.height,
                });
            }
            if let Some(m) = &obstacle.movement {
                let ok = m.amplitude.is_finite()
                    && m.amplitude >= 0.0
                    && m.angular_rate.is_finite()
                    && m.phase_offset.is_finite();
                if !ok {
                    return Err(LevelError::BadMovement { index });
                }
            }
        }
        Ok(())
    }

    /// Sanitized deep copy for headless simulation
    ///
    /// Dimensions are raised to the minimum, amplitudes made non-negative,
    /// angles wrapped, and zero-amplitude movers turned static. The source level
    /// is left untouched.
    pub fn normalized(&self) -> Level {
        let mut level = self.clone();
        level.ball_radius = level.ball_radius.abs();
        level.launcher.width = level.launcher.width.abs();
        level.launcher.height = level.launcher.height.abs();
        for obstacle in &mut level.obstacles {
            obstacle.width = obstacle.width.max(MIN_OBSTACLE_DIMENSION);
            obstacle.height = obstacle.height.max(MIN_OBSTACLE_DIMENSION);
            obstacle.angle = normalize_angle(obstacle.angle);
            if let Some(m) = &mut obstacle.movement {
                m.amplitude = m.amplitude.abs();
            }
            if obstacle
                .movement
                .is_some_and(|m| m.amplitude == 0.0 || m.angular_rate == 0.0)
            {
                obstacle.movement = None;
            }
        }
        level
    }
}
