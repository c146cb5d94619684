//! Level snapshot and simulation state types
//!
//! The level is immutable during play. Everything that changes from tick to
//! tick lives in `SimContext`, which `step` takes by value and hands back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::kinematics::{Movement, displaced_position};
use super::rect::RotatedRect;
use crate::consts::*;

/// Ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallState {
    /// Resting on the launcher, waiting to be fired
    #[default]
    OnLauncher,
    /// In free motion
    Fired,
    /// Attempt finished (goal, wall or lethal contact)
    Terminated,
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
}

impl Ball {
    /// A ball resting on the launcher head
    pub fn on_launcher(launcher: &Launcher, radius: f32) -> Self {
        Self {
            pos: launcher.head(radius),
            vel: Vec2::ZERO,
            radius,
            state: BallState::OnLauncher,
        }
    }

    /// Fire the ball with the given velocity (only from the launcher)
    pub fn launch(&mut self, velocity: Vec2) {
        if self.state == BallState::OnLauncher {
            self.vel = velocity;
            self.state = BallState::Fired;
        }
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.state == BallState::Fired
    }
}

/// Stationary launcher: a body rectangle with the ball resting on top
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launcher {
    /// Center of the body rectangle
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Launcher {
    pub const DEFAULT_WIDTH: f32 = 40.0;
    pub const DEFAULT_HEIGHT: f32 = 30.0;

    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }

    /// Body rectangle (never rotated)
    pub fn body(&self) -> RotatedRect {
        RotatedRect::new(self.position, Vec2::new(self.width, self.height), 0.0)
    }

    /// Where a ball of `ball_radius` rests before launch
    pub fn head(&self, ball_radius: f32) -> Vec2 {
        Vec2::new(
            self.position.x,
            self.position.y - self.height * 0.5 - ball_radius - LAUNCH_CLEARANCE,
        )
    }
}

/// Circular goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub center: Vec2,
    pub radius: f32,
}

impl Goal {
    /// Ball is home when its center is within `radius - tolerance * ball_radius`
    #[inline]
    pub fn contains(&self, ball_pos: Vec2, ball_radius: f32, tolerance: f32) -> bool {
        ball_pos.distance(self.center) < self.radius - tolerance * ball_radius
    }
}

/// Goal test with the default tolerance
#[inline]
pub fn contains_goal(
    ball_pos: Vec2,
    goal_center: Vec2,
    goal_radius: f32,
    ball_radius: f32,
) -> bool {
    Goal {
        center: goal_center,
        radius: goal_radius,
    }
    .contains(ball_pos, ball_radius, GOAL_TOLERANCE)
}

/// A rectangular obstacle ("brick")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner before rotation; oscillation is centered here
    pub anchor: Vec2,
    pub width: f32,
    pub height: f32,
    /// Rotation about the rectangle center (radians)
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub lethal: bool,
    #[serde(default)]
    pub movement: Option<Movement>,
}

impl Obstacle {
    pub fn new(anchor: Vec2, width: f32, height: f32) -> Self {
        Self {
            anchor,
            width,
            height,
            angle: 0.0,
            lethal: false,
            movement: None,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn lethal(mut self) -> Self {
        self.lethal = true;
        self
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = Some(movement);
        self
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Displaced top-left at `time` seconds
    #[inline]
    pub fn position_at(&self, time: f32) -> Vec2 {
        displaced_position(self.anchor, self.movement.as_ref(), time)
    }

    /// Collision shape at `time` seconds
    #[inline]
    pub fn rect_at(&self, time: f32) -> RotatedRect {
        RotatedRect::from_top_left(self.position_at(time), self.size(), self.angle)
    }
}

/// Immutable level snapshot consumed by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub name: String,
    /// Arena width (pixels)
    pub width: f32,
    /// Arena height (pixels)
    pub height: f32,
    #[serde(default = "default_ball_radius")]
    pub ball_radius: f32,
    pub launcher: Launcher,
    pub goal: Goal,
    /// Drawing order; every obstacle is tested each tick
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

fn default_ball_radius() -> f32 {
    BALL_RADIUS
}

impl Level {
    /// An empty arena with the launcher at bottom center
    pub fn new(width: f32, height: f32, goal: Goal) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            ball_radius: BALL_RADIUS,
            launcher: Launcher::new(Vec2::new(width * 0.5, height - 60.0)),
            goal,
            obstacles: Vec::new(),
        }
    }

    /// Does the point lie inside the arena (edges inclusive)
    #[inline]
    pub fn in_bounds(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Whether any obstacle moves
    pub fn has_moving_obstacles(&self) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.movement.is_some_and(|m| m.amplitude > 0.0 && m.period().is_some()))
    }
}

/// Mutable per-attempt state: the ball plus simulated time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimContext {
    pub ball: Ball,
    /// Simulated seconds; obstacles are evaluated at this time
    pub time: f32,
}

impl SimContext {
    /// Fresh attempt: ball on the launcher at time zero
    pub fn new(level: &Level) -> Self {
        Self::at_time(level, 0.0)
    }

    /// Fresh attempt starting at a given obstacle time
    pub fn at_time(level: &Level, time: f32) -> Self {
        Self {
            ball: Ball::on_launcher(&level.launcher, level.ball_radius),
            time,
        }
    }

    /// Fire the resting ball
    pub fn launched(mut self, velocity: Vec2) -> Self {
        self.ball.launch(velocity);
        self
    }
}
