//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep, fixed 60 Hz inside the solver
//! - Obstacle positions are a pure function of time
//! - Stable iteration order (obstacle list order)
//! - No rendering or platform dependencies

pub mod kinematics;
pub mod rect;
pub mod solver;
pub mod state;
pub mod step;
pub mod vector;

pub use kinematics::{MoveAxis, MoveKind, Movement, displaced_position};
pub use rect::{Overlap, RotatedRect, circle_rect_overlap, separating_axes};
pub use solver::{
    Shot, ShotOutcome, Solvability, SolverOptions, find_winning_shot,
    find_winning_shot_cancellable, simulate_shot, trace_shot,
};
pub use state::{Ball, BallState, Goal, Launcher, Level, Obstacle, SimContext, contains_goal};
pub use step::{StepResult, step};
pub use vector::reflect;
