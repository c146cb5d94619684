//! Single motion/collision step
//!
//! One call advances the ball by `velocity * dt` and reports at most one
//! outcome. The real-time loop and the headless solver both drive the ball
//! through this function, so they cannot disagree about physics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::{Overlap, circle_rect_overlap};
use super::state::{BallState, Level, SimContext};
use super::vector::reflect;
use crate::settings::{PhysicsSettings, TieBreak};

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepResult {
    /// Ball moved freely (or was not in flight)
    None,
    /// Ball center left the arena
    WallOut,
    /// Ball touched a lethal obstacle or the launcher body
    LethalHit,
    /// Ball center entered the goal's home radius
    GoalReached,
    /// Ball was pushed out of an obstacle and reflected
    ObstacleBounce {
        new_position: Vec2,
        new_velocity: Vec2,
    },
}

impl StepResult {
    /// Whether this outcome ends the attempt
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepResult::WallOut | StepResult::LethalHit | StepResult::GoalReached
        )
    }
}

/// Advance the simulation by `dt` seconds
///
/// Obstacles are placed at `ctx.time` (the start of the step); the returned
/// context has its time advanced by `dt` whatever the outcome.
pub fn step(
    ctx: SimContext,
    level: &Level,
    dt: f32,
    settings: &PhysicsSettings,
) -> (SimContext, StepResult) {
    let mut ctx = ctx;
    let time = ctx.time;
    ctx.time += dt;

    if !ctx.ball.is_fired() {
        return (ctx, StepResult::None);
    }

    let ball = ctx.ball;
    let next = ball.pos + ball.vel * dt;

    // All four arena edges are out
    if !level.in_bounds(next) {
        return terminate(ctx, next, StepResult::WallOut);
    }

    if level.goal.contains(next, ball.radius, settings.goal_tolerance) {
        return terminate(ctx, next, StepResult::GoalReached);
    }

    if settings.launcher_is_lethal
        && circle_rect_overlap(next, ball.radius, &level.launcher.body()).is_some()
    {
        return terminate(ctx, next, StepResult::LethalHit);
    }

    // Any lethal contact wins over bounces found earlier in the list
    let heading = ball.vel.normalize_or_zero();
    let mut chosen: Option<(Overlap, f32)> = None;
    for obstacle in &level.obstacles {
        let rect = obstacle.rect_at(time);
        let Some(hit) = circle_rect_overlap(next, ball.radius, &rect) else {
            continue;
        };
        if obstacle.lethal {
            return terminate(ctx, next, StepResult::LethalHit);
        }
        let key = contact_distance(ball.pos, heading, next, ball.radius, &hit);
        let replace = match settings.tie_break {
            TieBreak::Nearest => chosen.is_none_or(|(_, best)| key < best),
            TieBreak::LastInOrder => true,
        };
        if replace {
            chosen = Some((hit, key));
        }
    }

    match chosen {
        Some((hit, _)) => {
            let new_position = next + hit.normal * (hit.depth * settings.push_factor);
            // Only reflect when moving into the surface; a ball already
            // leaving keeps its velocity and is just pushed clear.
            let new_velocity = if ball.vel.dot(hit.normal) < 0.0 {
                reflect(ball.vel, hit.normal)
            } else {
                ball.vel
            };
            ctx.ball.pos = new_position;
            ctx.ball.vel = new_velocity;
            (
                ctx,
                StepResult::ObstacleBounce {
                    new_position,
                    new_velocity,
                },
            )
        }
        None => {
            ctx.ball.pos = next;
            (ctx, StepResult::None)
        }
    }
}

/// How far along the direction of travel the ball meets an obstacle
///
/// The contact point is where the ball's rim enters the surface. A ball with
/// no velocity ranks by straight-line distance instead.
fn contact_distance(from: Vec2, heading: Vec2, next: Vec2, radius: f32, hit: &Overlap) -> f32 {
    let contact = next - hit.normal * (radius - hit.depth);
    if heading == Vec2::ZERO {
        contact.distance(from)
    } else {
        (contact - from).dot(heading)
    }
}

fn terminate(mut ctx: SimContext, at: Vec2, result: StepResult) -> (SimContext, StepResult) {
    ctx.ball.pos = at;
    ctx.ball.state = BallState::Terminated;
    (ctx, result)
}
