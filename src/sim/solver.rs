//! Headless solvability search
//!
//! Brute-force grid over launch direction and obstacle phase. Each candidate
//! shot is played out with the same `step` function real-time play uses, at
//! the fixed 60 Hz tick, until it terminates or runs out of frames. Bounces
//! make the outcome discontinuous in the launch angle, so sampling is the
//! only practical approach.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use super::state::{Level, SimContext};
use super::step::{StepResult, step};
use crate::consts::{MIN_UPWARD_SPEED, SIM_DT};
use crate::settings::PhysicsSettings;

/// Search budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Frames simulated per shot before giving up on it
    pub max_simulated_frames: u32,
    /// Spacing of the horizontal launch velocity grid (pixels/s)
    pub velocity_step: f32,
    /// Phase samples per launch velocity
    pub phase_samples: u32,
    /// Window the phase samples are spread across; non-positive means
    /// "longest obstacle period"
    pub phase_duration_seconds: f32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_simulated_frames: 600,
            velocity_step: 20.0,
            phase_samples: 8,
            phase_duration_seconds: 4.0,
        }
    }
}

/// A candidate launch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub vx: f32,
    pub vy: f32,
    /// Simulation time at which the ball leaves the launcher
    pub phase_offset_seconds: f32,
}

impl Shot {
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }
}

/// How a single shot ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotOutcome {
    /// Terminal result, or `StepResult::None` when the frame budget ran out
    pub result: StepResult,
    /// Frames simulated
    pub frames: u32,
    /// Obstacle bounces along the way
    pub bounces: u32,
}

impl ShotOutcome {
    #[inline]
    pub fn reached_goal(&self) -> bool {
        self.result == StepResult::GoalReached
    }
}

/// Search verdict
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Solvability {
    /// First winning shot found, if any
    pub shot: Option<Shot>,
    /// Shots played out before the search stopped
    pub shots_evaluated: u32,
    /// Search was stopped early by its cancel flag
    pub cancelled: bool,
}

impl Solvability {
    #[inline]
    pub fn solvable(&self) -> bool {
        self.shot.is_some()
    }
}

/// Launch velocities in sweep order: straight up first, then fanning out
/// alternately right and left in `velocity_step` increments
///
/// The sweep is lazy, so a very fine step costs search time but no memory.
pub fn launch_velocities(speed: f32, velocity_step: f32) -> impl Iterator<Item = Vec2> {
    let speed = speed.abs();
    let step = if velocity_step.is_finite() && velocity_step > 0.0 {
        velocity_step
    } else {
        speed.max(1.0)
    };
    let steps = (speed / step).floor() as u64;

    let to_velocity = move |vx: f32| {
        let vy = -(speed * speed - vx * vx).max(0.0).sqrt();
        Vec2::new(vx, vy.min(-MIN_UPWARD_SPEED))
    };

    std::iter::once(0.0)
        .chain((1..=steps).flat_map(move |k| {
            let vx = k as f32 * step;
            [vx, -vx]
        }))
        .map(to_velocity)
        .filter(|v| v.length_squared() > 1e-6)
}

/// Evenly spaced starting times across `duration`
pub fn phase_offsets(samples: u32, duration: f32) -> Vec<f32> {
    if samples == 0 || !(duration.is_finite() && duration > 0.0) {
        return vec![0.0];
    }
    (0..samples)
        .map(|i| i as f32 * duration / samples as f32)
        .collect()
}

/// Phase samples worth trying for `level`
fn phases_for(level: &Level, options: &SolverOptions) -> Vec<f32> {
    if !level.has_moving_obstacles() {
        // Timing cannot matter
        return vec![0.0];
    }
    let duration = if options.phase_duration_seconds > 0.0 {
        options.phase_duration_seconds
    } else {
        level
            .obstacles
            .iter()
            .filter_map(|o| o.movement.and_then(|m| m.period()))
            .fold(0.0, f32::max)
    };
    phase_offsets(options.phase_samples, duration)
}

/// Play one shot out headlessly, calling `on_step` after every tick
fn run_shot(
    level: &Level,
    shot: &Shot,
    max_frames: u32,
    settings: &PhysicsSettings,
    mut on_step: impl FnMut(&SimContext),
) -> ShotOutcome {
    let mut ctx = SimContext::at_time(level, shot.phase_offset_seconds).launched(shot.velocity());
    let mut bounces = 0;

    for frame in 1..=max_frames {
        let (next, result) = step(ctx, level, SIM_DT, settings);
        ctx = next;
        on_step(&ctx);
        match result {
            StepResult::ObstacleBounce { .. } => bounces += 1,
            StepResult::None => {}
            terminal => {
                return ShotOutcome {
                    result: terminal,
                    frames: frame,
                    bounces,
                };
            }
        }
    }

    ShotOutcome {
        result: StepResult::None,
        frames: max_frames,
        bounces,
    }
}

/// Replay a single shot
pub fn simulate_shot(
    level: &Level,
    shot: &Shot,
    max_frames: u32,
    settings: &PhysicsSettings,
) -> ShotOutcome {
    run_shot(level, shot, max_frames, settings, |_| {})
}

/// Replay a single shot and record the ball path (one point per tick)
pub fn trace_shot(
    level: &Level,
    shot: &Shot,
    max_frames: u32,
    settings: &PhysicsSettings,
) -> (ShotOutcome, Vec<Vec2>) {
    let mut path = Vec::new();
    let outcome = run_shot(level, shot, max_frames, settings, |ctx| path.push(ctx.ball.pos));
    (outcome, path)
}

/// Search for any shot that reaches the goal
pub fn find_winning_shot(
    level: &Level,
    options: &SolverOptions,
    settings: &PhysicsSettings,
) -> Solvability {
    find_winning_shot_cancellable(level, options, settings, &AtomicBool::new(false))
}

/// Search for any shot that reaches the goal, checking `cancel` between shots
pub fn find_winning_shot_cancellable(
    level: &Level,
    options: &SolverOptions,
    settings: &PhysicsSettings,
    cancel: &AtomicBool,
) -> Solvability {
    // Work on a private, sanitized copy; the caller's level is never touched
    let level = level.normalized();
    let phases = phases_for(&level, options);
    let mut verdict = Solvability::default();

    log::debug!(
        "Solver: velocity step {} x {} phases, {} frames each",
        options.velocity_step,
        phases.len(),
        options.max_simulated_frames
    );

    for velocity in launch_velocities(settings.launch_speed, options.velocity_step) {
        for &phase in &phases {
            if cancel.load(Ordering::Relaxed) {
                log::info!("Solver cancelled after {} shots", verdict.shots_evaluated);
                verdict.cancelled = true;
                return verdict;
            }

            let shot = Shot {
                vx: velocity.x,
                vy: velocity.y,
                phase_offset_seconds: phase,
            };
            let outcome = simulate_shot(&level, &shot, options.max_simulated_frames, settings);
            verdict.shots_evaluated += 1;

            if outcome.reached_goal() {
                log::info!(
                    "Level '{}' solvable: v=({:.1}, {:.1}) phase={:.2}s after {} shots",
                    level.name,
                    shot.vx,
                    shot.vy,
                    phase,
                    verdict.shots_evaluated
                );
                verdict.shot = Some(shot);
                return verdict;
            }
        }
    }

    log::info!(
        "Level '{}' unsolvable after {} shots",
        level.name,
        verdict.shots_evaluated
    );
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kinematics::{MoveAxis, MoveKind, Movement};
    use crate::sim::state::{Goal, Launcher, Obstacle};
    use std::f32::consts::FRAC_PI_2;

    fn open_level() -> Level {
        let mut level = Level::new(
            800.0,
            600.0,
            Goal {
                center: Vec2::new(400.0, 100.0),
                radius: 15.0,
            },
        );
        level.launcher = Launcher::new(Vec2::new(400.0, 540.0));
        level.name = "open".into();
        level
    }

    #[test]
    fn test_launch_velocity_order() {
        let v: Vec<Vec2> = launch_velocities(600.0, 200.0).collect();
        let xs: Vec<f32> = v.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![0.0, 200.0, -200.0, 400.0, -400.0, 600.0, -600.0]);
        assert!(v.iter().all(|v| v.y <= -MIN_UPWARD_SPEED));
        assert!((v[0].y + 600.0).abs() < 1e-3);
        // Flattest shots are clamped to the minimum climb
        assert_eq!(v[5].y, -MIN_UPWARD_SPEED);
    }

    #[test]
    fn test_launch_velocity_bad_step() {
        assert_eq!(launch_velocities(600.0, 0.0).count(), 3);
        assert_eq!(launch_velocities(600.0, f32::NAN).count(), 3);
    }

    #[test]
    fn test_launch_velocity_fine_step_is_lazy() {
        // Billions of grid points; only the head of the sweep is built
        let head: Vec<Vec2> = launch_velocities(600.0, 1e-7).take(3).collect();
        assert_eq!(head.len(), 3);
        assert_eq!(head[0].x, 0.0);
        assert!(head[1].x > 0.0 && head[2].x < 0.0);
        assert_eq!(head[1].x, -head[2].x);
    }

    #[test]
    fn test_phase_offsets() {
        assert_eq!(phase_offsets(4, 2.0), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(phase_offsets(0, 2.0), vec![0.0]);
        assert_eq!(phase_offsets(3, -1.0), vec![0.0]);
    }

    #[test]
    fn test_open_level_solved_immediately() {
        let level = open_level();
        let verdict = find_winning_shot(&level, &SolverOptions::default(), &Default::default());
        assert!(verdict.solvable());
        assert!(verdict.shots_evaluated <= 3);
        let shot = verdict.shot.unwrap();
        assert_eq!(shot.vx, 0.0);
        assert!(shot.vy < 0.0);
    }

    #[test]
    fn test_lethal_ceiling_is_unsolvable() {
        let mut level = open_level();
        level
            .obstacles
            .push(Obstacle::new(Vec2::new(0.0, 300.0), 800.0, 20.0).lethal());
        let options = SolverOptions::default();
        let verdict = find_winning_shot(&level, &options, &Default::default());
        assert!(!verdict.solvable());
        assert!(!verdict.cancelled);
        // Static level: one phase per velocity
        assert_eq!(verdict.shots_evaluated, 61);
    }

    #[test]
    fn test_bounce_shot_found_around_blocker() {
        let mut level = open_level();
        level.goal.radius = 40.0;
        // Lethal block straight above the launcher, with a bumper to the
        // right that can redirect a shot back toward the goal
        level
            .obstacles
            .push(Obstacle::new(Vec2::new(350.0, 250.0), 100.0, 20.0).lethal());
        level
            .obstacles
            .push(Obstacle::new(Vec2::new(600.0, 0.0), 20.0, 600.0));
        let verdict = find_winning_shot(&level, &SolverOptions::default(), &Default::default());
        let shot = verdict.shot.expect("bank shot off the bumper");
        assert!(shot.vx > 0.0);
        let outcome = simulate_shot(&level, &shot, 600, &Default::default());
        assert!(outcome.reached_goal());
        assert!(outcome.bounces >= 1);
    }

    #[test]
    fn test_phase_matters_for_moving_blocker() {
        let mut level = open_level();
        // Full-width lethal bar sliding sideways across the launch line
        level.obstacles.push(
            Obstacle::new(Vec2::new(0.0, 300.0), 800.0, 20.0)
                .lethal()
                .with_movement(Movement {
                    axis: MoveAxis::Horizontal,
                    kind: MoveKind::Continuous,
                    amplitude: 800.0,
                    angular_rate: FRAC_PI_2,
                    phase_offset: 0.0,
                }),
        );
        let verdict = find_winning_shot(&level, &SolverOptions::default(), &Default::default());
        let shot = verdict.shot.expect("a later phase clears the bar");
        assert!(shot.phase_offset_seconds > 0.0);

        let blocked = Shot {
            phase_offset_seconds: 0.0,
            ..shot
        };
        let outcome = simulate_shot(&level, &blocked, 600, &Default::default());
        assert_eq!(outcome.result, StepResult::LethalHit);
    }

    #[test]
    fn test_search_is_deterministic() {
        let mut level = open_level();
        level.obstacles.push(
            Obstacle::new(Vec2::new(250.0, 280.0), 300.0, 15.0).with_movement(Movement {
                axis: MoveAxis::Both,
                kind: MoveKind::Continuous,
                amplitude: 120.0,
                angular_rate: 1.3,
                phase_offset: 0.25,
            }),
        );
        let options = SolverOptions::default();
        let a = find_winning_shot(&level, &options, &Default::default());
        let b = find_winning_shot(&level, &options, &Default::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled_search_stops_early() {
        let level = open_level();
        let cancel = AtomicBool::new(true);
        let verdict = find_winning_shot_cancellable(
            &level,
            &SolverOptions::default(),
            &Default::default(),
            &cancel,
        );
        assert!(verdict.cancelled);
        assert!(!verdict.solvable());
        assert_eq!(verdict.shots_evaluated, 0);
    }

    #[test]
    fn test_frame_budget_exhaustion() {
        let level = open_level();
        let shot = Shot {
            vx: 0.0,
            vy: -600.0,
            phase_offset_seconds: 0.0,
        };
        let outcome = simulate_shot(&level, &shot, 5, &Default::default());
        assert_eq!(outcome.result, StepResult::None);
        assert_eq!(outcome.frames, 5);
    }

    #[test]
    fn test_trace_records_each_tick() {
        let level = open_level();
        let shot = Shot {
            vx: 0.0,
            vy: -600.0,
            phase_offset_seconds: 0.0,
        };
        let (outcome, path) = trace_shot(&level, &shot, 600, &Default::default());
        assert!(outcome.reached_goal());
        assert_eq!(path.len() as u32, outcome.frames);
        assert!(path.windows(2).all(|w| w[1].y < w[0].y));
    }

    #[test]
    fn test_caller_level_untouched() {
        let mut level = open_level();
        level.obstacles.push(Obstacle::new(Vec2::new(10.0, 10.0), 1.0, 1.0));
        let before = level.clone();
        let _ = find_winning_shot(&level, &SolverOptions::default(), &Default::default());
        assert_eq!(level, before);
    }

    #[test]
    fn test_huge_obstacle_angle_still_terminates() {
        let mut level = open_level();
        level
            .obstacles
            .push(Obstacle::new(Vec2::new(40.0, 300.0), 40.0, 10.0).with_angle(2.0e8));
        assert_eq!(level.validate(), Ok(()));
        let verdict = find_winning_shot(&level, &SolverOptions::default(), &Default::default());
        assert!(verdict.solvable());
    }
}
