//! Seeded procedural level generation
//!
//! Same seed, same level. Candidates are run through the solver and only
//! solvable ones are handed out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_3, TAU};

use crate::settings::PhysicsSettings;
use crate::sim::{
    Goal, Level, MoveAxis, MoveKind, Movement, Obstacle, Shot, SolverOptions, circle_rect_overlap,
    find_winning_shot,
};

/// Shape of generated levels
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub width: f32,
    pub height: f32,
    pub obstacle_count: u32,
    /// Probability an obstacle is lethal
    pub lethal_chance: f64,
    /// Probability an obstacle moves
    pub moving_chance: f64,
    /// Probability an obstacle is rotated
    pub rotated_chance: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            obstacle_count: 6,
            lethal_chance: 0.2,
            moving_chance: 0.3,
            rotated_chance: 0.5,
        }
    }
}

/// Placement attempts per obstacle before it is dropped
const PLACEMENT_TRIES: u32 = 8;

/// Goal radius for generated levels
const GOAL_RADIUS: f32 = 20.0;

/// Build a level from `seed`
pub fn generate_level(seed: u64, params: &GeneratorParams) -> Level {
    let mut rng = Pcg32::seed_from_u64(seed);
    let (w, h) = (params.width, params.height);

    let goal = Goal {
        center: Vec2::new(
            rng.random_range(0.2 * w..0.8 * w),
            rng.random_range(0.1 * h..0.3 * h),
        ),
        radius: GOAL_RADIUS,
    };
    let mut level = Level::new(w, h, goal);
    level.name = format!("generated-{seed}");

    // Keep-out zones: goal, and the launcher plus the space right above it
    let goal_clearance = goal.radius + 2.0 * level.ball_radius;
    let launch_zone = level.launcher.head(level.ball_radius);
    let launch_clearance = level.launcher.width.max(level.launcher.height) + level.ball_radius;

    for _ in 0..params.obstacle_count {
        for _ in 0..PLACEMENT_TRIES {
            let obstacle = random_obstacle(&mut rng, params);
            let rect = obstacle.rect_at(0.0);
            let blocks_goal = circle_rect_overlap(goal.center, goal_clearance, &rect).is_some();
            let blocks_launch =
                circle_rect_overlap(launch_zone, launch_clearance, &rect).is_some();
            if !blocks_goal && !blocks_launch {
                level.obstacles.push(obstacle);
                break;
            }
        }
    }

    log::debug!(
        "Generated level {} with {} obstacles",
        level.name,
        level.obstacles.len()
    );
    level
}

fn random_obstacle(rng: &mut Pcg32, params: &GeneratorParams) -> Obstacle {
    let (w, h) = (params.width, params.height);
    let width = rng.random_range(40.0..200.0f32).min(w);
    let height = rng.random_range(10.0..25.0f32).min(h);
    let anchor = Vec2::new(
        rng.random_range(0.0..(w - width).max(1.0)),
        rng.random_range(0.3 * h..0.75 * h),
    );

    let mut obstacle = Obstacle::new(anchor, width, height);
    if rng.random_bool(params.rotated_chance) {
        obstacle.angle = rng.random_range(-FRAC_PI_3..FRAC_PI_3);
    }
    obstacle.lethal = rng.random_bool(params.lethal_chance);

    if rng.random_bool(params.moving_chance) {
        let axis = match rng.random_range(0..3u8) {
            0 => MoveAxis::Horizontal,
            1 => MoveAxis::Vertical,
            _ => MoveAxis::Both,
        };
        let kind = if rng.random_bool(0.25) {
            MoveKind::Stepped
        } else {
            MoveKind::Continuous
        };
        let angular_rate = rng.random_range(0.5..2.5f32);
        obstacle.movement = Some(Movement {
            axis,
            kind,
            amplitude: rng.random_range(20.0..100.0),
            angular_rate,
            phase_offset: rng.random_range(0.0..TAU / angular_rate),
        });
    }
    obstacle
}

/// Generate levels from `seed` upward until one is solvable
///
/// Returns the level, its example shot, and the seed that produced it.
pub fn generate_solvable(
    seed: u64,
    max_attempts: u32,
    params: &GeneratorParams,
    options: &SolverOptions,
    settings: &PhysicsSettings,
) -> Option<(Level, Shot, u64)> {
    for attempt in 0..max_attempts as u64 {
        let candidate_seed = seed.wrapping_add(attempt);
        let level = generate_level(candidate_seed, params);
        let verdict = find_winning_shot(&level, options, settings);
        match verdict.shot {
            Some(shot) => return Some((level, shot, candidate_seed)),
            None => log::info!("Rejected unsolvable level {}", level.name),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_level() {
        let params = GeneratorParams::default();
        assert_eq!(generate_level(42, &params), generate_level(42, &params));
        assert_ne!(generate_level(42, &params), generate_level(43, &params));
    }

    #[test]
    fn test_generated_levels_validate() {
        let params = GeneratorParams::default();
        for seed in 0..50 {
            let level = generate_level(seed, &params);
            assert_eq!(level.validate(), Ok(()), "seed {seed}");
            assert!(level.obstacles.len() <= params.obstacle_count as usize);
        }
    }

    #[test]
    fn test_obstacles_keep_clear_of_goal_and_launcher() {
        let params = GeneratorParams {
            obstacle_count: 20,
            ..Default::default()
        };
        for seed in 0..20 {
            let level = generate_level(seed, &params);
            for obstacle in &level.obstacles {
                let rect = obstacle.rect_at(0.0);
                assert!(circle_rect_overlap(level.goal.center, level.goal.radius, &rect).is_none());
                assert!(circle_rect_overlap(level.launcher.position, 10.0, &rect).is_none());
            }
        }
    }

    #[test]
    fn test_empty_level_generation_is_solvable() {
        let params = GeneratorParams {
            obstacle_count: 0,
            ..Default::default()
        };
        let found = generate_solvable(
            7,
            1,
            &params,
            &SolverOptions::default(),
            &PhysicsSettings::default(),
        );
        let (level, shot, seed) = found.expect("open arena is always solvable");
        assert_eq!(seed, 7);
        assert!(level.obstacles.is_empty());
        assert!(shot.vy < 0.0);
    }
}
