//! Rebound - ball-launch arena physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, kinematics, step, solver)
//! - `level`: Level records, JSON loading and validation
//! - `generate`: Seeded procedural level generation
//! - `settings`: Data-driven physics policy

pub mod generate;
pub mod level;
pub mod settings;
pub mod sim;

pub use level::LevelError;
pub use settings::{PhysicsSettings, TieBreak};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Launch speed magnitude (pixels/s)
    pub const LAUNCH_SPEED: f32 = 600.0;
    /// Launches never go flatter than this upward speed (pixels/s)
    pub const MIN_UPWARD_SPEED: f32 = 120.0;
    /// Gap between the launcher body and a resting ball
    pub const LAUNCH_CLEARANCE: f32 = 2.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;

    /// Goal tolerance factor k: home when dist < goal_radius - k * ball_radius
    pub const GOAL_TOLERANCE: f32 = 0.5;

    /// Push-out multiplier applied to the penetration depth on bounce
    pub const PUSH_FACTOR: f32 = 1.01;

    /// Smallest allowed obstacle width/height
    pub const MIN_OBSTACLE_DIMENSION: f32 = 5.0;

    /// Two separating axes with |a·b| above this are treated as parallel
    pub const AXIS_PARALLEL_TOLERANCE: f32 = 0.999;
}

/// Normalized angle to [-π, π)
///
/// Non-finite input maps to 0. Runs in constant time for any magnitude.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU itself
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn in_range(a: f32) -> bool {
        (-PI..PI).contains(&a)
    }

    #[test]
    fn test_normalize_angle() {
        // 3π lands on the ±π seam; either side is the same direction
        let seam = normalize_angle(3.0 * PI);
        assert!(in_range(seam));
        assert!((seam.abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI / 4.0) + PI / 4.0).abs() < 1e-6);
        assert!((normalize_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
        assert_eq!(normalize_angle(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_normalize_huge_angles_terminates_in_range() {
        for angle in [2.0e8, -2.0e8, 1.0e30, -1.0e30, f32::MAX, f32::MIN, -1e-8] {
            let a = normalize_angle(angle);
            assert!(in_range(a), "{angle} -> {a}");
        }
    }
}
