//! Arcade Trio - three real-time arcade games on one simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, particles, game flow)
//! - `games`: The three game sessions (platformer, shooter, serpent)
//! - `clock`: Bounded per-frame delta time
//! - `input` / `audio` / `render`: Boundaries to the excluded collaborators
//! - `settings` / `tuning`: Configuration and data-driven game balance

pub mod audio;
pub mod clock;
pub mod games;
pub mod highscores;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Engine-wide constants
pub mod consts {
    /// Largest delta time a single frame may advance the simulation by (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Default frame rate the native clock paces to
    pub const TARGET_FPS: u32 = 60;
    /// Reference frame length used to convert per-frame factors into per-second ones
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
}

/// Unit direction from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let dist = delta.length();
    if dist > f32::EPSILON {
        Some(delta / dist)
    } else {
        None
    }
}

/// Move `current` toward `target` by at most `max_step`
#[inline]
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    if (target - current).abs() <= max_step {
        target
    } else if target > current {
        current + max_step
    } else {
        current - max_step
    }
}

/// Scale a per-reference-frame damping factor to an arbitrary dt
#[inline]
pub fn damping(factor_per_frame: f32, dt: f32) -> f32 {
    factor_per_frame.powf(dt / consts::REFERENCE_DT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_to_coincident_points_is_none() {
        assert!(direction_to(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0)).is_none());
        let dir = direction_to(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn approach_clamps_to_target() {
        assert_eq!(approach(0.0, 10.0, 3.0), 3.0);
        assert_eq!(approach(9.0, 10.0, 3.0), 10.0);
        assert_eq!(approach(0.0, -10.0, 4.0), -4.0);
    }

    #[test]
    fn damping_matches_reference_frame() {
        assert!((damping(0.95, consts::REFERENCE_DT) - 0.95).abs() < 1e-6);
        assert_eq!(damping(0.95, 0.0), 1.0);
    }
}
