//! Data-driven game balance
//!
//! Every number a designer might want to tweak lives here, with the shipped
//! values as `Default`. Loaded as part of [`crate::Settings`].

use serde::{Deserialize, Serialize};

use crate::sim::level::LevelDescriptor;

/// Escape Rush (platformer) balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerTuning {
    pub screen_width: f32,
    pub screen_height: f32,
    pub tile_size: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub run_speed: f32,
    pub sprint_speed: f32,
    pub acceleration: f32,
    pub friction: f32,
    pub jump_velocity: f32,
    /// Seconds the jump keeps boosting while held
    pub jump_boost_window: f32,
    pub jump_boost: f32,
    pub gravity: f32,
    pub enemy_gravity: f32,
    pub enemy_speed: f32,
    pub enemy_size: f32,
    pub stomp_bounce: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub invulnerability: f32,
    /// Player y beyond which the player has fallen out of the world
    pub fall_limit: f32,
    /// Vertical band above a moving platform top that still lands
    pub platform_tolerance: f32,
    /// Forward/downward distance of the ledge probe past the leading edge
    pub ledge_probe: f32,
    pub lives: u32,
    pub time_limit: f32,
    pub coin_score: u64,
    pub gem_score: u64,
    /// Custom level; the built-in one when absent
    pub level: Option<LevelDescriptor>,
}

impl Default for PlatformerTuning {
    fn default() -> Self {
        Self {
            screen_width: 1200.0,
            screen_height: 800.0,
            tile_size: 40.0,
            player_width: 24.0,
            player_height: 32.0,
            run_speed: 180.0,
            sprint_speed: 280.0,
            acceleration: 1200.0,
            friction: 800.0,
            jump_velocity: -480.0,
            jump_boost_window: 0.15,
            jump_boost: 400.0,
            gravity: 1200.0,
            enemy_gravity: 800.0,
            enemy_speed: 60.0,
            enemy_size: 20.0,
            stomp_bounce: -200.0,
            knockback_x: 150.0,
            knockback_y: -200.0,
            invulnerability: 1.5,
            fall_limit: 900.0,
            platform_tolerance: 15.0,
            ledge_probe: 5.0,
            lives: 3,
            time_limit: 300.0,
            coin_score: 100,
            gem_score: 500,
            level: None,
        }
    }
}

/// Stellar Defender (shooter) balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub screen_width: f32,
    pub screen_height: f32,
    pub ship_width: f32,
    pub ship_height: f32,
    pub acceleration: f32,
    /// Extra multiplier on horizontal acceleration
    pub strafe_boost: f32,
    /// Velocity kept per 1/60 s
    pub friction: f32,
    pub max_speed: f32,
    pub max_health: i32,
    pub invulnerability: f32,
    pub fire_cooldown: f32,
    pub bolt_speed: f32,
    pub enemy_size: f32,
    pub basic_speed: f32,
    pub advanced_speed: f32,
    pub enemy_bolt_speed: f32,
    pub aimed_bolt_speed: f32,
    pub enemy_fire_min: f32,
    pub enemy_fire_max: f32,
    pub bolt_damage: i32,
    pub ram_damage: i32,
    pub basic_score: u64,
    pub advanced_score: u64,
    pub deflect_score: u64,
    pub bonus_score: u64,
    pub powerup_fall_speed: f32,
    pub health_chance: f64,
    pub health_boost_min: i32,
    pub health_boost_max: i32,
    pub spawn_interval_base: f32,
    pub spawn_interval_min: f32,
    pub powerup_interval_min: f32,
    pub powerup_interval_max: f32,
    pub points_per_level: u64,
    pub difficulty_step: f32,
    /// Chance per difficulty point that a spawn is an advanced enemy
    pub advanced_chance: f32,
    pub victory_level: u32,
    pub exhaust_interval: f32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            screen_width: 1000.0,
            screen_height: 700.0,
            ship_width: 30.0,
            ship_height: 40.0,
            acceleration: 2000.0,
            strafe_boost: 2.0,
            friction: 0.95,
            max_speed: 800.0,
            max_health: 100,
            invulnerability: 1.0,
            fire_cooldown: 0.1,
            bolt_speed: 700.0,
            enemy_size: 25.0,
            basic_speed: 150.0,
            advanced_speed: 100.0,
            enemy_bolt_speed: 200.0,
            aimed_bolt_speed: 250.0,
            enemy_fire_min: 1.0,
            enemy_fire_max: 2.5,
            bolt_damage: 20,
            ram_damage: 30,
            basic_score: 100,
            advanced_score: 250,
            deflect_score: 25,
            bonus_score: 500,
            powerup_fall_speed: 100.0,
            health_chance: 0.7,
            health_boost_min: 25,
            health_boost_max: 30,
            spawn_interval_base: 2.0,
            spawn_interval_min: 0.5,
            powerup_interval_min: 3.0,
            powerup_interval_max: 6.0,
            points_per_level: 1000,
            difficulty_step: 0.3,
            advanced_chance: 0.3,
            victory_level: 4,
            exhaust_interval: 0.05,
        }
    }
}

/// Quantum Serpent (snake) balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpentTuning {
    pub screen_width: f32,
    pub screen_height: f32,
    pub grid_size: f32,
    pub base_speed: f32,
    pub speed_per_level: f32,
    pub boost_factor: f32,
    pub slow_factor: f32,
    pub follow_rate: f32,
    /// Segments this close to the head never count as a self-hit
    pub neck_segments: usize,
    /// Self-hit distance as a fraction of the grid size
    pub self_hit_ratio: f32,
    pub targets: Vec<u64>,
    pub default_target: usize,
    pub initial_orbs: usize,
    pub orbs_per_eat: usize,
    pub orbs_per_eat_multi: usize,
    pub orb_score: u64,
    pub powerup_score: u64,
    pub speed_duration: f32,
    pub slow_duration: f32,
    pub shield_duration: f32,
    pub multi_duration: f32,
    pub powerup_interval_min: f32,
    pub powerup_interval_max: f32,
    pub max_powerups: usize,
    pub points_per_level: u64,
    pub trail_chance: f64,
    /// Per-frame chance of a drifting mote on the title screen
    pub ambient_chance: f64,
    /// Attempts to find a free cell before giving up on a spawn
    pub spawn_attempts: u32,
}

impl Default for SerpentTuning {
    fn default() -> Self {
        Self {
            screen_width: 1200.0,
            screen_height: 800.0,
            grid_size: 20.0,
            base_speed: 200.0,
            speed_per_level: 20.0,
            boost_factor: 1.8,
            slow_factor: 0.5,
            follow_rate: 15.0,
            neck_segments: 4,
            self_hit_ratio: 0.8,
            targets: vec![2000, 5000, 10000, 15000],
            default_target: 1,
            initial_orbs: 3,
            orbs_per_eat: 2,
            orbs_per_eat_multi: 5,
            orb_score: 100,
            powerup_score: 50,
            speed_duration: 5.0,
            slow_duration: 8.0,
            shield_duration: 10.0,
            multi_duration: 15.0,
            powerup_interval_min: 15.0,
            powerup_interval_max: 25.0,
            max_powerups: 2,
            points_per_level: 1000,
            trail_chance: 0.3,
            ambient_chance: 0.05,
            spawn_attempts: 256,
        }
    }
}
