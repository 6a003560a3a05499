//! Entity kinematics
//!
//! Every moving thing is an `Entity`: a `Body` (top-left position, velocity,
//! size) plus a kind tag and a few timers. Game sessions own their entities
//! in plain `Vec`s and compact with `retain` once per frame.

use glam::Vec2;

use super::aabb::Aabb;

/// Kinematic state; `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
        }
    }

    /// Body centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Free integration, no collision
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    pub fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.vel.y += gravity * dt;
    }
}

/// Seconds-remaining timer; inactive at or below zero
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Countdown(f32);

impl Countdown {
    pub fn reset(&mut self, seconds: f32) {
        self.0 = seconds;
    }

    /// Run down by `dt`. Returns true on the frame the timer expires
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.0 <= 0.0 {
            return false;
        }
        self.0 -= dt;
        self.0 <= 0.0
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.0 > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.0.max(0.0)
    }

    pub fn clear(&mut self) {
        self.0 = 0.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Ground patroller that turns at walls and ledges
    Walker,
    /// Shooter grunt: straight dive, straight shots
    Basic,
    /// Shooter elite: homes on the ship, aimed shots
    Advanced,
}

/// Timed serpent power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerKind {
    Speed,
    Slow,
    Shield,
    Multi,
}

impl PowerKind {
    pub const ALL: [PowerKind; 4] = [
        PowerKind::Speed,
        PowerKind::Slow,
        PowerKind::Shield,
        PowerKind::Multi,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    Coin,
    Gem,
    Health { boost: i32 },
    Bonus,
    Orb,
    Power(PowerKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Enemy(EnemyKind),
    Projectile { friendly: bool, damage: i32 },
    Collectible(CollectibleKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn from_velocity(vx: f32, current: Facing) -> Facing {
        if vx > 0.0 {
            Facing::Right
        } else if vx < 0.0 {
            Facing::Left
        } else {
            current
        }
    }
}

/// A moving actor in a session
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub body: Body,
    /// Dead entities are removed at the end of the frame
    pub alive: bool,
    pub facing: Facing,
    /// Per-entity action timer (enemy fire, etc.)
    pub cooldown: Countdown,
    /// Seconds since spawn
    pub age: f32,
    pub hp: i32,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, body: Body) -> Self {
        Self {
            id,
            kind,
            body,
            alive: true,
            facing: Facing::default(),
            cooldown: Countdown::default(),
            age: 0.0,
            hp: 1,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match self.kind {
            EntityKind::Enemy(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn collectible_kind(&self) -> Option<CollectibleKind> {
        match self.kind {
            EntityKind::Collectible(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Result of a player's interaction pass for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Clear,
    /// Touched a hazard tile
    Hazard,
    /// Left the world
    OutOfBounds,
    /// Took a hit
    Damaged { amount: i32 },
    /// Stomped an enemy
    Defeated(EnemyKind),
    Collected(CollectibleKind),
}

impl Outcome {
    /// Hazard/out-of-bounds beat enemy contact, which beats pickups
    pub fn priority(self) -> u8 {
        match self {
            Outcome::Hazard | Outcome::OutOfBounds => 3,
            Outcome::Damaged { .. } | Outcome::Defeated(_) => 2,
            Outcome::Collected(_) => 1,
            Outcome::Clear => 0,
        }
    }

    /// Keep whichever of the two outranks the other; ties keep `self`
    pub fn or(self, other: Outcome) -> Outcome {
        if other.priority() > self.priority() {
            other
        } else {
            self
        }
    }
}

/// Sequential id source
#[derive(Debug, Clone, Default)]
pub struct IdGen(u32);

impl IdGen {
    pub fn next_id(&mut self) -> u32 {
        let id = self.0;
        self.0 = self.0.wrapping_add(1);
        id
    }
}
