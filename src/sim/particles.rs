//! Transient particle effects
//!
//! Purely visual: nothing in the gameplay reads particle state. Each emission
//! appends a batch; `advance` integrates then prunes, so a particle's last
//! frame still renders at its faded alpha. The system never caps its own
//! size - call sites keep bursts small (5-50 per emission).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::render::{Color, Shape, Surface, palette};

/// Default downward acceleration for kinds that fall (units/s²)
pub const PARTICLE_GRAVITY: f32 = 300.0;

/// Visual kind of an emission; decides velocity, color, life and size ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Puff kicked up by a jump
    JumpDust,
    /// Glitter from a collected coin or gem
    CoinSparkle,
    /// Pieces of a stomped enemy
    EnemyBurst,
    /// Radial blast of a destroyed ship
    Explosion,
    /// Engine exhaust trailing a ship
    Exhaust,
    /// Ring of sparks around a collected power-up
    Pickup,
    /// Short flash at a gun barrel
    MuzzleFlash,
    /// Impact of a bolt on a target
    HitBlast,
    /// General radial burst
    Burst,
    /// Soft trail behind the serpent's head
    Wisp,
    /// Slow drifting background mote
    Ambient,
}

impl ParticleKind {
    /// Whether this kind falls under gravity
    pub fn falls(self) -> bool {
        matches!(
            self,
            ParticleKind::JumpDust | ParticleKind::CoinSparkle | ParticleKind::EnemyBurst
        )
    }

    fn spawn(self, rng: &mut Pcg32, origin: Vec2, tint: Option<Color>) -> Particle {
        let (vel, color, life, size) = match self {
            ParticleKind::JumpDust => (
                Vec2::new(rng.random_range(-50.0..50.0), rng.random_range(-100.0..-20.0)),
                tint.unwrap_or(palette::GRAY),
                0.5,
                2.0,
            ),
            ParticleKind::CoinSparkle => (
                Vec2::new(rng.random_range(-80.0..80.0), rng.random_range(-120.0..-40.0)),
                tint.unwrap_or_else(|| pick(rng, &[palette::GOLD, palette::YELLOW, palette::WHITE])),
                0.8,
                3.0,
            ),
            ParticleKind::EnemyBurst => (
                Vec2::new(rng.random_range(-120.0..120.0), rng.random_range(-150.0..-50.0)),
                tint.unwrap_or(palette::RED),
                1.0,
                4.0,
            ),
            ParticleKind::Explosion => (
                radial(rng, 50.0, 150.0),
                tint.unwrap_or(palette::ORANGE),
                1.0,
                rng.random_range(2..=6) as f32,
            ),
            ParticleKind::Exhaust => (
                Vec2::new(rng.random_range(-20.0..20.0), rng.random_range(20.0..60.0)),
                tint.unwrap_or(palette::CYAN),
                0.5,
                2.0,
            ),
            ParticleKind::Pickup => (
                radial(rng, 30.0, 80.0),
                tint.unwrap_or_else(|| pick(rng, &[palette::GOLD, palette::YELLOW, palette::WHITE])),
                0.8,
                3.0,
            ),
            ParticleKind::MuzzleFlash => (
                Vec2::new(rng.random_range(-30.0..30.0), rng.random_range(-50.0..-20.0)),
                tint.unwrap_or_else(|| pick(rng, &[palette::WHITE, palette::YELLOW, palette::ORANGE])),
                0.2,
                rng.random_range(3..=6) as f32,
            ),
            ParticleKind::HitBlast => (
                radial(rng, 80.0, 200.0),
                tint.unwrap_or_else(|| {
                    pick(rng, &[palette::RED, palette::ORANGE, palette::YELLOW, palette::WHITE])
                }),
                0.8,
                rng.random_range(4..=8) as f32,
            ),
            ParticleKind::Burst => (
                radial(rng, 50.0, 200.0),
                tint.unwrap_or(palette::NEON_CYAN),
                rng.random_range(0.5..1.5),
                rng.random_range(2.0..6.0),
            ),
            ParticleKind::Wisp => (
                Vec2::new(rng.random_range(-30.0..30.0), rng.random_range(-30.0..30.0)),
                tint.unwrap_or(palette::NEON_PURPLE),
                0.8,
                4.0,
            ),
            ParticleKind::Ambient => (
                Vec2::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0)),
                tint.unwrap_or_else(|| {
                    pick(rng, &[palette::NEON_CYAN, palette::NEON_PURPLE, palette::NEON_GREEN])
                }),
                2.0,
                2.0,
            ),
        };

        Particle {
            kind: self,
            pos: origin,
            vel,
            color,
            life,
            max_life: life,
            size,
        }
    }
}

fn radial(rng: &mut Pcg32, min_speed: f32, max_speed: f32) -> Vec2 {
    let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    let speed: f32 = rng.random_range(min_speed..max_speed);
    Vec2::new(angle.cos(), angle.sin()) * speed
}

fn pick(rng: &mut Pcg32, colors: &[Color]) -> Color {
    colors[rng.random_range(0..colors.len())]
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// Seconds left; the particle is inert at or below zero
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl Particle {
    /// Linear fade 1 → 0 over the particle's life
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Owner of every live particle
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Pcg32,
    gravity: f32,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self::with_gravity(seed, PARTICLE_GRAVITY)
    }

    pub fn with_gravity(seed: u64, gravity: f32) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            gravity,
        }
    }

    /// Append `count` particles of `kind` around `origin`; `tint` overrides the kind's color
    pub fn emit(&mut self, kind: ParticleKind, origin: Vec2, count: usize, tint: Option<Color>) {
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = kind.spawn(&mut self.rng, origin, tint);
            self.particles.push(particle);
        }
    }

    /// With probability `chance`, add one particle of `kind` somewhere inside `area`
    pub fn drift(&mut self, kind: ParticleKind, area: Vec2, chance: f64) {
        if !(area.x > 0.0 && area.y > 0.0) || !self.rng.random_bool(chance.clamp(0.0, 1.0)) {
            return;
        }
        let at = Vec2::new(self.rng.random_range(0.0..area.x), self.rng.random_range(0.0..area.y));
        let particle = kind.spawn(&mut self.rng, at, None);
        self.particles.push(particle);
    }

    /// Integrate, age, then drop every particle whose life ran out
    pub fn advance(&mut self, dt: f32) {
        let gravity = self.gravity;
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            if p.kind.falls() {
                p.vel.y += gravity * dt;
            }
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Draw every live particle, shifted by `-camera`
    pub fn render(&self, surface: &mut dyn Surface, camera: Vec2) {
        for p in &self.particles {
            let alpha = p.alpha();
            surface.draw(Shape::Circle {
                center: p.pos - camera,
                radius: (p.size * alpha).max(1.0),
                color: p.color.scaled(alpha),
            });
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
