//! Quantum Serpent: free-moving snake on a grid-aligned field
//!
//! The head moves continuously; body segments chase the one ahead of them
//! at a fixed spacing. The player picks a target score before the run and
//! wins by reaching it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::SoundCue;
use crate::input::Action;
use crate::render::{Color, Hud, Shape, Surface, palette};
use crate::settings::Settings;
use crate::sim::entity::{Body, CollectibleKind, Countdown, Entity, EntityKind, IdGen, PowerKind};
use crate::sim::particles::{ParticleKind, ParticleSystem};
use crate::sim::state::{FrameContext, Session, Verdict};
use crate::tuning::SerpentTuning;

/// Fireworks when the target score is reached
const CELEBRATION_BURSTS: usize = 50;
const CELEBRATION_SPARKS: usize = 15;
const CELEBRATION_COLORS: [Color; 4] =
    [palette::GOLD, palette::NEON_CYAN, palette::NEON_PURPLE, palette::NEON_GREEN];

/// Travel direction; the serpent only ever moves along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heading {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Heading {
    pub fn vec(self) -> Vec2 {
        match self {
            Heading::Up => Vec2::NEG_Y,
            Heading::Down => Vec2::Y,
            Heading::Left => Vec2::NEG_X,
            Heading::Right => Vec2::X,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Heading::Left | Heading::Right)
    }

    /// Requested turn from held input; reversals and same-axis turns are ignored
    fn steer(self, held: impl Fn(Action) -> bool) -> Heading {
        let wanted = [
            (Action::Left, Heading::Left),
            (Action::Right, Heading::Right),
            (Action::Up, Heading::Up),
            (Action::Down, Heading::Down),
        ];
        wanted
            .into_iter()
            .find(|(action, heading)| held(*action) && heading.is_horizontal() != self.is_horizontal())
            .map(|(_, heading)| heading)
            .unwrap_or(self)
    }
}

/// Remaining time on each power-up effect
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub speed: Countdown,
    pub slow: Countdown,
    pub shield: Countdown,
    pub multi: Countdown,
}

impl Effects {
    fn tick(&mut self, dt: f32) {
        self.speed.tick(dt);
        self.slow.tick(dt);
        self.shield.tick(dt);
        self.multi.tick(dt);
    }

    fn apply(&mut self, kind: PowerKind, tuning: &SerpentTuning) {
        match kind {
            PowerKind::Speed => self.speed.reset(tuning.speed_duration),
            PowerKind::Slow => self.slow.reset(tuning.slow_duration),
            PowerKind::Shield => self.shield.reset(tuning.shield_duration),
            PowerKind::Multi => self.multi.reset(tuning.multi_duration),
        }
    }

    /// Speed boost wins over slow-down when both are running
    fn speed_factor(&self, tuning: &SerpentTuning) -> f32 {
        if self.speed.active() {
            tuning.boost_factor
        } else if self.slow.active() {
            tuning.slow_factor
        } else {
            1.0
        }
    }
}

fn power_color(kind: PowerKind) -> Color {
    match kind {
        PowerKind::Speed => palette::NEON_GREEN,
        PowerKind::Slow => palette::NEON_PURPLE,
        PowerKind::Shield => palette::NEON_CYAN,
        PowerKind::Multi => palette::NEON_ORANGE,
    }
}

/// One run of Quantum Serpent
pub struct Serpent {
    tuning: SerpentTuning,
    rng: Pcg32,
    target: u64,
    /// Segment centers, head first
    segments: Vec<Vec2>,
    heading: Heading,
    effects: Effects,
    orbs: Vec<Entity>,
    powerups: Vec<Entity>,
    ids: IdGen,
    score: u64,
    level: u32,
    powerup_timer: f32,
    powerup_due: f32,
    crashed: bool,
    clock: f32,
}

impl Serpent {
    pub fn new(tuning: SerpentTuning, target: u64, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let powerup_due = roll(&mut rng, tuning.powerup_interval_min, tuning.powerup_interval_max);
        let head = Vec2::new(tuning.screen_width, tuning.screen_height) * 0.5;
        let mut serpent = Self {
            tuning,
            rng,
            target,
            segments: vec![head],
            heading: Heading::default(),
            effects: Effects::default(),
            orbs: Vec::new(),
            powerups: Vec::new(),
            ids: IdGen::default(),
            score: 0,
            level: 1,
            powerup_timer: 0.0,
            powerup_due,
            crashed: false,
            clock: 0.0,
        };
        for _ in 0..serpent.tuning.initial_orbs {
            serpent.spawn_orb();
        }
        serpent
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn head(&self) -> Vec2 {
        self.segments[0]
    }

    pub fn segments(&self) -> &[Vec2] {
        &self.segments
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn orbs(&self) -> &[Entity] {
        &self.orbs
    }

    pub fn powerups(&self) -> &[Entity] {
        &self.powerups
    }

    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// Head speed before power-up effects
    pub fn base_speed(&self) -> f32 {
        self.tuning.base_speed + self.tuning.speed_per_level * (self.level - 1) as f32
    }

    /// Center of a random free cell at least two cells from every edge
    fn free_cell(&mut self) -> Option<Vec2> {
        let grid = self.tuning.grid_size;
        let cols = (self.tuning.screen_width / grid) as i32;
        let rows = (self.tuning.screen_height / grid) as i32;
        if cols < 4 || rows < 4 {
            return None;
        }

        for _ in 0..self.tuning.spawn_attempts {
            let cx = self.rng.random_range(2..=cols - 2);
            let cy = self.rng.random_range(2..=rows - 2);
            let spot = Vec2::new(cx as f32, cy as f32) * grid + Vec2::splat(grid * 0.5);

            let near = |p: Vec2| (p.x - spot.x).abs() < grid && (p.y - spot.y).abs() < grid;
            let blocked = self.segments.iter().any(|s| near(*s))
                || self.orbs.iter().chain(&self.powerups).any(|e| near(e.body.center()));
            if !blocked {
                return Some(spot);
            }
        }
        None
    }

    fn spawn_orb(&mut self) {
        let Some(spot) = self.free_cell() else {
            log::debug!("No free cell for an orb, skipping");
            return;
        };
        let body = Body::centered(spot, Vec2::splat(self.tuning.grid_size));
        let kind = EntityKind::Collectible(CollectibleKind::Orb);
        self.orbs.push(Entity::new(self.ids.next_id(), kind, body));
    }

    fn spawn_powerup(&mut self) {
        let power = PowerKind::ALL[self.rng.random_range(0..PowerKind::ALL.len())];
        let Some(spot) = self.free_cell() else {
            log::debug!("No free cell for {:?} power-up, skipping", power);
            return;
        };
        let body = Body::centered(spot, Vec2::splat(self.tuning.grid_size));
        let kind = EntityKind::Collectible(CollectibleKind::Power(power));
        self.powerups.push(Entity::new(self.ids.next_id(), kind, body));
    }

    fn slither(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = ctx.dt;
        let input = ctx.input;
        let turned = self.heading.steer(|a| input.is_held(a));
        if turned != self.heading {
            self.heading = turned;
            ctx.particles.emit(ParticleKind::Burst, self.head(), 8, Some(palette::NEON_CYAN));
            ctx.audio.play(SoundCue::Turn);
        }

        self.effects.tick(dt);
        let speed = self.base_speed() * self.effects.speed_factor(&self.tuning);
        self.segments[0] += self.heading.vec() * speed * dt;

        let spacing = self.tuning.grid_size;
        let blend = (self.tuning.follow_rate * dt).min(1.0);
        for i in 1..self.segments.len() {
            let lead = self.segments[i - 1];
            let seg = self.segments[i];
            let gap = lead - seg;
            let dist = gap.length();
            if dist > spacing {
                let slot = lead - gap / dist * spacing;
                self.segments[i] = seg + (slot - seg) * blend;
            }
        }

        if self.rng.random_bool(self.tuning.trail_chance.clamp(0.0, 1.0)) {
            ctx.particles.emit(ParticleKind::Wisp, self.head(), 3, Some(palette::NEON_PURPLE));
        }
    }

    /// Wall contact, or the head touching the body past the neck
    fn hits_something(&self) -> bool {
        let head = self.head();
        let (w, h) = (self.tuning.screen_width, self.tuning.screen_height);
        if head.x < 0.0 || head.x >= w || head.y < 0.0 || head.y >= h {
            return true;
        }
        if self.effects.shield.active() {
            return false;
        }
        let reach = self.tuning.grid_size * self.tuning.self_hit_ratio;
        self.segments
            .iter()
            .skip(self.tuning.neck_segments)
            .any(|s| s.distance(head) < reach)
    }

    fn collect(&mut self, ctx: &mut FrameContext<'_>) {
        let head = self.head();
        let reach = self.tuning.grid_size;

        let mut eaten = 0;
        for orb in self.orbs.iter_mut().filter(|o| o.alive) {
            if orb.body.center().distance(head) < reach {
                orb.alive = false;
                eaten += 1;
                ctx.particles.emit(ParticleKind::Burst, orb.body.center(), 20, Some(palette::GOLD));
            }
        }
        self.orbs.retain(|o| o.alive);

        for _ in 0..eaten {
            if let Some(&tail) = self.segments.last() {
                self.segments.push(tail);
            }
            self.score += self.tuning.orb_score * self.level as u64;
            ctx.audio.play(SoundCue::Coin);
            let count = if self.effects.multi.active() {
                self.tuning.orbs_per_eat_multi
            } else {
                self.tuning.orbs_per_eat
            };
            for _ in 0..count {
                self.spawn_orb();
            }
        }

        for powerup in self.powerups.iter_mut().filter(|p| p.alive) {
            if powerup.body.center().distance(head) >= reach {
                continue;
            }
            powerup.alive = false;
            if let Some(CollectibleKind::Power(kind)) = powerup.collectible_kind() {
                let tint = Some(power_color(kind));
                ctx.particles.emit(ParticleKind::Burst, powerup.body.center(), 15, tint);
                ctx.audio.play(SoundCue::PowerUp);
                self.effects.apply(kind, &self.tuning);
                self.score += self.tuning.powerup_score;
                log::debug!("Serpent picked up {:?}", kind);
            }
        }
        self.powerups.retain(|p| p.alive);
    }

    fn run_spawner(&mut self, dt: f32) {
        self.powerup_timer += dt;
        if self.powerup_timer > self.powerup_due {
            self.powerup_timer = 0.0;
            self.powerup_due = roll(
                &mut self.rng,
                self.tuning.powerup_interval_min,
                self.tuning.powerup_interval_max,
            );
            if self.powerups.len() < self.tuning.max_powerups {
                self.spawn_powerup();
            }
        }
    }

    /// Bursts scattered over the whole field
    fn celebrate(&mut self, particles: &mut ParticleSystem) {
        let (w, h) = (self.tuning.screen_width, self.tuning.screen_height);
        for _ in 0..CELEBRATION_BURSTS {
            let at = Vec2::new(roll(&mut self.rng, 0.0, w), roll(&mut self.rng, 0.0, h));
            let color = CELEBRATION_COLORS[self.rng.random_range(0..CELEBRATION_COLORS.len())];
            particles.emit(ParticleKind::Burst, at, CELEBRATION_SPARKS, Some(color));
        }
    }

    fn update_level(&mut self, ctx: &mut FrameContext<'_>) {
        let per_level = self.tuning.points_per_level.max(1);
        let level = (self.score / per_level) as u32 + 1;
        if level > self.level {
            self.level = level;
            let banner = Vec2::new(self.tuning.screen_width * 0.5, 100.0);
            ctx.particles.emit(ParticleKind::Burst, banner, 30, Some(palette::NEON_GREEN));
            ctx.audio.play(SoundCue::LevelUp);
            log::info!("Quantum Serpent level {}, speed {:.0}", level, self.base_speed());
        }
    }
}

/// Uniform in `[lo, hi)`, or `lo` when the range is empty
fn roll(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

impl Session for Serpent {
    const TITLE: &'static str = "Quantum Serpent";

    fn targets(settings: &Settings) -> Vec<u64> {
        settings.serpent.targets.clone()
    }

    fn default_target(settings: &Settings) -> usize {
        settings.serpent.default_target
    }

    fn ambient(settings: &Settings) -> Option<(Vec2, f64)> {
        let tuning = &settings.serpent;
        let area = Vec2::new(tuning.screen_width, tuning.screen_height);
        Some((area, tuning.ambient_chance))
    }

    fn start(settings: &Settings, target: Option<u64>, seed: u64) -> Self {
        let tuning = settings.serpent.clone();
        let target = target
            .or_else(|| tuning.targets.get(tuning.default_target).copied())
            .unwrap_or(u64::MAX);
        Self::new(tuning, target, seed)
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.clock += ctx.dt;
        self.slither(ctx);

        // A crash ends the frame before anything on the crash cell is eaten
        if self.hits_something() {
            self.crashed = true;
            ctx.particles.emit(ParticleKind::Burst, self.head(), 25, Some(palette::NEON_PURPLE));
            log::debug!("Serpent crashed at ({:.0}, {:.0})", self.head().x, self.head().y);
            return;
        }

        let before = self.score;
        self.run_spawner(ctx.dt);
        self.collect(ctx);
        self.update_level(ctx);

        if before < self.target && self.score >= self.target {
            self.celebrate(ctx.particles);
            log::info!(
                "Quantum Serpent reached {} with {} segments",
                self.target,
                self.segments.len()
            );
        }
    }

    fn verdict(&self) -> Verdict {
        Verdict::judge(self.crashed, self.score >= self.target)
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let pulse = 1.0 + (self.clock * 4.0).sin() * 0.3;
        for orb in &self.orbs {
            surface.draw(Shape::Circle {
                center: orb.body.center(),
                radius: 10.0 * pulse,
                color: palette::GOLD,
            });
        }

        for powerup in &self.powerups {
            if let Some(CollectibleKind::Power(kind)) = powerup.collectible_kind() {
                surface.draw(Shape::Circle {
                    center: powerup.body.center(),
                    radius: 12.0 * pulse,
                    color: power_color(kind),
                });
            }
        }

        let count = self.segments.len() as f32;
        for (i, seg) in self.segments.iter().enumerate().rev() {
            let (color, radius) = if i == 0 {
                (palette::NEON_CYAN, 12.0)
            } else {
                let fade = 1.0 - 0.5 * (i as f32 / count);
                (palette::NEON_PURPLE.scaled(fade), (12.0 - i as f32 * 0.36).max(8.0))
            };
            surface.draw(Shape::Circle {
                center: *seg,
                radius,
                color,
            });
        }

        if self.effects.shield.active() {
            surface.draw(Shape::Circle {
                center: self.head(),
                radius: 30.0,
                color: palette::NEON_CYAN.scaled(0.4),
            });
        }
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            level: self.level,
            target: Some(self.target),
            progress: Some((self.score as f32 / self.target.max(1) as f32).min(1.0)),
            ..Default::default()
        }
    }
}
