//! Stellar Defender: vertical space shooter
//!
//! Enemies dive from the top edge and shoot back. Score climbs the level
//! ladder; reaching the victory level wins, running out of health loses.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::SoundCue;
use crate::input::Action;
use crate::render::{Hud, Shape, Surface, palette};
use crate::settings::Settings;
use crate::sim::aabb::Aabb;
use crate::sim::entity::{Body, CollectibleKind, Countdown, EnemyKind, Entity, EntityKind, IdGen};
use crate::sim::particles::ParticleKind;
use crate::sim::state::{FrameContext, Session, Verdict};
use crate::tuning::ShooterTuning;
use crate::{damping, direction_to};

const BOLT_SIZE: Vec2 = Vec2::new(4.0, 8.0);
const POWERUP_SIZE: f32 = 20.0;
/// Spawn row above the visible screen
const SPAWN_Y: f32 = -30.0;
/// Margin past the screen edge before an entity is dropped
const CULL_MARGIN: f32 = 50.0;
const BOLT_CULL_MARGIN: f32 = 10.0;

/// The player's ship
#[derive(Debug, Clone)]
pub struct Ship {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub reload: Countdown,
    pub invulnerable: Countdown,
    exhaust: f32,
}

impl Ship {
    fn new(center: Vec2, tuning: &ShooterTuning) -> Self {
        Self {
            body: Body::centered(center, Vec2::new(tuning.ship_width, tuning.ship_height)),
            health: tuning.max_health,
            max_health: tuning.max_health,
            reload: Countdown::default(),
            invulnerable: Countdown::default(),
            exhaust: 0.0,
        }
    }

    /// Apply damage unless invulnerable; returns whether it landed
    fn take_damage(&mut self, amount: i32, invulnerability: f32) -> bool {
        if self.invulnerable.active() {
            return false;
        }
        self.health -= amount;
        self.invulnerable.reset(invulnerability);
        true
    }
}

/// One run of Stellar Defender
pub struct Shooter {
    tuning: ShooterTuning,
    rng: Pcg32,
    ship: Ship,
    enemies: Vec<Entity>,
    bolts: Vec<Entity>,
    powerups: Vec<Entity>,
    ids: IdGen,
    score: u64,
    level: u32,
    difficulty: f32,
    spawn_timer: f32,
    powerup_timer: f32,
    /// Rolled once per power-up spawn
    powerup_due: f32,
}

impl Shooter {
    pub fn new(tuning: ShooterTuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let ship = Ship::new(
            Vec2::new(tuning.screen_width * 0.5, tuning.screen_height - 100.0),
            &tuning,
        );
        let powerup_due = roll(&mut rng, tuning.powerup_interval_min, tuning.powerup_interval_max);
        Self {
            tuning,
            rng,
            ship,
            enemies: Vec::new(),
            bolts: Vec::new(),
            powerups: Vec::new(),
            ids: IdGen::default(),
            score: 0,
            level: 1,
            difficulty: 1.0,
            spawn_timer: 0.0,
            powerup_timer: 0.0,
            powerup_due,
        }
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    pub fn bolts(&self) -> &[Entity] {
        &self.bolts
    }

    pub fn powerups(&self) -> &[Entity] {
        &self.powerups
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    fn screen(&self) -> Aabb {
        Aabb::from_pos_size(
            Vec2::ZERO,
            Vec2::new(self.tuning.screen_width, self.tuning.screen_height),
        )
    }

    /// Seconds between enemy spawns at the current difficulty
    pub fn spawn_interval(&self) -> f32 {
        (self.tuning.spawn_interval_base - self.difficulty * self.tuning.difficulty_step)
            .max(self.tuning.spawn_interval_min)
    }

    fn spawn_bolt(&mut self, center: Vec2, vel: Vec2, friendly: bool, damage: i32) {
        let body = Body::centered(center, BOLT_SIZE).with_velocity(vel);
        let kind = EntityKind::Projectile { friendly, damage };
        self.bolts.push(Entity::new(self.ids.next_id(), kind, body));
    }

    fn spawn_enemy(&mut self, center: Vec2, kind: EnemyKind) {
        let body = Body::centered(center, Vec2::splat(self.tuning.enemy_size));
        self.enemies.push(Entity::new(self.ids.next_id(), EntityKind::Enemy(kind), body));
        log::debug!("Spawned {:?} at ({:.0}, {:.0})", kind, center.x, center.y);
    }

    fn spawn_powerup(&mut self, center: Vec2, kind: CollectibleKind) {
        let body = Body::centered(center, Vec2::splat(POWERUP_SIZE))
            .with_velocity(Vec2::new(0.0, self.tuning.powerup_fall_speed));
        self.powerups.push(Entity::new(self.ids.next_id(), EntityKind::Collectible(kind), body));
    }

    fn spawn_x(&mut self) -> f32 {
        let hi = (self.tuning.screen_width - 50.0).max(51.0);
        self.rng.random_range(50.0..hi)
    }

    fn fly(&mut self, ctx: &mut FrameContext<'_>) {
        let t = &self.tuning;
        let ship = &mut self.ship;
        let dt = ctx.dt;

        let mut thrust = Vec2::ZERO;
        if ctx.input.is_held(Action::Left) {
            thrust.x -= t.acceleration * t.strafe_boost;
        }
        if ctx.input.is_held(Action::Right) {
            thrust.x += t.acceleration * t.strafe_boost;
        }
        if ctx.input.is_held(Action::Up) {
            thrust.y -= t.acceleration;
        }
        if ctx.input.is_held(Action::Down) {
            thrust.y += t.acceleration;
        }
        ship.body.vel += thrust * dt;
        ship.body.vel *= damping(t.friction, dt);
        ship.body.vel = ship.body.vel.clamp(Vec2::splat(-t.max_speed), Vec2::splat(t.max_speed));
        ship.body.integrate(dt);

        let max = Vec2::new(t.screen_width, t.screen_height) - ship.body.size;
        ship.body.pos = ship.body.pos.clamp(Vec2::ZERO, max.max(Vec2::ZERO));

        ship.reload.tick(dt);
        ship.invulnerable.tick(dt);

        ship.exhaust += dt;
        if ship.exhaust > t.exhaust_interval {
            ship.exhaust = 0.0;
            let nozzle = ship.body.center() + Vec2::new(0.0, 15.0);
            ctx.particles.emit(ParticleKind::Exhaust, nozzle, 2, Some(palette::BLUE));
        }

        if ctx.input.is_held(Action::Fire) && !ship.reload.active() {
            ship.reload.reset(t.fire_cooldown);
            let muzzle = ship.body.center() - Vec2::new(0.0, 20.0);
            ctx.particles.emit(ParticleKind::MuzzleFlash, muzzle, 5, None);
            ctx.audio.play(SoundCue::Shoot);
            let vel = Vec2::new(0.0, -t.bolt_speed);
            self.spawn_bolt(muzzle, vel, true, 1);
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        let target = self.ship.body.center();
        let cull = self.tuning.screen_height + CULL_MARGIN;
        let mut shots = Vec::new();

        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            let center = enemy.body.center();
            let kind = enemy.enemy_kind().unwrap_or(EnemyKind::Basic);
            enemy.body.vel = match kind {
                EnemyKind::Advanced => direction_to(center, target)
                    .map(|dir| dir * self.tuning.advanced_speed)
                    .unwrap_or(Vec2::ZERO),
                _ => Vec2::new(0.0, self.tuning.basic_speed),
            };
            enemy.body.integrate(dt);
            enemy.age += dt;

            enemy.cooldown.tick(dt);
            let center = enemy.body.center();
            if !enemy.cooldown.active() && center.y > 0.0 {
                let wait = roll(&mut self.rng, self.tuning.enemy_fire_min, self.tuning.enemy_fire_max);
                enemy.cooldown.reset(wait);
                match kind {
                    EnemyKind::Advanced => {
                        if let Some(dir) = direction_to(center, target) {
                            shots.push((center, dir * self.tuning.aimed_bolt_speed));
                        }
                    }
                    _ => shots.push((
                        center + Vec2::new(0.0, 15.0),
                        Vec2::new(0.0, self.tuning.enemy_bolt_speed),
                    )),
                }
            }

            if center.y > cull {
                enemy.alive = false;
            }
        }

        let damage = self.tuning.bolt_damage;
        for (origin, vel) in shots {
            self.spawn_bolt(origin, vel, false, damage);
        }
    }

    fn update_projectiles(&mut self, dt: f32) {
        let bolt_area = self.screen().expanded(BOLT_CULL_MARGIN);
        for bolt in &mut self.bolts {
            bolt.body.integrate(dt);
            if !bolt_area.contains_point(bolt.body.center()) {
                bolt.alive = false;
            }
        }

        let floor = self.tuning.screen_height + CULL_MARGIN;
        for powerup in &mut self.powerups {
            powerup.body.integrate(dt);
            powerup.age += dt;
            if powerup.body.center().y > floor {
                powerup.alive = false;
            }
        }
    }

    fn run_spawners(&mut self, dt: f32) {
        self.spawn_timer += dt;
        if self.spawn_timer > self.spawn_interval() {
            self.spawn_timer = 0.0;
            let x = self.spawn_x();
            let advanced_chance = (self.tuning.advanced_chance * self.difficulty).clamp(0.0, 1.0);
            let kind = if self.rng.random_bool(advanced_chance as f64) {
                EnemyKind::Advanced
            } else {
                EnemyKind::Basic
            };
            self.spawn_enemy(Vec2::new(x, SPAWN_Y), kind);
        }

        self.powerup_timer += dt;
        if self.powerup_timer > self.powerup_due {
            self.powerup_timer = 0.0;
            self.powerup_due = roll(
                &mut self.rng,
                self.tuning.powerup_interval_min,
                self.tuning.powerup_interval_max,
            );
            let x = self.spawn_x();
            let kind = if self.rng.random_bool(self.tuning.health_chance.clamp(0.0, 1.0)) {
                let lo = self.tuning.health_boost_min;
                let hi = self.tuning.health_boost_max.max(lo);
                CollectibleKind::Health {
                    boost: self.rng.random_range(lo..=hi),
                }
            } else {
                CollectibleKind::Bonus
            };
            self.spawn_powerup(Vec2::new(x, SPAWN_Y), kind);
        }
    }

    /// Every pairwise test of the frame, in a fixed order
    fn resolve_hits(&mut self, ctx: &mut FrameContext<'_>) {
        // Friendly bolts cancel hostile ones
        for i in 0..self.bolts.len() {
            if !self.bolts[i].alive || !is_friendly(&self.bolts[i]) {
                continue;
            }
            let shot = self.bolts[i].aabb();
            let hit = self
                .bolts
                .iter()
                .position(|b| b.alive && !is_friendly(b) && b.aabb().intersects(&shot));
            if let Some(j) = hit {
                self.bolts[i].alive = false;
                self.bolts[j].alive = false;
                let mid = (self.bolts[i].body.center() + self.bolts[j].body.center()) * 0.5;
                ctx.particles.emit(ParticleKind::HitBlast, mid, 20, None);
                self.score += self.tuning.deflect_score;
            }
        }

        // Friendly bolts against enemies
        for bolt in self.bolts.iter_mut().filter(|b| b.alive && is_friendly(b)) {
            let shot = bolt.aabb();
            let Some(enemy) = self.enemies.iter_mut().find(|e| e.alive && e.aabb().intersects(&shot))
            else {
                continue;
            };
            bolt.alive = false;
            let at = enemy.body.center();
            ctx.particles.emit(ParticleKind::HitBlast, at, 20, None);
            enemy.hp -= 1;
            if enemy.hp <= 0 {
                enemy.alive = false;
                ctx.particles.emit(ParticleKind::Explosion, at, 15, Some(palette::RED));
                ctx.audio.play(SoundCue::Explosion);
                let kind = enemy.enemy_kind().unwrap_or(EnemyKind::Basic);
                self.score += match kind {
                    EnemyKind::Advanced => self.tuning.advanced_score,
                    _ => self.tuning.basic_score,
                };
            }
        }

        let hull = self.ship.body.aabb();
        let ship_center = self.ship.body.center();
        let invulnerability = self.tuning.invulnerability;

        // Hostile bolts against the ship; absorbed even while invulnerable
        for bolt in self.bolts.iter_mut().filter(|b| b.alive && !is_friendly(b)) {
            if !bolt.aabb().intersects(&hull) {
                continue;
            }
            bolt.alive = false;
            ctx.particles.emit(ParticleKind::HitBlast, ship_center, 20, None);
            let damage = match bolt.kind {
                EntityKind::Projectile { damage, .. } => damage,
                _ => self.tuning.bolt_damage,
            };
            if self.ship.take_damage(damage, invulnerability) {
                ctx.particles.emit(ParticleKind::Explosion, ship_center, 15, Some(palette::ORANGE));
                ctx.audio.play(SoundCue::Hit);
                log::debug!("Ship hit for {}, health {}", damage, self.ship.health);
            }
        }

        // Rammers die on contact
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            if !enemy.aabb().intersects(&hull) {
                continue;
            }
            enemy.alive = false;
            let damage = self.tuning.ram_damage;
            if self.ship.take_damage(damage, invulnerability) {
                ctx.particles.emit(ParticleKind::Explosion, ship_center, 15, Some(palette::RED));
                ctx.audio.play(SoundCue::Hit);
                log::debug!("Ship hit for {}, health {}", damage, self.ship.health);
            }
        }

        for powerup in self.powerups.iter_mut().filter(|p| p.alive) {
            if !powerup.aabb().intersects(&hull) {
                continue;
            }
            powerup.alive = false;
            ctx.particles.emit(ParticleKind::Pickup, powerup.body.center(), 8, None);
            ctx.audio.play(SoundCue::PowerUp);
            let kind = powerup.collectible_kind().unwrap_or(CollectibleKind::Bonus);
            match kind {
                CollectibleKind::Health { boost } => {
                    self.ship.health = (self.ship.health + boost).min(self.ship.max_health);
                }
                _ => self.score += self.tuning.bonus_score,
            }
        }
    }

    fn update_level(&mut self, ctx: &mut FrameContext<'_>) {
        let per_level = self.tuning.points_per_level.max(1);
        let level = (self.score / per_level) as u32 + 1;
        if level > self.level {
            ctx.audio.play(SoundCue::LevelUp);
            log::info!("Stellar Defender level {}", level);
        }
        self.level = level;
        self.difficulty = 1.0 + (level - 1) as f32 * self.tuning.difficulty_step;
    }
}

fn is_friendly(entity: &Entity) -> bool {
    matches!(entity.kind, EntityKind::Projectile { friendly: true, .. })
}

/// Uniform in `[lo, hi)`, or `lo` when the range is empty
fn roll(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

impl Session for Shooter {
    const TITLE: &'static str = "Stellar Defender";

    fn start(settings: &Settings, _target: Option<u64>, seed: u64) -> Self {
        Self::new(settings.shooter.clone(), seed)
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = ctx.dt;
        self.fly(ctx);
        self.update_enemies(dt);
        self.update_projectiles(dt);
        self.run_spawners(dt);

        self.resolve_hits(ctx);

        self.enemies.retain(|e| e.alive);
        self.bolts.retain(|b| b.alive);
        self.powerups.retain(|p| p.alive);

        self.update_level(ctx);
    }

    fn verdict(&self) -> Verdict {
        Verdict::judge(self.ship.health <= 0, self.level >= self.tuning.victory_level)
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn draw(&self, surface: &mut dyn Surface) {
        for powerup in &self.powerups {
            let color = match powerup.collectible_kind() {
                Some(CollectibleKind::Health { .. }) => palette::GREEN,
                _ => palette::GOLD,
            };
            let bob = (powerup.age * 4.0).sin() * 3.0;
            surface.draw(Shape::Circle {
                center: powerup.body.center() + Vec2::new(0.0, bob),
                radius: POWERUP_SIZE * 0.5,
                color,
            });
        }

        for enemy in &self.enemies {
            let color = match enemy.enemy_kind() {
                Some(EnemyKind::Advanced) => palette::NEON_PURPLE,
                _ => palette::RED,
            };
            surface.draw(Shape::Rect {
                min: enemy.body.pos,
                size: enemy.body.size,
                color,
            });
        }

        for bolt in &self.bolts {
            surface.draw(Shape::Rect {
                min: bolt.body.pos,
                size: bolt.body.size,
                color: if is_friendly(bolt) { palette::CYAN } else { palette::ORANGE },
            });
        }

        let blink = self.ship.invulnerable.active()
            && (self.ship.invulnerable.remaining() * 10.0) as i32 % 2 == 1;
        if !blink {
            surface.draw(Shape::Rect {
                min: self.ship.body.pos,
                size: self.ship.body.size,
                color: palette::LIGHT_BLUE,
            });
        }
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            level: self.level,
            health: Some((self.ship.health.max(0), self.ship.max_health)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSnapshot;
    use crate::sim::particles::ParticleSystem;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        game: Shooter,
        particles: ParticleSystem,
        audio: Vec<SoundCue>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                game: Shooter::new(ShooterTuning::default(), 7),
                particles: ParticleSystem::new(0),
                audio: Vec::new(),
            }
        }

        fn step_with(&mut self, input: &InputSnapshot, dt: f32) {
            let mut ctx = FrameContext {
                dt,
                input,
                particles: &mut self.particles,
                audio: &mut self.audio,
            };
            self.game.update(&mut ctx);
        }

        fn step(&mut self) {
            self.step_with(&InputSnapshot::new(), DT);
        }
    }

    #[test]
    fn ship_stays_on_screen() {
        let mut rig = Rig::new();
        let input = InputSnapshot::new().hold(Action::Left).hold(Action::Up);
        for _ in 0..240 {
            rig.step_with(&input, DT);
        }
        assert_eq!(rig.game.ship().body.pos, Vec2::ZERO);
    }

    #[test]
    fn friction_brings_ship_to_rest() {
        let mut rig = Rig::new();
        rig.game.ship.body.vel = Vec2::new(400.0, 0.0);
        for _ in 0..300 {
            rig.step();
        }
        assert!(rig.game.ship().body.vel.length() < 1.0);
    }

    #[test]
    fn held_fire_respects_cooldown() {
        let mut rig = Rig::new();
        let input = InputSnapshot::new().hold(Action::Fire);
        for _ in 0..10 {
            rig.step_with(&input, 0.05);
        }
        let friendly = rig.game.bolts().iter().filter(|b| is_friendly(b)).count();
        assert_eq!(friendly, 5);
        assert_eq!(rig.audio.iter().filter(|c| **c == SoundCue::Shoot).count(), 5);
    }

    #[test]
    fn bolts_cancel_for_deflect_bonus() {
        let mut rig = Rig::new();
        rig.game.spawn_bolt(Vec2::new(100.0, 100.0), Vec2::ZERO, true, 1);
        rig.game.spawn_bolt(Vec2::new(101.0, 102.0), Vec2::ZERO, false, 20);
        rig.step();
        assert!(rig.game.bolts().is_empty());
        assert_eq!(rig.game.score(), 25);
    }

    #[test]
    fn bolt_destroys_enemy_for_score() {
        let mut rig = Rig::new();
        rig.game.spawn_enemy(Vec2::new(200.0, 200.0), EnemyKind::Basic);
        rig.game.spawn_bolt(Vec2::new(200.0, 205.0), Vec2::ZERO, true, 1);
        rig.step();
        assert!(rig.game.enemies().is_empty());
        assert_eq!(rig.game.score(), 100);
        assert!(rig.audio.contains(&SoundCue::Explosion));
    }

    #[test]
    fn invulnerable_ship_absorbs_bolts() {
        let mut rig = Rig::new();
        let center = rig.game.ship().body.center();
        rig.game.spawn_bolt(center, Vec2::ZERO, false, 20);
        rig.step();
        assert_eq!(rig.game.ship().health, 80);

        let center = rig.game.ship().body.center();
        rig.game.spawn_bolt(center, Vec2::ZERO, false, 20);
        rig.step();
        assert_eq!(rig.game.ship().health, 80);
        assert!(rig.game.bolts().is_empty());
    }

    #[test]
    fn rammer_dies_and_hurts() {
        let mut rig = Rig::new();
        let center = rig.game.ship().body.center();
        rig.game.spawn_enemy(center, EnemyKind::Basic);
        rig.game.enemies[0].cooldown.reset(5.0);
        rig.step();
        assert!(rig.game.enemies().is_empty());
        assert_eq!(rig.game.ship().health, 70);
        assert_eq!(rig.game.score(), 0);
    }

    #[test]
    fn health_pickup_is_capped() {
        let mut rig = Rig::new();
        rig.game.ship.health = 90;
        let center = rig.game.ship().body.center();
        rig.game.spawn_powerup(center, CollectibleKind::Health { boost: 30 });
        rig.step();
        assert_eq!(rig.game.ship().health, 100);
        assert!(rig.audio.contains(&SoundCue::PowerUp));
    }

    #[test]
    fn advanced_enemy_on_top_of_ship_does_not_move() {
        let mut rig = Rig::new();
        rig.game.ship.invulnerable.reset(10.0);
        let center = rig.game.ship().body.center();
        rig.game.spawn_enemy(center, EnemyKind::Advanced);
        rig.game.update_enemies(DT);
        let enemy = &rig.game.enemies()[0];
        assert_eq!(enemy.body.center(), center);
        assert!(enemy.body.vel.is_finite());
    }

    #[test]
    fn level_four_is_victory() {
        let mut rig = Rig::new();
        rig.game.score = 2_999;
        let center = rig.game.ship().body.center();
        rig.game.spawn_powerup(center, CollectibleKind::Bonus);
        rig.step();
        assert_eq!(rig.game.level(), 4);
        assert_eq!(rig.game.verdict(), Verdict::Won);
        assert!(rig.audio.contains(&SoundCue::LevelUp));
    }

    #[test]
    fn zero_health_loses_even_at_victory_level() {
        let mut rig = Rig::new();
        rig.game.level = 4;
        rig.game.ship.health = 0;
        assert_eq!(rig.game.verdict(), Verdict::Lost);
    }

    #[test]
    fn spawn_interval_shrinks_with_difficulty() {
        let mut rig = Rig::new();
        assert!((rig.game.spawn_interval() - 1.7).abs() < 1e-5);
        rig.game.difficulty = 10.0;
        assert_eq!(rig.game.spawn_interval(), 0.5);
    }

    #[test]
    fn same_seed_same_waves() {
        let run = || {
            let mut rig = Rig::new();
            for _ in 0..600 {
                rig.step();
            }
            rig.game
                .enemies()
                .iter()
                .map(|e| e.body.pos)
                .collect::<Vec<_>>()
        };
        let first = run();
        assert!(!first.is_empty());
        assert_eq!(first, run());
    }
}
