//! Escape Rush: side-scrolling platformer
//!
//! Run right across a broken ground line to the goal flag before the timer
//! runs out. Walkers patrol the ground; stomp them from above or lose a life
//! on contact. Gems are worth a life.

use glam::Vec2;

use crate::approach;
use crate::audio::SoundCue;
use crate::input::Action;
use crate::render::{Hud, Shape, Surface, palette};
use crate::settings::Settings;
use crate::sim::collision::{ground_ahead, land_on_platforms, move_and_collide};
use crate::sim::entity::{
    Body, CollectibleKind, Countdown, EnemyKind, Entity, EntityKind, Facing, IdGen, Outcome,
};
use crate::sim::level::{ItemType, LevelDescriptor};
use crate::sim::particles::ParticleKind;
use crate::sim::state::{FrameContext, Session, Verdict};
use crate::sim::world::World;
use crate::tuning::PlatformerTuning;

/// Collectible sprite size; the pickup box is the inner 8×8
const ITEM_SPRITE: f32 = 16.0;
const ITEM_INSET: f32 = 4.0;

/// Player-controlled runner
#[derive(Debug, Clone)]
pub struct Runner {
    pub body: Body,
    pub grounded: bool,
    pub facing: Facing,
    jump_boost: Countdown,
    pub invulnerable: Countdown,
}

impl Runner {
    fn new(spawn: Vec2, tuning: &PlatformerTuning) -> Self {
        Self {
            body: Body::new(spawn, Vec2::new(tuning.player_width, tuning.player_height)),
            grounded: false,
            facing: Facing::Right,
            jump_boost: Countdown::default(),
            invulnerable: Countdown::default(),
        }
    }
}

/// Smooth-follow camera clamped to the level
#[derive(Debug, Clone, Copy, Default)]
struct Camera {
    pos: Vec2,
}

impl Camera {
    fn follow(&mut self, target: Vec2, screen: Vec2, world_width: f32, dt: f32) {
        let max_x = (world_width - screen.x).max(0.0);
        let target_x = (target.x - screen.x * 0.5).clamp(0.0, max_x);
        self.pos.x += (target_x - self.pos.x) * (8.0 * dt).min(1.0);

        let target_y = target.y - screen.y * 0.6;
        self.pos.y += (target_y - self.pos.y) * (3.0 * dt).min(1.0);
        self.pos.y = self.pos.y.clamp(-200.0, 200.0);
    }
}

/// One run of Escape Rush
pub struct Platformer {
    tuning: PlatformerTuning,
    level: LevelDescriptor,
    world: World,
    runner: Runner,
    enemies: Vec<Entity>,
    items: Vec<Entity>,
    ids: IdGen,
    score: u64,
    lives: u32,
    time_left: f32,
    camera: Camera,
    reached_goal: bool,
}

impl Platformer {
    pub fn new(tuning: PlatformerTuning, level: LevelDescriptor) -> Self {
        let mut ids = IdGen::default();
        let (world, enemies, items) = populate(&level, &tuning, &mut ids);
        let runner = Runner::new(level.start.pos(), &tuning);
        Self {
            lives: tuning.lives,
            time_left: tuning.time_limit,
            tuning,
            level,
            world,
            runner,
            enemies,
            items,
            ids,
            score: 0,
            camera: Camera::default(),
            reached_goal: false,
        }
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn goal_x(&self) -> f32 {
        self.level.goal_x
    }

    /// Fraction of the way to the goal
    pub fn progress(&self) -> f32 {
        if self.level.goal_x > 0.0 {
            (self.runner.body.pos.x / self.level.goal_x).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn respawn(&mut self) {
        self.runner = Runner::new(self.level.start.pos(), &self.tuning);
        self.camera = Camera::default();
    }

    /// Rebuild the level in place; score and lives carry over
    fn reload(&mut self) {
        let (world, enemies, items) = populate(&self.level, &self.tuning, &mut self.ids);
        self.world = world;
        self.enemies = enemies;
        self.items = items;
        self.time_left = self.tuning.time_limit;
        self.respawn();
    }

    fn update_enemies(&mut self, dt: f32) {
        let probe = self.tuning.ledge_probe;
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            enemy.age += dt;
            enemy.body.apply_gravity(self.tuning.enemy_gravity, dt);

            let vx = enemy.body.vel.x;
            let contact = move_and_collide(&mut enemy.body, &self.world, dt);
            if contact.hit_wall {
                enemy.body.vel.x = -vx;
            }
            if contact.grounded && !ground_ahead(&enemy.body, &self.world, probe) {
                enemy.body.vel.x = -enemy.body.vel.x;
            }
            enemy.facing = Facing::from_velocity(enemy.body.vel.x, enemy.facing);

            if enemy.body.pos.y > self.tuning.fall_limit {
                enemy.alive = false;
            }
        }
    }

    fn steer(&mut self, ctx: &mut FrameContext<'_>) {
        let t = &self.tuning;
        let runner = &mut self.runner;
        let dt = ctx.dt;

        let speed = if ctx.input.is_held(Action::Sprint) {
            t.sprint_speed
        } else {
            t.run_speed
        };
        let target_vx = ctx.input.horizontal() * speed;
        runner.body.vel.x = if target_vx != 0.0 {
            approach(runner.body.vel.x, target_vx, t.acceleration * dt)
        } else {
            approach(runner.body.vel.x, 0.0, t.friction * dt)
        };
        runner.facing = Facing::from_velocity(target_vx, runner.facing);

        let jump_held = ctx.input.is_held(Action::Up) || ctx.input.is_held(Action::Fire);
        if jump_held && runner.grounded {
            runner.body.vel.y = t.jump_velocity;
            runner.jump_boost.reset(t.jump_boost_window);
            ctx.audio.play(SoundCue::Jump);
            let feet = Vec2::new(runner.body.center().x, runner.body.bottom());
            ctx.particles.emit(ParticleKind::JumpDust, feet, 5, None);
        }

        if jump_held {
            if runner.jump_boost.active() && runner.body.vel.y < 0.0 {
                runner.body.vel.y -= t.jump_boost * dt;
                runner.jump_boost.tick(dt);
            }
        } else {
            runner.jump_boost.clear();
        }

        runner.body.apply_gravity(t.gravity, dt);

        let contact = move_and_collide(&mut runner.body, &self.world, dt);
        let on_platform = land_on_platforms(&mut runner.body, &self.world, t.platform_tolerance);
        runner.grounded = contact.grounded || on_platform;
    }

    /// Hazards and bounds, then enemies, then pickups. Hazard, bounds and a
    /// damaging enemy hit end the pass; a stomp still collects whatever the
    /// runner overlaps this frame and is reported over the pickup.
    fn interact(&mut self, ctx: &mut FrameContext<'_>) -> Outcome {
        let bbox = self.runner.body.aabb();
        if self.world.touches_hazard(bbox) {
            return Outcome::Hazard;
        }
        if self.runner.body.pos.y > self.tuning.fall_limit {
            return Outcome::OutOfBounds;
        }

        let mut outcome = Outcome::Clear;
        if !self.runner.invulnerable.active() {
            for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
                let enemy_box = enemy.aabb();
                if !bbox.intersects(&enemy_box) {
                    continue;
                }
                let runner = &mut self.runner;
                if runner.body.vel.y > 0.0 && bbox.bottom() <= enemy_box.center().y {
                    enemy.alive = false;
                    runner.body.vel.y = self.tuning.stomp_bounce;
                    ctx.particles.emit(ParticleKind::EnemyBurst, enemy_box.center(), 12, None);
                    ctx.audio.play(SoundCue::Hit);
                    outcome = outcome.or(Outcome::Defeated(EnemyKind::Walker));
                } else {
                    runner.invulnerable.reset(self.tuning.invulnerability);
                    runner.body.vel.x = if runner.body.pos.x < enemy.body.pos.x {
                        -self.tuning.knockback_x
                    } else {
                        self.tuning.knockback_x
                    };
                    runner.body.vel.y = self.tuning.knockback_y;
                    ctx.audio.play(SoundCue::Hit);
                    return Outcome::Damaged { amount: 1 };
                }
            }
        }

        for item in self.items.iter_mut().filter(|i| i.alive) {
            if !bbox.intersects(&item.aabb()) {
                continue;
            }
            item.alive = false;
            ctx.particles.emit(ParticleKind::CoinSparkle, item.body.center(), 8, None);
            ctx.audio.play(SoundCue::Coin);

            let kind = item.collectible_kind().unwrap_or(CollectibleKind::Coin);
            match kind {
                CollectibleKind::Gem => {
                    self.score += self.tuning.gem_score;
                    self.lives += 1;
                }
                _ => self.score += self.tuning.coin_score,
            }
            outcome = outcome.or(Outcome::Collected(kind));
        }
        outcome
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Life lost, {} left", self.lives);
    }
}

/// World plus fresh enemy and item lists for a level
fn populate(
    level: &LevelDescriptor,
    tuning: &PlatformerTuning,
    ids: &mut IdGen,
) -> (World, Vec<Entity>, Vec<Entity>) {
    let screen = Vec2::new(tuning.screen_width, tuning.screen_height);
    let world = World::from_level(level, tuning.tile_size, screen);

    let enemies = level
        .enemies
        .iter()
        .map(|spawn| {
            let body = Body::new(spawn.pos(), Vec2::splat(tuning.enemy_size))
                .with_velocity(Vec2::new(-tuning.enemy_speed, 0.0));
            Entity::new(ids.next_id(), EntityKind::Enemy(EnemyKind::Walker), body)
        })
        .collect();

    let items = level
        .collectibles
        .iter()
        .map(|spec| {
            let kind = match spec.item_type {
                ItemType::Coin => CollectibleKind::Coin,
                ItemType::Gem => CollectibleKind::Gem,
            };
            let inner = ITEM_SPRITE - 2.0 * ITEM_INSET;
            let body = Body::new(
                Vec2::new(spec.x, spec.y) + Vec2::splat(ITEM_INSET),
                Vec2::splat(inner),
            );
            Entity::new(ids.next_id(), EntityKind::Collectible(kind), body)
        })
        .collect();

    (world, enemies, items)
}

impl Session for Platformer {
    const TITLE: &'static str = "Escape Rush";

    fn start(settings: &Settings, _target: Option<u64>, _seed: u64) -> Self {
        let tuning = settings.platformer.clone();
        let level = tuning.level.clone().unwrap_or_else(LevelDescriptor::escape_rush);
        Self::new(tuning, level)
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = ctx.dt;

        self.world.update(dt);
        self.update_enemies(dt);
        for item in &mut self.items {
            item.age += dt;
        }

        self.steer(ctx);
        let outcome = self.interact(ctx);
        self.runner.invulnerable.tick(dt);

        self.enemies.retain(|e| e.alive);
        self.items.retain(|i| i.alive);

        match outcome {
            Outcome::Hazard | Outcome::OutOfBounds => {
                self.lose_life();
                if self.lives > 0 {
                    self.respawn();
                }
                return;
            }
            // Knockback only; the runner stays where the hit landed
            Outcome::Damaged { .. } => {
                self.lose_life();
                return;
            }
            _ => {}
        }

        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.lose_life();
            if self.lives > 0 {
                log::info!("Time up, reloading level");
                self.reload();
            }
            return;
        }

        let screen = Vec2::new(self.tuning.screen_width, self.tuning.screen_height);
        self.camera.follow(
            self.runner.body.pos,
            screen,
            self.world.bounds.size().x,
            dt,
        );

        if !self.reached_goal && self.runner.body.pos.x >= self.level.goal_x {
            self.reached_goal = true;
            let around = self.runner.body.pos;
            for i in 0..30 {
                let offset = Vec2::new(((i * 7) % 41) as f32 - 20.0, ((i * 13) % 41) as f32 - 20.0);
                ctx.particles.emit(ParticleKind::CoinSparkle, around + offset, 1, None);
            }
        }
    }

    fn verdict(&self) -> Verdict {
        Verdict::judge(self.lives == 0, self.reached_goal)
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn level(&self) -> u32 {
        1
    }

    fn camera(&self) -> Vec2 {
        self.camera.pos
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let cam = self.camera.pos;
        self.world.draw(surface, cam);

        surface.draw(Shape::Rect {
            min: Vec2::new(self.level.goal_x, self.level.goal_y - 80.0) - cam,
            size: Vec2::new(4.0, 80.0),
            color: palette::WHITE,
        });
        surface.draw(Shape::Rect {
            min: Vec2::new(self.level.goal_x + 4.0, self.level.goal_y - 80.0) - cam,
            size: Vec2::new(30.0, 20.0),
            color: palette::GREEN,
        });

        for enemy in &self.enemies {
            surface.draw(Shape::Rect {
                min: enemy.body.pos - cam,
                size: enemy.body.size,
                color: palette::BROWN,
            });
        }

        for item in &self.items {
            let bob = (item.age * 3.0).sin() * 3.0;
            let color = match item.collectible_kind() {
                Some(CollectibleKind::Gem) => palette::PINK,
                _ => palette::GOLD,
            };
            surface.draw(Shape::Circle {
                center: item.body.center() + Vec2::new(0.0, bob) - cam,
                radius: ITEM_SPRITE * 0.5,
                color,
            });
        }

        // Blink while invulnerable
        let blink = self.runner.invulnerable.active()
            && (self.runner.invulnerable.remaining() * 15.0) as i32 % 2 == 1;
        if !blink {
            surface.draw(Shape::Rect {
                min: self.runner.body.pos - cam,
                size: self.runner.body.size,
                color: palette::BLUE,
            });
        }
    }

    fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            level: 1,
            lives: Some(self.lives),
            time_left: Some(self.time_left.max(0.0)),
            progress: Some(self.progress()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundCue;
    use crate::input::InputSnapshot;
    use crate::sim::level::{ItemSpec, SpawnPoint};
    use crate::sim::particles::ParticleSystem;

    const DT: f32 = 1.0 / 60.0;

    fn flat_level() -> LevelDescriptor {
        LevelDescriptor {
            map: vec![
                String::new(),
                String::new(),
                String::new(),
                "##############################".to_string(),
            ],
            platforms: Vec::new(),
            enemies: Vec::new(),
            collectibles: Vec::new(),
            goal_x: 1000.0,
            goal_y: 120.0,
            start: SpawnPoint::new(100.0, 88.0),
        }
    }

    struct Rig {
        game: Platformer,
        particles: ParticleSystem,
        audio: Vec<SoundCue>,
    }

    impl Rig {
        fn new(level: LevelDescriptor) -> Self {
            Self {
                game: Platformer::new(PlatformerTuning::default(), level),
                particles: ParticleSystem::new(0),
                audio: Vec::new(),
            }
        }

        fn step(&mut self, input: &InputSnapshot) {
            let mut ctx = FrameContext {
                dt: DT,
                input,
                particles: &mut self.particles,
                audio: &mut self.audio,
            };
            self.game.update(&mut ctx);
        }
    }

    #[test]
    fn runner_stays_grounded_on_flat_ground() {
        let mut rig = Rig::new(flat_level());
        for _ in 0..30 {
            rig.step(&InputSnapshot::new());
        }
        assert!(rig.game.runner().grounded);
        assert_eq!(rig.game.runner().body.bottom(), 120.0);
        assert_eq!(rig.game.runner().body.vel.y, 0.0);
    }

    #[test]
    fn jump_leaves_ground_and_kicks_dust() {
        let mut rig = Rig::new(flat_level());
        rig.step(&InputSnapshot::new());
        rig.step(&InputSnapshot::new().hold(Action::Up));
        assert!(!rig.game.runner().grounded);
        assert!(rig.game.runner().body.vel.y < 0.0);
        assert_eq!(rig.audio, vec![SoundCue::Jump]);
        assert_eq!(rig.particles.len(), 5);
    }

    #[test]
    fn running_accelerates_toward_run_speed() {
        let mut rig = Rig::new(flat_level());
        let right = InputSnapshot::new().hold(Action::Right);
        for _ in 0..60 {
            rig.step(&right);
        }
        assert_eq!(rig.game.runner().body.vel.x, 180.0);
        assert!(rig.game.runner().body.pos.x > 200.0);
    }

    #[test]
    fn coin_and_gem_pickups() {
        let mut level = flat_level();
        level.collectibles = vec![
            ItemSpec { x: 100.0, y: 100.0, item_type: ItemType::Coin },
            ItemSpec { x: 110.0, y: 100.0, item_type: ItemType::Gem },
        ];
        let mut rig = Rig::new(level);
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.score(), 600);
        assert_eq!(rig.game.lives(), 4);
        assert!(rig.game.items().is_empty());
    }

    #[test]
    fn stomp_kills_walker() {
        let mut level = flat_level();
        level.enemies = vec![SpawnPoint::new(100.0, 100.0)];
        let mut rig = Rig::new(level);
        rig.game.runner.body.pos = Vec2::new(98.0, 70.0);
        rig.game.runner.body.vel = Vec2::new(0.0, 300.0);
        rig.step(&InputSnapshot::new());
        assert!(rig.game.enemies().is_empty());
        assert_eq!(rig.game.lives(), 3);
        assert!(rig.game.runner().body.vel.y < 0.0);
    }

    #[test]
    fn stomp_still_collects_overlapping_coin() {
        let mut level = flat_level();
        level.enemies = vec![SpawnPoint::new(100.0, 100.0)];
        level.collectibles = vec![ItemSpec { x: 100.0, y: 92.0, item_type: ItemType::Coin }];
        let mut rig = Rig::new(level);
        rig.game.runner.body.pos = Vec2::new(98.0, 70.0);
        rig.game.runner.body.vel = Vec2::new(0.0, 300.0);
        rig.step(&InputSnapshot::new());

        assert!(rig.game.enemies().is_empty());
        assert!(rig.game.items().is_empty());
        assert_eq!(rig.game.score(), 100);
        assert_eq!(rig.game.lives(), 3);
        assert_eq!(rig.audio, vec![SoundCue::Hit, SoundCue::Coin]);
    }

    #[test]
    fn side_contact_costs_a_life_with_knockback() {
        let mut level = flat_level();
        level.enemies = vec![SpawnPoint::new(110.0, 100.0)];
        let mut rig = Rig::new(level);
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.lives(), 2);
        assert!(rig.game.runner().invulnerable.active());
        assert_eq!(rig.game.runner().body.vel.x, -150.0);

        // Invulnerable: further contact is ignored
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.lives(), 2);
    }

    #[test]
    fn enemy_hit_does_not_respawn() {
        let mut level = flat_level();
        level.enemies = vec![SpawnPoint::new(140.0, 100.0)];
        let mut rig = Rig::new(level);
        rig.game.runner.body.pos = Vec2::new(130.0, 88.0);
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.lives(), 2);
        assert!(rig.game.runner().body.pos.x > 120.0);
    }

    #[test]
    fn hazard_respawns_at_start() {
        let mut level = flat_level();
        level.map[3] = "####~~~~~~~~###".to_string();
        let mut rig = Rig::new(level);
        rig.game.runner.body.pos = Vec2::new(200.0, 100.0);
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.lives(), 2);
        assert_eq!(rig.game.runner().body.pos, Vec2::new(100.0, 88.0));
    }

    #[test]
    fn timer_expiry_reloads_and_keeps_score() {
        let mut level = flat_level();
        level.collectibles = vec![ItemSpec { x: 100.0, y: 100.0, item_type: ItemType::Coin }];
        let mut rig = Rig::new(level);
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.score(), 100);

        rig.game.time_left = DT * 0.5;
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.lives(), 2);
        assert_eq!(rig.game.score(), 100);
        assert_eq!(rig.game.time_left(), 300.0);
        assert_eq!(rig.game.items().len(), 1);
    }

    #[test]
    fn last_life_and_timer_resolve_to_loss() {
        let mut rig = Rig::new(flat_level());
        rig.game.lives = 1;
        rig.game.time_left = DT * 0.5;
        rig.game.reached_goal = true;
        rig.step(&InputSnapshot::new());
        assert_eq!(rig.game.verdict(), Verdict::Lost);
    }

    #[test]
    fn reaching_goal_wins_with_sparkles() {
        let mut rig = Rig::new(flat_level());
        rig.game.runner.body.pos.x = 999.5;
        rig.game.runner.body.vel.x = 180.0;
        rig.step(&InputSnapshot::new().hold(Action::Right));
        assert_eq!(rig.game.verdict(), Verdict::Won);
        assert_eq!(rig.particles.len(), 30);
    }

    #[test]
    fn walker_turns_at_ledge() {
        let mut level = flat_level();
        level.map[3] = "#####".to_string();
        level.enemies = vec![SpawnPoint::new(170.0, 100.0)];
        level.start = SpawnPoint::new(0.0, 0.0);
        let mut rig = Rig::new(level);
        rig.game.enemies[0].body.vel.x = 60.0;
        for _ in 0..60 {
            rig.step(&InputSnapshot::new());
        }
        let walker = &rig.game.enemies()[0];
        assert!(walker.body.pos.x + walker.body.size.x <= 200.0);
        assert!(walker.body.pos.y < 120.0);
    }
}
