//! Per-frame flow controller
//!
//! `Arcade` owns the active mode, the session for the current run, the
//! particle layer and the leaderboard. Each frame it turns input into at
//! most one flow event, runs the active mode's update, checks the session
//! verdict, then advances particles.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::particles::{ParticleKind, ParticleSystem};
use super::state::{FlowEvent, FrameContext, GameMode, Session, Transition, Verdict, transition};
use crate::audio::{AudioSink, SoundCue};
use crate::clock::cap_dt;
use crate::highscores::HighScores;
use crate::input::{Action, InputSnapshot};
use crate::render::{Overlay, Surface};
use crate::settings::Settings;

/// Flow event requested by this frame's presses; first match wins
pub fn flow_event(input: &InputSnapshot) -> Option<FlowEvent> {
    if input.was_pressed(Action::Pause) {
        Some(FlowEvent::Pause)
    } else if input.was_pressed(Action::Confirm) {
        Some(FlowEvent::Confirm)
    } else if input.was_pressed(Action::Cancel) {
        Some(FlowEvent::Cancel)
    } else {
        None
    }
}

/// Game-flow state machine around one kind of session
pub struct Arcade<S: Session> {
    mode: GameMode,
    session: Option<S>,
    particles: ParticleSystem,
    settings: Settings,
    targets: Vec<u64>,
    selected: usize,
    ambient: Option<(Vec2, f64)>,
    high_scores: HighScores,
    rng: Pcg32,
}

impl<S: Session> Arcade<S> {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let particles = ParticleSystem::new(rng.random());
        let targets = S::targets(&settings);
        let selected = S::default_target(&settings).min(targets.len().saturating_sub(1));
        let ambient = S::ambient(&settings);
        log::info!("{} ready (seed {})", S::TITLE, seed);

        Self {
            mode: GameMode::Menu,
            session: None,
            particles,
            settings,
            targets,
            selected,
            ambient,
            high_scores: HighScores::new(),
            rng,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Session of the current run; `None` before the first start and in `Menu`
    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn targets(&self) -> &[u64] {
        &self.targets
    }

    /// Target the next run will use
    pub fn selected_target(&self) -> Option<u64> {
        self.targets.get(self.selected).copied()
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &InputSnapshot, dt: f32, audio: &mut dyn AudioSink) {
        let dt = cap_dt(dt, self.settings.frame_cap());

        if self.mode == GameMode::OptionSelect {
            self.navigate(input);
        }
        if let Some(event) = flow_event(input) {
            self.apply(event, audio);
        }

        match self.mode {
            GameMode::Playing => {
                let verdict = match self.session.as_mut() {
                    Some(session) => {
                        let mut ctx = FrameContext {
                            dt,
                            input,
                            particles: &mut self.particles,
                            audio: &mut *audio,
                        };
                        session.update(&mut ctx);
                        session.verdict()
                    }
                    None => Verdict::Continue,
                };
                if let Some(event) = verdict.event() {
                    self.apply(event, audio);
                }
                self.particles.advance(dt);
            }
            // Celebration and explosion bursts settle behind the overlay
            GameMode::GameOver | GameMode::Victory => self.particles.advance(dt),
            GameMode::Menu | GameMode::OptionSelect => {
                if let Some((area, chance)) = self.ambient {
                    self.particles.drift(ParticleKind::Ambient, area, chance);
                    self.particles.advance(dt);
                }
            }
            GameMode::Paused => {}
        }
    }

    /// Apply one flow event. Returns false if the current mode ignores it
    pub fn apply(&mut self, event: FlowEvent, audio: &mut dyn AudioSink) -> bool {
        let Some(step) = transition(self.mode, event, !self.targets.is_empty()) else {
            return false;
        };

        let from = self.mode;
        match step {
            Transition::Restart => self.restart(),
            Transition::Enter(GameMode::Menu) => {
                self.session = None;
                self.particles.clear();
                self.mode = GameMode::Menu;
            }
            Transition::Enter(mode @ (GameMode::GameOver | GameMode::Victory)) => {
                self.finish(mode == GameMode::Victory, audio);
                self.mode = mode;
            }
            Transition::Enter(mode) => self.mode = mode,
        }
        log::info!("{}: {:?} -> {:?}", S::TITLE, from, self.mode);
        true
    }

    fn navigate(&mut self, input: &InputSnapshot) {
        let count = self.targets.len();
        if count == 0 {
            return;
        }
        if input.was_pressed(Action::Up) {
            self.selected = (self.selected + count - 1) % count;
        } else if input.was_pressed(Action::Down) {
            self.selected = (self.selected + 1) % count;
        }
    }

    fn restart(&mut self) {
        let seed = self.rng.random();
        let target = self.selected_target();
        self.session = Some(S::start(&self.settings, target, seed));
        self.particles.clear();
        self.mode = GameMode::Playing;
        match target {
            Some(target) => log::info!("{} started (target {})", S::TITLE, target),
            None => log::info!("{} started", S::TITLE),
        }
    }

    fn finish(&mut self, won: bool, audio: &mut dyn AudioSink) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (score, level) = (session.score(), session.level());
        audio.play(if won { SoundCue::Win } else { SoundCue::GameOver });

        match self.high_scores.add_score(score, level, won) {
            Some(rank) => log::info!(
                "{} run ended: score {} level {} (rank #{})",
                S::TITLE,
                score,
                level,
                rank
            ),
            None => log::info!("{} run ended: score {} level {}", S::TITLE, score, level),
        }
    }

    /// Issue this frame's draw calls
    pub fn draw(&self, surface: &mut dyn Surface) {
        match self.mode {
            GameMode::Menu => {
                self.particles.render(surface, Vec2::ZERO);
                surface.overlay(&Overlay::Menu { title: S::TITLE });
            }
            GameMode::OptionSelect => {
                self.particles.render(surface, Vec2::ZERO);
                surface.overlay(&Overlay::OptionSelect {
                    options: &self.targets,
                    selected: self.selected,
                });
            }
            GameMode::Playing => self.draw_play(surface),
            GameMode::Paused => {
                self.draw_play(surface);
                surface.overlay(&Overlay::Paused);
            }
            GameMode::GameOver | GameMode::Victory => {
                self.draw_play(surface);
                let score = self.session.as_ref().map(S::score).unwrap_or(0);
                let best = self.high_scores.top_score();
                surface.overlay(&if self.mode == GameMode::Victory {
                    Overlay::Victory { score, best }
                } else {
                    Overlay::GameOver { score, best }
                });
            }
        }
    }

    /// World, entities, particles, HUD
    fn draw_play(&self, surface: &mut dyn Surface) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        session.draw(surface);
        let camera: Vec2 = session.camera();
        self.particles.render(surface, camera);
        surface.hud(&session.hud());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Hud, Shape, palette};

    const DT: f32 = 1.0 / 60.0;

    /// Scores one point per frame and wins at its target
    struct Counter {
        score: u64,
        target: u64,
        updates: u32,
    }

    impl Session for Counter {
        const TITLE: &'static str = "Counter";

        fn start(_settings: &Settings, target: Option<u64>, _seed: u64) -> Self {
            Self {
                score: 0,
                target: target.unwrap_or(3),
                updates: 0,
            }
        }

        fn update(&mut self, ctx: &mut FrameContext<'_>) {
            self.score += 1;
            self.updates += 1;
            ctx.particles.emit(ParticleKind::Burst, Vec2::ZERO, 2, None);
        }

        fn verdict(&self) -> Verdict {
            Verdict::judge(false, self.score >= self.target)
        }

        fn score(&self) -> u64 {
            self.score
        }

        fn level(&self) -> u32 {
            1
        }

        fn draw(&self, surface: &mut dyn Surface) {
            surface.draw(Shape::Circle {
                center: Vec2::ZERO,
                radius: 1.0,
                color: palette::WHITE,
            });
        }

        fn hud(&self) -> Hud {
            Hud {
                score: self.score,
                ..Default::default()
            }
        }
    }

    /// Same as `Counter` but offers targets
    struct Picky(Counter);

    impl Session for Picky {
        const TITLE: &'static str = "Picky";

        fn targets(_settings: &Settings) -> Vec<u64> {
            vec![3, 5, 8]
        }

        fn default_target(_settings: &Settings) -> usize {
            1
        }

        fn start(settings: &Settings, target: Option<u64>, seed: u64) -> Self {
            Picky(Counter::start(settings, target, seed))
        }

        fn update(&mut self, ctx: &mut FrameContext<'_>) {
            self.0.update(ctx)
        }

        fn verdict(&self) -> Verdict {
            self.0.verdict()
        }

        fn score(&self) -> u64 {
            self.0.score
        }

        fn level(&self) -> u32 {
            1
        }

        fn draw(&self, surface: &mut dyn Surface) {
            self.0.draw(surface)
        }

        fn hud(&self) -> Hud {
            self.0.hud()
        }
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::new()
    }

    fn press(action: Action) -> InputSnapshot {
        InputSnapshot::new().press(action)
    }

    #[test]
    fn test_starts_in_menu() {
        let arcade = Arcade::<Counter>::new(Settings::default(), 1);
        assert_eq!(arcade.mode(), GameMode::Menu);
        assert!(arcade.session().is_none());
        assert_eq!(arcade.selected_target(), None);
    }

    #[test]
    fn test_pause_in_menu_stays_in_menu() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio: Vec<SoundCue> = Vec::new();
        arcade.tick(&press(Action::Pause), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Menu);
        assert!(audio.is_empty());
    }

    #[test]
    fn test_victory_triggers_exactly_once() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio: Vec<SoundCue> = Vec::new();

        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Playing);
        arcade.tick(&idle(), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Playing);
        arcade.tick(&idle(), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Victory);

        for _ in 0..30 {
            arcade.tick(&idle(), DT, &mut audio);
        }
        assert_eq!(arcade.mode(), GameMode::Victory);
        assert_eq!(audio.iter().filter(|c| **c == SoundCue::Win).count(), 1);
        assert_eq!(arcade.high_scores().entries().len(), 1);
        assert_eq!(arcade.session().map(|s| s.updates), Some(3));
    }

    #[test]
    fn test_paused_freezes_session() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;
        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        arcade.tick(&press(Action::Pause), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Paused);
        let particles = arcade.particles().len();
        for _ in 0..10 {
            arcade.tick(&idle(), DT, &mut audio);
        }
        assert_eq!(arcade.session().map(|s| s.updates), Some(1));
        assert_eq!(arcade.particles().len(), particles);

        arcade.tick(&press(Action::Pause), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Playing);
        assert_eq!(arcade.session().map(|s| s.updates), Some(2));
    }

    #[test]
    fn test_end_state_settles_particles() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;
        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        for _ in 0..2 {
            arcade.tick(&idle(), DT, &mut audio);
        }
        assert_eq!(arcade.mode(), GameMode::Victory);
        assert!(!arcade.particles().is_empty());
        for _ in 0..200 {
            arcade.tick(&idle(), DT, &mut audio);
        }
        assert!(arcade.particles().is_empty());
    }

    #[test]
    fn test_restart_replaces_session() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;
        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        for _ in 0..2 {
            arcade.tick(&idle(), DT, &mut audio);
        }
        assert_eq!(arcade.mode(), GameMode::Victory);
        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Playing);
        assert_eq!(arcade.session().map(|s| s.score), Some(1));
    }

    #[test]
    fn test_cancel_returns_to_menu_and_drops_session() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;
        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        arcade.tick(&press(Action::Pause), DT, &mut audio);
        arcade.tick(&press(Action::Cancel), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Menu);
        assert!(arcade.session().is_none());
        assert!(arcade.particles().is_empty());
    }

    #[test]
    fn test_option_select_navigation_wraps() {
        let mut arcade = Arcade::<Picky>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;
        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::OptionSelect);
        assert_eq!(arcade.selected_target(), Some(5));

        arcade.tick(&press(Action::Down), DT, &mut audio);
        arcade.tick(&press(Action::Down), DT, &mut audio);
        assert_eq!(arcade.selected_target(), Some(3));
        arcade.tick(&press(Action::Up), DT, &mut audio);
        assert_eq!(arcade.selected_target(), Some(8));

        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Playing);
        assert_eq!(arcade.session().map(|s| s.0.target), Some(8));
    }

    #[test]
    fn test_first_flow_event_wins() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;
        // Pause is checked before Confirm, and Menu ignores Pause
        let both = InputSnapshot::new().press(Action::Pause).press(Action::Confirm);
        arcade.tick(&both, DT, &mut audio);
        assert_eq!(arcade.mode(), GameMode::Menu);
    }

    #[test]
    fn test_draw_routing() {
        let mut arcade = Arcade::<Counter>::new(Settings::default(), 1);
        let mut audio = crate::audio::Silent;

        let mut shapes: Vec<Shape> = Vec::new();
        arcade.draw(&mut shapes);
        assert!(shapes.is_empty());

        arcade.tick(&press(Action::Confirm), DT, &mut audio);
        arcade.draw(&mut shapes);
        // Session circle first, then the particles it emitted
        assert_eq!(shapes.len(), 3);
        assert!(matches!(shapes[0], Shape::Circle { color, .. } if color == palette::WHITE));
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut arcade = Arcade::<Counter>::new(Settings::default(), seed);
            let mut audio = crate::audio::Silent;
            arcade.tick(&press(Action::Confirm), DT, &mut audio);
            arcade.particles().particles().to_vec()
        };
        assert_eq!(run(42), run(42));
    }
}
