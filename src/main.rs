//! Arcade Trio headless runner
//!
//! Drives one of the games through the full flow controller with a scripted
//! autopilot and a fixed clock, logging what happened. Rendering and audio
//! go to counting/logging sinks.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use rand::Rng;

use arcade_trio::Settings;
use arcade_trio::audio::LogAudio;
use arcade_trio::clock::{Clock, FixedClock};
use arcade_trio::games::{Platformer, Serpent, Shooter};
use arcade_trio::input::{Action, InputSnapshot};
use arcade_trio::render::{Hud, Overlay, Shape, Surface};
use arcade_trio::sim::{Arcade, GameMode, LevelDescriptor, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameChoice {
    /// Escape Rush
    Platformer,
    /// Stellar Defender
    Shooter,
    /// Quantum Serpent
    Serpent,
}

#[derive(Debug, Parser)]
#[command(name = "arcade-trio", version, about = "Run an arcade game headless with an autopilot")]
struct Args {
    #[arg(value_enum)]
    game: GameChoice,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Run seed; overrides the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Platformer level JSON file
    #[arg(long)]
    level: Option<PathBuf>,
}

/// Surface that only counts what it is asked to draw
#[derive(Debug, Default)]
struct Tally {
    shapes: usize,
    huds: usize,
    overlays: usize,
}

impl Surface for Tally {
    fn draw(&mut self, _shape: Shape) {
        self.shapes += 1;
    }

    fn hud(&mut self, _hud: &Hud) {
        self.huds += 1;
    }

    fn overlay(&mut self, _overlay: &Overlay<'_>) {
        self.overlays += 1;
    }
}

/// Scripted input for one frame of play
fn autopilot(game: GameChoice, frame: u64) -> InputSnapshot {
    let input = InputSnapshot::new();
    match game {
        GameChoice::Platformer => {
            let input = input.hold(Action::Right).hold(Action::Sprint);
            if frame % 45 < 10 { input.hold(Action::Up) } else { input }
        }
        GameChoice::Shooter => {
            let side = if (frame / 90) % 2 == 0 { Action::Left } else { Action::Right };
            input.hold(Action::Fire).hold(side)
        }
        GameChoice::Serpent => {
            const LOOP: [Action; 4] = [Action::Up, Action::Left, Action::Down, Action::Right];
            input.hold(LOOP[((frame / 60) % 4) as usize])
        }
    }
}

fn run<S: Session>(game: GameChoice, settings: Settings, seed: u64, seconds: f32) {
    let fps = settings.target_fps.max(1);
    let mut clock = FixedClock::new(1.0 / fps as f32, settings.frame_cap());
    let mut audio = LogAudio::new(settings.muted);
    let mut arcade = Arcade::<S>::new(settings, seed);
    let mut tally = Tally::default();

    let frames = (seconds.max(0.0) * fps as f32) as u64;
    let mut play_frame = 0u64;
    let mut idle = 0u64;
    let mut runs = 0u32;

    for _ in 0..frames {
        let dt = clock.tick();
        let input = match arcade.mode() {
            GameMode::Menu | GameMode::OptionSelect => InputSnapshot::new().press(Action::Confirm),
            GameMode::Playing => {
                play_frame += 1;
                autopilot(game, play_frame)
            }
            GameMode::Paused => InputSnapshot::new().press(Action::Pause),
            GameMode::GameOver | GameMode::Victory => {
                idle += 1;
                if idle >= fps as u64 * 2 {
                    idle = 0;
                    play_frame = 0;
                    InputSnapshot::new().press(Action::Confirm)
                } else {
                    InputSnapshot::new()
                }
            }
        };

        let before = arcade.mode();
        arcade.tick(&input, dt, &mut audio);
        let resumed = matches!(before, GameMode::Playing | GameMode::Paused);
        if !resumed && arcade.mode() == GameMode::Playing {
            runs += 1;
        }
        arcade.draw(&mut tally);
    }

    log::info!(
        "{}: {} frames, {} runs, final mode {:?}",
        S::TITLE,
        frames,
        runs,
        arcade.mode()
    );
    if let Some(session) = arcade.session() {
        log::info!("Last run: score {} at level {}", session.score(), session.level());
    }
    for (rank, entry) in arcade.high_scores().entries().iter().enumerate() {
        log::info!(
            "#{} {} (level {}{})",
            rank + 1,
            entry.score,
            entry.level,
            if entry.won { ", won" } else { "" }
        );
    }
    log::info!(
        "Drew {} shapes, {} HUDs, {} overlays",
        tally.shapes,
        tally.huds,
        tally.overlays
    );
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.seconds.is_finite() || args.seconds < 0.0 {
        bail!("--seconds must be a non-negative number, got {}", args.seconds);
    }

    let mut settings = args.config.as_deref().map(Settings::load).unwrap_or_default();

    if let Some(path) = &args.level {
        let level = LevelDescriptor::load(path)
            .with_context(|| format!("loading level {}", path.display()))?;
        settings.platformer.level = Some(level);
    }

    let seed = args
        .seed
        .or(settings.seed)
        .unwrap_or_else(|| rand::rng().random());
    log::info!("Arcade Trio starting {:?} with seed {}", args.game, seed);

    match args.game {
        GameChoice::Platformer => run::<Platformer>(args.game, settings, seed, args.seconds),
        GameChoice::Shooter => run::<Shooter>(args.game, settings, seed, args.seconds),
        GameChoice::Serpent => run::<Serpent>(args.game, settings, seed, args.seconds),
    }
    Ok(())
}
