//! Game-flow modes and the session contract
//!
//! The flow controller is a pure transition table: `transition` decides the
//! next mode from the current mode and one event. Everything a game needs to
//! plug into the controller is the `Session` trait.

use glam::Vec2;

use super::particles::ParticleSystem;
use crate::audio::AudioSink;
use crate::input::InputSnapshot;
use crate::render::{Hud, Surface};
use crate::settings::Settings;

/// Top-level mode; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// Title screen (initial)
    #[default]
    Menu,
    /// Choosing a target before play (only for games that offer options)
    OptionSelect,
    /// Active gameplay
    Playing,
    /// Gameplay frozen; backdrop still drawn
    Paused,
    /// Lives or health exhausted
    GameOver,
    /// Win condition met
    Victory,
}

/// Explicit trigger for a mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowEvent {
    /// Start / restart / accept selection
    Confirm,
    /// Back out to the menu
    Cancel,
    /// Pause toggle
    Pause,
    LivesExhausted,
    GoalReached,
}

/// Result of a valid transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Switch mode, keeping the current session
    Enter(GameMode),
    /// Discard the session, build a fresh one and enter `Playing`
    Restart,
}

impl Transition {
    /// Mode active after the transition is applied
    pub fn target(self) -> GameMode {
        match self {
            Transition::Enter(mode) => mode,
            Transition::Restart => GameMode::Playing,
        }
    }
}

/// Next step for `event` in `mode`; `None` means the event is ignored there
pub fn transition(mode: GameMode, event: FlowEvent, has_options: bool) -> Option<Transition> {
    use FlowEvent::*;
    use GameMode::*;

    match (mode, event) {
        (Menu, Confirm) if has_options => Some(Transition::Enter(OptionSelect)),
        (Menu, Confirm) => Some(Transition::Restart),

        (OptionSelect, Confirm) => Some(Transition::Restart),
        (OptionSelect, Cancel) => Some(Transition::Enter(Menu)),

        (Playing, Pause) => Some(Transition::Enter(Paused)),
        (Playing, LivesExhausted) => Some(Transition::Enter(GameOver)),
        (Playing, GoalReached) => Some(Transition::Enter(Victory)),

        (Paused, Pause) => Some(Transition::Enter(Playing)),
        (Paused, Cancel) => Some(Transition::Enter(Menu)),

        (GameOver | Victory, Confirm) => Some(Transition::Restart),
        (GameOver | Victory, Cancel) => Some(Transition::Enter(Menu)),

        _ => None,
    }
}

/// Per-frame judgement of a session; loss is checked before the win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Continue,
    Lost,
    Won,
}

impl Verdict {
    pub fn judge(lost: bool, won: bool) -> Self {
        if lost {
            Verdict::Lost
        } else if won {
            Verdict::Won
        } else {
            Verdict::Continue
        }
    }

    pub fn event(self) -> Option<FlowEvent> {
        match self {
            Verdict::Continue => None,
            Verdict::Lost => Some(FlowEvent::LivesExhausted),
            Verdict::Won => Some(FlowEvent::GoalReached),
        }
    }
}

/// Collaborators a session may touch during one update
pub struct FrameContext<'a> {
    pub dt: f32,
    pub input: &'a InputSnapshot,
    pub particles: &'a mut ParticleSystem,
    pub audio: &'a mut dyn AudioSink,
}

/// One play session of a game: world, entities and counters.
///
/// A session is built fresh for every (re)start and dropped wholesale when
/// the run ends; nothing carries over except what the controller owns.
pub trait Session: Sized {
    /// Display name used in logs and the menu overlay
    const TITLE: &'static str;

    /// Targets offered in `OptionSelect`; empty skips that mode
    fn targets(_settings: &Settings) -> Vec<u64> {
        Vec::new()
    }

    /// Index of the preselected target
    fn default_target(_settings: &Settings) -> usize {
        0
    }

    /// Title-screen backdrop: area to scatter drifting motes over and the
    /// per-frame chance of a new one. `None` leaves the menu bare
    fn ambient(_settings: &Settings) -> Option<(Vec2, f64)> {
        None
    }

    /// Build a fresh session
    fn start(settings: &Settings, target: Option<u64>, seed: u64) -> Self;

    /// Advance one frame of gameplay
    fn update(&mut self, ctx: &mut FrameContext<'_>);

    /// Win/loss check, run after `update`
    fn verdict(&self) -> Verdict;

    fn score(&self) -> u64;

    fn level(&self) -> u32;

    /// Camera offset applied to world-space drawing
    fn camera(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Draw world and entities (not particles or HUD)
    fn draw(&self, surface: &mut dyn Surface);

    fn hud(&self) -> Hud;
}
