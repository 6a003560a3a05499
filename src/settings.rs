//! Game settings and preferences
//!
//! Read from a JSON file by the native runner. Missing fields fall back to
//! their defaults so older files keep working.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, TARGET_FPS};
use crate::tuning::{PlatformerTuning, SerpentTuning, ShooterTuning};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Largest dt a frame may advance by (seconds)
    pub max_frame_dt: f32,
    /// Frame pacing target (0 = unpaced)
    pub target_fps: u32,

    // === Audio ===
    /// Suppress every audio cue
    pub muted: bool,

    // === Determinism ===
    /// Fixed run seed (random when absent)
    pub seed: Option<u64>,

    // === Balance ===
    pub platformer: PlatformerTuning,
    pub shooter: ShooterTuning,
    pub serpent: SerpentTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_frame_dt: MAX_FRAME_DT,
            target_fps: TARGET_FPS,
            muted: false,
            seed: None,
            platformer: PlatformerTuning::default(),
            shooter: ShooterTuning::default(),
            serpent: SerpentTuning::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from disk, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Effective frame cap (never negative)
    pub fn frame_cap(&self) -> f32 {
        self.max_frame_dt.max(0.0)
    }
}
