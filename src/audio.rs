//! Audio cue dispatch
//!
//! The simulation never synthesises sound. It names a cue and hands it to
//! whatever sink the platform layer installed.

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Player left the ground
    Jump,
    /// Coin or orb collected
    Coin,
    /// Something took a hit (stomp, damage)
    Hit,
    /// Victory reached
    Win,
    /// Run ended
    GameOver,
    /// Player fired a bolt
    Shoot,
    /// Enemy destroyed
    Explosion,
    /// Power-up collected
    PowerUp,
    /// Difficulty level increased
    LevelUp,
    /// Serpent changed direction
    Turn,
}

impl SoundCue {
    /// Tone sequence `(frequency Hz, duration s)` for a simple square/sine synth
    pub fn tones(self) -> &'static [(f32, f32)] {
        match self {
            SoundCue::Jump => &[(440.0, 0.1)],
            SoundCue::Coin => &[(880.0, 0.15)],
            SoundCue::Hit => &[(220.0, 0.2)],
            SoundCue::Win => &[(523.0, 0.2), (659.0, 0.2), (784.0, 0.2)],
            SoundCue::GameOver => &[(392.0, 0.2), (311.0, 0.2), (262.0, 0.4)],
            SoundCue::Shoot => &[(1320.0, 0.04)],
            SoundCue::Explosion => &[(110.0, 0.25)],
            SoundCue::PowerUp => &[(660.0, 0.08), (990.0, 0.12)],
            SoundCue::LevelUp => &[(523.0, 0.1), (784.0, 0.15)],
            SoundCue::Turn => &[(330.0, 0.03)],
        }
    }
}

/// Receiver of audio cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Drops every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Logs every cue at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio {
    muted: bool,
}

impl LogAudio {
    pub fn new(muted: bool) -> Self {
        Self { muted }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        log::debug!("audio cue {:?} {:?}", cue, cue.tones());
    }
}

/// Records cues in order (handy for tests and replays)
impl AudioSink for Vec<SoundCue> {
    fn play(&mut self, cue: SoundCue) {
        self.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cue_has_tones() {
        let cues = [
            SoundCue::Jump,
            SoundCue::Coin,
            SoundCue::Hit,
            SoundCue::Win,
            SoundCue::GameOver,
            SoundCue::Shoot,
            SoundCue::Explosion,
            SoundCue::PowerUp,
            SoundCue::LevelUp,
            SoundCue::Turn,
        ];
        for cue in cues {
            assert!(!cue.tones().is_empty());
            assert!(cue.tones().iter().all(|&(f, d)| f > 0.0 && d > 0.0));
        }
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut log: Vec<SoundCue> = Vec::new();
        log.play(SoundCue::Jump);
        log.play(SoundCue::Coin);
        assert_eq!(log, vec![SoundCue::Jump, SoundCue::Coin]);
    }
}
