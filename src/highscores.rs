//! Session leaderboard
//!
//! Keeps the best finished runs since the process started, best first.
//! Nothing is written to disk.

use serde::{Deserialize, Serialize};

/// Leaderboard capacity
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level (difficulty tier) reached
    pub level: u32,
    pub won: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `score` would make the board. Zero never does
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_none_or(|lowest| score > lowest.score))
    }

    /// Record a finished run; returns its 1-based rank if it made the board.
    /// Ties rank below earlier runs with the same score.
    pub fn add_score(&mut self, score: u64, level: u32, won: bool) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let slot = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(slot, HighScoreEntry { score, level, won });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    /// Entries, best first
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
