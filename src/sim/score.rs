//! Score and high-score tracking
//!
//! The high score is owned here through the injected [`HighScoreStore`]; it is
//! written the moment it is beaten. The "new high score" celebration compares
//! against the record as it stood when the session started, and fires once.

use crate::highscores::HighScoreStore;

pub struct ScoreTracker {
    score: u64,
    high_score: u64,
    /// Record at session start
    initial_high_score: u64,
    record_celebrated: bool,
    store: Box<dyn HighScoreStore>,
}

impl ScoreTracker {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        let high_score = store.get_high_score();
        Self {
            score: 0,
            high_score,
            initial_high_score: high_score,
            record_celebrated: false,
            store,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn initial_high_score(&self) -> u64 {
        self.initial_high_score
    }

    /// Add points. Returns true when this pushed the high score up.
    pub fn add_score(&mut self, points: u64) -> bool {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
            self.store.set_high_score(self.high_score);
            return true;
        }
        false
    }

    /// True exactly once per session, the first time the session-start
    /// record is beaten
    pub fn take_new_record_celebration(&mut self) -> bool {
        if !self.record_celebrated && self.score > self.initial_high_score {
            self.record_celebrated = true;
            return true;
        }
        false
    }

    pub fn is_new_record(&self) -> bool {
        self.score > self.initial_high_score
    }

    /// New session: score back to zero, record re-read from storage
    pub fn reset(&mut self) {
        self.score = 0;
        self.record_celebrated = false;
        // Never go below what we already know
        self.high_score = self.high_score.max(self.store.get_high_score());
        self.initial_high_score = self.high_score;
    }
}

impl std::fmt::Debug for ScoreTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreTracker")
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .field("initial_high_score", &self.initial_high_score)
            .field("record_celebrated", &self.record_celebrated)
            .finish()
    }
}
