//! Outside collaborators: audio, analytics and the leaderboard
//!
//! The simulation only talks to these through traits. Calls are
//! fire-and-forget; failures never reach the game state.

use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::types::SoundCue;

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Drops every sound
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Logs sounds instead of playing them (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        debug!("Playing sound {}", cue.file_name());
    }
}

pub trait Analytics {
    fn track(&mut self, event: &str, params: serde_json::Value);
}

#[derive(Debug, Default)]
pub struct NoopAnalytics;

impl Analytics for NoopAnalytics {
    fn track(&mut self, _event: &str, _params: serde_json::Value) {}
}

/// Writes every tracked event to the log
#[derive(Debug, Default)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn track(&mut self, event: &str, params: serde_json::Value) {
        info!("analytics {} {}", event, params);
    }
}

/// One leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: i64,
    pub cash: i64,
    pub bank: i64,
    pub debt: i64,
    pub fame: i32,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub items: Vec<ScoreRecord>,
}

pub trait Leaderboard {
    /// Returns the stored record, or `None` if the board declined it
    fn submit_score(&mut self, record: &ScoreRecord) -> Result<Option<ScoreRecord>>;

    fn fetch_leaderboard(&self) -> Result<Option<LeaderboardPage>>;
}

/// In-process leaderboard keeping the best `limit` scores
#[derive(Debug, Clone)]
pub struct LocalLeaderboard {
    limit: usize,
    items: Vec<ScoreRecord>,
}

impl LocalLeaderboard {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            items: Vec::new(),
        }
    }
}

impl Leaderboard for LocalLeaderboard {
    fn submit_score(&mut self, record: &ScoreRecord) -> Result<Option<ScoreRecord>> {
        if self.limit == 0 {
            anyhow::bail!("leaderboard is closed");
        }
        self.items.push(record.clone());
        self.items.sort_by(|a, b| b.score.cmp(&a.score));
        self.items.truncate(self.limit);
        Ok(self.items.iter().find(|r| *r == record).cloned())
    }

    fn fetch_leaderboard(&self) -> Result<Option<LeaderboardPage>> {
        Ok(Some(LeaderboardPage {
            items: self.items.clone(),
        }))
    }
}
