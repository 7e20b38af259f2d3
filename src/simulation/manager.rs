//! Owner of the live game state
//!
//! Routes player actions to the engine, then persists the new state and
//! notifies subscribers. Collaborator failures are logged and swallowed.

use anyhow::Result;
use log::{debug, info, warn};
use serde_json::json;
use std::panic::{catch_unwind, AssertUnwindSafe};
use unicode_segmentation::UnicodeSegmentation;

use super::engine::{GameEngine, StockTrade, WangbaVisit};
use super::error::{GameError, PersistenceError};
use super::events::{EventPayload, GameEvent};
use super::game_state::GameState;
use super::persistence::{decode_save, encode_save, SaveStorage, SAVE_KEY};
use super::services::{
    Analytics, AudioSink, Leaderboard, LeaderboardPage, NoopAnalytics, ScoreRecord, SilentAudio,
};
use super::types::{GoodId, LocationId, SoundCue, StockId};

/// Handle returned by [`GameStateManager::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(&GameState) -> Result<()>>;

pub struct GameStateManager {
    engine: GameEngine,
    state: GameState,
    storage: Box<dyn SaveStorage>,
    audio: Box<dyn AudioSink>,
    analytics: Box<dyn Analytics>,
    leaderboard: Option<Box<dyn Leaderboard>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: usize,
}

impl GameStateManager {
    /// Start a fresh game with silent audio and no analytics
    pub fn new(mut engine: GameEngine, storage: Box<dyn SaveStorage>) -> Self {
        let state = engine.new_game();
        Self {
            engine,
            state,
            storage,
            audio: Box::new(SilentAudio),
            analytics: Box::new(NoopAnalytics),
            leaderboard: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_analytics(mut self, analytics: Box<dyn Analytics>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_leaderboard(mut self, leaderboard: Box<dyn Leaderboard>) -> Self {
        self.leaderboard = Some(leaderboard);
        self
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Borrow the live state. It cannot be mutated through this reference.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// An owned copy that never aliases the live state
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn score(&self) -> i64 {
        GameEngine::calculate_score(&self.state)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameState) -> Result<()> + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Call every listener with a snapshot. A listener that errors or
    /// panics is logged and skipped.
    fn notify(&mut self) {
        let snapshot = self.snapshot();
        for (id, listener) in self.listeners.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| listener(&snapshot))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("State listener {:?} failed: {:#}", id, e),
                Err(_) => warn!("State listener {:?} panicked", id),
            }
        }
    }

    fn commit(&mut self) {
        self.save();
        self.notify();
    }

    fn play(&mut self, cue: SoundCue) {
        if self.state.sound_enabled {
            self.audio.play(cue);
        }
    }

    /// Run an engine action; persist and notify only when it succeeds
    fn apply<T>(
        &mut self,
        action: &str,
        op: impl FnOnce(&mut GameEngine, &mut GameState) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        match op(&mut self.engine, &mut self.state) {
            Ok(value) => {
                self.analytics.track(action, json!({ "ok": true }));
                self.commit();
                Ok(value)
            }
            Err(e) => {
                debug!("{} rejected: {}", action, e);
                self.analytics
                    .track(action, json!({ "ok": false, "reason": e.to_string() }));
                Err(e)
            }
        }
    }

    /// Start over, keeping the player's name and toggles
    pub fn new_game(&mut self) {
        let mut state = self.engine.new_game();
        state.player_name = self.state.player_name.clone();
        state.sound_enabled = self.state.sound_enabled;
        state.hacking_enabled = self.state.hacking_enabled;
        self.state = state;
        self.analytics.track(
            "game_start",
            json!({ "hacking": self.state.hacking_enabled }),
        );
        self.commit();
    }

    /// Discard the current game and its save
    pub fn reset(&mut self) {
        self.clear_save();
        self.state = self.engine.new_game();
        self.notify();
    }

    pub fn buy_good(&mut self, good: GoodId, quantity: u32) -> Result<i64, GameError> {
        let cost = self.apply("buy_good", |engine, state| engine.buy_good(state, good, quantity))?;
        self.play(SoundCue::Buy);
        Ok(cost)
    }

    pub fn sell_good(&mut self, good: GoodId, quantity: u32) -> Result<i64, GameError> {
        let revenue =
            self.apply("sell_good", |engine, state| engine.sell_good(state, good, quantity))?;
        self.play(SoundCue::Sell);
        Ok(revenue)
    }

    pub fn buy_stock(&mut self, stock: StockId, shares: u32) -> Result<StockTrade, GameError> {
        self.apply("buy_stock", |engine, state| engine.buy_stock(state, stock, shares))
    }

    pub fn sell_stock(&mut self, stock: StockId, shares: u32) -> Result<StockTrade, GameError> {
        self.apply("sell_stock", |engine, state| engine.sell_stock(state, stock, shares))
    }

    pub fn deposit_bank(&mut self, amount: i64) -> Result<(), GameError> {
        self.apply("deposit_bank", |engine, state| engine.deposit_bank(state, amount))
    }

    pub fn withdraw_bank(&mut self, amount: i64) -> Result<(), GameError> {
        self.apply("withdraw_bank", |engine, state| engine.withdraw_bank(state, amount))
    }

    pub fn pay_debt(&mut self, amount: i64) -> Result<i64, GameError> {
        self.apply("pay_debt", |engine, state| engine.pay_debt(state, amount))
    }

    pub fn visit_hospital(&mut self, points: i32) -> Result<i64, GameError> {
        let cost = self.apply("visit_hospital", |engine, state| {
            engine.visit_hospital(state, points)
        })?;
        self.play(SoundCue::Hospital);
        Ok(cost)
    }

    pub fn rent_house(&mut self) -> Result<i64, GameError> {
        self.apply("rent_house", |engine, state| engine.rent_house(state))
    }

    pub fn visit_wangba(&mut self, reward_range: Option<(i64, i64)>) -> Result<WangbaVisit, GameError> {
        let visit = self.apply("visit_wangba", |engine, state| {
            engine.visit_wangba(state, reward_range)
        })?;
        self.play(SoundCue::Cash);
        Ok(visit)
    }

    /// Charge the fare, then resolve the turn. Without enough cash for the
    /// fare nothing changes and no turn passes.
    pub fn travel_to(&mut self, destination: LocationId) -> Result<Vec<GameEvent>, GameError> {
        let events = self.apply("travel", |engine, state| {
            if state.is_game_over() {
                return Err(GameError::GameOver);
            }
            let fare = engine.travel_fare(state, destination)?;
            if !state.spend(fare) {
                return Err(GameError::InsufficientCash {
                    needed: fare,
                    available: state.cash,
                });
            }
            engine.change_location(state, destination).inspect_err(|_| {
                state.earn(fare);
            })
        })?;

        for event in &events {
            if let Some(cue) = event.sound {
                self.play(cue);
            }
            if let EventPayload::GameOver(summary) = event.payload {
                info!("{}", event.message);
                self.analytics.track(
                    "game_over",
                    json!({
                        "reason": summary.reason,
                        "score": summary.final_score,
                        "fame": self.state.fame,
                    }),
                );
            }
        }
        Ok(events)
    }

    pub fn set_player_name(&mut self, name: &str) {
        let limit = self.engine.config().player_name_max_chars;
        let trimmed: String = name.trim().graphemes(true).take(limit).collect();
        self.state.player_name = if trimmed.is_empty() {
            self.engine.config().default_player_name.clone()
        } else {
            trimmed
        };
        self.commit();
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.state.sound_enabled = enabled;
        self.commit();
    }

    pub fn set_hacking_enabled(&mut self, enabled: bool) {
        self.state.hacking_enabled = enabled;
        self.analytics.track("hacking_toggled", json!({ "enabled": enabled }));
        self.commit();
    }

    /// Persist the current state. Failures are logged and otherwise ignored.
    pub fn save(&mut self) {
        let result = encode_save(&self.state).and_then(|text| self.storage.save(SAVE_KEY, &text));
        if let Err(e) = result {
            warn!("Failed to save game: {}", e);
        }
    }

    /// Replace the state with the stored save. Returns false, leaving the
    /// state untouched, when there is no usable save.
    pub fn load(&mut self) -> bool {
        let text = match self.storage.load(SAVE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return false,
            Err(e) => {
                warn!("Failed to read save: {}", e);
                return false;
            }
        };
        self.replace_from(&text)
    }

    pub fn export_save(&self) -> Result<String, PersistenceError> {
        encode_save(&self.state)
    }

    /// Replace the state with an exported blob. Returns false on any failure.
    pub fn import_save(&mut self, text: &str) -> bool {
        if !self.replace_from(text) {
            return false;
        }
        self.save();
        true
    }

    fn replace_from(&mut self, text: &str) -> bool {
        match decode_save(text) {
            Ok(state) => {
                self.state = state;
                self.notify();
                true
            }
            Err(e) => {
                warn!("Ignoring unusable save: {}", e);
                false
            }
        }
    }

    pub fn clear_save(&mut self) {
        if let Err(e) = self.storage.remove(SAVE_KEY) {
            warn!("Failed to clear save: {}", e);
        }
    }

    fn score_record(&self) -> ScoreRecord {
        ScoreRecord {
            name: self.state.player_name.clone(),
            score: self.score(),
            cash: self.state.cash,
            bank: self.state.bank,
            debt: self.state.debt,
            fame: self.state.fame,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Submit the current score. `None` means it was not submitted.
    pub fn submit_score(&mut self) -> Option<ScoreRecord> {
        let record = self.score_record();
        let leaderboard = self.leaderboard.as_mut()?;
        match leaderboard.submit_score(&record) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Score submission failed: {:#}", e);
                self.analytics.track(
                    "leaderboard_submit_failed",
                    json!({ "error": e.to_string() }),
                );
                None
            }
        }
    }

    pub fn fetch_leaderboard(&mut self) -> Option<LeaderboardPage> {
        let leaderboard = self.leaderboard.as_ref()?;
        match leaderboard.fetch_leaderboard() {
            Ok(page) => page,
            Err(e) => {
                warn!("Leaderboard fetch failed: {:#}", e);
                self.analytics.track(
                    "leaderboard_fetch_failed",
                    json!({ "error": e.to_string() }),
                );
                None
            }
        }
    }
}
