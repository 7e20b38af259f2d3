//! Standalone trading game simulation
//!
//! Everything needed to play the game without any front end: price and
//! event generation, the turn engine, and the state manager that persists
//! and publishes state. Randomness, storage, audio, analytics and the
//! leaderboard are all injected so the whole game runs headless and can be
//! driven deterministically in tests.

mod autoplay;
mod catalog;
mod config;
mod engine;
mod error;
mod events;
mod game_state;
mod manager;
mod persistence;
mod prices;
mod random;
mod services;
mod stocks;
mod types;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use autoplay::{AutoPlayReport, AutoPlayer, BUY_THRESHOLD_PERCENT, HEAL_BELOW};
#[allow(unused_imports)]
pub use catalog::{
    CatalogError, CommercialEvent, EventCatalog, GoodInfo, HealthEvent, StockEvent, StockInfo,
    TheftEvent, GOODS, LOCATIONS, STOCKS,
};
#[allow(unused_imports)]
pub use config::{
    GameConfig, CAPACITY_STEP, DEFAULT_LEAVEOUT, MAX_CAPACITY, STARTING_CAPACITY, STARTING_CASH,
    STARTING_DEBT, STOCK_HISTORY_LENGTH, TOTAL_TURNS,
};
#[allow(unused_imports)]
pub use engine::{
    GameEngine, StockTrade, WangbaVisit, BANK_INTEREST_PERCENT, DEBT_INTEREST_PERCENT,
    FULL_MARKET_TURNS, RENT_FLAT_COST, RENT_FLAT_THRESHOLD, RENT_WEALTH_REBATE,
};
#[allow(unused_imports)]
pub use error::{GameError, PersistenceError};
#[allow(unused_imports)]
pub use events::{
    get_end_game_warning, EventKind, EventPayload, EventSystem, EventTally, GameEvent,
    GameOverReason, GameOverSummary, LiquidationRevenue, TheftTarget,
};
#[allow(unused_imports)]
pub use game_state::{GameState, STARTING_FAME};
#[allow(unused_imports)]
pub use manager::{GameStateManager, SubscriptionId};
#[allow(unused_imports)]
pub use persistence::{
    decode_save, encode_save, FileStorage, MemoryStorage, SaveData, SaveStorage, SAVE_KEY,
    SAVE_VERSION,
};
#[allow(unused_imports)]
pub use prices::{divide_price, format_price, multiply_price, PriceGenerator};
#[allow(unused_imports)]
pub use random::{roll_frequency, GameRng, RandomSource, COMMERCIAL_MODULUS, EVENT_MODULUS};
#[allow(unused_imports)]
pub use services::{
    Analytics, AudioSink, Leaderboard, LeaderboardPage, LocalLeaderboard, LogAnalytics, LogAudio,
    NoopAnalytics, ScoreRecord, SilentAudio,
};
#[allow(unused_imports)]
pub use stocks::{append_history, StockPriceGenerator, MARKET_DRIFT};
#[allow(unused_imports)]
pub use types::{
    weighted_average, Candle, City, GoodId, InventorySlot, Location, LocationId, SoundCue,
    StockHolding, StockId, GOOD_COUNT, LOCATION_COUNT, MAX_HEALTH, STOCK_COUNT,
};
