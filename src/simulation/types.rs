//! Core types for the trading simulation
//!
//! Identifiers, inventory records and price-history candles shared by the
//! engine, the event system and the generators.

use serde::{Deserialize, Serialize};

/// Number of tradeable goods
pub const GOOD_COUNT: usize = 8;

/// Number of listed stocks
pub const STOCK_COUNT: usize = 10;

/// Number of travel destinations (10 per city)
pub const LOCATION_COUNT: usize = 20;

/// Maximum health a player can have
pub const MAX_HEALTH: i32 = 100;

/// A wrapper type for good IDs (index into the goods catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoodId(pub usize);

/// A wrapper type for stock IDs (index into the stock catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockId(pub usize);

/// A wrapper type for location IDs (index into the location catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub usize);

/// The two cities a player can travel between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Beijing,
    Shanghai,
}

impl City {
    pub fn display_name(&self) -> &'static str {
        match self {
            City::Beijing => "北京",
            City::Shanghai => "上海",
        }
    }
}

/// A fixed travel destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: &'static str,
    pub city: City,
}

/// A single inventory slot. Slot `i` always holds good `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventorySlot {
    /// The good held in this slot, `None` while empty
    pub good: Option<GoodId>,
    pub quantity: u32,
    /// Running weighted-average purchase price
    pub avg_price: i64,
}

impl InventorySlot {
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Reset to the empty sentinel
    pub fn clear(&mut self) {
        *self = InventorySlot::default();
    }
}

/// Shares held in one stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockHolding {
    pub shares: u32,
    pub avg_price: i64,
}

/// One open-high-low-close record of a stock's price history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open: i64,
    pub high: i64,
    pub low: i64,
    pub close: i64,
}

/// Sound cue identifiers handed to the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Cash,
    Buy,
    Sell,
    Hurt,
    Kill,
    Hospital,
    Theft,
    Hacker,
    Warning,
    Death,
    GameOver,
}

impl SoundCue {
    /// Asset file name used by the audio collaborator
    pub fn file_name(&self) -> &'static str {
        match self {
            SoundCue::Cash => "cash.wav",
            SoundCue::Buy => "buy.wav",
            SoundCue::Sell => "sell.wav",
            SoundCue::Hurt => "hurt.wav",
            SoundCue::Kill => "kill.wav",
            SoundCue::Hospital => "hospital.wav",
            SoundCue::Theft => "theft.wav",
            SoundCue::Hacker => "hacker.wav",
            SoundCue::Warning => "warning.wav",
            SoundCue::Death => "death.wav",
            SoundCue::GameOver => "gameover.wav",
        }
    }
}

/// Floor of the weighted average of an existing position and a new purchase
pub fn weighted_average(old_avg: i64, old_qty: u32, price: i64, qty: u32) -> i64 {
    let total_qty = old_qty as i64 + qty as i64;
    if total_qty == 0 {
        return 0;
    }
    (old_avg * old_qty as i64 + price * qty as i64).div_euclid(total_qty)
}
