//! Game state tracking for the trading game
//!
//! A single mutable aggregate holding the player's money, health, goods,
//! stocks and position. The engine mutates it in place; the manager owns it.

use serde::{Deserialize, Serialize};

use super::catalog;
use super::config::GameConfig;
use super::types::{
    Candle, City, InventorySlot, Location, LocationId, StockHolding, GOOD_COUNT,
    MAX_HEALTH, STOCK_COUNT,
};

/// Fame every player starts with
pub const STARTING_FAME: i32 = 100;

/// Game state that tracks player progress and resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub cash: i64,
    pub debt: i64,
    pub bank: i64,

    /// Health in `[0, 100]`
    pub health: i32,
    pub fame: i32,

    /// Slot `i` holds good `i`
    pub inventory: [InventorySlot; GOOD_COUNT],
    pub capacity: u32,

    /// `None` before the game starts
    pub current_location: Option<LocationId>,
    pub city: City,

    /// Turns remaining; the game ends when this reaches 0
    pub time_left: i32,

    /// Current price per good, 0 when unavailable this turn
    pub market_prices: [i64; GOOD_COUNT],

    /// Empty until the stock market has been seeded
    pub stock_prices: Vec<i64>,
    pub stock_holdings: Vec<StockHolding>,
    pub stock_history: Vec<Vec<Candle>>,

    pub sound_enabled: bool,
    pub hacking_enabled: bool,
    pub wangba_visits: u32,
    pub player_name: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl GameState {
    /// Create a game state with starting conditions, before any location
    /// or prices are assigned
    pub fn new(config: &GameConfig) -> Self {
        Self {
            cash: config.starting_cash,
            debt: config.starting_debt,
            bank: 0,
            health: MAX_HEALTH,
            fame: STARTING_FAME,
            inventory: [InventorySlot::default(); GOOD_COUNT],
            capacity: config.starting_capacity,
            current_location: None,
            city: City::Beijing,
            time_left: config.total_turns,
            market_prices: [0; GOOD_COUNT],
            stock_prices: Vec::new(),
            stock_holdings: vec![StockHolding::default(); STOCK_COUNT],
            stock_history: vec![Vec::new(); STOCK_COUNT],
            sound_enabled: true,
            hacking_enabled: false,
            wangba_visits: 0,
            player_name: config.default_player_name.clone(),
        }
    }

    /// Check if player can afford a purchase
    pub fn can_afford(&self, cost: i64) -> bool {
        self.cash >= cost
    }

    /// Deduct cash for a purchase
    /// Returns true if successful, false if insufficient funds
    pub fn spend(&mut self, cost: i64) -> bool {
        if self.can_afford(cost) {
            self.cash -= cost;
            true
        } else {
            false
        }
    }

    /// Add cash from revenue
    pub fn earn(&mut self, amount: i64) {
        self.cash += amount;
    }

    /// Total units of goods carried
    pub fn total_inventory(&self) -> u32 {
        self.inventory.iter().map(|slot| slot.quantity).sum()
    }

    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.total_inventory())
    }

    pub fn location(&self) -> Option<&'static Location> {
        self.current_location.and_then(catalog::location)
    }

    /// Market value of all held shares at current prices
    pub fn stock_value(&self) -> i64 {
        self.stock_holdings
            .iter()
            .zip(self.stock_prices.iter())
            .map(|(holding, price)| holding.shares as i64 * price)
            .sum()
    }

    /// Final-score formula: cash + bank + stock value - debt
    pub fn score(&self) -> i64 {
        self.cash + self.bank + self.stock_value() - self.debt
    }

    /// The game ends when time runs out or the player dies
    pub fn is_game_over(&self) -> bool {
        self.time_left <= 0 || self.health <= 0
    }

    /// Clamp balances into their legal ranges
    pub fn clamp_balances(&mut self) {
        self.cash = self.cash.max(0);
        self.bank = self.bank.max(0);
        self.debt = self.debt.max(0);
        self.health = self.health.clamp(0, MAX_HEALTH);
        self.fame = self.fame.max(0);
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        let place = self
            .location()
            .map(|loc| format!("{}{}", loc.city.display_name(), loc.name))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "Cash: {} | Bank: {} | Debt: {} | Health: {} | Fame: {} | Goods: {}/{} | Turns left: {} | At: {}",
            self.cash,
            self.bank,
            self.debt,
            self.health,
            self.fame,
            self.total_inventory(),
            self.capacity,
            self.time_left,
            place
        )
    }
}
