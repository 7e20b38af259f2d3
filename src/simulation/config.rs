//! Tunable game parameters
//!
//! Defaults reproduce the shipped balance. A JSON file may override any
//! subset of fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Starting cash for a new game
pub const STARTING_CASH: i64 = 2000;
/// Starting debt owed to the loan shark
pub const STARTING_DEBT: i64 = 5000;
/// Number of turns in a game
pub const TOTAL_TURNS: i32 = 40;
/// Goods hidden from the market on an ordinary turn
pub const DEFAULT_LEAVEOUT: usize = 3;
/// Starting inventory capacity
pub const STARTING_CAPACITY: u32 = 100;
/// Capacity gained per house rental
pub const CAPACITY_STEP: u32 = 10;
/// Capacity ceiling
pub const MAX_CAPACITY: u32 = 140;
/// Candles retained per stock
pub const STOCK_HISTORY_LENGTH: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub starting_cash: i64,
    pub starting_debt: i64,
    pub total_turns: i32,
    pub leaveout: usize,
    pub starting_capacity: u32,
    pub capacity_step: u32,
    pub max_capacity: u32,
    pub stock_market_enabled: bool,
    /// Fraction of trade value charged per stock trade
    pub stock_fee_rate: f64,
    pub stock_history_length: usize,
    pub hospital_cost_per_point: i64,
    pub wangba_entry_cost: i64,
    /// Default inclusive reward range for a wangba visit
    pub wangba_reward_min: i64,
    pub wangba_reward_max: i64,
    pub max_wangba_visits: u32,
    pub hacking_bonus: f64,
    pub subway_fare: i64,
    pub flight_fare: i64,
    pub player_name_max_chars: usize,
    pub default_player_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_cash: STARTING_CASH,
            starting_debt: STARTING_DEBT,
            total_turns: TOTAL_TURNS,
            leaveout: DEFAULT_LEAVEOUT,
            starting_capacity: STARTING_CAPACITY,
            capacity_step: CAPACITY_STEP,
            max_capacity: MAX_CAPACITY,
            stock_market_enabled: true,
            stock_fee_rate: 0.005,
            stock_history_length: STOCK_HISTORY_LENGTH,
            hospital_cost_per_point: 350,
            wangba_entry_cost: 15,
            wangba_reward_min: 20,
            wangba_reward_max: 200,
            max_wangba_visits: 3,
            hacking_bonus: 1.5,
            subway_fare: 10,
            flight_fare: 500,
            player_name_max_chars: 8,
            default_player_name: "无名小贩".to_string(),
        }
    }
}

impl GameConfig {
    /// Load a config override from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.total_turns <= 0 {
            anyhow::bail!("total_turns must be positive");
        }
        if self.max_capacity < self.starting_capacity {
            anyhow::bail!("max_capacity must not be below starting_capacity");
        }
        if self.wangba_reward_max < self.wangba_reward_min {
            anyhow::bail!("wangba reward range is empty");
        }
        if !(0.0..1.0).contains(&self.stock_fee_rate) {
            anyhow::bail!("stock_fee_rate must be in [0, 1)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "flight_fare": 800, "leaveout": 2 }"#)
            .expect("config should parse");
        assert_eq!(config.flight_fare, 800);
        assert_eq!(config.leaveout, 2);
        assert_eq!(config.starting_cash, STARTING_CASH);
        assert_eq!(config.max_capacity, MAX_CAPACITY);
    }

    #[test]
    fn test_rejects_unknown_and_inconsistent_fields() {
        assert!(GameConfig::from_json(r#"{ "flight_fair": 800 }"#).is_err());
        assert!(GameConfig::from_json(r#"{ "total_turns": 0 }"#).is_err());
        assert!(GameConfig::from_json(r#"{ "wangba_reward_min": 50, "wangba_reward_max": 10 }"#).is_err());
    }

    #[test]
    fn test_from_file_reports_missing_path() {
        let err = GameConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
