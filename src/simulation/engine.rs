//! Turn and action API
//!
//! Every player action validates first and mutates second, so a returned
//! `Err` always leaves the state untouched. `change_location` is the turn
//! resolution and runs its steps in a fixed order because later steps read
//! what earlier ones wrote.

use log::{debug, info};

use super::catalog::{self, CatalogError, EventCatalog};
use super::config::GameConfig;
use super::error::GameError;
use super::events::{
    get_end_game_warning, EventPayload, EventSystem, GameEvent, GameOverReason, GameOverSummary,
    LiquidationRevenue,
};
use super::game_state::GameState;
use super::prices::PriceGenerator;
use super::random::RandomSource;
use super::stocks::{append_history, StockPriceGenerator};
use super::types::{
    weighted_average, GoodId, LocationId, SoundCue, StockId, LOCATION_COUNT, MAX_HEALTH,
    STOCK_COUNT,
};

/// Final-turns window in which every good is listed
pub const FULL_MARKET_TURNS: i32 = 2;
/// Rent is a flat fee while cash is at or below this amount
pub const RENT_FLAT_THRESHOLD: i64 = 30_000;
pub const RENT_FLAT_COST: i64 = 25_000;
/// Rebate subtracted from the half-of-cash rent charged to rich players
pub const RENT_WEALTH_REBATE: i64 = 2_000;
/// Debt interest per turn, percent
pub const DEBT_INTEREST_PERCENT: i64 = 10;
/// Bank interest per turn, percent
pub const BANK_INTEREST_PERCENT: i64 = 1;

/// Outcome of a stock trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockTrade {
    /// Shares times price
    pub value: i64,
    pub fee: i64,
    /// Cash paid on a buy, cash received on a sell
    pub net: i64,
}

/// Outcome of an internet-cafe visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WangbaVisit {
    pub cost: i64,
    pub reward: i64,
}

pub struct GameEngine {
    config: GameConfig,
    rng: Box<dyn RandomSource>,
    prices: PriceGenerator,
    stocks: StockPriceGenerator,
    events: EventSystem,
}

impl GameEngine {
    pub fn new(config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            rng,
            prices: PriceGenerator::new(),
            stocks: StockPriceGenerator::new(),
            events: EventSystem::new(EventCatalog::standard()),
        }
    }

    /// Build an engine with custom event tables
    pub fn with_catalog(
        config: GameConfig,
        rng: Box<dyn RandomSource>,
        catalog: EventCatalog,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self {
            events: EventSystem::new(catalog),
            ..Self::new(config, rng)
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn events(&self) -> &EventSystem {
        &self.events
    }

    /// Fresh state at a random starting location with opening prices
    pub fn new_game(&mut self) -> GameState {
        let mut state = GameState::new(&self.config);
        let start = LocationId(self.rng.random_int(LOCATION_COUNT as u32) as usize);
        if let Some(location) = catalog::location(start) {
            state.current_location = Some(start);
            state.city = location.city;
        }
        state.market_prices = self
            .prices
            .generate_prices(self.rng.as_mut(), self.config.leaveout);
        state.stock_prices = self.stocks.generate_initial_prices(self.rng.as_mut());
        info!("New game started at {:?}", state.location().map(|l| l.name));
        state
    }

    fn ensure_active(state: &GameState) -> Result<(), GameError> {
        if state.is_game_over() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    pub fn buy_good(
        &mut self,
        state: &mut GameState,
        good: GoodId,
        quantity: u32,
    ) -> Result<i64, GameError> {
        Self::ensure_active(state)?;
        if !catalog::is_valid_good(good) {
            return Err(GameError::UnknownGood(good.0));
        }
        let price = state.market_prices[good.0];
        if price <= 0 {
            return Err(GameError::GoodUnavailable);
        }
        if quantity == 0 {
            return Err(GameError::InvalidQuantity);
        }
        let cost = price * quantity as i64;
        if cost > state.cash {
            return Err(GameError::InsufficientCash {
                needed: cost,
                available: state.cash,
            });
        }
        let free = state.free_capacity();
        if quantity > free {
            return Err(GameError::InsufficientCapacity { free });
        }

        state.cash -= cost;
        let slot = &mut state.inventory[good.0];
        slot.avg_price = weighted_average(slot.avg_price, slot.quantity, price, quantity);
        slot.quantity += quantity;
        slot.good = Some(good);
        debug!("Bought {} x good {} for {}", quantity, good.0, cost);
        Ok(cost)
    }

    pub fn sell_good(
        &mut self,
        state: &mut GameState,
        good: GoodId,
        quantity: u32,
    ) -> Result<i64, GameError> {
        Self::ensure_active(state)?;
        let info = catalog::good(good).ok_or(GameError::UnknownGood(good.0))?;
        let held = state.inventory[good.0].quantity;
        if held == 0 {
            return Err(GameError::NoHolding);
        }
        if quantity == 0 {
            return Err(GameError::InvalidQuantity);
        }
        if quantity > held {
            return Err(GameError::InsufficientHolding { held });
        }
        let price = state.market_prices[good.0];
        if price <= 0 {
            return Err(GameError::NoBuyer);
        }

        let revenue = price * quantity as i64;
        state.cash += revenue;
        let slot = &mut state.inventory[good.0];
        slot.quantity -= quantity;
        if slot.quantity == 0 {
            slot.clear();
        }
        if info.fame_penalty > 0 {
            state.fame = (state.fame - info.fame_penalty).max(0);
        }
        debug!("Sold {} x good {} for {}", quantity, good.0, revenue);
        Ok(revenue)
    }

    fn stock_fee(&self, value: i64) -> i64 {
        (value as f64 * self.config.stock_fee_rate).ceil() as i64
    }

    fn stock_price(&self, state: &GameState, stock: StockId) -> Result<i64, GameError> {
        if !self.config.stock_market_enabled {
            return Err(GameError::StockMarketClosed);
        }
        if stock.0 >= STOCK_COUNT {
            return Err(GameError::UnknownStock(stock.0));
        }
        state
            .stock_prices
            .get(stock.0)
            .copied()
            .ok_or(GameError::StockMarketClosed)
    }

    pub fn buy_stock(
        &mut self,
        state: &mut GameState,
        stock: StockId,
        shares: u32,
    ) -> Result<StockTrade, GameError> {
        Self::ensure_active(state)?;
        let price = self.stock_price(state, stock)?;
        if shares == 0 {
            return Err(GameError::InvalidQuantity);
        }
        let value = price * shares as i64;
        let fee = self.stock_fee(value);
        let net = value + fee;
        if net > state.cash {
            return Err(GameError::InsufficientCash {
                needed: net,
                available: state.cash,
            });
        }
        let Some(holding) = state.stock_holdings.get_mut(stock.0) else {
            return Err(GameError::UnknownStock(stock.0));
        };

        holding.avg_price = weighted_average(holding.avg_price, holding.shares, price, shares);
        holding.shares += shares;
        state.cash -= net;
        Ok(StockTrade { value, fee, net })
    }

    pub fn sell_stock(
        &mut self,
        state: &mut GameState,
        stock: StockId,
        shares: u32,
    ) -> Result<StockTrade, GameError> {
        Self::ensure_active(state)?;
        let price = self.stock_price(state, stock)?;
        if shares == 0 {
            return Err(GameError::InvalidQuantity);
        }
        let held = state
            .stock_holdings
            .get(stock.0)
            .map(|h| h.shares)
            .unwrap_or(0);
        if held == 0 {
            return Err(GameError::NoHolding);
        }
        if shares > held {
            return Err(GameError::InsufficientHolding { held });
        }
        let value = price * shares as i64;
        let fee = self.stock_fee(value);
        let net = (value - fee).max(0);

        let holding = &mut state.stock_holdings[stock.0];
        holding.shares -= shares;
        if holding.shares == 0 {
            holding.avg_price = 0;
        }
        state.cash += net;
        Ok(StockTrade { value, fee, net })
    }

    pub fn deposit_bank(&mut self, state: &mut GameState, amount: i64) -> Result<(), GameError> {
        Self::ensure_active(state)?;
        if amount <= 0 {
            return Err(GameError::InvalidAmount);
        }
        if amount > state.cash {
            return Err(GameError::InsufficientCash {
                needed: amount,
                available: state.cash,
            });
        }
        state.cash -= amount;
        state.bank += amount;
        Ok(())
    }

    pub fn withdraw_bank(&mut self, state: &mut GameState, amount: i64) -> Result<(), GameError> {
        Self::ensure_active(state)?;
        if amount <= 0 {
            return Err(GameError::InvalidAmount);
        }
        if amount > state.bank {
            return Err(GameError::InsufficientBank {
                available: state.bank,
            });
        }
        state.bank -= amount;
        state.cash += amount;
        Ok(())
    }

    /// Repay up to `amount` of debt, cash first and the bank for the rest.
    /// Returns the amount actually repaid.
    pub fn pay_debt(&mut self, state: &mut GameState, amount: i64) -> Result<i64, GameError> {
        Self::ensure_active(state)?;
        if amount <= 0 {
            return Err(GameError::InvalidAmount);
        }
        if state.debt == 0 {
            return Err(GameError::NoDebt);
        }
        let payment = amount.min(state.debt);
        if payment > state.cash + state.bank {
            return Err(GameError::InsufficientFunds { needed: payment });
        }
        let from_cash = payment.min(state.cash);
        state.cash -= from_cash;
        state.bank -= payment - from_cash;
        state.debt -= payment;
        Ok(payment)
    }

    pub fn visit_hospital(&mut self, state: &mut GameState, points: i32) -> Result<i64, GameError> {
        Self::ensure_active(state)?;
        if state.health >= MAX_HEALTH {
            return Err(GameError::AlreadyHealthy);
        }
        if points <= 0 {
            return Err(GameError::InvalidQuantity);
        }
        let headroom = MAX_HEALTH - state.health;
        if points > headroom {
            return Err(GameError::ExceedsHealthHeadroom { headroom });
        }
        let cost = points as i64 * self.config.hospital_cost_per_point;
        if cost > state.cash {
            return Err(GameError::InsufficientCash {
                needed: cost,
                available: state.cash,
            });
        }
        state.cash -= cost;
        state.health += points;
        Ok(cost)
    }

    /// Rent price: a flat fee for modest cash, half of cash minus a rebate
    /// above that
    pub fn rent_cost(cash: i64) -> i64 {
        if cash <= RENT_FLAT_THRESHOLD {
            RENT_FLAT_COST
        } else {
            cash / 2 - RENT_WEALTH_REBATE
        }
    }

    pub fn rent_house(&mut self, state: &mut GameState) -> Result<i64, GameError> {
        Self::ensure_active(state)?;
        if state.capacity >= self.config.max_capacity {
            return Err(GameError::CapacityMaxed);
        }
        let cost = Self::rent_cost(state.cash);
        if !state.spend(cost) {
            return Err(GameError::InsufficientCash {
                needed: cost,
                available: state.cash,
            });
        }
        state.capacity = (state.capacity + self.config.capacity_step).min(self.config.max_capacity);
        Ok(cost)
    }

    /// Pay the entry fee and collect a random reward. `reward_range` is
    /// inclusive; the configured range applies when `None`.
    pub fn visit_wangba(
        &mut self,
        state: &mut GameState,
        reward_range: Option<(i64, i64)>,
    ) -> Result<WangbaVisit, GameError> {
        Self::ensure_active(state)?;
        if state.wangba_visits >= self.config.max_wangba_visits {
            return Err(GameError::WangbaLimitReached);
        }
        let cost = self.config.wangba_entry_cost;
        if state.cash < cost {
            return Err(GameError::InsufficientCash {
                needed: cost,
                available: state.cash,
            });
        }
        let (min, max) = reward_range
            .unwrap_or((self.config.wangba_reward_min, self.config.wangba_reward_max));
        if min < 0 || max < min {
            return Err(GameError::InvalidAmount);
        }

        // Inclusive span, drawn through a u32 bound
        let span = max
            .checked_sub(min)
            .and_then(|width| width.checked_add(1))
            .and_then(|width| u32::try_from(width).ok())
            .ok_or(GameError::InvalidAmount)?;
        let mut reward = min + self.rng.random_int(span) as i64;
        if state.hacking_enabled {
            reward = (reward as f64 * self.config.hacking_bonus).floor() as i64;
        }
        state.cash = state.cash.saturating_sub(cost).saturating_add(reward);
        state.wangba_visits += 1;
        Ok(WangbaVisit { cost, reward })
    }

    /// Subway fare within a city, flight fare across cities
    pub fn travel_fare(&self, state: &GameState, destination: LocationId) -> Result<i64, GameError> {
        let target = catalog::location(destination).ok_or(GameError::UnknownLocation(destination.0))?;
        if state.current_location == Some(destination) {
            return Err(GameError::SameLocation);
        }
        if target.city == state.city {
            Ok(self.config.subway_fare)
        } else {
            Ok(self.config.flight_fare)
        }
    }

    /// Resolve one turn of travel to `destination`. The fare must already
    /// have been charged by the caller.
    ///
    /// A turn that ends the game returns every event collected before the
    /// end, followed by a single `GameOver` event as the last element.
    pub fn change_location(
        &mut self,
        state: &mut GameState,
        destination: LocationId,
    ) -> Result<Vec<GameEvent>, GameError> {
        Self::ensure_active(state)?;
        let target = catalog::location(destination).ok_or(GameError::UnknownLocation(destination.0))?;

        // 1. Goods market
        let leaveout = if state.time_left <= FULL_MARKET_TURNS {
            0
        } else {
            self.config.leaveout
        };
        state.market_prices = self.prices.generate_prices(self.rng.as_mut(), leaveout);

        // 2. Stock market and history
        self.advance_stock_market(state);

        // 3. Interest
        state.debt += state.debt * DEBT_INTEREST_PERCENT / 100;
        state.bank += state.bank * BANK_INTEREST_PERCENT / 100;
        state.clamp_balances();

        // 4-8. Random events
        let rng = self.rng.as_mut();
        let mut events = self.events.trigger_commercial_events(state, rng);
        if self.config.stock_market_enabled {
            events.extend(self.events.trigger_stock_events(state, rng, &self.stocks));
        }
        events.extend(self.events.trigger_health_events(state, rng));
        events.extend(self.events.trigger_theft_events(state, rng));
        events.extend(self.events.check_debt_penalty(state));

        // 9. Arrive
        state.current_location = Some(destination);
        state.city = target.city;
        state.time_left -= 1;
        debug!(
            "Arrived at {}{} with {} turns left, {} events",
            target.city.display_name(),
            target.name,
            state.time_left,
            events.len()
        );

        // 10. Out of time
        if state.time_left <= 0 {
            let revenue = self.liquidate(state);
            let final_score = state.score();
            info!("Game over (time up), final score {}", final_score);
            events.push(GameEvent::new(
                format!(
                    "时间到了！你把手里的货和股票全部变卖，收入{}元。最终成绩：{}元。",
                    revenue.total, final_score
                ),
                Some(SoundCue::GameOver),
                EventPayload::GameOver(GameOverSummary {
                    reason: GameOverReason::TimeUp,
                    liquidation_revenue: Some(revenue),
                    final_score,
                }),
            ));
            return Ok(events);
        }

        // 11. Dead
        if state.health <= 0 {
            let final_score = state.score();
            info!("Game over (death), final score {}", final_score);
            events.push(GameEvent::new(
                format!("你的身体彻底垮了，倒在了街头……最终成绩：{}元。", final_score),
                Some(SoundCue::Death),
                EventPayload::GameOver(GameOverSummary {
                    reason: GameOverReason::Death,
                    liquidation_revenue: None,
                    final_score,
                }),
            ));
            return Ok(events);
        }

        // 12. Last-turn warning goes first
        if let Some(warning) = get_end_game_warning(state) {
            events.insert(
                0,
                GameEvent::new(warning, Some(SoundCue::Warning), EventPayload::Warning),
            );
        }
        Ok(events)
    }

    fn advance_stock_market(&mut self, state: &mut GameState) {
        if state.stock_prices.len() != STOCK_COUNT {
            state.stock_prices = self.stocks.generate_initial_prices(self.rng.as_mut());
        }
        let previous = state.stock_prices.clone();
        let next = self
            .stocks
            .generate_next_prices(self.rng.as_mut(), &previous);
        let candles: Vec<_> = previous
            .iter()
            .zip(next.iter())
            .enumerate()
            .map(|(index, (open, close))| {
                self.stocks
                    .build_candle(self.rng.as_mut(), StockId(index), *open, *close)
            })
            .collect();
        append_history(
            &mut state.stock_history,
            &candles,
            self.config.stock_history_length,
        );
        state.stock_prices = next;
    }

    /// Sell every good and share at current prices. Goods left unlisted get
    /// a fully listed price table first.
    fn liquidate(&mut self, state: &mut GameState) -> LiquidationRevenue {
        let needs_full_market = state
            .inventory
            .iter()
            .zip(state.market_prices.iter())
            .any(|(slot, price)| slot.quantity > 0 && *price <= 0);
        if needs_full_market {
            state.market_prices = self.prices.generate_prices(self.rng.as_mut(), 0);
        }

        let mut goods = 0;
        for (slot, price) in state.inventory.iter_mut().zip(state.market_prices.iter()) {
            goods += slot.quantity as i64 * price;
            slot.clear();
        }

        let mut stocks = 0;
        for (holding, price) in state
            .stock_holdings
            .iter_mut()
            .zip(state.stock_prices.iter())
        {
            stocks += holding.shares as i64 * price;
            holding.shares = 0;
            holding.avg_price = 0;
        }

        let total = goods + stocks;
        state.cash += total;
        LiquidationRevenue {
            goods,
            stocks,
            total,
        }
    }

    /// `cash + bank + stock value - debt`
    pub fn calculate_score(state: &GameState) -> i64 {
        state.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::events::{EventKind, TheftTarget};
    use crate::simulation::random::testing::ScriptedRng;
    use crate::simulation::types::GOOD_COUNT;

    fn quiet_catalog() -> EventCatalog {
        EventCatalog {
            commercial: Vec::new(),
            health: Vec::new(),
            theft: Vec::new(),
            stock: Vec::new(),
        }
    }

    fn quiet_engine() -> GameEngine {
        GameEngine::with_catalog(
            GameConfig::default(),
            Box::new(ScriptedRng::quiet()),
            quiet_catalog(),
        )
        .expect("empty catalog is valid")
    }

    fn started_state(engine: &mut GameEngine) -> GameState {
        let mut state = engine.new_game();
        state.market_prices = [100; GOOD_COUNT];
        state.current_location = Some(LocationId(0));
        state.city = catalog::LOCATIONS[0].city;
        state
    }

    #[test]
    fn test_new_game_scenario() {
        let mut engine = quiet_engine();
        let state = engine.new_game();
        assert_eq!(state.cash, 2000);
        assert_eq!(state.debt, 5000);
        assert_eq!(state.bank, 0);
        assert_eq!(state.health, 100);
        assert_eq!(state.capacity, 100);
        assert_eq!(state.time_left, 40);
        assert!(state.current_location.is_some());
        assert_eq!(state.stock_prices.len(), STOCK_COUNT);
        assert_eq!(GameEngine::calculate_score(&state), -3000);
    }

    #[test]
    fn test_buy_good_rejections_leave_state_untouched() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.market_prices[1] = 0;
        let before = state.clone();

        assert_eq!(
            engine.buy_good(&mut state, GoodId(8), 1),
            Err(GameError::UnknownGood(8))
        );
        assert_eq!(
            engine.buy_good(&mut state, GoodId(1), 1),
            Err(GameError::GoodUnavailable)
        );
        assert_eq!(
            engine.buy_good(&mut state, GoodId(0), 0),
            Err(GameError::InvalidQuantity)
        );
        assert!(matches!(
            engine.buy_good(&mut state, GoodId(0), 21),
            Err(GameError::InsufficientCash { .. })
        ));
        state.cash = 1_000_000;
        let before_rich = state.clone();
        assert_eq!(
            engine.buy_good(&mut state, GoodId(0), 101),
            Err(GameError::InsufficientCapacity { free: 100 })
        );
        assert_eq!(state, before_rich);
        state.cash = before.cash;
        assert_eq!(state, before);
    }

    #[test]
    fn test_buy_good_weighted_average() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.market_prices[0] = 100;
        assert_eq!(engine.buy_good(&mut state, GoodId(0), 3), Ok(300));
        state.market_prices[0] = 105;
        assert_eq!(engine.buy_good(&mut state, GoodId(0), 4), Ok(420));
        let slot = state.inventory[0];
        assert_eq!(slot.quantity, 7);
        assert_eq!(slot.avg_price, (100 * 3 + 105 * 4) / 7);
        assert_eq!(slot.good, Some(GoodId(0)));
        assert_eq!(state.cash, 2000 - 720);
    }

    #[test]
    fn test_sell_good_clears_slot_and_costs_fame() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        engine.buy_good(&mut state, GoodId(3), 5).expect("buy");
        assert_eq!(engine.sell_good(&mut state, GoodId(3), 5), Ok(500));
        assert_eq!(state.fame, 90);
        assert!(state.inventory[3].is_empty());
        assert_eq!(state.inventory[3].good, None);
        assert_eq!(state.inventory[3].avg_price, 0);

        engine.buy_good(&mut state, GoodId(4), 2).expect("buy");
        engine.sell_good(&mut state, GoodId(4), 1).expect("sell");
        assert_eq!(state.fame, 83);

        state.fame = 5;
        engine.sell_good(&mut state, GoodId(4), 1).expect("sell");
        assert_eq!(state.fame, 0);
    }

    #[test]
    fn test_sell_good_rejections() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        assert_eq!(
            engine.sell_good(&mut state, GoodId(2), 1),
            Err(GameError::NoHolding)
        );
        engine.buy_good(&mut state, GoodId(2), 3).expect("buy");
        assert_eq!(
            engine.sell_good(&mut state, GoodId(2), 0),
            Err(GameError::InvalidQuantity)
        );
        assert_eq!(
            engine.sell_good(&mut state, GoodId(2), 4),
            Err(GameError::InsufficientHolding { held: 3 })
        );
        state.market_prices[2] = 0;
        assert_eq!(
            engine.sell_good(&mut state, GoodId(2), 1),
            Err(GameError::NoBuyer)
        );
    }

    #[test]
    fn test_stock_trades_charge_rounded_up_fee() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.stock_prices = vec![30; STOCK_COUNT];

        let trade = engine.buy_stock(&mut state, StockId(2), 10).expect("buy");
        // 300 * 0.005 = 1.5 -> 2
        assert_eq!(trade, StockTrade { value: 300, fee: 2, net: 302 });
        assert_eq!(state.cash, 2000 - 302);
        assert_eq!(state.stock_holdings[2].shares, 10);
        assert_eq!(state.stock_holdings[2].avg_price, 30);

        state.stock_prices[2] = 40;
        let trade = engine.sell_stock(&mut state, StockId(2), 10).expect("sell");
        assert_eq!(trade, StockTrade { value: 400, fee: 2, net: 398 });
        assert_eq!(state.stock_holdings[2].shares, 0);
        assert_eq!(state.stock_holdings[2].avg_price, 0);
        assert_eq!(state.cash, 2000 - 302 + 398);
    }

    #[test]
    fn test_stock_market_can_be_disabled() {
        let config = GameConfig {
            stock_market_enabled: false,
            ..GameConfig::default()
        };
        let mut engine =
            GameEngine::with_catalog(config, Box::new(ScriptedRng::quiet()), quiet_catalog())
                .expect("valid");
        let mut state = started_state(&mut engine);
        assert_eq!(
            engine.buy_stock(&mut state, StockId(0), 1),
            Err(GameError::StockMarketClosed)
        );
    }

    #[test]
    fn test_bank_transfers_and_debt_payment() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        engine.deposit_bank(&mut state, 1500).expect("deposit");
        assert_eq!((state.cash, state.bank), (500, 1500));
        assert_eq!(
            engine.withdraw_bank(&mut state, 2000),
            Err(GameError::InsufficientBank { available: 1500 })
        );
        engine.withdraw_bank(&mut state, 100).expect("withdraw");
        assert_eq!((state.cash, state.bank), (600, 1400));

        // 1000 owed from 600 cash + 400 bank
        assert_eq!(engine.pay_debt(&mut state, 1000), Ok(1000));
        assert_eq!((state.cash, state.bank, state.debt), (0, 1000, 4000));

        assert_eq!(
            engine.pay_debt(&mut state, 4000),
            Err(GameError::InsufficientFunds { needed: 4000 })
        );
        state.cash = 10_000;
        // Overpaying only clears the remaining debt
        assert_eq!(engine.pay_debt(&mut state, 9000), Ok(4000));
        assert_eq!(state.debt, 0);
        assert_eq!(state.cash, 6000);
        assert_eq!(engine.pay_debt(&mut state, 1), Err(GameError::NoDebt));
    }

    #[test]
    fn test_hospital_visit() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        assert_eq!(
            engine.visit_hospital(&mut state, 1),
            Err(GameError::AlreadyHealthy)
        );
        state.health = 95;
        assert_eq!(
            engine.visit_hospital(&mut state, 6),
            Err(GameError::ExceedsHealthHeadroom { headroom: 5 })
        );
        assert_eq!(engine.visit_hospital(&mut state, 5), Ok(1750));
        assert_eq!(state.health, 100);
        assert_eq!(state.cash, 250);
    }

    #[test]
    fn test_rent_house_pricing_scenarios() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.cash = 20_000;
        assert_eq!(
            engine.rent_house(&mut state),
            Err(GameError::InsufficientCash {
                needed: 25_000,
                available: 20_000
            })
        );
        assert_eq!(state.capacity, 100);

        state.cash = 100_000;
        assert_eq!(engine.rent_house(&mut state), Ok(48_000));
        assert_eq!(state.capacity, 110);
        assert_eq!(state.cash, 52_000);

        state.capacity = 140;
        assert_eq!(engine.rent_house(&mut state), Err(GameError::CapacityMaxed));
    }

    #[test]
    fn test_wangba_visits_and_hacking_bonus() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        // quiet rng draws 1 -> reward min + 1
        let visit = engine
            .visit_wangba(&mut state, Some((100, 200)))
            .expect("visit");
        assert_eq!(visit, WangbaVisit { cost: 15, reward: 101 });
        assert_eq!(state.cash, 2000 - 15 + 101);

        state.hacking_enabled = true;
        let visit = engine
            .visit_wangba(&mut state, Some((100, 200)))
            .expect("visit");
        assert_eq!(visit.reward, 151);

        engine.visit_wangba(&mut state, None).expect("visit");
        assert_eq!(state.wangba_visits, 3);
        assert_eq!(
            engine.visit_wangba(&mut state, None),
            Err(GameError::WangbaLimitReached)
        );
    }

    #[test]
    fn test_wangba_rejects_unbounded_reward_range() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        let before = state.clone();

        for range in [(0, i64::MAX), (0, u32::MAX as i64), (i64::MIN + 1, 0)] {
            assert!(engine.visit_wangba(&mut state, Some(range)).is_err());
        }
        assert_eq!(state, before);

        // Widest range that still fits the draw
        let visit = engine
            .visit_wangba(&mut state, Some((0, u32::MAX as i64 - 1)))
            .expect("visit");
        assert_eq!(visit.reward, 1);
    }

    #[test]
    fn test_interest_step_clamps_negative_balances() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.cash = -50;
        state.bank = -10;
        state.fame = -4;
        engine
            .change_location(&mut state, LocationId(3))
            .expect("turn resolves");
        assert_eq!(state.cash, 0);
        assert_eq!(state.bank, 0);
        assert_eq!(state.fame, 0);
    }

    #[test]
    fn test_travel_fare_by_city() {
        let engine = quiet_engine();
        let mut state = GameState::default();
        state.current_location = Some(LocationId(0));
        state.city = catalog::LOCATIONS[0].city;
        assert_eq!(engine.travel_fare(&state, LocationId(3)), Ok(10));
        assert_eq!(engine.travel_fare(&state, LocationId(12)), Ok(500));
        assert_eq!(
            engine.travel_fare(&state, LocationId(0)),
            Err(GameError::SameLocation)
        );
        assert_eq!(
            engine.travel_fare(&state, LocationId(20)),
            Err(GameError::UnknownLocation(20))
        );
    }

    #[test]
    fn test_change_location_applies_interest_and_moves() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.bank = 1000;
        let events = engine
            .change_location(&mut state, LocationId(15))
            .expect("travel");
        assert!(events.is_empty());
        assert_eq!(state.debt, 5500);
        assert_eq!(state.bank, 1010);
        assert_eq!(state.time_left, 39);
        assert_eq!(state.current_location, Some(LocationId(15)));
        assert_eq!(state.city, catalog::LOCATIONS[15].city);
        assert!(state.stock_history.iter().all(|series| series.len() == 1));
    }

    #[test]
    fn test_change_location_last_turn_liquidates() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.time_left = 1;
        state.inventory[0].quantity = 10;
        state.inventory[0].good = Some(GoodId(0));
        state.stock_holdings[0].shares = 5;

        let events = engine
            .change_location(&mut state, LocationId(1))
            .expect("travel");
        assert_eq!(state.time_left, 0);
        let last = events.last().expect("game over event");
        assert_eq!(last.kind(), EventKind::GameOver);
        match last.payload {
            EventPayload::GameOver(summary) => {
                assert_eq!(summary.reason, GameOverReason::TimeUp);
                let revenue = summary.liquidation_revenue.expect("liquidation");
                assert_eq!(revenue.goods, 10 * state.market_prices[0]);
                assert_eq!(revenue.stocks, 5 * state.stock_prices[0]);
                assert_eq!(summary.final_score, state.score());
            }
            _ => panic!("expected game over payload"),
        }
        assert_eq!(state.total_inventory(), 0);
        assert!(state.stock_holdings.iter().all(|h| h.shares == 0));
        assert!(events.iter().all(|e| e.kind() != EventKind::Warning));
        assert_eq!(
            engine.change_location(&mut state, LocationId(2)),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_change_location_warns_before_final_turn() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.time_left = 2;
        let events = engine
            .change_location(&mut state, LocationId(1))
            .expect("travel");
        assert_eq!(state.time_left, 1);
        assert_eq!(events[0].kind(), EventKind::Warning);
        // Final two turns list every good
        assert!(state.market_prices.iter().all(|p| *p > 0));
    }

    #[test]
    fn test_debt_penalty_can_kill() {
        let mut engine = quiet_engine();
        let mut state = started_state(&mut engine);
        state.debt = 200_000;
        state.health = 25;
        state.time_left = 3;
        let events = engine
            .change_location(&mut state, LocationId(1))
            .expect("travel");
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::DebtPenalty, EventKind::GameOver]);
        match events[1].payload {
            EventPayload::GameOver(summary) => {
                assert_eq!(summary.reason, GameOverReason::Death);
                assert!(summary.liquidation_revenue.is_none());
            }
            _ => panic!("expected game over payload"),
        }
    }

    #[test]
    fn test_change_location_event_order() {
        let catalog = EventCatalog {
            theft: vec![catalog::TheftEvent {
                freq: 1,
                message: "pickpocket",
                ratio: 50,
                targets_bank: false,
            }],
            ..quiet_catalog()
        };
        let mut engine =
            GameEngine::with_catalog(GameConfig::default(), Box::new(ScriptedRng::quiet()), catalog)
                .expect("valid");
        let mut state = started_state(&mut engine);
        state.health = 50;
        let events = engine
            .change_location(&mut state, LocationId(4))
            .expect("travel");
        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::Hospital, EventKind::Theft]);
        assert!(matches!(
            events[1].payload,
            EventPayload::Theft {
                target: TheftTarget::Cash,
                loss: 1000
            }
        ));
        assert_eq!(state.cash, 1000);
        assert_eq!(state.health, 60);
    }
}
