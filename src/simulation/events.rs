//! Random events rolled during turn resolution
//!
//! Commercial, stock, health and theft events come from the weighted
//! tables in [`EventCatalog`]. Auto-hospitalization, the hacker event and
//! the debt penalty are rule-driven and live here as well.

use log::debug;
use serde::{Deserialize, Serialize};

use super::catalog::EventCatalog;
use super::game_state::GameState;
use super::prices::{divide_price, multiply_price};
use super::random::{roll_frequency, RandomSource, COMMERCIAL_MODULUS, EVENT_MODULUS};
use super::stocks::StockPriceGenerator;
use super::types::{GoodId, SoundCue, StockId, MAX_HEALTH};

/// Auto-hospitalization triggers below this health
pub const HOSPITAL_HEALTH_THRESHOLD: i32 = 85;
/// Auto-hospitalization only happens while more than this many turns remain
pub const HOSPITAL_MIN_TIME_LEFT: i32 = 3;
/// Health restored by an auto-hospitalization stay
pub const HOSPITAL_HEALTH_RESTORE: i32 = 10;
/// Daily hospital cost is drawn from `[min, max)`
pub const HOSPITAL_DAY_COST_MIN: i64 = 1000;
pub const HOSPITAL_DAY_COST_MAX: i64 = 9500;

/// Debt above which the loan shark's thugs pay a visit
pub const DEBT_PENALTY_THRESHOLD: i64 = 100_000;
pub const DEBT_PENALTY_DAMAGE: i32 = 30;

/// Hacker event frequency against [`EVENT_MODULUS`] (2.5%)
pub const HACKER_FREQ: u32 = 25;
/// Banks below this are not worth hacking
pub const HACKER_MIN_BANK: i64 = 1000;
/// Banks above this risk losing money to the hacker
pub const HACKER_RICH_BANK: i64 = 100_000;
/// Percent chance a rich player's bank is drained rather than padded
pub const HACKER_DRAIN_PERCENT: u32 = 67;

const END_GAME_WARNING: &str = "明天就是最后一天了，该把手里的货都卖掉了！";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Commercial,
    Stock,
    Health,
    Hospital,
    Theft,
    Hacker,
    DebtPenalty,
    Warning,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TheftTarget {
    Cash,
    Bank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    TimeUp,
    Death,
}

/// Revenue from the forced end-of-game sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiquidationRevenue {
    pub goods: i64,
    pub stocks: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub reason: GameOverReason,
    /// Present only when the game ended because time ran out
    pub liquidation_revenue: Option<LiquidationRevenue>,
    pub final_score: i64,
}

/// Structured detail carried by each event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Commercial {
        good: GoodId,
        price_before: i64,
        price_after: i64,
        granted: u32,
        extra_debt: i64,
    },
    Stock {
        stock: StockId,
        price_before: i64,
        price_after: i64,
    },
    Health {
        damage: i32,
        health_after: i32,
    },
    Hospital {
        days: i32,
        cost: i64,
        health_after: i32,
    },
    Theft {
        target: TheftTarget,
        loss: i64,
    },
    Hacker {
        change: i64,
        bank_after: i64,
    },
    DebtPenalty {
        damage: i32,
        health_after: i32,
    },
    Warning,
    GameOver(GameOverSummary),
}

/// One message shown to the player after a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub message: String,
    pub sound: Option<SoundCue>,
    pub payload: EventPayload,
}

impl GameEvent {
    pub fn new(message: impl Into<String>, sound: Option<SoundCue>, payload: EventPayload) -> Self {
        Self {
            message: message.into(),
            sound,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Commercial { .. } => EventKind::Commercial,
            EventPayload::Stock { .. } => EventKind::Stock,
            EventPayload::Health { .. } => EventKind::Health,
            EventPayload::Hospital { .. } => EventKind::Hospital,
            EventPayload::Theft { .. } => EventKind::Theft,
            EventPayload::Hacker { .. } => EventKind::Hacker,
            EventPayload::DebtPenalty { .. } => EventKind::DebtPenalty,
            EventPayload::Warning => EventKind::Warning,
            EventPayload::GameOver(_) => EventKind::GameOver,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.kind() == EventKind::GameOver
    }
}

/// Count of events fired over the system's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTally {
    pub commercial: u32,
    pub stock: u32,
    pub health: u32,
    pub hospital: u32,
    pub theft: u32,
    pub hacker: u32,
    pub debt_penalty: u32,
}

impl EventTally {
    pub fn total(&self) -> u32 {
        self.commercial
            + self.stock
            + self.health
            + self.hospital
            + self.theft
            + self.hacker
            + self.debt_penalty
    }
}

/// Rolls and applies events against a game state
#[derive(Debug, Clone, Default)]
pub struct EventSystem {
    catalog: EventCatalog,
    tally: EventTally,
}

impl EventSystem {
    pub fn new(catalog: EventCatalog) -> Self {
        Self {
            catalog,
            tally: EventTally::default(),
        }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn tally(&self) -> EventTally {
        self.tally
    }

    /// Roll every commercial event independently; any number may fire
    pub fn trigger_commercial_events(
        &mut self,
        state: &mut GameState,
        rng: &mut dyn RandomSource,
    ) -> Vec<GameEvent> {
        let mut fired = Vec::new();
        for event in &self.catalog.commercial {
            if !roll_frequency(rng, COMMERCIAL_MODULUS, event.freq) {
                continue;
            }
            let Some(price) = state.market_prices.get_mut(event.good.0) else {
                continue;
            };
            let price_before = *price;
            if event.multiplier > 0 && *price > 0 {
                *price = multiply_price(*price, event.multiplier);
            }
            if event.divisor > 0 && *price > 0 {
                *price = divide_price(*price, event.divisor);
            }
            let price_after = *price;

            let mut granted = 0;
            if event.free_quantity > 0
                && state.total_inventory() + event.free_quantity <= state.capacity
            {
                let slot = &mut state.inventory[event.good.0];
                if slot.is_empty() {
                    slot.avg_price = 0;
                }
                slot.good = Some(event.good);
                slot.quantity += event.free_quantity;
                granted = event.free_quantity;
            }

            if event.extra_debt > 0 {
                state.debt += event.extra_debt;
            }

            debug!("Commercial event fired: {}", event.message);
            self.tally.commercial += 1;
            fired.push(GameEvent::new(
                event.message,
                None,
                EventPayload::Commercial {
                    good: event.good,
                    price_before,
                    price_after,
                    granted,
                    extra_debt: event.extra_debt,
                },
            ));
        }
        fired
    }

    /// Roll every stock news event independently against current stock prices
    pub fn trigger_stock_events(
        &mut self,
        state: &mut GameState,
        rng: &mut dyn RandomSource,
        stocks: &StockPriceGenerator,
    ) -> Vec<GameEvent> {
        let mut fired = Vec::new();
        for event in &self.catalog.stock {
            if !roll_frequency(rng, EVENT_MODULUS, event.freq) {
                continue;
            }
            let Some(price) = state.stock_prices.get_mut(event.stock.0) else {
                continue;
            };
            let price_before = *price;
            let moved = price_before * (100 + event.percent_change) / 100;
            *price = stocks.clamp_price(event.stock, moved);
            let price_after = *price;

            debug!("Stock event fired: {}", event.message);
            self.tally.stock += 1;
            fired.push(GameEvent::new(
                event.message,
                None,
                EventPayload::Stock {
                    stock: event.stock,
                    price_before,
                    price_after,
                },
            ));
        }
        fired
    }

    /// At most one health event, followed by a possible auto-hospitalization
    pub fn trigger_health_events(
        &mut self,
        state: &mut GameState,
        rng: &mut dyn RandomSource,
    ) -> Vec<GameEvent> {
        let mut fired = Vec::new();
        for event in &self.catalog.health {
            if roll_frequency(rng, EVENT_MODULUS, event.freq) {
                state.health = (state.health - event.damage).max(0);
                self.tally.health += 1;
                fired.push(GameEvent::new(
                    event.message,
                    Some(event.sound),
                    EventPayload::Health {
                        damage: event.damage,
                        health_after: state.health,
                    },
                ));
                break;
            }
        }

        if state.health < HOSPITAL_HEALTH_THRESHOLD && state.time_left > HOSPITAL_MIN_TIME_LEFT {
            fired.push(self.auto_hospitalize(state, rng));
        }
        fired
    }

    /// Debt-funded stay: +10 health, one or two days lost
    fn auto_hospitalize(&mut self, state: &mut GameState, rng: &mut dyn RandomSource) -> GameEvent {
        let days = 1 + rng.random_int(2) as i32;
        let spread = (HOSPITAL_DAY_COST_MAX - HOSPITAL_DAY_COST_MIN) as u32;
        let cost_per_day = HOSPITAL_DAY_COST_MIN + rng.random_int(spread) as i64;
        let cost = days as i64 * cost_per_day;

        state.debt += cost;
        state.health = (state.health + HOSPITAL_HEALTH_RESTORE).min(MAX_HEALTH);
        state.time_left -= days;

        self.tally.hospital += 1;
        GameEvent::new(
            format!(
                "你的身体撑不住了，被好心人送进医院住了{}天。医药费{}元，记在了你的欠账上。",
                days, cost
            ),
            Some(SoundCue::Hospital),
            EventPayload::Hospital {
                days,
                cost,
                health_after: state.health,
            },
        )
    }

    /// At most one catalog theft, plus an independent hacker roll when
    /// hacking mode is on
    pub fn trigger_theft_events(
        &mut self,
        state: &mut GameState,
        rng: &mut dyn RandomSource,
    ) -> Vec<GameEvent> {
        let mut fired = Vec::new();
        for event in &self.catalog.theft {
            if !roll_frequency(rng, EVENT_MODULUS, event.freq) {
                continue;
            }
            let (balance, target) = if event.targets_bank {
                (&mut state.bank, TheftTarget::Bank)
            } else {
                (&mut state.cash, TheftTarget::Cash)
            };
            let remaining = (*balance * (100 - event.ratio) / 100).max(0);
            let loss = *balance - remaining;
            *balance = remaining;

            self.tally.theft += 1;
            fired.push(GameEvent::new(
                event.message,
                Some(SoundCue::Theft),
                EventPayload::Theft { target, loss },
            ));
            break;
        }

        if state.hacking_enabled {
            if let Some(event) = self.trigger_hacker_event(state, rng) {
                fired.push(event);
            }
        }
        fired
    }

    fn trigger_hacker_event(
        &mut self,
        state: &mut GameState,
        rng: &mut dyn RandomSource,
    ) -> Option<GameEvent> {
        if !roll_frequency(rng, EVENT_MODULUS, HACKER_FREQ) {
            return None;
        }
        if state.bank < HACKER_MIN_BANK {
            return None;
        }

        let change = if state.bank > HACKER_RICH_BANK {
            let amount = state.bank / (2 + rng.random_int(20) as i64);
            if rng.random_int(100) < HACKER_DRAIN_PERCENT {
                -amount
            } else {
                amount
            }
        } else {
            state.bank / (1 + rng.random_int(15) as i64)
        };
        state.bank = (state.bank + change).max(0);

        let message = if change < 0 {
            format!("黑客入侵了银行系统，你的账户被盗走了{}元！", -change)
        } else {
            format!("黑客入侵了银行系统，阴差阳错往你的账户里打了{}元！", change)
        };
        self.tally.hacker += 1;
        Some(GameEvent::new(
            message,
            Some(SoundCue::Hacker),
            EventPayload::Hacker {
                change,
                bank_after: state.bank,
            },
        ))
    }

    /// Heavy debt costs 30 health each turn
    pub fn check_debt_penalty(&mut self, state: &mut GameState) -> Option<GameEvent> {
        if state.debt <= DEBT_PENALTY_THRESHOLD {
            return None;
        }
        state.health = (state.health - DEBT_PENALTY_DAMAGE).max(0);
        self.tally.debt_penalty += 1;
        Some(GameEvent::new(
            "你欠的钱太多，债主派人把你狠狠揍了一顿！",
            Some(SoundCue::Kill),
            EventPayload::DebtPenalty {
                damage: DEBT_PENALTY_DAMAGE,
                health_after: state.health,
            },
        ))
    }
}

/// Warning shown when exactly one turn remains
pub fn get_end_game_warning(state: &GameState) -> Option<&'static str> {
    (state.time_left == 1).then_some(END_GAME_WARNING)
}
