//! Simple trading bot used by the headless runner
//!
//! Each turn it sells at a profit, heals when badly hurt, pays down debt,
//! buys the most discounted good and then travels somewhere random.

use log::{debug, info, warn};

use super::catalog;
use super::error::GameError;
use super::events::GameEvent;
use super::manager::GameStateManager;
use super::random::RandomSource;
use super::types::{GoodId, LocationId, GOOD_COUNT, LOCATION_COUNT, MAX_HEALTH};

/// Buy only when the price is at most this percent of the good's midpoint
pub const BUY_THRESHOLD_PERCENT: i64 = 80;
/// Health below which the bot pays for the hospital
pub const HEAL_BELOW: i32 = 60;

/// Totals for one finished run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutoPlayReport {
    pub turns: u32,
    pub events: u32,
    pub final_score: i64,
}

pub struct AutoPlayer {
    rng: Box<dyn RandomSource>,
}

impl AutoPlayer {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { rng }
    }

    /// Play until the game ends or `max_turns` turns have passed
    pub fn play_game(
        &mut self,
        manager: &mut GameStateManager,
        max_turns: Option<u32>,
    ) -> Result<AutoPlayReport, GameError> {
        let mut report = AutoPlayReport::default();
        while !manager.state().is_game_over() {
            if max_turns.is_some_and(|limit| report.turns >= limit) {
                info!("Stopping after {} turns", report.turns);
                break;
            }
            let events = match self.play_turn(manager) {
                Ok(events) => events,
                Err(GameError::InsufficientCash { needed, available }) => {
                    warn!("Bot is stranded: fare {} but only {} cash", needed, available);
                    break;
                }
                Err(e) => return Err(e),
            };
            report.turns += 1;
            report.events += events.len() as u32;
            for event in &events {
                info!("Turn {}: {}", report.turns, event.message);
            }
        }
        report.final_score = manager.score();
        Ok(report)
    }

    /// Trade at the current location, then travel once
    pub fn play_turn(&mut self, manager: &mut GameStateManager) -> Result<Vec<GameEvent>, GameError> {
        let reserve = manager.engine().config().flight_fare;

        let bank = manager.state().bank;
        if bank > 0 {
            manager.withdraw_bank(bank)?;
        }
        self.sell_profitable(manager);
        self.heal(manager, reserve);

        let spare = manager.state().cash - reserve;
        let debt = manager.state().debt;
        if spare > 0 && debt > 0 {
            manager.pay_debt(spare.min(debt))?;
        }
        if manager.state().time_left > 1 {
            self.buy_discounted(manager, reserve);
        }

        let spare = manager.state().cash - reserve;
        if spare > 0 && manager.state().debt == 0 {
            manager.deposit_bank(spare)?;
        }

        let destination = self.pick_destination(manager);
        manager.travel_to(destination)
    }

    fn sell_profitable(&mut self, manager: &mut GameStateManager) {
        let last_chance = manager.state().time_left <= 2;
        for index in 0..GOOD_COUNT {
            let slot = manager.state().inventory[index];
            let price = manager.state().market_prices[index];
            if slot.quantity == 0 || price <= 0 {
                continue;
            }
            if price > slot.avg_price || last_chance {
                if let Err(e) = manager.sell_good(GoodId(index), slot.quantity) {
                    debug!("Bot could not sell good {}: {}", index, e);
                }
            }
        }
    }

    fn heal(&mut self, manager: &mut GameStateManager, reserve: i64) {
        let state = manager.state();
        if state.health >= HEAL_BELOW {
            return;
        }
        let per_point = manager.engine().config().hospital_cost_per_point.max(1);
        let affordable = ((state.cash - reserve).max(0) / per_point) as i32;
        let points = affordable.min(MAX_HEALTH - state.health);
        if points > 0 {
            if let Err(e) = manager.visit_hospital(points) {
                debug!("Bot could not heal: {}", e);
            }
        }
    }

    /// Good with the lowest price relative to its usual range
    fn best_discount(manager: &GameStateManager) -> Option<(GoodId, i64)> {
        manager
            .state()
            .market_prices
            .iter()
            .enumerate()
            .filter(|(_, price)| **price > 0)
            .filter_map(|(index, price)| {
                let info = catalog::good(GoodId(index))?;
                let midpoint = (info.min_price + info.max_price) / 2;
                let percent = *price * 100 / midpoint.max(1);
                Some((GoodId(index), *price, percent))
            })
            .filter(|(_, _, percent)| *percent <= BUY_THRESHOLD_PERCENT)
            .min_by_key(|(_, _, percent)| *percent)
            .map(|(good, price, _)| (good, price))
    }

    fn buy_discounted(&mut self, manager: &mut GameStateManager, reserve: i64) {
        let Some((good, price)) = Self::best_discount(manager) else {
            return;
        };
        let budget = (manager.state().cash - reserve).max(0);
        let quantity = (budget / price).min(manager.state().free_capacity() as i64) as u32;
        if quantity == 0 {
            return;
        }
        if let Err(e) = manager.buy_good(good, quantity) {
            debug!("Bot could not buy good {}: {}", good.0, e);
        }
    }

    /// Random location other than the current one, staying in town when a
    /// flight is unaffordable
    fn pick_destination(&mut self, manager: &GameStateManager) -> LocationId {
        let state = manager.state();
        let here = state.current_location.map(|l| l.0).unwrap_or(0);
        let mut pick = self.rng.random_int(LOCATION_COUNT as u32 - 1) as usize;
        if pick >= here {
            pick += 1;
        }
        let destination = LocationId(pick);
        let fare = manager.engine().travel_fare(state, destination).unwrap_or(i64::MAX);
        if fare <= state.cash {
            return destination;
        }
        // Neighbour in the same city
        let city_start = here - here % (LOCATION_COUNT / 2);
        let offset = (here - city_start + 1) % (LOCATION_COUNT / 2);
        LocationId(city_start + offset)
    }
}
