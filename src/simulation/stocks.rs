//! Stock price walk and candle synthesis
//!
//! Each turn every stock moves by a shared drift, its own noise and an
//! occasional jump. The turn's move is recorded as one OHLC candle.

use super::catalog::{StockInfo, STOCKS};
use super::random::RandomSource;
use super::types::{Candle, StockId, STOCK_COUNT};

/// Bound of the market-wide drift term
pub const MARKET_DRIFT: f64 = 0.01;

/// Fraction of daily volatility used for candle wicks
const WICK_FACTOR: f64 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct StockPriceGenerator {
    stocks: &'static [StockInfo; STOCK_COUNT],
}

impl Default for StockPriceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StockPriceGenerator {
    pub fn new() -> Self {
        Self { stocks: &STOCKS }
    }

    fn info(&self, stock: StockId) -> Option<&StockInfo> {
        self.stocks.get(stock.0)
    }

    /// Uniform integer per stock within its start range
    pub fn generate_initial_prices(&self, rng: &mut dyn RandomSource) -> Vec<i64> {
        self.stocks
            .iter()
            .map(|info| {
                let span = (info.start_max - info.start_min + 1).max(1) as u32;
                info.start_min + rng.random_int(span) as i64
            })
            .collect()
    }

    /// `round(base * (1 + drift + noise + jump))` clamped to each stock's
    /// hard range. Missing entries in `current` are seeded from the start range.
    pub fn generate_next_prices(&self, rng: &mut dyn RandomSource, current: &[i64]) -> Vec<i64> {
        let drift = rng.random_float(-MARKET_DRIFT, MARKET_DRIFT);
        self.stocks
            .iter()
            .enumerate()
            .map(|(index, info)| {
                let base = match current.get(index) {
                    Some(price) => *price,
                    None => {
                        let span = (info.start_max - info.start_min + 1).max(1) as u32;
                        info.start_min + rng.random_int(span) as i64
                    }
                };
                let noise = rng.random_float(-info.daily_volatility, info.daily_volatility);
                let jump = if rng.random_float(0.0, 1.0) < info.jump_chance {
                    let magnitude = rng.random_float(info.jump_min, info.jump_max);
                    if rng.random_int(2) == 0 {
                        magnitude
                    } else {
                        -magnitude
                    }
                } else {
                    0.0
                };
                let next = (base as f64 * (1.0 + drift + noise + jump)).round() as i64;
                next.clamp(info.min_price, info.max_price)
            })
            .collect()
    }

    /// Synthesize high/low wicks around the turn's open and close
    pub fn build_candle(
        &self,
        rng: &mut dyn RandomSource,
        stock: StockId,
        open: i64,
        close: i64,
    ) -> Candle {
        let top = open.max(close);
        let bottom = open.min(close);
        let Some(info) = self.info(stock) else {
            return Candle {
                open,
                high: top,
                low: bottom,
                close,
            };
        };
        let wick = WICK_FACTOR * info.daily_volatility;
        let high = (top as f64 * (1.0 + rng.random_float(0.0, wick))).round() as i64;
        let low = (bottom as f64 * (1.0 - rng.random_float(0.0, wick))).round() as i64;
        Candle {
            open,
            high: high.clamp(info.min_price, info.max_price),
            low: low.clamp(info.min_price, info.max_price),
            close,
        }
    }

    /// Clamp a price into a stock's hard range
    pub fn clamp_price(&self, stock: StockId, price: i64) -> i64 {
        match self.info(stock) {
            Some(info) => price.clamp(info.min_price, info.max_price),
            None => price,
        }
    }
}

/// Append one candle per stock, dropping the oldest beyond `max_len`
pub fn append_history(history: &mut Vec<Vec<Candle>>, candles: &[Candle], max_len: usize) {
    if history.len() < candles.len() {
        history.resize_with(candles.len(), Vec::new);
    }
    for (series, candle) in history.iter_mut().zip(candles.iter()) {
        series.push(*candle);
        if series.len() > max_len {
            let excess = series.len() - max_len;
            series.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::random::testing::ScriptedRng;
    use crate::simulation::random::GameRng;

    #[test]
    fn test_initial_prices_in_start_range() {
        let generator = StockPriceGenerator::new();
        let mut rng = GameRng::seeded(11);
        for _ in 0..50 {
            let prices = generator.generate_initial_prices(&mut rng);
            assert_eq!(prices.len(), STOCK_COUNT);
            for (price, info) in prices.iter().zip(STOCKS.iter()) {
                assert!(*price >= info.start_min && *price <= info.start_max);
            }
        }
    }

    #[test]
    fn test_next_prices_stay_clamped() {
        let generator = StockPriceGenerator::new();
        let mut rng = GameRng::seeded(3);
        let mut prices = generator.generate_initial_prices(&mut rng);
        for _ in 0..300 {
            prices = generator.generate_next_prices(&mut rng, &prices);
            for (price, info) in prices.iter().zip(STOCKS.iter()) {
                assert!(*price >= info.min_price && *price <= info.max_price);
            }
        }
    }

    #[test]
    fn test_next_price_formula_without_jump() {
        let generator = StockPriceGenerator::new();
        // drift 0.01, then per stock: noise 0.03, jump roll 0.99 (no jump)
        let mut floats = vec![0.01];
        for _ in 0..STOCK_COUNT {
            floats.extend_from_slice(&[0.03, 0.99]);
        }
        let mut rng = ScriptedRng::quiet().with_floats(&floats);
        let current = vec![50; STOCK_COUNT];
        let next = generator.generate_next_prices(&mut rng, &current);
        // round(50 * 1.04) = 52, inside every hard range
        assert!(next.iter().all(|p| *p == 52));
    }

    #[test]
    fn test_candle_wicks_surround_body() {
        let generator = StockPriceGenerator::new();
        let mut rng = GameRng::seeded(21);
        for _ in 0..100 {
            let candle = generator.build_candle(&mut rng, StockId(0), 50, 40);
            assert!(candle.high >= 50);
            assert!(candle.low <= 40);
            assert!(candle.low >= STOCKS[0].min_price);
            assert_eq!(candle.open, 50);
            assert_eq!(candle.close, 40);
        }
    }

    #[test]
    fn test_history_is_trimmed() {
        let mut history = vec![Vec::new(); 2];
        let candle = Candle {
            open: 1,
            high: 2,
            low: 1,
            close: 2,
        };
        for _ in 0..30 {
            append_history(&mut history, &[candle, candle], 25);
        }
        assert!(history.iter().all(|series| series.len() == 25));
    }
}
