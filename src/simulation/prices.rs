//! Per-turn pricing for the goods market

use super::catalog::{GoodInfo, GOODS};
use super::random::RandomSource;
use super::types::GOOD_COUNT;

/// Draws a fresh price table each turn and hides a few goods
#[derive(Debug, Clone, Copy)]
pub struct PriceGenerator {
    goods: &'static [GoodInfo; GOOD_COUNT],
}

impl Default for PriceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceGenerator {
    pub fn new() -> Self {
        Self { goods: &GOODS }
    }

    /// Draw `min + randomInt(max - min)` for every good, then zero
    /// `leaveout` randomly chosen goods. Duplicate picks are allowed, so
    /// fewer than `leaveout` goods may end up hidden.
    pub fn generate_prices(&self, rng: &mut dyn RandomSource, leaveout: usize) -> [i64; GOOD_COUNT] {
        let mut prices = [0; GOOD_COUNT];
        for (price, info) in prices.iter_mut().zip(self.goods.iter()) {
            let spread = (info.max_price - info.min_price).max(0) as u32;
            *price = info.min_price + rng.random_int(spread) as i64;
        }
        for _ in 0..leaveout {
            let hidden = rng.random_int(GOOD_COUNT as u32) as usize;
            prices[hidden] = 0;
        }
        prices
    }
}

/// Apply an event multiplier
pub fn multiply_price(price: i64, multiplier: i64) -> i64 {
    price * multiplier
}

/// Apply an event divisor, flooring and never dropping below 1
pub fn divide_price(price: i64, divisor: i64) -> i64 {
    if divisor <= 0 {
        return price;
    }
    (price / divisor).max(1)
}

/// Render a price with a currency sign and thousands separators
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if price < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}
