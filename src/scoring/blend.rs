// src/scoring/blend.rs

use super::round_to;

/// Share of the realized outcome driven by the market forecast itself.
/// The remaining `1 - MARKET_IMPACT` comes from the true event probability.
pub const MARKET_IMPACT: f64 = 0.1;

/// The probability forecasts are scored against: `c·market + (1-c)·q`,
/// rounded to two decimals.
///
/// Both the round itself and every hypothetical lookahead go through this
/// function, so the scores a player anticipates are the scores it gets.
pub fn outcome_blend(market: f64, q: f64) -> f64 {
    round_to(MARKET_IMPACT * market + (1.0 - MARKET_IMPACT) * q, 2)
}
