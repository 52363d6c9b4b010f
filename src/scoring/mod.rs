// src/scoring/mod.rs

// Proper scoring rules and the blend that produces the realized outcome.
pub mod blend;
pub mod rules;

pub use blend::{outcome_blend, MARKET_IMPACT};
pub use rules::{LogTable, ScoringRule};

/// Rounds half away from zero to `places` decimals. Infinities pass through.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
