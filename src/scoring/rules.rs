// src/scoring/rules.rs

use super::round_to;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The proper scoring rules a player can be rewarded under. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoringRule {
    /// `q·ln(p) + (1-q)·ln(1-p)`, rounded to four decimals.
    #[serde(rename = "log")]
    #[value(name = "log")]
    Logarithmic,
    /// `-(q·(1-p)² + (1-q)·p²)`.
    Brier,
    /// `-(p-q)²`.
    #[serde(rename = "quadratic")]
    #[value(name = "quadratic")]
    SquaredError,
}

impl ScoringRule {
    pub const ALL: [ScoringRule; 3] = [
        ScoringRule::Logarithmic,
        ScoringRule::Brier,
        ScoringRule::SquaredError,
    ];

    /// Scores forecast `p` against the realized probability `q`.
    pub fn score(self, p: f64, q: f64) -> f64 {
        match self {
            ScoringRule::Logarithmic => {
                if let Some(edge) = log_edge_case(p, q) {
                    return edge;
                }
                round_to(q * p.ln() + (1.0 - q) * (1.0 - p).ln(), 4)
            }
            ScoringRule::Brier => -(q * (1.0 - p).powi(2) + (1.0 - q) * p.powi(2)),
            ScoringRule::SquaredError => -(p - q).powi(2),
        }
    }

    /// Same as [`score`](Self::score) for the `index`-th grid point, reading
    /// the logarithms from a precomputed table.
    pub fn score_at(self, table: &LogTable, index: usize, q: f64) -> f64 {
        let p = table.values[index];
        match self {
            ScoringRule::Logarithmic => {
                if let Some(edge) = log_edge_case(p, q) {
                    return edge;
                }
                round_to(q * table.ln_p[index] + (1.0 - q) * table.ln_not_p[index], 4)
            }
            _ => self.score(p, q),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl std::fmt::Display for ScoringRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScoringRule::Logarithmic => "log",
            ScoringRule::Brier => "brier",
            ScoringRule::SquaredError => "quadratic",
        };
        f.write_str(name)
    }
}

// Certainty contradicted by the outcome is infinitely bad; certainty that
// matches a certain outcome is perfect.
fn log_edge_case(p: f64, q: f64) -> Option<f64> {
    let certain = |x: f64| x == 0.0 || x == 1.0;
    if certain(p) && !certain(q) {
        Some(f64::NEG_INFINITY)
    } else if q == p && certain(q) {
        Some(0.0)
    } else {
        None
    }
}

/// `ln(p)` and `ln(1-p)` for every point of a forecast grid, computed once.
#[derive(Debug, Clone, PartialEq)]
pub struct LogTable {
    values: Vec<f64>,
    ln_p: Vec<f64>,
    ln_not_p: Vec<f64>,
}

impl LogTable {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            ln_p: values.iter().map(|p| p.ln()).collect(),
            ln_not_p: values.iter().map(|p| (1.0 - p).ln()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
