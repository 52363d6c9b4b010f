// src/simulation.rs

use crate::error::SimulationError;
use crate::players::Player;
use crate::scoring::{outcome_blend, ScoringRule};
use crate::types::PredictionVector;
use serde::Serialize;
use tracing::debug;

/// How far the weights may drift from summing to exactly one.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Everything one round produced. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundResult {
    pub predictions: PredictionVector,
    pub market_forecast: f64,
    pub realized_outcome: f64,
    pub scores: Vec<f64>,
}

impl RoundResult {
    /// Scores the market forecast itself against the realized outcome.
    pub fn market_score(&self, rule: ScoringRule) -> f64 {
        rule.score(self.market_forecast, self.realized_outcome)
    }
}

/// The round engine. It owns the roster and runs the players strictly in
/// index order, each one seeing the forecasts of everyone before it.
#[derive(Debug, Clone)]
pub struct Simulation {
    players: Vec<Player>,
}

impl Simulation {
    /// Checks the roster before any round can run: at least one player,
    /// player `k` stored at position `k`, non-negative weights summing to one
    /// within [`WEIGHT_TOLERANCE`], and one shared grid size.
    pub fn new(players: Vec<Player>) -> Result<Self, SimulationError> {
        let first = players.first().ok_or(SimulationError::NoPlayers)?;
        let grid_size = first.domain().len();

        for (position, player) in players.iter().enumerate() {
            if player.index != position {
                return Err(SimulationError::IndexMismatch {
                    position,
                    index: player.index,
                });
            }
            if player.weight < 0.0 || player.weight.is_nan() {
                return Err(SimulationError::NegativeWeight {
                    index: player.index,
                    weight: player.weight,
                });
            }
            if player.domain().len() != grid_size {
                return Err(SimulationError::DomainMismatch {
                    index: player.index,
                    expected: grid_size,
                    actual: player.domain().len(),
                });
            }
        }

        let sum: f64 = players.iter().map(|p| p.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SimulationError::WeightSum {
                sum,
                tolerance: WEIGHT_TOLERANCE,
            });
        }

        Ok(Self { players })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Runs one round against the true event probability `q`.
    pub fn run_round(&self, q: f64) -> Result<RoundResult, SimulationError> {
        if !(0.0..=1.0).contains(&q) {
            return Err(SimulationError::ProbabilityOutOfRange { value: q });
        }

        let mut predictions = PredictionVector::placeholders(self.players.len());
        for player in &self.players {
            // Each player gets its own snapshot; nothing it does can leak
            // into the vector except the forecast written below.
            let snapshot = predictions.clone();
            let forecast = player.predict(&self.players, &snapshot)?;
            debug!(player = player.index, belief = player.belief, forecast, "player moved");
            predictions.set(player.index, forecast);
        }

        let market_forecast = predictions.weighted_sum(&self.players, self.players.len());
        let realized_outcome = outcome_blend(market_forecast, q);
        let scores = self
            .players
            .iter()
            .zip(predictions.as_slice())
            .map(|(player, &forecast)| player.rule.score(forecast, realized_outcome))
            .collect();

        Ok(RoundResult {
            predictions,
            market_forecast,
            realized_outcome,
            scores,
        })
    }
}
